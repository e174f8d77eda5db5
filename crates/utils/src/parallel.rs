//! Row fan-out over a region of an [`ImageMut`].
//!
//! Every worker receives one whole row slice of the region, so writes are
//! disjoint by construction and no synchronization is needed. The callback
//! is told the absolute coordinates of the first pixel it owns, which keeps
//! position-derived results independent of how rows are scheduled.

use rayon::prelude::*;
use tracing::trace;

use crate::buffer::ImageMut;
use crate::region::Region;

/// How region rows are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parallelism {
    /// One row after another on the calling thread.
    Serial,
    /// Rows distributed over the global rayon pool.
    #[default]
    Rows,
}

/// Calls `f(x0, y, pixels)` for every row of `region` (clipped to the image),
/// where `pixels` is the region's slice of row `y` starting at column `x0`.
pub fn for_each_row<T, F>(image: &mut ImageMut<'_, T>, region: Region, parallelism: Parallelism, f: F)
where
    T: Copy + Send,
    F: Fn(usize, usize, &mut [T]) + Sync + Send,
{
    let region = region.clip(image.width(), image.height());
    if region.is_empty() {
        return;
    }

    let stride = image.stride();
    let (x0, x1) = (region.x, region.right());
    trace!(?region, ?parallelism, "row fan-out");

    match parallelism {
        Parallelism::Serial => image
            .data
            .chunks_mut(stride)
            .enumerate()
            .skip(region.y)
            .take(region.height)
            .for_each(|(y, row)| f(x0, y, &mut row[x0..x1])),
        Parallelism::Rows => image
            .data
            .par_chunks_mut(stride)
            .enumerate()
            .skip(region.y)
            .take(region.height)
            .for_each(|(y, row)| f(x0, y, &mut row[x0..x1])),
    }
}

/// Per-pixel variant of [`for_each_row`]: `f(x, y, pixel)` is called once for
/// every pixel of the region.
pub fn for_each_pixel<T, F>(
    image: &mut ImageMut<'_, T>,
    region: Region,
    parallelism: Parallelism,
    f: F,
) where
    T: Copy + Send,
    F: Fn(usize, usize, &mut T) + Sync + Send,
{
    for_each_row(image, region, parallelism, |x0, y, row| {
        for (i, px) in row.iter_mut().enumerate() {
            f(x0 + i, y, px);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Bitmap;
    use pretty_assertions::assert_eq;

    fn stamp(parallelism: Parallelism) -> Vec<u32> {
        let mut bitmap = Bitmap::filled(5, 4, 0u32).unwrap();
        let mut view = bitmap.view_mut();
        for_each_pixel(&mut view, Region::new(1, 1, 3, 2), parallelism, |x, y, px| {
            *px = (y * 10 + x) as u32;
        });
        bitmap.into_vec()
    }

    #[test]
    fn writes_only_inside_region() {
        let out = stamp(Parallelism::Serial);
        #[rustfmt::skip]
        let expected = vec![
            0, 0, 0, 0, 0,
            0, 11, 12, 13, 0,
            0, 21, 22, 23, 0,
            0, 0, 0, 0, 0,
        ];
        assert_eq!(out, expected);
    }

    #[test]
    fn serial_and_parallel_agree() {
        assert_eq!(stamp(Parallelism::Serial), stamp(Parallelism::Rows));
    }

    #[test]
    fn honours_stride_padding() {
        let mut data = vec![7u8; 2 * 4 + 3];
        let mut view = ImageMut::from_slice(&mut data, 3, 3, 4).unwrap();
        for_each_pixel(&mut view, Region::full(3, 3), Parallelism::Rows, |_, _, px| {
            *px = 0;
        });
        assert_eq!(data, vec![0, 0, 0, 7, 0, 0, 0, 7, 0, 0, 0]);
    }

    #[test]
    fn empty_region_is_noop() {
        let mut bitmap = Bitmap::filled(2, 2, 1u8).unwrap();
        let mut view = bitmap.view_mut();
        for_each_pixel(&mut view, Region::new(5, 5, 1, 1), Parallelism::Rows, |_, _, px| {
            *px = 0;
        });
        assert_eq!(bitmap.pixels(), &[1, 1, 1, 1]);
    }
}
