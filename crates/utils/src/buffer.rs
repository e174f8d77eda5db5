//! Row-major pixel buffers with an explicit stride.
//!
//! External codecs and surfaces hand pixels over as a slice plus
//! `width`, `height` and `stride` (in pixels, `stride >= width`). The
//! borrowed views here validate that contract once and then offer bounds
//! checked access; [`Bitmap`] is the owned, tightly packed counterpart.

use crate::error::{BufferError, Result};
use crate::region::Region;

/// Minimum slice length able to hold `height` rows of `width` pixels spaced
/// `stride` apart. The last row does not need trailing padding.
fn required_len(width: usize, height: usize, stride: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(BufferError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(BufferError::StrideTooSmall { stride, width });
    }
    stride
        .checked_mul(height - 1)
        .and_then(|n| n.checked_add(width))
        .ok_or(BufferError::SizeOverflow)
}

fn validate_len(len: usize, width: usize, height: usize, stride: usize) -> Result<()> {
    let expected = required_len(width, height, stride)?;
    if len < expected {
        return Err(BufferError::InvalidLength {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Read-only view over a caller-owned pixel buffer.
#[derive(Clone, Copy, Debug)]
pub struct Image<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T: Copy> Image<'a, T> {
    pub fn from_slice(data: &'a [T], width: usize, height: usize, stride: usize) -> Result<Self> {
        validate_len(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn bounds(&self) -> Region {
        Region::full(self.width, self.height)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.stride + x])
        } else {
            None
        }
    }

    /// Pixel at `(x, y)`. Panics when out of bounds, like slice indexing.
    pub fn pixel(&self, x: usize, y: usize) -> T {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{} image",
            self.width,
            self.height
        );
        self.data[y * self.stride + x]
    }

    /// Pixel at `(x, y)` with both coordinates clamped into the image,
    /// i.e. the border pixels extend infinitely.
    pub fn clamped(&self, x: isize, y: isize) -> T {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.data[cy * self.stride + cx]
    }

    /// The `width` visible pixels of row `y`.
    pub fn row(&self, y: usize) -> &'a [T] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }
}

/// Mutable view over a caller-owned pixel buffer.
#[derive(Debug)]
pub struct ImageMut<'a, T> {
    pub(crate) data: &'a mut [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T: Copy> ImageMut<'a, T> {
    pub fn from_slice(
        data: &'a mut [T],
        width: usize,
        height: usize,
        stride: usize,
    ) -> Result<Self> {
        validate_len(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn bounds(&self) -> Region {
        Region::full(self.width, self.height)
    }

    pub fn as_image(&self) -> Image<'_, T> {
        Image {
            data: &*self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        self.as_image().get(x, y)
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        if x < self.width && y < self.height {
            self.data[y * self.stride + x] = value;
            true
        } else {
            false
        }
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    /// Copies the pixels of `region` (clipped) out of the view.
    pub fn copy_region(&self, region: Region) -> Bitmap<T> {
        let region = region.clip(self.width, self.height);
        let image = self.as_image();
        let mut data = Vec::with_capacity(region.area());
        for y in region.y..region.bottom() {
            data.extend_from_slice(&image.row(y)[region.x..region.right()]);
        }
        Bitmap {
            data,
            width: region.width,
            height: region.height,
        }
    }
}

/// Owned, tightly packed (`stride == width`) pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Copy> Bitmap<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Result<Self> {
        let len = required_len(width, height, width)?;
        Ok(Self {
            data: vec![value; len],
            width,
            height,
        })
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        let expected = required_len(width, height, width)?;
        if data.len() != expected {
            return Err(BufferError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> Result<Self> {
        let len = required_len(width, height, width)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Packs a strided view into a fresh bitmap of identical dimensions.
    pub fn from_image(image: &Image<'_, T>) -> Self {
        let mut data = Vec::with_capacity(image.width() * image.height());
        for y in 0..image.height() {
            data.extend_from_slice(image.row(y));
        }
        Self {
            data,
            width: image.width(),
            height: image.height(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[T] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn view(&self) -> Image<'_, T> {
        Image {
            data: &self.data[..],
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    pub fn view_mut(&mut self) -> ImageMut<'_, T> {
        ImageMut {
            data: &mut self.data[..],
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        self.view().get(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strided_view_skips_padding() {
        // 2x2 image in rows of 3; the third column is padding.
        let data = [1, 2, 99, 3, 4];
        let image = Image::from_slice(&data, 2, 2, 3).unwrap();
        assert_eq!(image.row(0), &[1, 2]);
        assert_eq!(image.row(1), &[3, 4]);
        assert_eq!(image.get(2, 0), None);
        assert_eq!(Bitmap::from_image(&image).into_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn rejects_short_buffers() {
        let data = [0u32; 5];
        assert_eq!(
            Image::from_slice(&data, 3, 2, 3).unwrap_err(),
            BufferError::InvalidLength {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn rejects_small_stride_and_zero_size() {
        let data = [0u32; 16];
        assert_eq!(
            Image::from_slice(&data, 4, 2, 3).unwrap_err(),
            BufferError::StrideTooSmall {
                stride: 3,
                width: 4
            }
        );
        assert!(matches!(
            Image::from_slice(&data, 0, 2, 3),
            Err(BufferError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn clamped_extends_border() {
        let bitmap = Bitmap::from_fn(3, 2, |x, y| (y * 3 + x) as u8).unwrap();
        let view = bitmap.view();
        assert_eq!(view.clamped(-5, -1), 0);
        assert_eq!(view.clamped(10, 0), 2);
        assert_eq!(view.clamped(1, 7), 4);
    }

    #[test]
    fn copy_region_clips() {
        let mut bitmap = Bitmap::from_fn(4, 4, |x, y| (y * 4 + x) as u8).unwrap();
        let view = bitmap.view_mut();
        let copy = view.copy_region(Region::new(2, 3, 5, 5));
        assert_eq!((copy.width(), copy.height()), (2, 1));
        assert_eq!(copy.pixels(), &[14, 15]);
    }

    #[test]
    fn set_ignores_out_of_bounds() {
        let mut bitmap = Bitmap::filled(2, 2, 0u8).unwrap();
        let mut view = bitmap.view_mut();
        assert!(view.set(1, 1, 7));
        assert!(!view.set(2, 0, 7));
        assert_eq!(bitmap.pixels(), &[0, 0, 0, 7]);
    }
}
