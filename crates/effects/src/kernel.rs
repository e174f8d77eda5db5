//! Square convolution kernels.

use color::PackedColor;
use color::error::ensure_finite;
use nalgebra::DMatrix;
use utils::Image;

use crate::error::{EffectError, Result, invalid};

/// Largest kernel side length accepted.
pub const MAX_KERNEL_SIZE: usize = 63;
/// Smallest Gaussian standard deviation accepted, in pixels.
pub const MIN_SIGMA: f64 = 1.0e-3;

/// An odd-sized square weight matrix centered on the pixel being computed.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    weights: DMatrix<f64>,
}

impl Kernel {
    pub fn new(weights: DMatrix<f64>) -> Result<Self> {
        let (rows, cols) = weights.shape();
        if rows != cols || rows % 2 == 0 || rows > MAX_KERNEL_SIZE {
            return Err(EffectError::InvalidKernel {
                rows,
                cols,
                max: MAX_KERNEL_SIZE,
            });
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(EffectError::NonFiniteKernel);
        }
        Ok(Self { weights })
    }

    /// Builds a `size` x `size` kernel from weights listed row by row.
    pub fn from_row_slice(size: usize, weights: &[f64]) -> Result<Self> {
        if size.checked_mul(size) != Some(weights.len()) {
            return Err(invalid(
                "weights",
                format!("expected {} weights for size {size}, got {}", size.saturating_mul(size), weights.len()),
            ));
        }
        Self::new(DMatrix::from_row_slice(size, size, weights))
    }

    /// Uniform average over a `(2 * radius + 1)` square.
    pub fn box_blur(radius: usize) -> Result<Self> {
        if radius > MAX_KERNEL_SIZE / 2 {
            let side = radius.saturating_mul(2).saturating_add(1);
            return Err(EffectError::InvalidKernel {
                rows: side,
                cols: side,
                max: MAX_KERNEL_SIZE,
            });
        }
        let size = 2 * radius + 1;
        let weight = 1.0 / (size * size) as f64;
        Self::new(DMatrix::from_element(size, size, weight))
    }

    /// Normalized Gaussian truncated at three standard deviations.
    pub fn gaussian(sigma: f64) -> Result<Self> {
        let sigma = ensure_finite("sigma", sigma)?;
        if sigma < MIN_SIGMA {
            return Err(invalid(
                "sigma",
                format!("must be at least {MIN_SIGMA}, got {sigma}"),
            ));
        }
        let radius = ((3.0 * sigma).ceil() as usize).min(MAX_KERNEL_SIZE / 2);
        let size = 2 * radius + 1;
        let denom = 2.0 * sigma * sigma;
        let weights = DMatrix::from_fn(size, size, |r, c| {
            let dy = r as f64 - radius as f64;
            let dx = c as f64 - radius as f64;
            (-(dx * dx + dy * dy) / denom).exp()
        });
        let sum = weights.sum();
        Self::new(weights / sum)
    }

    #[rustfmt::skip]
    pub fn sharpen() -> Self {
        Self {
            weights: DMatrix::from_row_slice(3, 3, &[
                0.0, -1.0, 0.0,
                -1.0, 5.0, -1.0,
                0.0, -1.0, 0.0,
            ]),
        }
    }

    /// Four-neighbour Laplacian; responds to edges, zero on flat areas.
    #[rustfmt::skip]
    pub fn laplacian() -> Self {
        Self {
            weights: DMatrix::from_row_slice(3, 3, &[
                0.0, 1.0, 0.0,
                1.0, -4.0, 1.0,
                0.0, 1.0, 0.0,
            ]),
        }
    }

    #[rustfmt::skip]
    pub fn emboss() -> Self {
        Self {
            weights: DMatrix::from_row_slice(3, 3, &[
                -2.0, -1.0, 0.0,
                -1.0, 1.0, 1.0,
                0.0, 1.0, 2.0,
            ]),
        }
    }

    pub fn size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn radius(&self) -> usize {
        self.size() / 2
    }

    pub fn weights(&self) -> &DMatrix<f64> {
        &self.weights
    }

    /// Weighted sum of the normalized R, G and B channels around `(x, y)`.
    /// Samples past the border repeat the nearest edge pixel. The result is
    /// not clamped.
    pub fn convolve(&self, image: &Image<'_, PackedColor>, x: usize, y: usize) -> [f64; 3] {
        let r = self.radius() as isize;
        let (cx, cy) = (x as isize, y as isize);
        let mut acc = [0.0f64; 3];
        for ky in 0..self.size() {
            for kx in 0..self.size() {
                let w = self.weights[(ky, kx)];
                if w == 0.0 {
                    continue;
                }
                let px = image.clamped(cx + kx as isize - r, cy + ky as isize - r);
                let [pr, pg, pb, _] = px.normalized();
                acc[0] += w * pr;
                acc[1] += w * pg;
                acc[2] += w * pb;
            }
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utils::Bitmap;

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(
            Kernel::new(DMatrix::zeros(2, 2)),
            Err(EffectError::InvalidKernel { rows: 2, .. })
        ));
        assert!(Kernel::new(DMatrix::zeros(3, 5)).is_err());
        assert!(Kernel::new(DMatrix::zeros(65, 65)).is_err());
        assert_eq!(
            Kernel::new(DMatrix::from_element(1, 1, f64::NAN)),
            Err(EffectError::NonFiniteKernel)
        );
        assert!(Kernel::from_row_slice(3, &[1.0; 8]).is_err());
        assert!(Kernel::box_blur(40).is_err());
    }

    #[test]
    fn huge_box_radius_is_rejected_before_allocating() {
        assert!(matches!(
            Kernel::box_blur(usize::MAX / 2),
            Err(EffectError::InvalidKernel { max: MAX_KERNEL_SIZE, .. })
        ));
        assert!(Kernel::box_blur(1 << 32).is_err());
        assert!(Kernel::box_blur(1 << 20).is_err());
        assert_eq!(Kernel::box_blur(MAX_KERNEL_SIZE / 2).unwrap().size(), MAX_KERNEL_SIZE);
    }

    #[test]
    fn gaussian_is_normalized_and_symmetric() {
        let k = Kernel::gaussian(1.2).unwrap();
        assert_eq!(k.size(), 9);
        assert!((k.weights().sum() - 1.0).abs() < 1e-12);
        assert_eq!(k.weights()[(0, 1)], k.weights()[(1, 0)]);
        assert!(Kernel::gaussian(0.0).is_err());
        assert_eq!(Kernel::gaussian(100.0).unwrap().size(), MAX_KERNEL_SIZE);
    }

    #[test]
    fn convolve_clamps_at_borders() {
        let bitmap = Bitmap::from_fn(3, 1, |x, _| {
            if x == 0 { PackedColor::WHITE } else { PackedColor::BLACK }
        })
        .unwrap();
        let k = Kernel::box_blur(1).unwrap();
        // Row 0 repeats above and below; column -1 repeats column 0.
        let [r, g, b] = k.convolve(&bitmap.view(), 0, 0);
        assert!((r - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!((r, g), (g, b));
        let flat = k.convolve(&bitmap.view(), 2, 0);
        assert_eq!(flat, [0.0, 0.0, 0.0]);
    }
}
