//! Effects that read a neighbourhood of the source around each pixel.
//!
//! Every region effect first snapshots the buffer, then computes the region
//! rows in parallel from that snapshot. Reads may reach outside the region
//! (kernel borders clamp to the buffer, not to the region); writes never do.

use std::f64::consts::TAU;

use color::error::ensure_finite;
use color::{ColorModel, Hsl, PackedColor};
use tracing::trace;
use utils::parallel::for_each_pixel;
use utils::{Bitmap, Image, ImageMut, Parallelism, Region};

use crate::error::{Result, invalid};
use crate::kernel::Kernel;
use crate::pixel::PixelEffect;

/// Fewest lightness levels a cartoon pass accepts.
pub const MIN_STEPS: u32 = 2;

#[derive(Clone, Debug)]
enum RegionOp {
    Convolution {
        kernel: Kernel,
        bias: f64,
        absolute: bool,
    },
    Pixelate(usize),
    Cartoon {
        blur: Kernel,
        steps: u32,
    },
    CartoonEdges {
        edges: Kernel,
        threshold: f64,
        background: PixelEffect,
    },
}

#[derive(Clone, Debug)]
pub struct RegionEffect {
    op: RegionOp,
}

impl RegionEffect {
    fn from_op(op: RegionOp) -> Self {
        Self { op }
    }

    pub fn convolution(kernel: Kernel) -> Self {
        Self::from_op(RegionOp::Convolution {
            kernel,
            bias: 0.0,
            absolute: false,
        })
    }

    /// Convolution whose per-channel sum is shifted by `bias` and, when
    /// `absolute` is set, replaced by its magnitude before clamping.
    pub fn convolution_with(kernel: Kernel, bias: f64, absolute: bool) -> Result<Self> {
        let bias = ensure_finite("bias", bias)?;
        Ok(Self::from_op(RegionOp::Convolution {
            kernel,
            bias,
            absolute,
        }))
    }

    pub fn box_blur(radius: usize) -> Result<Self> {
        Ok(Self::convolution(Kernel::box_blur(radius)?))
    }

    pub fn gaussian_blur(sigma: f64) -> Result<Self> {
        Ok(Self::convolution(Kernel::gaussian(sigma)?))
    }

    pub fn sharpen() -> Self {
        Self::convolution(Kernel::sharpen())
    }

    /// Laplacian magnitude: black on flat areas, bright along edges.
    pub fn edge_detect() -> Self {
        Self::from_op(RegionOp::Convolution {
            kernel: Kernel::laplacian(),
            bias: 0.0,
            absolute: true,
        })
    }

    pub fn emboss() -> Self {
        Self::convolution(Kernel::emboss())
    }

    /// Fills `block` x `block` tiles, aligned to the region origin, with
    /// their average color.
    pub fn pixelate(block: usize) -> Result<Self> {
        if block == 0 {
            return Err(invalid("block", "must be at least 1"));
        }
        Ok(Self::from_op(RegionOp::Pixelate(block)))
    }

    /// Flat-shaded look: hue of the blurred source cut into `steps / 2`
    /// sectors, saturation of the blurred source, and lightness from the
    /// perceptual gray of the unblurred source cut into `steps` levels.
    /// Source alpha is kept.
    pub fn cartoon(steps: u32, blur_sigma: f64) -> Result<Self> {
        if steps < MIN_STEPS {
            return Err(invalid(
                "steps",
                format!("need at least {MIN_STEPS}, got {steps}"),
            ));
        }
        Ok(Self::from_op(RegionOp::Cartoon {
            blur: Kernel::gaussian(blur_sigma)?,
            steps,
        }))
    }

    /// Black outlines where the Laplacian response reaches `threshold`
    /// (clamped to `[0, 1]`), over the source posterized to `levels`.
    pub fn cartoon_edges(threshold: f64, levels: u32) -> Result<Self> {
        let threshold = ensure_finite("threshold", threshold)?.clamp(0.0, 1.0);
        Ok(Self::from_op(RegionOp::CartoonEdges {
            edges: Kernel::laplacian(),
            threshold,
            background: PixelEffect::posterize(levels)?,
        }))
    }

    pub fn name(&self) -> &'static str {
        match self.op {
            RegionOp::Convolution { .. } => "convolution",
            RegionOp::Pixelate(_) => "pixelate",
            RegionOp::Cartoon { .. } => "cartoon",
            RegionOp::CartoonEdges { .. } => "cartoon-edges",
        }
    }

    /// Rewrites `region` of `image` from a snapshot of its current content.
    pub fn apply(
        &self,
        image: &mut ImageMut<'_, PackedColor>,
        region: Region,
        parallelism: Parallelism,
    ) {
        let region = region.clip(image.width(), image.height());
        if region.is_empty() {
            return;
        }
        let snapshot = Bitmap::from_image(&image.as_image());
        let source = snapshot.view();
        trace!(effect = self.name(), ?region, "region snapshot taken");
        for_each_pixel(image, region, parallelism, |x, y, px| {
            *px = self.compute(&source, region, x, y);
        });
    }

    fn compute(&self, source: &Image<'_, PackedColor>, region: Region, x: usize, y: usize) -> PackedColor {
        let center = source.pixel(x, y);
        match &self.op {
            RegionOp::Convolution {
                kernel,
                bias,
                absolute,
            } => {
                let sums = kernel.convolve(source, x, y).map(|v| {
                    let v = v + bias;
                    if *absolute { v.abs() } else { v }
                });
                PackedColor::from_normalized(sums[0], sums[1], sums[2], center.alpha())
            }
            RegionOp::Pixelate(block) => pixelate(source, region, *block, x, y),
            RegionOp::Cartoon { blur, steps } => {
                let blurred = Hsl::from_rgb(kernel_rgb(blur, source, x, y));
                let hue_steps = (steps / 2).max(1) as f64;
                let hue = (blurred.h / TAU * hue_steps).floor() / hue_steps * TAU;
                let levels = (steps - 1) as f64;
                let lightness = (center.cie_gray() * levels).round() / levels;
                PackedColor::from_hsl(Hsl::new(hue, blurred.s, lightness), center.alpha())
            }
            RegionOp::CartoonEdges {
                edges,
                threshold,
                background,
            } => {
                let response = edges
                    .convolve(source, x, y)
                    .iter()
                    .fold(0.0f64, |m, v| m.max(v.abs()));
                if response >= *threshold && response > 0.0 {
                    PackedColor::BLACK.with_alpha(center.a)
                } else {
                    background.process(center)
                }
            }
        }
    }
}

fn kernel_rgb(kernel: &Kernel, source: &Image<'_, PackedColor>, x: usize, y: usize) -> [f64; 3] {
    kernel.convolve(source, x, y).map(|v| v.clamp(0.0, 1.0))
}

fn pixelate(source: &Image<'_, PackedColor>, region: Region, block: usize, x: usize, y: usize) -> PackedColor {
    let x0 = region.x + (x - region.x) / block * block;
    let y0 = region.y + (y - region.y) / block * block;
    let x1 = (x0 + block).min(region.right());
    let y1 = (y0 + block).min(region.bottom());
    let mut acc = [0.0f64; 4];
    for yy in y0..y1 {
        for px in &source.row(yy)[x0..x1] {
            for (sum, v) in acc.iter_mut().zip(px.normalized()) {
                *sum += v;
            }
        }
    }
    let n = ((x1 - x0) * (y1 - y0)) as f64;
    PackedColor::from_normalized(acc[0] / n, acc[1] / n, acc[2] / n, acc[3] / n)
}
