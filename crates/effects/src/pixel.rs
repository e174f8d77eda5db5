//! Effects that map every pixel through a function of its own color.

use std::sync::LazyLock;

use color::error::{ensure_finite, ensure_non_negative};
use color::space::ColorMatrix;
use color::{
    BlendMode, Channel, ColorMap, ColorMetric, ColorModel, ColorTolerance, LinearColor,
    PackedColor, Palette, composite,
};
use nalgebra::Matrix3;

use crate::error::{Result, invalid};

/// Fewest output levels per channel a posterize pass accepts.
pub const MIN_LEVELS: u32 = 2;

#[rustfmt::skip]
static SEPIA: LazyLock<Matrix3<f64>> = LazyLock::new(|| Matrix3::new(
    0.393, 0.769, 0.189,
    0.349, 0.686, 0.168,
    0.272, 0.534, 0.131,
));

/// Where an output channel of [`PixelEffect::channel_remap`] takes its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelSelector {
    Channel(Channel),
    Full,
    Half,
    None,
}

impl ChannelSelector {
    fn select(self, c: PackedColor) -> u8 {
        match self {
            ChannelSelector::Channel(ch) => c.channel(ch),
            ChannelSelector::Full => 255,
            ChannelSelector::Half => 128,
            ChannelSelector::None => 0,
        }
    }
}

impl From<Channel> for ChannelSelector {
    fn from(channel: Channel) -> Self {
        ChannelSelector::Channel(channel)
    }
}

#[derive(Clone, Debug)]
enum PixelOp {
    Invert,
    Grayscale,
    Gamma(f64),
    Brightness(f64),
    Contrast(f64),
    Saturation(f64),
    Opacity(f64),
    Sepia,
    Posterize(u32),
    Threshold {
        metric: ColorMetric,
        threshold: f64,
    },
    ReduceColorSpace {
        palette: Palette,
        metric: ColorMetric,
    },
    ColorMap {
        map: ColorMap,
        metric: ColorMetric,
    },
    ReplaceColor {
        target: PackedColor,
        tolerance: ColorTolerance,
        replacement: PackedColor,
    },
    ChannelRemap([ChannelSelector; 4]),
    BlendColor {
        color: PackedColor,
        mode: BlendMode,
        opacity: f64,
    },
}

/// A transform of one color with no knowledge of where the pixel sits.
///
/// Built through the validating constructors below; once built, applying it
/// cannot fail.
#[derive(Clone, Debug)]
pub struct PixelEffect {
    op: PixelOp,
}

impl PixelEffect {
    fn from_op(op: PixelOp) -> Self {
        Self { op }
    }

    /// `1 - c` on the color channels; alpha is kept.
    pub fn invert() -> Self {
        Self::from_op(PixelOp::Invert)
    }

    /// BT.601 luma written to all three color channels.
    pub fn grayscale() -> Self {
        Self::from_op(PixelOp::Grayscale)
    }

    /// Raises each color channel to `gamma` (`> 0`).
    pub fn gamma(gamma: f64) -> Result<Self> {
        let gamma = ensure_finite("gamma", gamma)?;
        if gamma <= 0.0 {
            return Err(invalid("gamma", format!("must be positive, got {gamma}")));
        }
        Ok(Self::from_op(PixelOp::Gamma(gamma)))
    }

    /// Adds `amount` (clamped to `[-1, 1]`) to each color channel.
    pub fn brightness(amount: f64) -> Result<Self> {
        let amount = ensure_finite("brightness", amount)?.clamp(-1.0, 1.0);
        Ok(Self::from_op(PixelOp::Brightness(amount)))
    }

    /// Scales the distance of each color channel from mid-gray by `factor`.
    pub fn contrast(factor: f64) -> Result<Self> {
        let factor = ensure_non_negative("contrast", factor)?;
        Ok(Self::from_op(PixelOp::Contrast(factor)))
    }

    /// Scales HSL saturation by `factor`; `0` yields gray.
    pub fn saturation(factor: f64) -> Result<Self> {
        let factor = ensure_non_negative("saturation", factor)?;
        Ok(Self::from_op(PixelOp::Saturation(factor)))
    }

    /// Multiplies alpha by `opacity`, clamped to `[0, 1]`.
    pub fn opacity(opacity: f64) -> Result<Self> {
        let opacity = ensure_finite("opacity", opacity)?.clamp(0.0, 1.0);
        Ok(Self::from_op(PixelOp::Opacity(opacity)))
    }

    pub fn sepia() -> Self {
        Self::from_op(PixelOp::Sepia)
    }

    /// Quantizes each color channel to `levels` evenly spaced values.
    pub fn posterize(levels: u32) -> Result<Self> {
        if levels < MIN_LEVELS {
            return Err(invalid(
                "levels",
                format!("need at least {MIN_LEVELS}, got {levels}"),
            ));
        }
        Ok(Self::from_op(PixelOp::Posterize(levels)))
    }

    /// White where `metric.value(c) >= threshold`, black elsewhere; alpha is
    /// kept. `threshold` is clamped to `[0, 1]`.
    pub fn threshold(metric: ColorMetric, threshold: f64) -> Result<Self> {
        let threshold = ensure_finite("threshold", threshold)?.clamp(0.0, 1.0);
        Ok(Self::from_op(PixelOp::Threshold { metric, threshold }))
    }

    /// Replaces every pixel by its nearest palette entry under `metric`.
    pub fn reduce_color_space(palette: Palette, metric: ColorMetric) -> Self {
        Self::from_op(PixelOp::ReduceColorSpace { palette, metric })
    }

    /// Maps the arithmetic mean of R, G and B through `map`.
    pub fn multitone(map: ColorMap) -> Self {
        Self::color_map(map, ColorMetric::Average)
    }

    /// Maps `metric.value(c)` through `map`; alpha is kept.
    pub fn color_map(map: ColorMap, metric: ColorMetric) -> Self {
        Self::from_op(PixelOp::ColorMap { map, metric })
    }

    /// Swaps pixels within `tolerance` of `target` for `replacement`.
    pub fn replace_color(
        target: PackedColor,
        tolerance: ColorTolerance,
        replacement: PackedColor,
    ) -> Self {
        Self::from_op(PixelOp::ReplaceColor {
            target,
            tolerance,
            replacement,
        })
    }

    /// Rebuilds each pixel as `[r, g, b, a]` taken from `selectors`.
    pub fn channel_remap(selectors: [ChannelSelector; 4]) -> Self {
        Self::from_op(PixelOp::ChannelRemap(selectors))
    }

    /// Composites `color` over every pixel with `mode`, the color's alpha
    /// scaled by `opacity` (clamped to `[0, 1]`).
    pub fn blend_color(color: PackedColor, mode: BlendMode, opacity: f64) -> Result<Self> {
        let opacity = ensure_finite("opacity", opacity)?.clamp(0.0, 1.0);
        Ok(Self::from_op(PixelOp::BlendColor {
            color,
            mode,
            opacity,
        }))
    }

    pub fn name(&self) -> &'static str {
        match self.op {
            PixelOp::Invert => "invert",
            PixelOp::Grayscale => "grayscale",
            PixelOp::Gamma(_) => "gamma",
            PixelOp::Brightness(_) => "brightness",
            PixelOp::Contrast(_) => "contrast",
            PixelOp::Saturation(_) => "saturation",
            PixelOp::Opacity(_) => "opacity",
            PixelOp::Sepia => "sepia",
            PixelOp::Posterize(_) => "posterize",
            PixelOp::Threshold { .. } => "threshold",
            PixelOp::ReduceColorSpace { .. } => "reduce-color-space",
            PixelOp::ColorMap { .. } => "color-map",
            PixelOp::ReplaceColor { .. } => "replace-color",
            PixelOp::ChannelRemap(_) => "channel-remap",
            PixelOp::BlendColor { .. } => "blend-color",
        }
    }

    pub fn process(&self, c: PackedColor) -> PackedColor {
        match &self.op {
            PixelOp::Invert => PackedColor::new(255 - c.r, 255 - c.g, 255 - c.b, c.a),
            PixelOp::Grayscale => {
                let l = c.luma();
                PackedColor::from_normalized(l, l, l, c.alpha())
            }
            PixelOp::Gamma(gamma) => c.gamma(*gamma),
            PixelOp::Brightness(amount) => map_rgb(c, |v| v + amount),
            PixelOp::Contrast(factor) => map_rgb(c, |v| (v - 0.5) * factor + 0.5),
            PixelOp::Saturation(factor) => {
                let mut hsl = c.to_hsl();
                hsl.s = (hsl.s * factor).min(1.0);
                PackedColor::from_hsl(hsl, c.alpha())
            }
            PixelOp::Opacity(opacity) => c.with_alpha((c.a as f64 * opacity).round() as u8),
            PixelOp::Sepia => {
                let [r, g, b] = ColorMatrix::apply(c.to_linear().rgb(), &SEPIA);
                PackedColor::from_normalized(r, g, b, c.alpha())
            }
            PixelOp::Posterize(levels) => {
                let steps = (*levels - 1) as f64;
                map_rgb(c, |v| (v * steps).round() / steps)
            }
            PixelOp::Threshold { metric, threshold } => {
                let out = if metric.value(c) >= *threshold {
                    PackedColor::WHITE
                } else {
                    PackedColor::BLACK
                };
                out.with_alpha(c.a)
            }
            PixelOp::ReduceColorSpace { palette, metric } => palette.nearest(c, *metric).0,
            PixelOp::ColorMap { map, metric } => map.sample(metric.value(c)).with_alpha(c.a),
            PixelOp::ReplaceColor {
                target,
                tolerance,
                replacement,
            } => {
                if tolerance.matches(c, *target) {
                    *replacement
                } else {
                    c
                }
            }
            PixelOp::ChannelRemap([r, g, b, a]) => {
                PackedColor::new(r.select(c), g.select(c), b.select(c), a.select(c))
            }
            PixelOp::BlendColor {
                color,
                mode,
                opacity,
            } => {
                if *opacity == 0.0 {
                    return c;
                }
                let top = color.with_alpha((color.a as f64 * opacity).round() as u8);
                composite(c, top, *mode)
            }
        }
    }
}

fn map_rgb(c: PackedColor, f: impl Fn(f64) -> f64) -> PackedColor {
    let lin = c.to_linear();
    let [r, g, b] = lin.rgb();
    PackedColor::from_linear(LinearColor::new(f(r), f(g), f(b), lin.a()))
}
