//! Two-layer compositing: "over" alpha compositing with a closed table of
//! blend operators.

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use utils::seed::mix64;

use crate::error::{ColorError, Result};
use crate::linear::{LinearColor, sanitize01};
use crate::model::ColorModel;
use crate::packed::PackedColor;
use crate::space::Hsl;

const EPSILON: f64 = 1.0e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendMode {
    /// Plain alpha compositing, the top color replaces the bottom one.
    #[default]
    Normal,
    Multiply,
    Screen,
    Divide,
    ColorBurn,
    ColorDodge,
    Darken,
    Lighten,
    Hue,
    Color,
    Saturation,
    Luminosity,
    Overlay,
    SoftLight,
    HardLight,
    VividLight,
    PinLight,
    LinearLight,
    HardMix,
    Add,
    Subtract,
    Difference,
    Exclusion,
    Average,
    /// Picks one of the two inputs at random, weighted by their alphas.
    Dissolve,
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Nxor,
    Shl,
    Shr,
    Rol,
    Ror,
    /// Always the bottom color.
    Bottom,
    /// Always the top color.
    Top,
    /// Channel-wise midpoint of both colors, alpha included.
    HalfwayLerp,
    LinearBurn,
    DarkerColor,
    LighterColor,
}

impl BlendMode {
    pub const ALL: [BlendMode; 41] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Divide,
        BlendMode::ColorBurn,
        BlendMode::ColorDodge,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::Hue,
        BlendMode::Color,
        BlendMode::Saturation,
        BlendMode::Luminosity,
        BlendMode::Overlay,
        BlendMode::SoftLight,
        BlendMode::HardLight,
        BlendMode::VividLight,
        BlendMode::PinLight,
        BlendMode::LinearLight,
        BlendMode::HardMix,
        BlendMode::Add,
        BlendMode::Subtract,
        BlendMode::Difference,
        BlendMode::Exclusion,
        BlendMode::Average,
        BlendMode::Dissolve,
        BlendMode::And,
        BlendMode::Or,
        BlendMode::Xor,
        BlendMode::Nand,
        BlendMode::Nor,
        BlendMode::Nxor,
        BlendMode::Shl,
        BlendMode::Shr,
        BlendMode::Rol,
        BlendMode::Ror,
        BlendMode::Bottom,
        BlendMode::Top,
        BlendMode::HalfwayLerp,
        BlendMode::LinearBurn,
        BlendMode::DarkerColor,
        BlendMode::LighterColor,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Divide => "divide",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::Hue => "hue",
            BlendMode::Color => "color",
            BlendMode::Saturation => "saturation",
            BlendMode::Luminosity => "luminosity",
            BlendMode::Overlay => "overlay",
            BlendMode::SoftLight => "soft-light",
            BlendMode::HardLight => "hard-light",
            BlendMode::VividLight => "vivid-light",
            BlendMode::PinLight => "pin-light",
            BlendMode::LinearLight => "linear-light",
            BlendMode::HardMix => "hard-mix",
            BlendMode::Add => "add",
            BlendMode::Subtract => "subtract",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Average => "average",
            BlendMode::Dissolve => "dissolve",
            BlendMode::And => "and",
            BlendMode::Or => "or",
            BlendMode::Xor => "xor",
            BlendMode::Nand => "nand",
            BlendMode::Nor => "nor",
            BlendMode::Nxor => "nxor",
            BlendMode::Shl => "shl",
            BlendMode::Shr => "shr",
            BlendMode::Rol => "rol",
            BlendMode::Ror => "ror",
            BlendMode::Bottom => "bottom",
            BlendMode::Top => "top",
            BlendMode::HalfwayLerp => "halfway-lerp",
            BlendMode::LinearBurn => "linear-burn",
            BlendMode::DarkerColor => "darker-color",
            BlendMode::LighterColor => "lighter-color",
        }
    }

    /// Modes that work on the packed `0xAARRGGBB` integer and skip alpha
    /// compositing entirely.
    pub const fn is_bitwise(self) -> bool {
        matches!(
            self,
            BlendMode::And
                | BlendMode::Or
                | BlendMode::Xor
                | BlendMode::Nand
                | BlendMode::Nor
                | BlendMode::Nxor
                | BlendMode::Shl
                | BlendMode::Shr
                | BlendMode::Rol
                | BlendMode::Ror
        )
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlendMode {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        if key == "alpha" {
            return Ok(BlendMode::Normal);
        }
        BlendMode::ALL
            .into_iter()
            .find(|m| m.name().replace('-', "") == key)
            .ok_or_else(|| ColorError::UnknownBlendMode(s.to_string()))
    }
}

/// Composites `top` over `bottom`.
///
/// Pure in its inputs for every mode. `Dissolve` seeds its draw from the two
/// packed values, so equal inputs always pick the same side; use
/// [`composite_with_rng`] to supply the random source explicitly.
pub fn composite(bottom: PackedColor, top: PackedColor, mode: BlendMode) -> PackedColor {
    if mode == BlendMode::Dissolve {
        let key = ((bottom.to_argb() as u64) << 32) | top.to_argb() as u64;
        let mut rng = SmallRng::seed_from_u64(mix64(key));
        return dissolve(bottom, top, &mut rng);
    }
    blend(bottom, top, mode)
}

/// Like [`composite`], but `Dissolve` draws from `rng`. Other modes never
/// touch the generator.
pub fn composite_with_rng<R: Rng + ?Sized>(
    bottom: PackedColor,
    top: PackedColor,
    mode: BlendMode,
    rng: &mut R,
) -> PackedColor {
    if mode == BlendMode::Dissolve {
        return dissolve(bottom, top, rng);
    }
    blend(bottom, top, mode)
}

/// Composites with the top layer's alpha scaled by `opacity` (clamped to
/// `[0, 1]`). A zero opacity returns `bottom` for every mode.
pub fn composite_opacity<R: Rng + ?Sized>(
    bottom: PackedColor,
    top: PackedColor,
    mode: BlendMode,
    opacity: f64,
    rng: &mut R,
) -> PackedColor {
    let opacity = sanitize01(opacity);
    if opacity == 0.0 {
        return bottom;
    }
    let top = top.with_alpha((top.a as f64 * opacity).round() as u8);
    composite_with_rng(bottom, top, mode, rng)
}

fn dissolve<R: Rng + ?Sized>(bottom: PackedColor, top: PackedColor, rng: &mut R) -> PackedColor {
    let (ab, at) = (bottom.a as f64, top.a as f64);
    let p = if ab + at == 0.0 { 0.5 } else { at / (ab + at) };
    if rng.random_bool(p) { top } else { bottom }
}

fn blend(bottom: PackedColor, top: PackedColor, mode: BlendMode) -> PackedColor {
    if mode.is_bitwise() {
        return PackedColor::from_argb(bitwise(bottom.to_argb(), top.to_argb(), mode));
    }
    match mode {
        BlendMode::Bottom => return bottom,
        BlendMode::Top => return top,
        BlendMode::HalfwayLerp => {
            return PackedColor::from_linear(bottom.to_linear().lerp(top.to_linear(), 0.5));
        }
        _ => {}
    }

    let (cb, cs) = (bottom.to_linear(), top.to_linear());
    let (ab, at) = (cb.a(), cs.a());
    let ao = 1.0 - (1.0 - ab) * (1.0 - at);
    if ao <= 0.0 {
        return PackedColor::TRANSPARENT;
    }

    let mixed = blend_rgb(cb.rgb(), cs.rgb(), mode);
    let [b, s] = [cb.rgb(), cs.rgb()];
    let channel = |i: usize| {
        let source = (1.0 - ab) * s[i] + ab * sanitize01(mixed[i]);
        (at * source + (1.0 - at) * ab * b[i]) / ao
    };
    PackedColor::from_linear(LinearColor::new(channel(0), channel(1), channel(2), ao))
}

fn bitwise(b: u32, s: u32, mode: BlendMode) -> u32 {
    let shift = s & 31;
    match mode {
        BlendMode::And => b & s,
        BlendMode::Or => b | s,
        BlendMode::Xor => b ^ s,
        BlendMode::Nand => !(b & s),
        BlendMode::Nor => !(b | s),
        BlendMode::Nxor => !(b ^ s),
        BlendMode::Shl => b << shift,
        BlendMode::Shr => b >> shift,
        BlendMode::Rol => b.rotate_left(shift),
        BlendMode::Ror => b.rotate_right(shift),
        _ => s,
    }
}

fn blend_rgb(base: [f64; 3], blend: [f64; 3], mode: BlendMode) -> [f64; 3] {
    match mode {
        BlendMode::Hue => {
            let (b, s) = (Hsl::from_rgb(base), Hsl::from_rgb(blend));
            Hsl::new(s.h, b.s, b.l).to_rgb()
        }
        BlendMode::Saturation => {
            let (b, s) = (Hsl::from_rgb(base), Hsl::from_rgb(blend));
            Hsl::new(b.h, s.s, b.l).to_rgb()
        }
        BlendMode::Color => {
            let (b, s) = (Hsl::from_rgb(base), Hsl::from_rgb(blend));
            Hsl::new(s.h, s.s, b.l).to_rgb()
        }
        BlendMode::Luminosity => {
            let (b, s) = (Hsl::from_rgb(base), Hsl::from_rgb(blend));
            Hsl::new(b.h, b.s, s.l).to_rgb()
        }
        BlendMode::DarkerColor => {
            if luma(blend) < luma(base) {
                blend
            } else {
                base
            }
        }
        BlendMode::LighterColor => {
            if luma(blend) > luma(base) {
                blend
            } else {
                base
            }
        }
        _ => [
            blend_channel(base[0], blend[0], mode),
            blend_channel(base[1], blend[1], mode),
            blend_channel(base[2], blend[2], mode),
        ],
    }
}

fn blend_channel(b: f64, s: f64, mode: BlendMode) -> f64 {
    match mode {
        BlendMode::Multiply => b * s,
        BlendMode::Screen => 1.0 - (1.0 - b) * (1.0 - s),
        BlendMode::Divide => {
            if s.abs() < EPSILON {
                1.0
            } else {
                b / s
            }
        }
        BlendMode::ColorBurn => {
            if b >= 1.0 {
                1.0
            } else if s <= 0.0 {
                0.0
            } else {
                1.0 - (1.0 - b) / s.max(EPSILON)
            }
        }
        BlendMode::ColorDodge => {
            if b <= 0.0 {
                0.0
            } else if s >= 1.0 {
                1.0
            } else {
                b / (1.0 - s).max(EPSILON)
            }
        }
        BlendMode::Darken => b.min(s),
        BlendMode::Lighten => b.max(s),
        BlendMode::Overlay => hard_light(s, b),
        BlendMode::SoftLight => soft_light(b, s),
        BlendMode::HardLight => hard_light(b, s),
        BlendMode::VividLight => vivid_light(b, s),
        BlendMode::PinLight => {
            if s < 0.5 {
                b.min(2.0 * s)
            } else {
                b.max(2.0 * s - 1.0)
            }
        }
        BlendMode::LinearLight => b + 2.0 * s - 1.0,
        BlendMode::HardMix => {
            if vivid_light(b, s) < 0.5 {
                0.0
            } else {
                1.0
            }
        }
        BlendMode::Add => b + s,
        BlendMode::Subtract => b - s,
        BlendMode::Difference => (b - s).abs(),
        BlendMode::Exclusion => b + s - 2.0 * b * s,
        BlendMode::Average => 0.5 * (b + s),
        BlendMode::LinearBurn => b + s - 1.0,
        _ => s,
    }
}

fn hard_light(b: f64, s: f64) -> f64 {
    if s <= 0.5 {
        2.0 * b * s
    } else {
        1.0 - 2.0 * (1.0 - b) * (1.0 - s)
    }
}

fn soft_light(b: f64, s: f64) -> f64 {
    if s <= 0.5 {
        b - (1.0 - 2.0 * s) * b * (1.0 - b)
    } else {
        let d = if b <= 0.25 {
            ((16.0 * b - 12.0) * b + 4.0) * b
        } else {
            b.sqrt()
        };
        b + (2.0 * s - 1.0) * (d - b)
    }
}

fn vivid_light(b: f64, s: f64) -> f64 {
    if s <= 0.5 {
        1.0 - (1.0 - b) / (2.0 * s).max(EPSILON)
    } else {
        b / (1.0 - (2.0 * s - 1.0)).max(EPSILON)
    }
}

fn luma([r, g, b]: [f64; 3]) -> f64 {
    0.299 * r + 0.587 * g + 0.114 * b
}
