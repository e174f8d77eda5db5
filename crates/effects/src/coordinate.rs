//! Effects whose output depends on where a pixel sits: gradients and the
//! seeded random effects.

use std::f64::consts::TAU;

use color::error::ensure_finite;
use color::{BlendMode, ColorMap, PackedColor, composite_opacity, composite_with_rng};
use rand::Rng;
use utils::seed::pixel_rng;

use crate::error::{Result, invalid};

/// Smallest radius a radial gradient accepts, in normalized units.
pub const MIN_RADIUS: f64 = 1.0e-6;

/// Shape of a gradient. Points are in normalized buffer coordinates, where
/// `(0, 0)` is the top-left corner and `(1, 1)` the bottom-right one.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GradientKind {
    /// The map's color at `0` everywhere.
    Constant,
    /// `0` at `start`, `1` at `end`, constant across the perpendicular.
    Linear { start: (f64, f64), end: (f64, f64) },
    /// `0` at `center`, `1` at `radius` and beyond.
    Radial { center: (f64, f64), radius: f64 },
    /// Sweeps once around `center`, starting at `angle` radians.
    Conic { center: (f64, f64), angle: f64 },
}

impl GradientKind {
    fn validate(self) -> Result<Self> {
        let point = |name, (x, y): (f64, f64)| -> Result<()> {
            ensure_finite(name, x)?;
            ensure_finite(name, y)?;
            Ok(())
        };
        match self {
            GradientKind::Constant => {}
            GradientKind::Linear { start, end } => {
                point("start", start)?;
                point("end", end)?;
            }
            GradientKind::Radial { center, radius } => {
                point("center", center)?;
                if ensure_finite("radius", radius)? < MIN_RADIUS {
                    return Err(invalid(
                        "radius",
                        format!("must be at least {MIN_RADIUS}, got {radius}"),
                    ));
                }
            }
            GradientKind::Conic { center, angle } => {
                point("center", center)?;
                ensure_finite("angle", angle)?;
            }
        }
        Ok(self)
    }

    /// Map position of the normalized point `(u, v)`.
    fn position(self, u: f64, v: f64) -> f64 {
        match self {
            GradientKind::Constant => 0.0,
            GradientKind::Linear { start, end } => {
                let (dx, dy) = (end.0 - start.0, end.1 - start.1);
                let len_sq = dx * dx + dy * dy;
                if len_sq <= f64::EPSILON {
                    return 0.0;
                }
                ((u - start.0) * dx + (v - start.1) * dy) / len_sq
            }
            GradientKind::Radial { center, radius } => {
                (u - center.0).hypot(v - center.1) / radius
            }
            GradientKind::Conic { center, angle } => {
                let theta = (v - center.1).atan2(u - center.0);
                (theta - angle).rem_euclid(TAU) / TAU
            }
        }
    }
}

#[derive(Clone, Debug)]
enum CoordinateOp {
    Gradient {
        kind: GradientKind,
        map: ColorMap,
        mode: BlendMode,
    },
    Noise {
        amount: f64,
        monochrome: bool,
    },
    Dissolve {
        color: PackedColor,
        opacity: f64,
    },
}

#[derive(Clone, Debug)]
pub struct CoordinateEffect {
    op: CoordinateOp,
}

impl CoordinateEffect {
    /// Generates a color from `map` by position and composites it over the
    /// source with `mode`.
    pub fn gradient(kind: GradientKind, map: ColorMap, mode: BlendMode) -> Result<Self> {
        let kind = kind.validate()?;
        Ok(Self {
            op: CoordinateOp::Gradient { kind, map, mode },
        })
    }

    /// Adds uniform noise in `[-amount, amount]` to the color channels.
    /// `amount` is clamped to `[0, 1]`.
    pub fn noise(amount: f64, monochrome: bool) -> Result<Self> {
        let amount = ensure_finite("amount", amount)?.clamp(0.0, 1.0);
        Ok(Self {
            op: CoordinateOp::Noise { amount, monochrome },
        })
    }

    /// Dissolves `color` into the source, its alpha scaled by `opacity`.
    pub fn dissolve(color: PackedColor, opacity: f64) -> Result<Self> {
        let opacity = ensure_finite("opacity", opacity)?.clamp(0.0, 1.0);
        Ok(Self {
            op: CoordinateOp::Dissolve { color, opacity },
        })
    }

    pub fn name(&self) -> &'static str {
        match self.op {
            CoordinateOp::Gradient { .. } => "gradient",
            CoordinateOp::Noise { .. } => "noise",
            CoordinateOp::Dissolve { .. } => "dissolve",
        }
    }

    /// Output for the pixel at `(x, y)` of a `width` x `height` buffer.
    /// Random draws come from a generator seeded by `(seed, x, y)` alone.
    pub fn process(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        color: PackedColor,
        seed: u64,
    ) -> PackedColor {
        match &self.op {
            CoordinateOp::Gradient { kind, map, mode } => {
                let u = (x as f64 + 0.5) / width.max(1) as f64;
                let v = (y as f64 + 0.5) / height.max(1) as f64;
                let top = map.sample(kind.position(u, v));
                let mut rng = pixel_rng(seed, x, y);
                composite_with_rng(color, top, *mode, &mut rng)
            }
            CoordinateOp::Noise { amount, monochrome } => {
                let mut rng = pixel_rng(seed, x, y);
                let mut draw = || rng.random_range(-1.0f64..=1.0) * amount;
                let [r, g, b, a] = color.normalized();
                let (dr, dg, db) = if *monochrome {
                    let d = draw();
                    (d, d, d)
                } else {
                    (draw(), draw(), draw())
                };
                PackedColor::from_normalized(r + dr, g + dg, b + db, a)
            }
            CoordinateOp::Dissolve {
                color: top,
                opacity,
            } => {
                let mut rng = pixel_rng(seed, x, y);
                composite_opacity(color, *top, BlendMode::Dissolve, *opacity, &mut rng)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_gradient_runs_left_to_right() {
        let effect = CoordinateEffect::gradient(
            GradientKind::Linear {
                start: (0.0, 0.5),
                end: (1.0, 0.5),
            },
            ColorMap::grayscale(),
            BlendMode::Normal,
        )
        .unwrap();
        let left = effect.process(0, 0, 4, 1, PackedColor::RED, 0);
        let right = effect.process(3, 0, 4, 1, PackedColor::RED, 0);
        assert_eq!(left, PackedColor::rgb(32, 32, 32));
        assert_eq!(right, PackedColor::rgb(223, 223, 223));
    }

    #[test]
    fn radial_and_conic_positions() {
        let radial = GradientKind::Radial {
            center: (0.5, 0.5),
            radius: 0.5,
        };
        assert_eq!(radial.position(0.5, 0.5), 0.0);
        assert!((radial.position(1.0, 0.5) - 1.0).abs() < 1e-12);
        let conic = GradientKind::Conic {
            center: (0.5, 0.5),
            angle: 0.0,
        };
        assert!((conic.position(0.5, 1.0) - 0.25).abs() < 1e-12);
        assert_eq!(GradientKind::Constant.position(0.3, 0.9), 0.0);
    }

    #[test]
    fn gradient_parameters_are_validated() {
        let map = ColorMap::grayscale();
        let bad_radius = GradientKind::Radial {
            center: (0.5, 0.5),
            radius: 0.0,
        };
        assert!(CoordinateEffect::gradient(bad_radius, map.clone(), BlendMode::Normal).is_err());
        let bad_point = GradientKind::Linear {
            start: (f64::NAN, 0.0),
            end: (1.0, 1.0),
        };
        assert!(CoordinateEffect::gradient(bad_point, map, BlendMode::Normal).is_err());
        assert!(CoordinateEffect::noise(f64::NAN, true).is_err());
    }

    #[test]
    fn noise_is_position_seeded() {
        let noise = CoordinateEffect::noise(0.5, false).unwrap();
        let a = noise.process(3, 4, 8, 8, PackedColor::GRAY, 11);
        let b = noise.process(3, 4, 8, 8, PackedColor::GRAY, 11);
        assert_eq!(a, b);
        let mono = CoordinateEffect::noise(0.5, true).unwrap();
        let m = mono.process(1, 2, 8, 8, PackedColor::GRAY, 11);
        assert!(m.r == m.g && m.g == m.b);
        let silent = CoordinateEffect::noise(0.0, false).unwrap();
        assert_eq!(silent.process(0, 0, 1, 1, PackedColor::GRAY, 5), PackedColor::GRAY);
    }

    #[test]
    fn dissolve_picks_either_side() {
        let dissolve = CoordinateEffect::dissolve(PackedColor::RED, 1.0).unwrap();
        let mut reds = 0;
        for x in 0..400 {
            let out = dissolve.process(x, 0, 400, 1, PackedColor::BLUE, 3);
            assert!(out == PackedColor::RED || out == PackedColor::BLUE);
            if out == PackedColor::RED {
                reds += 1;
            }
        }
        assert!((120..280).contains(&reds), "reds = {reds}");
    }
}
