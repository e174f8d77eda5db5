//! Channel subsets and derived scalars used to compare colors.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use crate::error::{ColorError, Result, ensure_non_negative};
use crate::model::ColorModel;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// What part of a color a distance or equality test looks at.
///
/// Channel-subset metrics measure the Euclidean distance over the selected
/// normalized channels. Scalar metrics reduce each color to one number and
/// compare those; `Hue` wraps around the color wheel. `CieLab` is the
/// Euclidean L*a*b* distance and is not normalized (black to white is 100).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorMetric {
    Red,
    Green,
    Blue,
    Alpha,
    RedGreen,
    RedBlue,
    GreenBlue,
    Rgb,
    #[default]
    Rgba,
    Hue,
    Saturation,
    Lightness,
    Average,
    CieGray,
    CieLab,
    /// Euclidean length of the RGB vector, normalized to `[0, 1]`.
    Length,
}

impl ColorMetric {
    pub const ALL: [ColorMetric; 16] = [
        ColorMetric::Red,
        ColorMetric::Green,
        ColorMetric::Blue,
        ColorMetric::Alpha,
        ColorMetric::RedGreen,
        ColorMetric::RedBlue,
        ColorMetric::GreenBlue,
        ColorMetric::Rgb,
        ColorMetric::Rgba,
        ColorMetric::Hue,
        ColorMetric::Saturation,
        ColorMetric::Lightness,
        ColorMetric::Average,
        ColorMetric::CieGray,
        ColorMetric::CieLab,
        ColorMetric::Length,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ColorMetric::Red => "red",
            ColorMetric::Green => "green",
            ColorMetric::Blue => "blue",
            ColorMetric::Alpha => "alpha",
            ColorMetric::RedGreen => "rg",
            ColorMetric::RedBlue => "rb",
            ColorMetric::GreenBlue => "gb",
            ColorMetric::Rgb => "rgb",
            ColorMetric::Rgba => "rgba",
            ColorMetric::Hue => "hue",
            ColorMetric::Saturation => "saturation",
            ColorMetric::Lightness => "lightness",
            ColorMetric::Average => "average",
            ColorMetric::CieGray => "cie-gray",
            ColorMetric::CieLab => "cie-lab",
            ColorMetric::Length => "length",
        }
    }

    /// Channel mask `[r, g, b, a]` for channel-subset metrics.
    const fn channels(self) -> Option<[bool; 4]> {
        match self {
            ColorMetric::Red => Some([true, false, false, false]),
            ColorMetric::Green => Some([false, true, false, false]),
            ColorMetric::Blue => Some([false, false, true, false]),
            ColorMetric::Alpha => Some([false, false, false, true]),
            ColorMetric::RedGreen => Some([true, true, false, false]),
            ColorMetric::RedBlue => Some([true, false, true, false]),
            ColorMetric::GreenBlue => Some([false, true, true, false]),
            ColorMetric::Rgb => Some([true, true, true, false]),
            ColorMetric::Rgba => Some([true, true, true, true]),
            _ => None,
        }
    }

    /// Distance between two colors under this metric; always `>= 0` and
    /// `0` for identical inputs.
    pub fn distance<C: ColorModel>(self, a: C, b: C) -> f64 {
        if let Some(mask) = self.channels() {
            let ca = a.to_linear().channels();
            let cb = b.to_linear().channels();
            let sum: f64 = (0..4)
                .filter(|&i| mask[i])
                .map(|i| (ca[i] - cb[i]) * (ca[i] - cb[i]))
                .sum();
            return sum.sqrt();
        }
        match self {
            ColorMetric::Hue => {
                let d = (a.to_hsl().h - b.to_hsl().h).abs() % TAU;
                d.min(TAU - d) / PI
            }
            ColorMetric::CieLab => a.lab_distance(b),
            _ => (self.value(a) - self.value(b)).abs(),
        }
    }

    /// Reduces a color to one scalar in `[0, 1]`.
    ///
    /// Channel subsets yield their normalized Euclidean length, `Hue` the
    /// fraction of a full turn and `CieLab` the lightness L* / 100.
    pub fn value<C: ColorModel>(self, color: C) -> f64 {
        if let Some(mask) = self.channels() {
            let channels = color.to_linear().channels();
            let count = mask.iter().filter(|m| **m).count() as f64;
            let sum: f64 = (0..4)
                .filter(|&i| mask[i])
                .map(|i| channels[i] * channels[i])
                .sum();
            return (sum / count).sqrt();
        }
        match self {
            ColorMetric::Hue => color.to_hsl().h / TAU,
            ColorMetric::Saturation => color.to_hsl().s,
            ColorMetric::Lightness => color.to_hsl().l,
            ColorMetric::Average => color.average(),
            ColorMetric::CieGray | ColorMetric::CieLab => color.cie_gray(),
            ColorMetric::Length => {
                let [r, g, b] = color.to_linear().rgb();
                (r * r + g * g + b * b).sqrt() / SQRT_3
            }
            _ => 0.0,
        }
    }

    pub fn equals<C: ColorModel>(self, a: C, b: C) -> bool {
        self.distance(a, b) == 0.0
    }
}

impl fmt::Display for ColorMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorMetric {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        ColorMetric::ALL
            .into_iter()
            .find(|m| m.name().replace('-', "") == key)
            .ok_or_else(|| ColorError::UnknownMetric(s.to_string()))
    }
}

/// A metric paired with the largest distance still considered equal.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorTolerance {
    metric: ColorMetric,
    tolerance: f64,
}

impl ColorTolerance {
    pub fn new(metric: ColorMetric, tolerance: f64) -> Result<Self> {
        let tolerance = ensure_non_negative("tolerance", tolerance)?;
        Ok(Self { metric, tolerance })
    }

    pub fn exact(metric: ColorMetric) -> Self {
        Self {
            metric,
            tolerance: 0.0,
        }
    }

    pub fn metric(&self) -> ColorMetric {
        self.metric
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn matches<C: ColorModel>(&self, a: C, b: C) -> bool {
        self.metric.distance(a, b) <= self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PackedColor;

    #[test]
    fn channel_subsets_ignore_other_channels() {
        let a = PackedColor::new(10, 20, 30, 255);
        let b = PackedColor::new(10, 99, 99, 0);
        assert_eq!(ColorMetric::Red.distance(a, b), 0.0);
        assert!(ColorMetric::Rgba.distance(a, b) > 0.0);
        assert_eq!(ColorMetric::Alpha.distance(a, b), 1.0);
    }

    #[test]
    fn hue_wraps_around() {
        let red = PackedColor::RED;
        let magenta_red = PackedColor::rgb(255, 0, 20);
        let d = ColorMetric::Hue.distance(red, magenta_red);
        assert!(d > 0.0 && d < 0.05, "d = {d}");
        let cyan = PackedColor::CYAN;
        assert!((ColorMetric::Hue.distance(red, cyan) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scalar_metrics_collapse_colors() {
        assert_eq!(
            ColorMetric::Average.distance(PackedColor::RED, PackedColor::BLUE),
            0.0
        );
        assert!(ColorMetric::CieGray.distance(PackedColor::RED, PackedColor::BLUE) > 0.1);
        assert!((ColorMetric::Length.value(PackedColor::WHITE) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn parse_names() {
        for metric in ColorMetric::ALL {
            assert_eq!(metric.name().parse::<ColorMetric>().unwrap(), metric);
        }
        assert_eq!("CIE_Gray".parse::<ColorMetric>().unwrap(), ColorMetric::CieGray);
        assert!(matches!(
            "chroma".parse::<ColorMetric>(),
            Err(ColorError::UnknownMetric(_))
        ));
    }

    #[test]
    fn tolerance_validation() {
        assert!(ColorTolerance::new(ColorMetric::Rgb, -0.1).is_err());
        assert!(ColorTolerance::new(ColorMetric::Rgb, f64::NAN).is_err());
        let tol = ColorTolerance::new(ColorMetric::Rgb, 0.1).unwrap();
        assert!(tol.matches(PackedColor::rgb(250, 0, 0), PackedColor::RED));
        assert!(!tol.matches(PackedColor::rgb(200, 0, 0), PackedColor::RED));
    }
}
