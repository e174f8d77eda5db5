//! Scalar-to-color lookup: gradient stops or an arbitrary function.

use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::{ColorError, Result, ensure_finite};
use crate::linear::{LinearColor, sanitize01};
use crate::model::ColorModel;
use crate::packed::PackedColor;
use crate::palette::Palette;
use crate::space::Hsl;

/// A color pinned at a position in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorStop {
    pub position: f64,
    pub color: PackedColor,
}

impl ColorStop {
    pub const fn new(position: f64, color: PackedColor) -> Self {
        Self { position, color }
    }
}

type MapFn = dyn Fn(f64) -> LinearColor + Send + Sync;

#[derive(Clone)]
enum MapKind {
    /// Sorted by position; never empty.
    Discrete(Arc<[ColorStop]>),
    Continuous(Arc<MapFn>),
}

/// Maps a scalar in `[0, 1]` to a color. Inputs outside the range (and NaN)
/// are clamped first.
#[derive(Clone)]
pub struct ColorMap {
    kind: MapKind,
}

impl ColorMap {
    /// Builds a map from explicit stops. Positions are clamped to `[0, 1]`
    /// and the stops sorted; stops sharing a position keep their order.
    pub fn discrete(stops: impl Into<Vec<ColorStop>>) -> Result<Self> {
        let mut stops: Vec<ColorStop> = stops.into();
        if stops.is_empty() {
            return Err(ColorError::EmptyColorMap);
        }
        for stop in stops.iter_mut() {
            stop.position = ensure_finite("position", stop.position)?.clamp(0.0, 1.0);
        }
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        trace!(stops = stops.len(), "discrete color map built");
        Ok(Self::from_sorted(stops))
    }

    /// Spreads `colors` evenly: entry `i` of `n` sits at `i / (n - 1)`.
    pub fn uniform(colors: impl Into<Vec<PackedColor>>) -> Result<Self> {
        let colors: Vec<PackedColor> = colors.into();
        if colors.is_empty() {
            return Err(ColorError::EmptyColorMap);
        }
        Ok(Self::from_sorted(uniform_stops(&colors)))
    }

    pub fn continuous(f: impl Fn(f64) -> LinearColor + Send + Sync + 'static) -> Self {
        Self {
            kind: MapKind::Continuous(Arc::new(f)),
        }
    }

    fn from_sorted(stops: Vec<ColorStop>) -> Self {
        Self {
            kind: MapKind::Discrete(stops.into()),
        }
    }

    /// Black to white.
    pub fn grayscale() -> Self {
        Self::from_sorted(uniform_stops(&[PackedColor::BLACK, PackedColor::WHITE]))
    }

    /// Black through red and yellow to white.
    pub fn hot() -> Self {
        Self::from_sorted(uniform_stops(&[
            PackedColor::BLACK,
            PackedColor::RED,
            PackedColor::YELLOW,
            PackedColor::WHITE,
        ]))
    }

    pub fn jet() -> Self {
        Self::from_sorted(vec![
            ColorStop::new(0.0, PackedColor::rgb(0, 0, 128)),
            ColorStop::new(0.125, PackedColor::BLUE),
            ColorStop::new(0.375, PackedColor::CYAN),
            ColorStop::new(0.625, PackedColor::YELLOW),
            ColorStop::new(0.875, PackedColor::RED),
            ColorStop::new(1.0, PackedColor::rgb(128, 0, 0)),
        ])
    }

    /// Fully saturated hue sweep from red to magenta.
    pub fn rainbow() -> Self {
        Self::continuous(|s| {
            let [r, g, b] = Hsl::new(s * TAU * 5.0 / 6.0, 1.0, 0.5).to_rgb();
            LinearColor::opaque(r, g, b)
        })
    }

    /// The stops of a discrete map, `None` for a continuous one.
    pub fn stops(&self) -> Option<&[ColorStop]> {
        match &self.kind {
            MapKind::Discrete(stops) => Some(stops),
            MapKind::Continuous(_) => None,
        }
    }

    pub fn sample_linear(&self, s: f64) -> LinearColor {
        let s = sanitize01(s);
        match &self.kind {
            MapKind::Continuous(f) => f(s),
            MapKind::Discrete(stops) => {
                let idx = stops.partition_point(|stop| stop.position <= s);
                if idx == 0 {
                    return stops[0].color.to_linear();
                }
                if idx == stops.len() {
                    return stops[idx - 1].color.to_linear();
                }
                let (lo, hi) = (stops[idx - 1], stops[idx]);
                let t = (s - lo.position) / (hi.position - lo.position);
                lo.color.to_linear().lerp(hi.color.to_linear(), t)
            }
        }
    }

    pub fn sample(&self, s: f64) -> PackedColor {
        PackedColor::from_linear(self.sample_linear(s))
    }

    /// The same map run from 1 to 0.
    pub fn reversed(&self) -> Self {
        match &self.kind {
            MapKind::Discrete(stops) => Self::from_sorted(
                stops
                    .iter()
                    .rev()
                    .map(|stop| ColorStop::new(1.0 - stop.position, stop.color))
                    .collect(),
            ),
            MapKind::Continuous(f) => {
                let f = Arc::clone(f);
                Self::continuous(move |s| f(1.0 - s))
            }
        }
    }

    /// Samples `n` evenly spaced colors into a palette.
    pub fn to_palette(&self, n: usize) -> Result<Palette> {
        if n == 0 {
            return Err(ColorError::EmptyPalette);
        }
        let last = n.saturating_sub(1).max(1) as f64;
        let colors: Vec<PackedColor> = (0..n).map(|i| self.sample(i as f64 / last)).collect();
        Palette::new(colors)
    }
}

fn uniform_stops(colors: &[PackedColor]) -> Vec<ColorStop> {
    let last = colors.len().saturating_sub(1).max(1) as f64;
    colors
        .iter()
        .enumerate()
        .map(|(i, c)| ColorStop::new(i as f64 / last, *c))
        .collect()
}

impl fmt::Debug for ColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MapKind::Discrete(stops) => f.debug_tuple("Discrete").field(stops).finish(),
            MapKind::Continuous(_) => f.write_str("Continuous(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn black_to_white_midpoint() {
        let map = ColorMap::uniform([PackedColor::BLACK, PackedColor::WHITE]).unwrap();
        assert_eq!(map.sample(0.0), PackedColor::BLACK);
        assert_eq!(map.sample(1.0), PackedColor::WHITE);
        assert_eq!(map.sample(0.5), PackedColor::rgb(128, 128, 128));
    }

    #[test]
    fn out_of_range_is_clamped() {
        let map = ColorMap::grayscale();
        assert_eq!(map.sample(-3.0), PackedColor::BLACK);
        assert_eq!(map.sample(7.0), PackedColor::WHITE);
        assert_eq!(map.sample(f64::NAN), PackedColor::BLACK);
    }

    #[test]
    fn single_color_is_constant() {
        let map = ColorMap::uniform([PackedColor::CYAN]).unwrap();
        for s in [0.0, 0.3, 1.0] {
            assert_eq!(map.sample(s), PackedColor::CYAN);
        }
    }

    #[test]
    fn stops_are_sorted_and_validated() {
        assert!(matches!(
            ColorMap::discrete(Vec::<ColorStop>::new()),
            Err(ColorError::EmptyColorMap)
        ));
        assert!(ColorMap::discrete([ColorStop::new(f64::NAN, PackedColor::RED)]).is_err());
        let map = ColorMap::discrete([
            ColorStop::new(1.0, PackedColor::WHITE),
            ColorStop::new(0.0, PackedColor::BLACK),
        ])
        .unwrap();
        assert_eq!(map.sample(0.0), PackedColor::BLACK);
        assert_eq!(map.sample(0.25), PackedColor::rgb(64, 64, 64));
    }

    #[test]
    fn reversed_maps() {
        let hot = ColorMap::hot().reversed();
        assert_eq!(hot.sample(0.0), PackedColor::WHITE);
        assert_eq!(hot.sample(1.0), PackedColor::BLACK);
        let rainbow = ColorMap::rainbow();
        assert_eq!(rainbow.sample(0.0), PackedColor::RED);
        assert_eq!(rainbow.reversed().sample(1.0), PackedColor::RED);
    }

    #[test]
    fn palette_from_map() {
        let palette = ColorMap::jet().to_palette(2).unwrap();
        assert_eq!(
            palette.colors(),
            &[PackedColor::rgb(0, 0, 128), PackedColor::rgb(128, 0, 0)]
        );
        assert!(ColorMap::jet().to_palette(0).is_err());
    }
}
