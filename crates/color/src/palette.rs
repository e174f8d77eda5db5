//! Immutable color sets and nearest-color search.

use std::sync::Arc;

use tracing::trace;

use crate::error::{ColorError, Result};
use crate::metric::ColorMetric;
use crate::model::ColorModel;
use crate::packed::PackedColor;
use crate::space::Lab;

/// A non-empty, ordered set of colors.
///
/// Cloning is cheap and shares the entries, so one palette can back any
/// number of effects and worker threads.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Arc<[PackedColor]>,
    labs: Arc<[Lab]>,
}

impl Palette {
    pub fn new(colors: impl Into<Vec<PackedColor>>) -> Result<Self> {
        let colors: Vec<PackedColor> = colors.into();
        if colors.is_empty() {
            return Err(ColorError::EmptyPalette);
        }
        let labs: Vec<Lab> = colors.iter().map(|c| c.to_lab()).collect();
        trace!(len = colors.len(), "palette built");
        Ok(Self {
            colors: colors.into(),
            labs: labs.into(),
        })
    }

    /// `levels` evenly spaced opaque grays from black to white.
    pub fn grayscale(levels: usize) -> Result<Self> {
        if levels < 2 {
            return Err(ColorError::invalid(
                "levels",
                format!("need at least 2 levels, got {levels}"),
            ));
        }
        let last = (levels - 1) as f64;
        let colors: Vec<PackedColor> = (0..levels)
            .map(|i| {
                let v = i as f64 / last;
                PackedColor::from_normalized(v, v, v, 1.0)
            })
            .collect();
        Self::new(colors)
    }

    /// The 216-color web-safe cube, channels stepping by `0x33`.
    pub fn web_safe() -> Self {
        let mut colors = Vec::with_capacity(216);
        for r in 0..6u8 {
            for g in 0..6u8 {
                for b in 0..6u8 {
                    colors.push(PackedColor::rgb(r * 0x33, g * 0x33, b * 0x33));
                }
            }
        }
        let labs: Vec<Lab> = colors.iter().map(|c| c.to_lab()).collect();
        Self {
            colors: colors.into(),
            labs: labs.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[PackedColor] {
        &self.colors
    }

    pub fn get(&self, index: usize) -> Option<PackedColor> {
        self.colors.get(index).copied()
    }

    pub fn contains(&self, color: PackedColor) -> bool {
        self.colors.contains(&color)
    }

    /// Index and distance of the entry closest to `color`. Ties go to the
    /// entry that comes first.
    pub fn nearest_index(&self, color: PackedColor, metric: ColorMetric) -> (usize, f64) {
        let mut best_idx = 0usize;
        let mut best_dist = f64::INFINITY;
        if metric == ColorMetric::CieLab {
            let query = color.to_lab();
            for (idx, lab) in self.labs.iter().enumerate() {
                let dist = query.distance(lab);
                if dist < best_dist {
                    best_dist = dist;
                    best_idx = idx;
                }
            }
        } else {
            for (idx, entry) in self.colors.iter().enumerate() {
                let dist = metric.distance(color, *entry);
                if dist < best_dist {
                    best_dist = dist;
                    best_idx = idx;
                }
            }
        }
        (best_idx, best_dist)
    }

    pub fn nearest(&self, color: PackedColor, metric: ColorMetric) -> (PackedColor, f64) {
        let (idx, dist) = self.nearest_index(color, metric);
        (self.colors[idx], dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_is_rejected() {
        assert_eq!(Palette::new(Vec::<PackedColor>::new()), Err(ColorError::EmptyPalette));
        assert!(Palette::grayscale(1).is_err());
    }

    #[test]
    fn ties_resolve_to_first_entry() {
        let palette = Palette::new([PackedColor::RED, PackedColor::BLUE]).unwrap();
        let (idx, _) = palette.nearest_index(PackedColor::GREEN, ColorMetric::Rgb);
        assert_eq!(idx, 0);
        let flipped = Palette::new([PackedColor::BLUE, PackedColor::RED]).unwrap();
        assert_eq!(
            flipped.nearest(PackedColor::GREEN, ColorMetric::Rgb).0,
            PackedColor::BLUE
        );
    }

    #[test]
    fn builtin_palettes() {
        let gray = Palette::grayscale(3).unwrap();
        assert_eq!(
            gray.colors(),
            &[PackedColor::BLACK, PackedColor::GRAY, PackedColor::WHITE]
        );
        let web = Palette::web_safe();
        assert_eq!(web.len(), 216);
        assert!(web.contains(PackedColor::MAGENTA));
    }

    #[test]
    fn lab_metric_uses_cached_values() {
        let palette = Palette::new([PackedColor::BLACK, PackedColor::WHITE]).unwrap();
        let (hit, dist) = palette.nearest(PackedColor::rgb(230, 230, 230), ColorMetric::CieLab);
        assert_eq!(hit, PackedColor::WHITE);
        assert!(dist > 0.0 && dist < 15.0);
    }

    proptest! {
        #[test]
        fn distance_is_zero_for_members(picks in prop::collection::vec(any::<u32>(), 1..12), i in any::<prop::sample::Index>()) {
            let colors: Vec<PackedColor> = picks.into_iter().map(PackedColor::from_argb).collect();
            let member = colors[i.index(colors.len())];
            let palette = Palette::new(colors).unwrap();
            for metric in [ColorMetric::Rgba, ColorMetric::CieLab, ColorMetric::Average] {
                let (_, dist) = palette.nearest(member, metric);
                prop_assert_eq!(dist, 0.0);
            }
        }

        #[test]
        fn distance_is_never_negative(c in any::<u32>()) {
            let palette = Palette::web_safe();
            let (_, dist) = palette.nearest(PackedColor::from_argb(c), ColorMetric::Rgba);
            prop_assert!(dist >= 0.0);
        }
    }
}
