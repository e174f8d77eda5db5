//! The `Effect` enum and in-place or copying application.

use color::PackedColor;
use tracing::{debug, trace};
use utils::parallel::for_each_pixel;
use utils::{Bitmap, Image, ImageMut};

use crate::coordinate::CoordinateEffect;
use crate::options::ApplyOptions;
use crate::pixel::PixelEffect;
use crate::region::RegionEffect;

/// Any effect of the closed set, or an ordered chain of them.
#[derive(Clone, Debug)]
pub enum Effect {
    Pixel(PixelEffect),
    Coordinate(CoordinateEffect),
    Region(RegionEffect),
    /// Applied strictly in order, each step seeing the previous one's output.
    Chain(Vec<Effect>),
}

impl Effect {
    pub fn chain(effects: impl IntoIterator<Item = Effect>) -> Self {
        Effect::Chain(effects.into_iter().collect())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Effect::Pixel(e) => e.name(),
            Effect::Coordinate(e) => e.name(),
            Effect::Region(e) => e.name(),
            Effect::Chain(_) => "chain",
        }
    }

    /// Applies the effect in place. Pixels outside the (clipped) region of
    /// `options` are left untouched.
    pub fn apply(&self, image: &mut ImageMut<'_, PackedColor>, options: &ApplyOptions) {
        let (width, height) = (image.width(), image.height());
        let region = options.region_for(width, height);
        if region.is_empty() {
            trace!(effect = self.name(), "empty region, nothing to do");
            return;
        }
        debug!(
            effect = self.name(),
            ?region,
            parallelism = ?options.parallelism,
            "applying effect"
        );

        match self {
            Effect::Pixel(effect) => {
                for_each_pixel(image, region, options.parallelism, |_, _, px| {
                    *px = effect.process(*px);
                });
            }
            Effect::Coordinate(effect) => {
                let seed = options.seed;
                for_each_pixel(image, region, options.parallelism, |x, y, px| {
                    *px = effect.process(x, y, width, height, *px, seed);
                });
            }
            Effect::Region(effect) => effect.apply(image, region, options.parallelism),
            Effect::Chain(effects) => {
                for (step, effect) in effects.iter().enumerate() {
                    trace!(step, effect = effect.name(), "chain step");
                    effect.apply(image, options);
                }
            }
        }
    }

    /// Applies the effect to a copy of `image`, returned as a fresh bitmap of
    /// identical dimensions.
    pub fn apply_to_new(&self, image: &Image<'_, PackedColor>, options: &ApplyOptions) -> Bitmap<PackedColor> {
        let mut out = Bitmap::from_image(image);
        self.apply(&mut out.view_mut(), options);
        out
    }
}

impl From<PixelEffect> for Effect {
    fn from(effect: PixelEffect) -> Self {
        Effect::Pixel(effect)
    }
}

impl From<CoordinateEffect> for Effect {
    fn from(effect: CoordinateEffect) -> Self {
        Effect::Coordinate(effect)
    }
}

impl From<RegionEffect> for Effect {
    fn from(effect: RegionEffect) -> Self {
        Effect::Region(effect)
    }
}
