//! Effects over packed color buffers.
//!
//! An [`Effect`] is one of three kinds, or a chain of them:
//!
//! - [`PixelEffect`]: output depends only on the pixel's own color.
//! - [`CoordinateEffect`]: output also depends on the pixel's position and,
//!   for the random effects, on a seed. Draws are keyed by position, so
//!   serial and parallel runs agree.
//! - [`RegionEffect`]: output depends on neighbouring pixels. Reads come from
//!   a snapshot taken before the pass, never from pixels already written.
//!
//! [`Effect::apply`] runs in place over the region and with the parallelism
//! given in [`ApplyOptions`].

pub mod coordinate;
pub mod effect;
pub mod error;
pub mod kernel;
pub mod options;
pub mod pixel;
pub mod region;

pub use coordinate::{CoordinateEffect, GradientKind};
pub use effect::Effect;
pub use error::{EffectError, Result};
pub use kernel::Kernel;
pub use options::ApplyOptions;
pub use pixel::{ChannelSelector, PixelEffect};
pub use region::RegionEffect;
