//! Shared plumbing for the color and effect crates.
//!
//! - [`buffer`]: the raw pixel-buffer contract (row-major, explicit stride).
//! - [`region`]: rectangular sub-regions and clipping.
//! - [`parallel`]: disjoint row fan-out over a region, serial or on rayon.
//! - [`seed`]: position-derived random streams that do not depend on
//!   execution order.

pub mod buffer;
pub mod error;
pub mod parallel;
pub mod region;
pub mod seed;

pub use buffer::{Bitmap, Image, ImageMut};
pub use error::{BufferError, Result};
pub use parallel::Parallelism;
pub use region::Region;
