//! Color values, colorspace conversions, compositing and lookup tables.
//!
//! [`PackedColor`] is the 8-bit storage form shared with pixel buffers;
//! [`LinearColor`] carries `f64` channels for intermediate math. Both
//! implement [`ColorModel`], which provides every colorspace conversion.

pub mod blend;
pub mod colormap;
pub mod error;
pub mod linear;
pub mod metric;
pub mod model;
pub mod packed;
pub mod palette;
pub mod space;

pub use blend::{BlendMode, composite, composite_opacity, composite_with_rng};
pub use colormap::{ColorMap, ColorStop};
pub use error::{ColorError, Result};
pub use linear::LinearColor;
pub use metric::{ColorMetric, ColorTolerance};
pub use model::ColorModel;
pub use packed::{Channel, PackedColor};
pub use palette::Palette;
pub use space::{Cmyk, Hsl, Hsv, Lab, YCbCr, Yiq, Yuv};
