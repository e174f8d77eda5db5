use color::ColorError;
use thiserror::Error;
use utils::BufferError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("kernel must be square with an odd size of at most {max}, got {rows}x{cols}")]
    InvalidKernel { rows: usize, cols: usize, max: usize },

    #[error("kernel contains a non-finite weight")]
    NonFiniteKernel,
}

pub type Result<T> = std::result::Result<T, EffectError>;

/// Shorthand for an [`EffectError::Color`] naming the rejected parameter.
pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> EffectError {
    EffectError::Color(ColorError::invalid(name, reason))
}
