use bytemuck::PodCastError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("color map must contain at least one stop")]
    EmptyColorMap,

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("unknown color metric: {0}")]
    UnknownMetric(String),

    #[error("unknown blend mode: {0}")]
    UnknownBlendMode(String),

    #[error("invalid hex color: {0}")]
    InvalidHex(String),

    #[error("cannot view bytes as pixels: {0:?}")]
    ByteCast(PodCastError),
}

impl ColorError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ColorError>;

/// Rejects NaN and infinities for a named parameter.
pub fn ensure_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ColorError::invalid(name, format!("must be finite, got {value}")))
    }
}

/// Rejects non-finite and negative values for a named parameter.
pub fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64> {
    let value = ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(ColorError::invalid(
            name,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(value)
}
