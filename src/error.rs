//! Error types for colourscale.
//!
//! Palette parsing is deliberately forgiving and rarely surfaces these errors
//! to callers; they are mostly produced by colour-string parsing, the
//! configuration layer and the HTTP service.

use thiserror::Error;

/// The main error type for colourscale operations.
#[derive(Error, Debug)]
pub enum ColourScaleError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Unknown colour map name
    #[error("Colour map not found: {name}")]
    ColourMapNotFound { name: String },

    /// A colour specification that could not be understood
    #[error("Invalid colour '{input}': {message}")]
    ColourParse { input: String, message: String },

    /// Stop positions no longer bracket a queried position
    #[error(
        "Colour position {position} not in range [{first},{last}] for colour map '{name}' \
         ({stops} stops, minimum {minimum}, maximum {maximum})"
    )]
    Calibration {
        name: String,
        stops: usize,
        first: f32,
        last: f32,
        position: f32,
        minimum: f32,
        maximum: f32,
    },

    /// Image generation errors
    #[error("Image generation error: {message}")]
    ImageGeneration { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server errors
    #[error("Server error: {message}")]
    Server { message: String },
}

impl ColourScaleError {
    pub(crate) fn colour_parse(input: &str, message: impl Into<String>) -> Self {
        ColourScaleError::ColourParse {
            input: input.to_string(),
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results with ColourScaleError
pub type Result<T> = std::result::Result<T, ColourScaleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_error_carries_context() {
        let err = ColourScaleError::Calibration {
            name: "heat".to_string(),
            stops: 3,
            first: 0.0,
            last: 0.8,
            position: 0.9,
            minimum: 1.0,
            maximum: 5.0,
        };
        let message = err.to_string();
        assert!(message.contains("heat"));
        assert!(message.contains("3 stops"));
        assert!(message.contains("0.9"));
        assert!(message.contains("[0,0.8]"));
    }
}
