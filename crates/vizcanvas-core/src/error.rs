/// Core error types for vizcanvas.
use std::path::PathBuf;

/// A specialized Result type for vizcanvas operations.
pub type VizResult<T> = Result<T, VizError>;

/// Top-level error type encompassing every vizcanvas subsystem.
///
/// The interpretation and render path never lets one of these reach the
/// host frame loop: extraction and normalization errors collapse to
/// "no scene", draw errors skip a single layer.
#[derive(Debug, thiserror::Error)]
pub enum VizError {
    #[error("extract error: {0}")]
    Extract(String),

    #[error("normalize error: {0}")]
    Normalize(String),

    #[error("draw error in layer {layer}: {message}")]
    Draw { layer: usize, message: String },

    #[error("surface error: {0}")]
    Surface(String),

    #[error("config error: {message} ({path:?})")]
    Config { message: String, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl VizError {
    /// Create a draw error attributed to the layer at `layer`.
    pub fn draw(layer: usize, message: impl Into<String>) -> Self {
        VizError::Draw {
            layer,
            message: message.into(),
        }
    }

    /// Create a surface error.
    pub fn surface(message: impl Into<String>) -> Self {
        VizError::Surface(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        VizError::Config {
            message: message.into(),
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_error_display() {
        let err = VizError::draw(3, "arc radius is negative");
        assert_eq!(
            err.to_string(),
            "draw error in layer 3: arc radius is negative"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = VizError::config("missing [playback] table", "/etc/vizcanvas.toml");
        assert!(err.to_string().contains("missing [playback] table"));
    }

    #[test]
    fn test_serde_error_converts() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: VizError = parse.into();
        assert!(err.to_string().starts_with("serialization error:"));
    }
}
