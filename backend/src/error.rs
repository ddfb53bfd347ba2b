use std::path::PathBuf;

/// Reasons a file could not be turned into a frame. Every variant is
/// recoverable and ends up as the `Error` verdict.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not decode {0}")]
    Decode(String),
    #[error("Video has no decodable frames")]
    NoFrames,
    #[error("ffmpeg error: {0}")]
    Ffmpeg(String),
}

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Classifier backend not compiled in (enable the `libtorch` feature)")]
    Unavailable,
    #[error("Failed to load model: {0}")]
    Load(String),
    #[error("Model error: {0}")]
    Model(String),
    #[error("Unexpected model output shape: {0:?}")]
    Shape(Vec<i64>),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
