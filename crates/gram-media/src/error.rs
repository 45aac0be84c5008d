//! Media pipeline errors

use thiserror::Error;

/// Errors raised while mirroring or deriving media artifacts
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ffmpeg failed on {path}: {detail}")]
    Ffmpeg { path: String, detail: String },

    #[error("Font file unreadable: {0}")]
    Font(String),
}
