//! Gateway crate errors
//!
//! Everything that can go wrong between the platform and the services:
//! bootstrap failures, transport errors, and protocol violations.

use thiserror::Error;

use gram_common::ConfigError;
use gram_media::MediaError;
use gram_service::ServiceError;

/// Errors raised by the gateway edge
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(String),

    #[error("media pipeline error: {0}")]
    Media(#[from] MediaError),

    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway protocol violation: {0}")]
    Protocol(String),
}

impl GatewayError {
    /// Shorthand for a protocol violation
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}
