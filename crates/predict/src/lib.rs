//! External prediction integration
//!
//! - `PredictionClient` calls the externally-hosted prediction endpoint with
//!   layered retries and normalizes every outcome into a `PredictionResult`
//! - `KnowledgeExporter` serializes the answered corpus for the service's
//!   own indexing process

pub mod client;
pub mod export;
pub mod retry;

pub use client::{PredictionClient, PredictionClientConfig};
pub use export::{KnowledgeExporter, KnowledgeRecord};
pub use retry::RetryPolicy;

use thiserror::Error;

/// Prediction adapter errors (internal; never surfaced past the adapter)
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout")]
    Timeout,

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for PredictError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PredictError::Timeout
        } else {
            PredictError::Network(err.to_string())
        }
    }
}

impl PredictError {
    /// Connection-level failures are retried by the inner transport layer;
    /// everything else bubbles to the message-level layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, PredictError::Network(_) | PredictError::Timeout)
    }
}
