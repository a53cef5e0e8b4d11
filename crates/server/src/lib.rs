//! HTTP server for the chat agent
//!
//! Wires the engine, the prediction adapter, and the in-memory stores into an
//! axum application: the public chat operation, the feedback endpoint, the
//! training moderation surface, and the knowledge export trigger.

pub mod events;
pub mod http;
pub mod state;

pub use events::BroadcastNotifier;
pub use http::create_router;
pub use state::AppState;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prediction client error: {0}")]
    Predict(String),
}
