//! Layered configuration for the chat agent
//!
//! Priority: environment variables (`CHAT_AGENT_*`) > optional config file >
//! built-in defaults. Settings are validated once at startup.

pub mod settings;

pub use settings::{
    load_settings, CacheSettings, ExportSettings, NotificationSettings, PipelineSettings,
    PredictionSettings, ServerSettings, SessionSettings, Settings,
};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
