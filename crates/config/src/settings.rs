//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Conversation session configuration
    #[serde(default)]
    pub session: SessionSettings,

    /// Intent pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// External prediction service configuration
    #[serde(default)]
    pub prediction: PredictionSettings,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheSettings,

    /// Escalation notification configuration
    #[serde(default)]
    pub notifications: NotificationSettings,

    /// Knowledge export configuration
    #[serde(default)]
    pub export: ExportSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty means same-origin only
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Conversation session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Messages kept per conversation; oldest dropped first
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Idle time after which a session is purged entirely
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

fn default_max_history() -> usize {
    10
}

fn default_idle_timeout_secs() -> u64 {
    30 * 60
}

/// Intent pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Minimum external-prediction confidence accepted without learning
    #[serde(default = "default_confidence_gate")]
    pub confidence_gate: f32,
    /// Caller-level timeout around a whole handle_message call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            confidence_gate: default_confidence_gate(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_confidence_gate() -> f32 {
    0.6
}

fn default_request_timeout_secs() -> u64 {
    45
}

/// External prediction service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionSettings {
    #[serde(default = "default_prediction_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_prediction_timeout_secs")]
    pub timeout_secs: u64,
    /// Message-level attempts (outer retry layer)
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// Delay between message-level attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Connection-level attempts per message-level attempt (inner layer)
    #[serde(default = "default_transport_attempts")]
    pub transport_attempts: u32,
    #[serde(default = "default_transport_retry_delay_ms")]
    pub transport_retry_delay_ms: u64,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            endpoint: default_prediction_endpoint(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_prediction_timeout_secs(),
            attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            transport_attempts: default_transport_attempts(),
            transport_retry_delay_ms: default_transport_retry_delay_ms(),
        }
    }
}

fn default_prediction_endpoint() -> String {
    "http://localhost:8000/chat".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_prediction_timeout_secs() -> u64 {
    15
}

fn default_attempts() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_transport_attempts() -> u32 {
    2
}

fn default_transport_retry_delay_ms() -> u64 {
    100
}

/// Cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// TTL for the learned-response map and the corpus snapshot
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    60
}

/// Escalation notification settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotificationSettings {
    /// Moderator/admin recipients for training alerts
    #[serde(default)]
    pub moderators: Vec<String>,
}

/// Knowledge export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Output path consumed by the prediction service's indexing process
    #[serde(default = "default_export_path")]
    pub path: String,
    /// Interval between periodic export runs; 0 disables the periodic job
    #[serde(default = "default_export_interval_secs")]
    pub interval_secs: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            path: default_export_path(),
            interval_secs: default_export_interval_secs(),
        }
    }
}

fn default_export_path() -> String {
    "data/knowledge.json".to_string()
}

fn default_export_interval_secs() -> u64 {
    15 * 60
}

impl Settings {
    /// Validate settings, rejecting values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.pipeline.confidence_gate) {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.confidence_gate".to_string(),
                message: format!(
                    "Must be between 0.0 and 1.0, got {}",
                    self.pipeline.confidence_gate
                ),
            });
        }

        if self.session.max_history == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.max_history".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.prediction.attempts == 0 || self.prediction.transport_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "prediction.attempts".to_string(),
                message: "Retry layers need at least one attempt each".to_string(),
            });
        }

        if self.prediction.endpoint.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "prediction.endpoint".to_string(),
                message: "Endpoint must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Load settings from an optional file plus `CHAT_AGENT_*` env overrides.
///
/// `CHAT_AGENT_SERVER__PORT=9000` overrides `server.port`, and so on.
pub fn load_settings(path: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::with_name(path).required(false));
    }

    let config = builder
        .add_source(Environment::with_prefix("CHAT_AGENT").separator("__"))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let settings: Settings = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    settings.validate()?;
    Ok(settings)
}
