//! Prediction service client
//!
//! Calls the external endpoint with two retry layers:
//! - outer, message-level: full request attempts with a fixed pause between
//! - inner, transport-level: quick re-sends on connection errors only
//!
//! An attempt succeeds only on a 2xx response with a non-empty `answer`.
//! Exhausted attempts collapse into the uniform failure result; the caller
//! applies the confidence gate, not this client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use chat_agent_config::PredictionSettings;
use chat_agent_core::{PredictionResult, Predictor};

use crate::retry::RetryPolicy;
use crate::PredictError;

/// Client configuration
#[derive(Debug, Clone)]
pub struct PredictionClientConfig {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Message-level retry layer
    pub attempts: RetryPolicy,
    /// Transport-level retry layer
    pub transport: RetryPolicy,
}

impl Default for PredictionClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/chat".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(15),
            attempts: RetryPolicy::new(2, Duration::from_secs(1)),
            transport: RetryPolicy::new(2, Duration::from_millis(100)),
        }
    }
}

impl From<&PredictionSettings> for PredictionClientConfig {
    fn from(settings: &PredictionSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
            request_timeout: Duration::from_secs(settings.timeout_secs),
            attempts: RetryPolicy::new(
                settings.attempts,
                Duration::from_millis(settings.retry_delay_ms),
            ),
            transport: RetryPolicy::new(
                settings.transport_attempts,
                Duration::from_millis(settings.transport_retry_delay_ms),
            ),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    answer: Option<String>,
    confidence: Option<f32>,
    #[serde(default)]
    is_fallback: bool,
}

/// HTTP adapter for the external prediction service
pub struct PredictionClient {
    client: Client,
    config: PredictionClientConfig,
}

impl PredictionClient {
    pub fn new(config: PredictionClientConfig) -> Result<Self, PredictError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                PredictError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    pub fn from_settings(settings: &PredictionSettings) -> Result<Self, PredictError> {
        Self::new(PredictionClientConfig::from(settings))
    }

    /// One wire round-trip
    async fn send(&self, question: &str) -> Result<ChatResponse, PredictError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&ChatRequest { question })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PredictError::Api(format!(
                "status {}",
                response.status().as_u16()
            )));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| PredictError::InvalidResponse(e.to_string()))
    }

    /// One message-level attempt, with transport-level retries underneath
    async fn attempt(&self, question: &str) -> Result<ChatResponse, PredictError> {
        let policy = self.config.transport;
        let mut last_error = None;

        for try_number in 0..policy.max_attempts {
            policy.pause_before(try_number).await;

            match self.send(question).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transport() => {
                    tracing::debug!(error = %e, try_number, "Transport error, re-sending");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| PredictError::Network("no attempts made".to_string())))
    }
}

#[async_trait]
impl Predictor for PredictionClient {
    async fn predict(&self, question: &str) -> PredictionResult {
        let policy = self.config.attempts;

        for attempt in 0..policy.max_attempts {
            if attempt > 0 {
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    "Prediction attempt failed, retrying"
                );
            }
            policy.pause_before(attempt).await;

            match self.attempt(question).await {
                Ok(response) => {
                    match response.answer.filter(|a| !a.trim().is_empty()) {
                        Some(answer) => {
                            return PredictionResult {
                                answer: Some(answer),
                                confidence: response.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
                                is_fallback: response.is_fallback,
                                success: true,
                            };
                        }
                        // A 2xx with no answer still counts as a failed attempt
                        None => {
                            tracing::debug!(attempt, "Prediction response had no answer");
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, attempt, "Prediction attempt errored");
                }
            }
        }

        tracing::warn!("All prediction attempts exhausted, downgrading to no prediction");
        PredictionResult::failed()
    }
}
