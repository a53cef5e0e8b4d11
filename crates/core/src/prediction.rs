//! External prediction collaborator
//!
//! The adapter normalizes every outcome, including transport failures, into a
//! `PredictionResult`; callers never see an error from this seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of one prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub answer: Option<String>,
    /// Confidence in [0, 1]; 0.0 when the call failed
    pub confidence: f32,
    /// Set when the service answered with its generic fallback text
    pub is_fallback: bool,
    pub success: bool,
}

impl PredictionResult {
    /// The uniform failure value returned when all attempts are exhausted
    pub fn failed() -> Self {
        Self {
            answer: None,
            confidence: 0.0,
            is_fallback: false,
            success: false,
        }
    }

    /// Caller-side confidence gate: only a successful, non-fallback answer at
    /// or above `gate` is trusted without triggering learning.
    pub fn accepted(&self, gate: f32) -> bool {
        self.success && !self.is_fallback && self.confidence >= gate
    }
}

/// Prediction service seam
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, question: &str) -> PredictionResult;
}
