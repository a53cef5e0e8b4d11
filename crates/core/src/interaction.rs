//! Interaction log
//!
//! Every handled message is recorded as an `Interaction` so that user
//! feedback can later be attributed back to the training entry that produced
//! the reply.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Which pipeline stage produced the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Exact,
    Learned,
    Sentiment,
    Pattern,
    GuidedFlow,
    Context,
    Corpus,
    Prediction,
    Holding,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Learned => "learned",
            Self::Sentiment => "sentiment",
            Self::Pattern => "pattern",
            Self::GuidedFlow => "guided_flow",
            Self::Context => "context",
            Self::Corpus => "corpus",
            Self::Prediction => "prediction",
            Self::Holding => "holding",
        }
    }
}

/// One handled message and its reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Uuid,
    pub conversation_id: String,
    pub user_input: String,
    pub reply: String,
    pub source: ReplySource,
    /// Training entry that produced the reply, when the corpus matched
    pub training_match_id: Option<u64>,
    pub was_helpful: Option<bool>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(
        conversation_id: &str,
        user_input: &str,
        reply: &str,
        source: ReplySource,
        training_match_id: Option<u64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id: conversation_id.to_string(),
            user_input: user_input.to_string(),
            reply: reply.to_string(),
            source,
            training_match_id,
            was_helpful: None,
            feedback: None,
            created_at: Utc::now(),
        }
    }
}

/// Storage collaborator for the interaction log
#[async_trait]
pub trait InteractionStore: Send + Sync {
    async fn record(&self, interaction: Interaction) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Interaction>>;

    /// Attach user feedback, returning the updated interaction
    async fn set_feedback(
        &self,
        id: Uuid,
        was_helpful: bool,
        note: Option<String>,
    ) -> Result<Interaction>;

    /// Number of helpful interactions that referenced a training entry
    async fn count_helpful_for(&self, training_id: u64) -> Result<u32>;
}
