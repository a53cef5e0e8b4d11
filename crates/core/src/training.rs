//! Training corpus records and store trait
//!
//! A `TrainingEntry` is one learned stimulus→response pair. Entries are never
//! hard-deleted by this subsystem: moderation deactivates them via
//! `is_active = false` instead.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::MIN_SERVABLE_RESPONSE_LEN;

/// One learned stimulus→response pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingEntry {
    pub id: u64,
    /// The text (or text fragment) that triggers this entry
    pub trigger: String,
    /// The reply to serve; empty means "unanswered"
    pub response: String,
    /// Topical label, if one was detected or assigned
    pub category: Option<String>,
    /// Analyzer keywords captured at creation time
    pub keywords: Vec<String>,
    pub is_active: bool,
    /// Set when the entry is unanswered or was disputed by feedback
    pub needs_review: bool,
    pub usage_count: u32,
    /// helpful_uses / usage_count × 100, recomputed on positive feedback
    pub success_rate: f32,
    pub trained_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingEntry {
    /// The response, if it is allowed to be served.
    ///
    /// A response is only served when its trimmed length exceeds
    /// [`MIN_SERVABLE_RESPONSE_LEN`]; anything shorter counts as unanswered.
    pub fn servable_response(&self) -> Option<&str> {
        let trimmed = self.response.trim();
        if trimmed.len() > MIN_SERVABLE_RESPONSE_LEN {
            Some(trimmed)
        } else {
            None
        }
    }
}

/// Fields for creating a new training entry
#[derive(Debug, Clone, Default)]
pub struct NewTrainingEntry {
    pub trigger: String,
    pub response: String,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub is_active: bool,
    pub needs_review: bool,
    pub trained_by: Option<String>,
}

/// Partial update applied by moderation or the feedback loop
#[derive(Debug, Clone, Default)]
pub struct TrainingUpdate {
    pub response: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub needs_review: Option<bool>,
    pub success_rate: Option<f32>,
}

/// Listing filter for the moderation surface
#[derive(Debug, Clone, Default)]
pub struct TrainingFilter {
    pub category: Option<String>,
    /// Substring match against the trigger text
    pub search: Option<String>,
    pub needs_review: Option<bool>,
}

/// Storage collaborator for the trained corpus
#[async_trait]
pub trait TrainingStore: Send + Sync {
    /// All active entries, in creation order
    async fn list_active(&self) -> Result<Vec<TrainingEntry>>;

    /// First entry whose trigger contains `message` and whose category
    /// matches, in creation order
    async fn find_similar(
        &self,
        message: &str,
        category: Option<&str>,
    ) -> Result<Option<TrainingEntry>>;

    async fn get(&self, id: u64) -> Result<Option<TrainingEntry>>;

    async fn create(&self, entry: NewTrainingEntry) -> Result<TrainingEntry>;

    async fn update(&self, id: u64, fields: TrainingUpdate) -> Result<TrainingEntry>;

    /// Increment the usage counter, returning the new count
    async fn increment_usage(&self, id: u64) -> Result<u32>;

    /// Listing for the moderation surface, entries needing review first
    async fn list(&self, filter: TrainingFilter) -> Result<Vec<TrainingEntry>>;

    /// Distinct non-null categories across the corpus
    async fn categories(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_response(response: &str) -> TrainingEntry {
        TrainingEntry {
            id: 1,
            trigger: "how do refunds work".to_string(),
            response: response.to_string(),
            category: Some("payment".to_string()),
            keywords: vec!["refunds".to_string()],
            is_active: true,
            needs_review: false,
            usage_count: 0,
            success_rate: 0.0,
            trained_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn servable_response_requires_length() {
        assert!(entry_with_response("").servable_response().is_none());
        assert!(entry_with_response("ok").servable_response().is_none());
        // Exactly five characters is still too short
        assert!(entry_with_response("12345").servable_response().is_none());
        assert!(entry_with_response("   ok    ").servable_response().is_none());
        assert_eq!(
            entry_with_response("Refunds take 5-7 days").servable_response(),
            Some("Refunds take 5-7 days")
        );
    }
}
