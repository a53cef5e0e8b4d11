//! Learning and escalation
//!
//! Unanswered questions become training entries awaiting human review, and
//! moderators are alerted. Escalation is at-least-once: a question that keeps
//! arriving unresolved keeps re-notifying until someone writes a response.
//!
//! Nothing on this path may fail the reply that was already computed; every
//! error is logged and swallowed at the call site.

use std::sync::Arc;
use uuid::Uuid;

use chat_agent_core::{
    cache::{LEARNED_RESPONSES_KEY, TRAINING_CORPUS_KEY},
    InteractionStore, NewTrainingEntry, NotificationSink, ResponseCache, Result, TrainingAlert,
    TrainingStore, TrainingUpdate,
};

/// Creates/updates training entries and drives the notification path
pub struct LearningManager {
    store: Arc<dyn TrainingStore>,
    interactions: Arc<dyn InteractionStore>,
    cache: Arc<dyn ResponseCache>,
    notifier: Arc<dyn NotificationSink>,
}

impl LearningManager {
    pub fn new(
        store: Arc<dyn TrainingStore>,
        interactions: Arc<dyn InteractionStore>,
        cache: Arc<dyn ResponseCache>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            interactions,
            cache,
            notifier,
        }
    }

    /// Record a message no resolver was confident about.
    ///
    /// If a similar unanswered entry already exists the moderators are
    /// notified again and nothing is written; otherwise a new entry is
    /// created (empty response, needs review, inactive) and the caches are
    /// invalidated.
    pub async fn record_unresolved(
        &self,
        message: &str,
        category: &str,
        keywords: &[String],
    ) -> Result<()> {
        let alert = TrainingAlert {
            message: message.to_string(),
            category: category.to_string(),
            keywords: keywords.to_vec(),
        };

        if let Some(existing) = self.store.find_similar(message, Some(category)).await? {
            if existing.needs_review && existing.response.trim().is_empty() {
                // Re-notify every time the condition persists; there is no
                // dedup window, so popular questions are loud on purpose
                tracing::warn!(
                    training_id = existing.id,
                    category,
                    "Unresolved question seen again, re-notifying moderators"
                );
                self.escalate(&alert).await;
            } else {
                tracing::debug!(
                    training_id = existing.id,
                    "Similar training entry already handled"
                );
            }
            return Ok(());
        }

        let entry = self
            .store
            .create(NewTrainingEntry {
                trigger: message.to_string(),
                response: String::new(),
                category: Some(category.to_string()),
                keywords: keywords.to_vec(),
                is_active: false,
                needs_review: true,
                trained_by: None,
            })
            .await?;

        tracing::info!(
            training_id = entry.id,
            category,
            "Created training entry for unresolved question"
        );

        self.escalate(&alert).await;
        self.invalidate_caches().await;
        Ok(())
    }

    /// Apply user feedback to an interaction and its matched training entry
    pub async fn record_feedback(
        &self,
        interaction_id: Uuid,
        was_helpful: bool,
        note: Option<String>,
    ) -> Result<()> {
        let interaction = self
            .interactions
            .set_feedback(interaction_id, was_helpful, note)
            .await?;

        let Some(training_id) = interaction.training_match_id else {
            return Ok(());
        };

        if !was_helpful {
            self.store
                .update(
                    training_id,
                    TrainingUpdate {
                        needs_review: Some(true),
                        ..Default::default()
                    },
                )
                .await?;
            tracing::info!(training_id, "Entry flagged for review after unhelpful feedback");
        } else {
            let usage_count = self.store.increment_usage(training_id).await?;
            let helpful = self.interactions.count_helpful_for(training_id).await?;
            let success_rate = if usage_count > 0 {
                helpful as f32 / usage_count as f32 * 100.0
            } else {
                0.0
            };

            self.store
                .update(
                    training_id,
                    TrainingUpdate {
                        success_rate: Some(success_rate),
                        ..Default::default()
                    },
                )
                .await?;
            tracing::info!(training_id, usage_count, success_rate, "Positive feedback applied");
        }

        self.invalidate_caches().await;
        Ok(())
    }

    /// Deliver the alert to moderators and publish the matching domain event.
    /// Delivery failures are logged, never returned.
    async fn escalate(&self, alert: &TrainingAlert) {
        match self.notifier.recipients().await {
            Ok(recipients) if !recipients.is_empty() => {
                if let Err(e) = self.notifier.notify(&recipients, alert).await {
                    tracing::error!(error = %e, "Training alert delivery failed");
                }
            }
            Ok(_) => {
                tracing::warn!("No moderator recipients configured for training alerts");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to resolve training alert recipients");
            }
        }

        self.notifier.publish(alert);
    }

    /// Drop both derived caches; call after every corpus write
    pub async fn invalidate_caches(&self) {
        self.cache.forget(LEARNED_RESPONSES_KEY).await;
        self.cache.forget(TRAINING_CORPUS_KEY).await;
    }
}
