//! Escalation notification sink
//!
//! Delivers training alerts to the configured moderators (logged delivery)
//! and publishes the same payload on a broadcast channel for real-time
//! listeners such as an admin dashboard stream.

use async_trait::async_trait;
use tokio::sync::broadcast;

use chat_agent_core::{NotificationSink, Recipient, Result, TrainingAlert};

/// Broadcast-backed implementation of [`NotificationSink`]
pub struct BroadcastNotifier {
    moderators: Vec<Recipient>,
    events: broadcast::Sender<TrainingAlert>,
}

impl BroadcastNotifier {
    pub fn new(moderators: &[String]) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            moderators: moderators
                .iter()
                .enumerate()
                .map(|(i, name)| Recipient {
                    id: (i + 1).to_string(),
                    name: name.clone(),
                })
                .collect(),
            events,
        }
    }

    /// Subscribe to escalation events
    pub fn subscribe(&self) -> broadcast::Receiver<TrainingAlert> {
        self.events.subscribe()
    }
}

#[async_trait]
impl NotificationSink for BroadcastNotifier {
    async fn recipients(&self) -> Result<Vec<Recipient>> {
        Ok(self.moderators.clone())
    }

    async fn notify(&self, recipients: &[Recipient], alert: &TrainingAlert) -> Result<()> {
        for recipient in recipients {
            tracing::info!(
                recipient = %recipient.name,
                category = %alert.category,
                message = %alert.message,
                "Training alert delivered"
            );
        }
        Ok(())
    }

    fn publish(&self, alert: &TrainingAlert) {
        // No listeners is fine
        let _ = self.events.send(alert.clone());
    }
}
