//! Notification collaborator
//!
//! Escalation delivers a structured alert to human moderators and publishes
//! the same payload as a broadcast event for real-time listeners.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Payload delivered when a question needs human training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingAlert {
    pub message: String,
    pub category: String,
    pub keywords: Vec<String>,
}

/// A human recipient flagged as moderator/admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub name: String,
}

/// Delivery collaborator for escalation alerts
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// All recipients flagged as moderators/admins
    async fn recipients(&self) -> Result<Vec<Recipient>>;

    async fn notify(&self, recipients: &[Recipient], alert: &TrainingAlert) -> Result<()>;

    /// Broadcast the alert as a domain event for real-time listeners.
    /// Delivery is best-effort; listeners may or may not exist.
    fn publish(&self, alert: &TrainingAlert);
}
