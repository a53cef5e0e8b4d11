//! Core types and collaborator traits for the chat agent
//!
//! This crate provides the foundational types used across all other crates:
//! - Training corpus records and the store trait backing them
//! - Interaction log records for the feedback loop
//! - Collaborator traits for the cache, the notification sink, and the
//!   external prediction service
//! - Error types

pub mod cache;
pub mod error;
pub mod interaction;
pub mod notify;
pub mod prediction;
pub mod training;

pub use cache::ResponseCache;
pub use error::{Error, Result};
pub use interaction::{Interaction, InteractionStore, ReplySource};
pub use notify::{NotificationSink, Recipient, TrainingAlert};
pub use prediction::{PredictionResult, Predictor};
pub use training::{
    NewTrainingEntry, TrainingEntry, TrainingFilter, TrainingStore, TrainingUpdate,
};

/// Minimum trimmed response length (exclusive) for a training entry to be
/// served back to users. Shorter responses are treated as unanswered.
pub const MIN_SERVABLE_RESPONSE_LEN: usize = 5;
