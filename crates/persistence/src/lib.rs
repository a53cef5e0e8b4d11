//! In-memory persistence layer for the chat agent
//!
//! Reference implementations of the storage collaborators defined in
//! `chat-agent-core`:
//! - `MemoryTrainingStore`: the trained corpus
//! - `MemoryInteractionStore`: the interaction/feedback log
//! - `MemoryCache`: key/value cache with per-entry TTL
//!
//! Durable transcript storage is a concern of the surrounding application;
//! these stores live for the process lifetime only.

pub mod cache;
pub mod interactions;
pub mod training;

pub use cache::MemoryCache;
pub use interactions::MemoryInteractionStore;
pub use training::MemoryTrainingStore;
