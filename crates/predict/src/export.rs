//! Knowledge export
//!
//! Serializes every active, answered training entry into the record format
//! the external prediction service indexes from disk. Export failures are a
//! logged operational problem, never a pipeline error.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chat_agent_core::{Error, Result, TrainingStore};

/// One exported knowledge record
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeRecord {
    pub text: String,
    pub source: String,
}

/// Writes the answered corpus to the export path as JSON
pub struct KnowledgeExporter {
    store: Arc<dyn TrainingStore>,
    path: PathBuf,
}

impl KnowledgeExporter {
    pub fn new(store: Arc<dyn TrainingStore>, path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    /// Export now, returning the number of records written
    pub async fn export(&self) -> Result<usize> {
        let entries = self.store.list_active().await?;

        let records: Vec<KnowledgeRecord> = entries
            .iter()
            .filter_map(|entry| {
                entry.servable_response().map(|response| KnowledgeRecord {
                    text: format!("Question: {}\nAnswer: {}", entry.trigger, response),
                    source: "trained_data".to_string(),
                })
            })
            .collect();

        let json = serde_json::to_vec_pretty(&records)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::Export(e.to_string()))?;
            }
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| Error::Export(e.to_string()))?;

        tracing::info!(
            records = records.len(),
            path = %self.path.display(),
            "Knowledge export written"
        );
        Ok(records.len())
    }

    /// Run one export, logging instead of raising
    pub async fn run_once(&self) {
        if let Err(e) = self.export().await {
            tracing::error!(error = %e, path = %self.path.display(), "Knowledge export failed");
        }
    }

    /// Periodic export loop; runs until the task is dropped
    pub async fn run_periodic(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.run_once().await;
        }
    }
}
