//! In-memory training corpus store

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chat_agent_core::{
    Error, NewTrainingEntry, Result, TrainingEntry, TrainingFilter, TrainingStore, TrainingUpdate,
};

/// In-memory implementation of [`TrainingStore`]
#[derive(Default)]
pub struct MemoryTrainingStore {
    entries: RwLock<Vec<TrainingEntry>>,
    next_id: AtomicU64,
}

impl MemoryTrainingStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn materialize(id: u64, entry: NewTrainingEntry) -> TrainingEntry {
    let now = Utc::now();
    TrainingEntry {
        id,
        trigger: entry.trigger,
        response: entry.response,
        category: entry.category,
        keywords: entry.keywords,
        is_active: entry.is_active,
        needs_review: entry.needs_review,
        usage_count: 0,
        success_rate: 0.0,
        trained_by: entry.trained_by,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl TrainingStore for MemoryTrainingStore {
    async fn list_active(&self) -> Result<Vec<TrainingEntry>> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| e.is_active)
            .cloned()
            .collect())
    }

    async fn find_similar(
        &self,
        message: &str,
        category: Option<&str>,
    ) -> Result<Option<TrainingEntry>> {
        let lowered = message.to_lowercase();
        Ok(self
            .entries
            .read()
            .iter()
            .find(|e| {
                e.trigger.to_lowercase().contains(&lowered)
                    && match category {
                        Some(cat) => e.category.as_deref() == Some(cat),
                        None => true,
                    }
            })
            .cloned())
    }

    async fn get(&self, id: u64) -> Result<Option<TrainingEntry>> {
        Ok(self.entries.read().iter().find(|e| e.id == id).cloned())
    }

    async fn create(&self, entry: NewTrainingEntry) -> Result<TrainingEntry> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let entry = materialize(id, entry);
        self.entries.write().push(entry.clone());
        tracing::debug!(training_id = id, trigger = %entry.trigger, "Training entry created");
        Ok(entry)
    }

    async fn update(&self, id: u64, fields: TrainingUpdate) -> Result<TrainingEntry> {
        let mut entries = self.entries.write();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("training entry {id}")))?;

        if let Some(response) = fields.response {
            entry.response = response;
        }
        if let Some(category) = fields.category {
            entry.category = Some(category);
        }
        if let Some(is_active) = fields.is_active {
            entry.is_active = is_active;
        }
        if let Some(needs_review) = fields.needs_review {
            entry.needs_review = needs_review;
        }
        if let Some(success_rate) = fields.success_rate {
            entry.success_rate = success_rate;
        }
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }

    async fn increment_usage(&self, id: u64) -> Result<u32> {
        let mut entries = self.entries.write();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("training entry {id}")))?;

        entry.usage_count += 1;
        entry.updated_at = Utc::now();
        Ok(entry.usage_count)
    }

    async fn list(&self, filter: TrainingFilter) -> Result<Vec<TrainingEntry>> {
        let mut results: Vec<TrainingEntry> = self
            .entries
            .read()
            .iter()
            .filter(|e| {
                filter
                    .category
                    .as_deref()
                    .map_or(true, |cat| e.category.as_deref() == Some(cat))
            })
            .filter(|e| {
                filter.search.as_deref().map_or(true, |s| {
                    e.trigger.to_lowercase().contains(&s.to_lowercase())
                })
            })
            .filter(|e| {
                filter
                    .needs_review
                    .map_or(true, |flag| e.needs_review == flag)
            })
            .cloned()
            .collect();

        // Entries awaiting review first, newest first within each group
        results.sort_by(|a, b| {
            b.needs_review
                .cmp(&a.needs_review)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(results)
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let mut categories: Vec<String> = self
            .entries
            .read()
            .iter()
            .filter_map(|e| e.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(trigger: &str, response: &str, category: Option<&str>) -> NewTrainingEntry {
        NewTrainingEntry {
            trigger: trigger.to_string(),
            response: response.to_string(),
            category: category.map(str::to_string),
            keywords: Vec::new(),
            is_active: true,
            needs_review: false,
            trained_by: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryTrainingStore::new();
        let first = store.create(new_entry("a", "resp", None)).await.unwrap();
        let second = store.create(new_entry("b", "resp", None)).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn list_active_skips_inactive() {
        let store = MemoryTrainingStore::new();
        store.create(new_entry("a", "resp", None)).await.unwrap();
        let mut inactive = new_entry("b", "resp", None);
        inactive.is_active = false;
        store.create(inactive).await.unwrap();

        let active = store.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].trigger, "a");
    }

    #[tokio::test]
    async fn find_similar_matches_containment_and_category() {
        let store = MemoryTrainingStore::new();
        store
            .create(new_entry(
                "how do i reset my password",
                "",
                Some("account"),
            ))
            .await
            .unwrap();

        let hit = store
            .find_similar("reset my password", Some("account"))
            .await
            .unwrap();
        assert!(hit.is_some());

        let wrong_category = store
            .find_similar("reset my password", Some("payment"))
            .await
            .unwrap();
        assert!(wrong_category.is_none());
    }

    #[tokio::test]
    async fn increment_usage_counts_up() {
        let store = MemoryTrainingStore::new();
        let entry = store.create(new_entry("a", "resp", None)).await.unwrap();
        assert_eq!(store.increment_usage(entry.id).await.unwrap(), 1);
        assert_eq!(store.increment_usage(entry.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_puts_review_entries_first() {
        let store = MemoryTrainingStore::new();
        store.create(new_entry("answered", "resp", None)).await.unwrap();
        let mut pending = new_entry("pending", "", None);
        pending.needs_review = true;
        store.create(pending).await.unwrap();

        let listed = store.list(TrainingFilter::default()).await.unwrap();
        assert_eq!(listed[0].trigger, "pending");
    }
}
