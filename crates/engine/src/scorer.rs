//! Trained-corpus scorer
//!
//! Ranks the active training entries against an incoming message. The score
//! is keyword overlap (double-weighted) plus a category bonus:
//!
//! `score = 2 × |tokens(msg) ∩ (tokens(trigger) ∪ keywords ∪ {category})|
//!          + 3 if the entry's category was detected in the message`
//!
//! The maximum-score entry wins; ties keep the first-seen entry. A winner
//! whose response is too short to serve counts as no match at all.
//!
//! The active corpus is read through the cache collaborator with a short TTL
//! and must be invalidated on every corpus write.

use std::sync::Arc;
use std::time::Duration;

use chat_agent_core::{cache::TRAINING_CORPUS_KEY, ResponseCache, TrainingEntry, TrainingStore};
use chat_agent_text_processing::{detect_categories, tokenize};

/// A winning corpus entry
#[derive(Debug, Clone)]
pub struct CorpusMatch {
    pub training_id: u64,
    pub response: String,
    pub score: u32,
}

/// Scorer over the cached active corpus
pub struct CorpusScorer {
    store: Arc<dyn TrainingStore>,
    cache: Arc<dyn ResponseCache>,
    cache_ttl: Duration,
}

impl CorpusScorer {
    pub fn new(
        store: Arc<dyn TrainingStore>,
        cache: Arc<dyn ResponseCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            cache_ttl,
        }
    }

    /// Active corpus snapshot, via cache. A store failure degrades to an
    /// empty corpus rather than failing the pipeline.
    async fn active_corpus(&self) -> Vec<TrainingEntry> {
        if let Some(value) = self.cache.get(TRAINING_CORPUS_KEY).await {
            if let Ok(entries) = serde_json::from_value::<Vec<TrainingEntry>>(value) {
                return entries;
            }
        }

        match self.store.list_active().await {
            Ok(entries) => {
                if let Ok(value) = serde_json::to_value(&entries) {
                    self.cache.put(TRAINING_CORPUS_KEY, value, self.cache_ttl).await;
                }
                entries
            }
            Err(e) => {
                tracing::warn!(error = %e, "Training store unavailable, scoring empty corpus");
                Vec::new()
            }
        }
    }

    /// Best servable corpus entry for the message, if any
    pub async fn find_best_match(&self, message: &str) -> Option<CorpusMatch> {
        let corpus = self.active_corpus().await;
        let lowered = message.trim().to_lowercase();

        // An exact trigger match short-circuits scoring
        if let Some(entry) = corpus.iter().find(|e| e.trigger.to_lowercase() == lowered) {
            if let Some(response) = entry.servable_response() {
                tracing::info!(training_id = entry.id, "Exact trigger match");
                return Some(CorpusMatch {
                    training_id: entry.id,
                    response: response.to_string(),
                    score: 0,
                });
            }
        }

        let tokens = tokenize(message);
        if tokens.is_empty() {
            return None;
        }
        let detected = detect_categories(message);

        let mut best: Option<(u32, &TrainingEntry)> = None;
        for entry in &corpus {
            let mut pool = tokenize(&entry.trigger);
            pool.extend(entry.keywords.iter().map(|k| k.to_lowercase()));
            if let Some(category) = &entry.category {
                pool.push(category.to_lowercase());
            }

            let overlap = tokens.iter().filter(|t| pool.contains(t)).count() as u32;
            let category_match = entry
                .category
                .as_deref()
                .map_or(false, |c| detected.iter().any(|d| d == c));

            let score = overlap * 2 + if category_match { 3 } else { 0 };

            // Strictly greater keeps the first-seen entry on ties
            if score > 0 && best.as_ref().map_or(true, |(b, _)| score > *b) {
                best = Some((score, entry));
            }
        }

        let (score, entry) = best?;
        match entry.servable_response() {
            Some(response) => {
                tracing::info!(training_id = entry.id, score, "Corpus match selected");
                Some(CorpusMatch {
                    training_id: entry.id,
                    response: response.to_string(),
                    score,
                })
            }
            None => {
                tracing::info!(
                    training_id = entry.id,
                    score,
                    "Best corpus entry has no servable response"
                );
                None
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_agent_core::{
        NewTrainingEntry, Result, TrainingFilter, TrainingUpdate,
    };
    use chrono::Utc;

    struct FixedStore {
        entries: Vec<TrainingEntry>,
    }

    #[async_trait]
    impl TrainingStore for FixedStore {
        async fn list_active(&self) -> Result<Vec<TrainingEntry>> {
            Ok(self.entries.clone())
        }
        async fn find_similar(&self, _: &str, _: Option<&str>) -> Result<Option<TrainingEntry>> {
            Ok(None)
        }
        async fn get(&self, _: u64) -> Result<Option<TrainingEntry>> {
            Ok(None)
        }
        async fn create(&self, _: NewTrainingEntry) -> Result<TrainingEntry> {
            unimplemented!("read-only fixture")
        }
        async fn update(&self, _: u64, _: TrainingUpdate) -> Result<TrainingEntry> {
            unimplemented!("read-only fixture")
        }
        async fn increment_usage(&self, _: u64) -> Result<u32> {
            Ok(0)
        }
        async fn list(&self, _: TrainingFilter) -> Result<Vec<TrainingEntry>> {
            Ok(self.entries.clone())
        }
        async fn categories(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    /// Cache that never hits
    struct NullCache;

    #[async_trait]
    impl ResponseCache for NullCache {
        async fn get(&self, _: &str) -> Option<serde_json::Value> {
            None
        }
        async fn put(&self, _: &str, _: serde_json::Value, _: Duration) {}
        async fn forget(&self, _: &str) {}
    }

    fn entry(id: u64, trigger: &str, response: &str, category: Option<&str>, keywords: &[&str]) -> TrainingEntry {
        TrainingEntry {
            id,
            trigger: trigger.to_string(),
            response: response.to_string(),
            category: category.map(str::to_string),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            is_active: true,
            needs_review: false,
            usage_count: 0,
            success_rate: 0.0,
            trained_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn scorer(entries: Vec<TrainingEntry>) -> CorpusScorer {
        CorpusScorer::new(
            Arc::new(FixedStore { entries }),
            Arc::new(NullCache),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn higher_overlap_beats_category_bonus() {
        // Entry A: 1 keyword overlap + matching category = 2 + 3 = 5
        // Entry B: 3 keyword overlaps, no category match = 6
        let scorer = scorer(vec![
            entry(
                1,
                "trouble with my account settings",
                "Account settings live under Settings > Account",
                Some("account"),
                &[],
            ),
            entry(
                2,
                "upload photo failed today",
                "Try re-uploading from the app home screen",
                Some("media"),
                &[],
            ),
        ]);

        let best = scorer
            .find_best_match("my photo upload failed on my account")
            .await
            .unwrap();
        assert_eq!(best.training_id, 2);
        assert_eq!(best.score, 6);
    }

    #[tokio::test]
    async fn short_response_winner_means_no_match() {
        // Same scores as above, but the winner's response is unservable
        let scorer = scorer(vec![
            entry(
                1,
                "trouble with my account settings",
                "Account settings live under Settings > Account",
                Some("account"),
                &[],
            ),
            entry(2, "upload photo failed today", "ok", Some("media"), &[]),
        ]);

        let best = scorer
            .find_best_match("my photo upload failed on my account")
            .await;
        assert!(best.is_none());
    }

    #[tokio::test]
    async fn ties_keep_first_seen_entry() {
        let scorer = scorer(vec![
            entry(1, "reset password", "Use the reset link in Settings", None, &[]),
            entry(2, "password reset", "Second entry, same overlap", None, &[]),
        ]);

        let best = scorer.find_best_match("password reset help").await.unwrap();
        assert_eq!(best.training_id, 1);
    }

    #[tokio::test]
    async fn exact_trigger_match_short_circuits() {
        let scorer = scorer(vec![
            entry(1, "How do refunds work?", "Refunds take 5-7 business days", Some("payment"), &[]),
            entry(2, "refunds how work", "Scored entry that would also hit", Some("payment"), &[]),
        ]);

        let best = scorer.find_best_match("how do refunds work?").await.unwrap();
        assert_eq!(best.training_id, 1);
    }

    #[tokio::test]
    async fn stored_keywords_count_toward_overlap() {
        let scorer = scorer(vec![entry(
            1,
            "payment bounced",
            "Check your card details and retry",
            None,
            &["declined", "failed"],
        )]);

        let best = scorer.find_best_match("my card was declined").await.unwrap();
        assert_eq!(best.training_id, 1);
        assert_eq!(best.score, 2);
    }

    #[tokio::test]
    async fn empty_corpus_matches_nothing() {
        let scorer = scorer(Vec::new());
        assert!(scorer.find_best_match("anything at all").await.is_none());
    }
}
