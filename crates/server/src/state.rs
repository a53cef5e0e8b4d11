//! Application state

use std::sync::Arc;
use std::time::Duration;

use chat_agent_config::Settings;
use chat_agent_core::{InteractionStore, Predictor, ResponseCache, TrainingStore};
use chat_agent_engine::{
    CorpusScorer, DecisionTreeEngine, IntentPipeline, LearningManager, PipelineConfig,
    SessionStore,
};
use chat_agent_persistence::{MemoryCache, MemoryInteractionStore, MemoryTrainingStore};
use chat_agent_predict::{KnowledgeExporter, PredictionClient};

use crate::events::BroadcastNotifier;
use crate::ServerError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IntentPipeline>,
    pub learning: Arc<LearningManager>,
    pub store: Arc<dyn TrainingStore>,
    pub interactions: Arc<dyn InteractionStore>,
    pub exporter: Arc<KnowledgeExporter>,
    pub notifier: Arc<BroadcastNotifier>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Build the full application graph on in-memory stores
    pub fn new(settings: Settings) -> Result<Self, ServerError> {
        let store: Arc<MemoryTrainingStore> = Arc::new(MemoryTrainingStore::new());
        let interactions: Arc<MemoryInteractionStore> = Arc::new(MemoryInteractionStore::new());
        let cache: Arc<dyn ResponseCache> = Arc::new(MemoryCache::new());
        let notifier = Arc::new(BroadcastNotifier::new(&settings.notifications.moderators));

        let predictor: Arc<dyn Predictor> = Arc::new(
            PredictionClient::from_settings(&settings.prediction)
                .map_err(|e| ServerError::Predict(e.to_string()))?,
        );

        Self::assemble(settings, store, interactions, cache, notifier, predictor)
    }

    /// Build with an injected predictor (tests, alternative backends)
    pub fn with_predictor(
        settings: Settings,
        predictor: Arc<dyn Predictor>,
    ) -> Result<Self, ServerError> {
        let store: Arc<MemoryTrainingStore> = Arc::new(MemoryTrainingStore::new());
        let interactions: Arc<MemoryInteractionStore> = Arc::new(MemoryInteractionStore::new());
        let cache: Arc<dyn ResponseCache> = Arc::new(MemoryCache::new());
        let notifier = Arc::new(BroadcastNotifier::new(&settings.notifications.moderators));

        Self::assemble(settings, store, interactions, cache, notifier, predictor)
    }

    fn assemble(
        settings: Settings,
        store: Arc<MemoryTrainingStore>,
        interactions: Arc<MemoryInteractionStore>,
        cache: Arc<dyn ResponseCache>,
        notifier: Arc<BroadcastNotifier>,
        predictor: Arc<dyn Predictor>,
    ) -> Result<Self, ServerError> {
        let cache_ttl = Duration::from_secs(settings.cache.ttl_secs);

        let sessions = Arc::new(SessionStore::new(
            settings.session.max_history,
            Duration::from_secs(settings.session.idle_timeout_secs),
        ));

        let store_dyn: Arc<dyn TrainingStore> = store;
        let interactions_dyn: Arc<dyn InteractionStore> = interactions;

        let scorer = CorpusScorer::new(store_dyn.clone(), cache.clone(), cache_ttl);
        let learning = Arc::new(LearningManager::new(
            store_dyn.clone(),
            interactions_dyn.clone(),
            cache.clone(),
            notifier.clone(),
        ));

        let pipeline = Arc::new(IntentPipeline::new(
            sessions,
            DecisionTreeEngine::new(),
            scorer,
            learning.clone(),
            predictor,
            store_dyn.clone(),
            cache,
            interactions_dyn.clone(),
            PipelineConfig {
                confidence_gate: settings.pipeline.confidence_gate,
                cache_ttl,
            },
        ));

        let exporter = Arc::new(KnowledgeExporter::new(
            store_dyn.clone(),
            settings.export.path.clone(),
        ));

        Ok(Self {
            pipeline,
            learning,
            store: store_dyn,
            interactions: interactions_dyn,
            exporter,
            notifier,
            settings: Arc::new(settings),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn state_builds_and_handles_a_greeting() {
        let state = AppState::new(Settings::default()).unwrap();

        let handled = state
            .pipeline
            .handle_message("hello", None)
            .await
            .unwrap();
        assert_eq!(handled.response, "Hi! How can I help?");
    }
}
