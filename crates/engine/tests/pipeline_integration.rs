//! End-to-end pipeline tests with in-memory collaborators

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chat_agent_core::{
    InteractionStore, NewTrainingEntry, NotificationSink, PredictionResult, Predictor, Recipient,
    Result, TrainingAlert, TrainingStore,
};
use chat_agent_engine::{
    CorpusScorer, DecisionTreeEngine, IntentPipeline, LearningManager, PipelineConfig,
    SessionStore,
};
use chat_agent_persistence::{MemoryCache, MemoryInteractionStore, MemoryTrainingStore};

/// Predictor stub with a scripted outcome
struct ScriptedPredictor {
    result: PredictionResult,
    calls: AtomicUsize,
}

impl ScriptedPredictor {
    fn down() -> Self {
        Self {
            result: PredictionResult::failed(),
            calls: AtomicUsize::new(0),
        }
    }

    fn answering(answer: &str, confidence: f32) -> Self {
        Self {
            result: PredictionResult {
                answer: Some(answer.to_string()),
                confidence,
                is_fallback: false,
                success: true,
            },
            calls: AtomicUsize::new(0),
        }
    }

    fn fallback(answer: &str, confidence: f32) -> Self {
        Self {
            result: PredictionResult {
                answer: Some(answer.to_string()),
                confidence,
                is_fallback: true,
                success: true,
            },
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Predictor for ScriptedPredictor {
    async fn predict(&self, _question: &str) -> PredictionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notified: AtomicUsize,
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn recipients(&self) -> Result<Vec<Recipient>> {
        Ok(vec![Recipient {
            id: "1".to_string(),
            name: "moderator".to_string(),
        }])
    }

    async fn notify(&self, _: &[Recipient], _: &TrainingAlert) -> Result<()> {
        self.notified.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn publish(&self, _: &TrainingAlert) {}
}

struct Harness {
    pipeline: IntentPipeline,
    store: Arc<MemoryTrainingStore>,
    interactions: Arc<MemoryInteractionStore>,
    notifier: Arc<RecordingNotifier>,
}

fn harness(predictor: ScriptedPredictor) -> Harness {
    let store = Arc::new(MemoryTrainingStore::new());
    let interactions = Arc::new(MemoryInteractionStore::new());
    let cache = Arc::new(MemoryCache::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let sessions = Arc::new(SessionStore::new(10, Duration::from_secs(1800)));

    let scorer = CorpusScorer::new(store.clone(), cache.clone(), Duration::from_secs(60));
    let learning = Arc::new(LearningManager::new(
        store.clone(),
        interactions.clone(),
        cache.clone(),
        notifier.clone(),
    ));

    let pipeline = IntentPipeline::new(
        sessions,
        DecisionTreeEngine::new(),
        scorer,
        learning,
        Arc::new(predictor),
        store.clone(),
        cache,
        interactions.clone(),
        PipelineConfig::default(),
    );

    Harness {
        pipeline,
        store,
        interactions,
        notifier,
    }
}

#[tokio::test]
async fn greeting_hits_the_exact_table_without_corpus_writes() {
    let h = harness(ScriptedPredictor::down());

    let handled = h.pipeline.handle_message("hello", None).await.unwrap();
    assert_eq!(handled.response, "Hi! How can I help?");
    assert!(!handled.conversation_id.is_empty());
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn empty_message_is_rejected_before_the_pipeline() {
    let h = harness(ScriptedPredictor::down());
    assert!(h.pipeline.handle_message("   ", None).await.is_err());
    assert!(h.interactions.is_empty());
}

#[tokio::test]
async fn novel_question_with_service_down_escalates_once() {
    let h = harness(ScriptedPredictor::down());

    let handled = h
        .pipeline
        .handle_message("xyzzy completely novel question", Some("conv-1"))
        .await
        .unwrap();

    assert_eq!(
        handled.response,
        "I'm still learning about general questions. Our team will review this shortly."
    );
    assert_eq!(handled.conversation_id, "conv-1");

    assert_eq!(h.store.len(), 1);
    let entry = h.store.get(1).await.unwrap().unwrap();
    assert!(entry.needs_review);
    assert_eq!(entry.response, "");
    assert_eq!(h.notifier.notified.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn account_flow_walks_start_then_terminal_then_exits() {
    let h = harness(ScriptedPredictor::down());

    let first = h
        .pipeline
        .handle_message("I need help with my account", Some("conv"))
        .await
        .unwrap();
    assert_eq!(
        first.response,
        "What would you like to do? (update info, reset password, delete account)"
    );

    let second = h
        .pipeline
        .handle_message("reset password", Some("conv"))
        .await
        .unwrap();
    assert_eq!(
        second.response,
        "Visit our password reset page at example.com/reset"
    );

    // After the terminal node the flow is gone; the rolling account context
    // answers instead of the tree
    let third = h
        .pipeline
        .handle_message("what is the weather", Some("conv"))
        .await
        .unwrap();
    assert!(!third.response.contains("update info"));
    assert!(!third.response.contains("example.com/reset"));
}

#[tokio::test]
async fn learned_entry_answers_exact_text() {
    let h = harness(ScriptedPredictor::down());
    h.store
        .create(NewTrainingEntry {
            trigger: "Where are exports stored?".to_string(),
            response: "Exports land in Settings > Data > Downloads".to_string(),
            category: None,
            keywords: Vec::new(),
            is_active: true,
            needs_review: false,
            trained_by: None,
        })
        .await
        .unwrap();

    let handled = h
        .pipeline
        .handle_message("where are exports stored?", None)
        .await
        .unwrap();
    assert_eq!(handled.response, "Exports land in Settings > Data > Downloads");
}

#[tokio::test]
async fn corpus_match_is_recorded_on_the_interaction() {
    let h = harness(ScriptedPredictor::down());
    h.store
        .create(NewTrainingEntry {
            trigger: "notification sounds silent".to_string(),
            response: "Enable sounds under Settings > Notifications".to_string(),
            category: Some("notification".to_string()),
            keywords: vec!["silent".to_string(), "sounds".to_string()],
            is_active: true,
            needs_review: false,
            trained_by: None,
        })
        .await
        .unwrap();

    let handled = h
        .pipeline
        .handle_message("why are my notification sounds silent lately", None)
        .await
        .unwrap();
    assert_eq!(
        handled.response,
        "Enable sounds under Settings > Notifications"
    );

    let interaction = h
        .interactions
        .get(handled.interaction_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(interaction.training_match_id, Some(1));
}

#[tokio::test]
async fn confident_prediction_is_served_with_machine_suffix() {
    let h = harness(ScriptedPredictor::answering(
        "The mitochondria is the powerhouse of the cell.",
        0.9,
    ));

    let handled = h
        .pipeline
        .handle_message("tell me something surprising", None)
        .await
        .unwrap();
    assert_eq!(
        handled.response,
        "The mitochondria is the powerhouse of the cell. 🤖"
    );
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn low_confidence_prediction_falls_through_to_learning() {
    let h = harness(ScriptedPredictor::answering("a guess", 0.5));

    let handled = h
        .pipeline
        .handle_message("explain quantum computing basics", None)
        .await
        .unwrap();
    assert_eq!(
        handled.response,
        "I'm still learning about quantum computing questions. Our team will review this shortly."
    );
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn fallback_prediction_is_not_trusted() {
    let h = harness(ScriptedPredictor::fallback(
        "I don't have specific information about that topic.",
        0.9,
    ));

    let handled = h
        .pipeline
        .handle_message("dwimmerlaik provenance", None)
        .await
        .unwrap();
    assert!(handled.response.starts_with("I'm still learning about"));
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn negative_sentiment_outranks_an_active_flow() {
    let h = harness(ScriptedPredictor::down());

    h.pipeline
        .handle_message("help with my account", Some("conv"))
        .await
        .unwrap();

    // "broken" flips sentiment negative; the flow never sees this message
    let handled = h
        .pipeline
        .handle_message("update info is broken", Some("conv"))
        .await
        .unwrap();
    assert_eq!(
        handled.response,
        "I'm sorry to hear you're having trouble. Let me help resolve this."
    );
}

#[tokio::test]
async fn duplicate_novel_question_renotifies_without_duplicate_entry() {
    let h = harness(ScriptedPredictor::down());

    h.pipeline
        .handle_message("xyzzy completely novel question", Some("a"))
        .await
        .unwrap();
    h.pipeline
        .handle_message("xyzzy completely novel question", Some("b"))
        .await
        .unwrap();

    assert_eq!(h.store.len(), 1);
    assert_eq!(h.notifier.notified.load(Ordering::SeqCst), 2);
}
