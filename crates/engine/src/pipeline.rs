//! Intent resolution pipeline
//!
//! One fixed, short-circuiting chain per incoming message:
//!
//! 1. exact static reply table
//! 2. learned exact-text cache
//! 3. lexical analysis; negative sentiment answers immediately
//! 4. keyword pattern rules
//! 5. guided-flow decision tree
//! 6. rolling conversation context
//! 7. trained-corpus scorer
//! 8. external prediction, confidence-gated
//! 9. learning/escalation and a holding reply
//!
//! Steps 1-6 are read-only against static tables and session state. The
//! pipeline always returns some reply; internal failures degrade toward the
//! holding message instead of erroring.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use chat_agent_core::{
    cache::LEARNED_RESPONSES_KEY, Error, Interaction, InteractionStore, Predictor, ReplySource,
    ResponseCache, Result, TrainingStore,
};
use chat_agent_text_processing::{analyze, Sentiment};

use crate::decision_tree::DecisionTreeEngine;
use crate::learning::LearningManager;
use crate::patterns;
use crate::scorer::CorpusScorer;
use crate::session::{SessionStore, Topic};

/// Reply returned when sentiment comes back negative
const EMPATHY_REPLY: &str = "I'm sorry to hear you're having trouble. Let me help resolve this.";

/// Suffix marking a reply that came from the external prediction service
const MACHINE_SUFFIX: &str = " 🤖";

/// Exact replies for messages that match a static table entry verbatim
static EXACT_REPLIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("hello", "Hi! How can I help?"),
        ("hi", "Hi! How can I help?"),
        ("hey", "Hi! How can I help?"),
        ("help", "I can assist with account, payment, and technical questions."),
        ("password", "You can reset your password at Settings > Security"),
        ("email", "Check your spam folder or request a new verification email"),
        ("refund", "Our refund policy allows returns within 30 days"),
    ])
});

/// Pipeline tuning knobs
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum external-prediction confidence accepted without learning
    pub confidence_gate: f32,
    /// TTL for the learned-response and corpus caches
    pub cache_ttl: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_gate: 0.6,
            cache_ttl: Duration::from_secs(60),
        }
    }
}

/// Result of one handled message
#[derive(Debug, Clone)]
pub struct HandledMessage {
    pub response: String,
    pub conversation_id: String,
    pub interaction_id: Uuid,
}

struct Resolved {
    reply: String,
    source: ReplySource,
    training_match_id: Option<u64>,
}

impl Resolved {
    fn new(reply: impl Into<String>, source: ReplySource) -> Self {
        Self {
            reply: reply.into(),
            source,
            training_match_id: None,
        }
    }
}

/// The ordered decision chain over all resolvers
pub struct IntentPipeline {
    sessions: Arc<SessionStore>,
    tree: DecisionTreeEngine,
    scorer: CorpusScorer,
    learning: Arc<LearningManager>,
    predictor: Arc<dyn Predictor>,
    store: Arc<dyn TrainingStore>,
    cache: Arc<dyn ResponseCache>,
    interactions: Arc<dyn InteractionStore>,
    config: PipelineConfig,
}

impl IntentPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<SessionStore>,
        tree: DecisionTreeEngine,
        scorer: CorpusScorer,
        learning: Arc<LearningManager>,
        predictor: Arc<dyn Predictor>,
        store: Arc<dyn TrainingStore>,
        cache: Arc<dyn ResponseCache>,
        interactions: Arc<dyn InteractionStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            sessions,
            tree,
            scorer,
            learning,
            predictor,
            store,
            cache,
            interactions,
            config,
        }
    }

    /// Public operation surface: validate, resolve, and log one message.
    ///
    /// A missing conversation id gets a generated one so the caller can keep
    /// the conversation going.
    pub async fn handle_message(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<HandledMessage> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("message must not be empty".to_string()));
        }

        let conversation_id = match conversation_id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        self.sessions.sweep(&conversation_id);
        self.sessions.touch(&conversation_id, trimmed);

        let resolved = self.resolve(trimmed, &conversation_id).await;
        tracing::info!(
            conversation_id = %conversation_id,
            source = resolved.source.as_str(),
            "Message resolved"
        );

        let interaction = Interaction::new(
            &conversation_id,
            trimmed,
            &resolved.reply,
            resolved.source,
            resolved.training_match_id,
        );
        let interaction_id = interaction.id;
        if let Err(e) = self.interactions.record(interaction).await {
            tracing::error!(error = %e, "Failed to record interaction");
        }

        Ok(HandledMessage {
            response: resolved.reply,
            conversation_id,
            interaction_id,
        })
    }

    async fn resolve(&self, message: &str, conversation_id: &str) -> Resolved {
        let lowered = message.to_lowercase();

        // 1. Exact static table
        if let Some(reply) = EXACT_REPLIES.get(lowered.as_str()) {
            return Resolved::new(*reply, ReplySource::Exact);
        }

        // 2. Previously learned exact text
        if let Some(reply) = self.learned_response(&lowered).await {
            return Resolved::new(reply, ReplySource::Learned);
        }

        // 3. One analyzer pass; negative sentiment outranks everything below,
        // including an active guided flow
        let analysis = analyze(message);
        if analysis.sentiment == Sentiment::Negative {
            return Resolved::new(EMPATHY_REPLY, ReplySource::Sentiment);
        }

        // 4. Keyword pattern rules
        if let Some(reply) = patterns::match_keywords(&analysis.keywords) {
            return Resolved::new(reply, ReplySource::Pattern);
        }

        // 5. Guided flows
        if let Some(reply) = self.tree.step(&self.sessions, conversation_id, message) {
            return Resolved::new(reply, ReplySource::GuidedFlow);
        }

        // 6. Rolling conversation context
        if let Some(topic) = self.sessions.infer_topic(conversation_id) {
            let recent = self.sessions.recent(conversation_id, 3);
            return Resolved::new(contextual_reply(topic, &recent), ReplySource::Context);
        }

        // 7. Trained corpus
        if let Some(m) = self.scorer.find_best_match(message).await {
            return Resolved {
                reply: m.response,
                source: ReplySource::Corpus,
                training_match_id: Some(m.training_id),
            };
        }

        // 8. External prediction, confidence-gated
        let prediction = self.predictor.predict(message).await;
        if prediction.accepted(self.config.confidence_gate) {
            if let Some(answer) = prediction.answer {
                return Resolved::new(
                    format!("{answer}{MACHINE_SUFFIX}"),
                    ReplySource::Prediction,
                );
            }
        }

        // 9. Nothing was confident: learn and hold. Failures here must not
        // reach the sender.
        let category = analysis
            .categories
            .first()
            .cloned()
            .unwrap_or_else(|| "general".to_string());

        if let Err(e) = self
            .learning
            .record_unresolved(&lowered, &category, &analysis.keywords)
            .await
        {
            tracing::error!(error = %e, "Failed to record unresolved question");
        }

        Resolved::new(
            format!("I'm still learning about {category} questions. Our team will review this shortly."),
            ReplySource::Holding,
        )
    }

    /// Learned exact-text lookup via the cache collaborator. On a miss the
    /// map is rebuilt from approved active entries with servable responses.
    async fn learned_response(&self, lowered: &str) -> Option<String> {
        if let Some(value) = self.cache.get(LEARNED_RESPONSES_KEY).await {
            if let Ok(map) = serde_json::from_value::<HashMap<String, String>>(value) {
                return map.get(lowered).cloned();
            }
        }

        let entries = match self.store.list_active().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Training store unavailable for learned responses");
                return None;
            }
        };

        let map: HashMap<String, String> = entries
            .iter()
            .filter(|e| !e.needs_review)
            .filter_map(|e| {
                e.servable_response()
                    .map(|r| (e.trigger.to_lowercase(), r.to_string()))
            })
            .collect();

        if let Ok(value) = serde_json::to_value(&map) {
            self.cache
                .put(LEARNED_RESPONSES_KEY, value, self.config.cache_ttl)
                .await;
        }

        map.get(lowered).cloned()
    }
}

/// Topic-specific canned reply with nested sub-rules. Sub-rule triggers
/// compare against whole history entries: a bare "password" message counts,
/// "reset password please" does not.
fn contextual_reply(topic: Topic, recent: &[String]) -> &'static str {
    let said = |words: &[&str]| recent.iter().any(|m| words.contains(&m.as_str()));

    match topic {
        Topic::Account => {
            if said(&["password", "reset"]) {
                "You can reset your password at: Settings > Account > Reset Password"
            } else if said(&["email", "verify"]) {
                "Check your spam folder or request a new verification email from your account settings"
            } else {
                "For account help, visit our support page or ask about: password reset, email verification, or profile changes"
            }
        }
        Topic::Payment => {
            if said(&["refund", "return"]) {
                "Refunds are processed within 5-7 business days. Contact refunds@example.com for urgent requests"
            } else if said(&["failed", "declined"]) {
                "For failed payments, please verify your card details or try an alternative payment method"
            } else {
                "For billing support, you can: check invoices in Settings > Billing, or contact payments@example.com"
            }
        }
        Topic::Technical => {
            if said(&["crash", "freeze"]) {
                "Try updating to the latest version. If crashes persist, please describe when it happens"
            } else {
                "For technical issues, please specify: device model, app version, and exact error message if available"
            }
        }
        Topic::Feature => {
            if said(&["how to", "use"]) {
                "We have video tutorials at help.example.com/videos or you can ask about specific features"
            } else {
                "Which feature do you need help with? You can ask about: uploading files, sharing, notifications, etc."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_table_covers_greetings() {
        assert_eq!(EXACT_REPLIES.get("hello"), Some(&"Hi! How can I help?"));
        assert_eq!(EXACT_REPLIES.get("hi"), EXACT_REPLIES.get("hey"));
        assert!(EXACT_REPLIES.get("hello there").is_none());
    }

    #[test]
    fn contextual_sub_rules_match_whole_messages() {
        let recent = vec!["i need help".to_string(), "password".to_string()];
        assert_eq!(
            contextual_reply(Topic::Account, &recent),
            "You can reset your password at: Settings > Account > Reset Password"
        );

        // A sub-rule word embedded in a longer message does not count
        let recent = vec!["reset password please".to_string()];
        assert_eq!(
            contextual_reply(Topic::Account, &recent),
            "For account help, visit our support page or ask about: password reset, email verification, or profile changes"
        );
    }

    #[test]
    fn contextual_defaults_per_topic() {
        let empty: Vec<String> = Vec::new();
        assert!(contextual_reply(Topic::Payment, &empty).contains("Settings > Billing"));
        assert!(contextual_reply(Topic::Technical, &empty).contains("device model"));
        assert!(contextual_reply(Topic::Feature, &empty).contains("Which feature"));
    }
}
