//! Conversation session store
//!
//! Short-lived per-conversation state: a bounded lowercase message history,
//! the inferred topic, and the guided-flow cursor. Sessions are keyed by
//! conversation id in a concurrent map so conversations never contend with
//! each other; a session is only ever mutated by the request currently
//! handling its id.
//!
//! Expiry is lazy: `sweep` runs at the start of every message-handling call
//! and purges the whole session (history, topic, cursor) once it has been
//! idle longer than the configured timeout.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Inferred conversation topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Account,
    Payment,
    Technical,
    Feature,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Payment => "payment",
            Self::Technical => "technical",
            Self::Feature => "feature",
        }
    }
}

/// Trigger words that pull a conversation into a topic, scanned in order
const TOPIC_TRIGGERS: &[(Topic, &[&str])] = &[
    (
        Topic::Account,
        &["account", "profile", "login", "sign in", "register"],
    ),
    (
        Topic::Payment,
        &["payment", "invoice", "bill", "credit", "charge"],
    ),
    (
        Topic::Technical,
        &["bug", "crash", "error", "not working", "problem"],
    ),
    (
        Topic::Feature,
        &["feature", "how to use", "guide", "tutorial", "use"],
    ),
];

/// Guided-flow position for one conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeCursor {
    pub flow: String,
    pub node: String,
}

#[derive(Debug)]
struct ConversationSession {
    history: VecDeque<String>,
    last_active: Instant,
    topic: Option<Topic>,
    cursor: Option<TreeCursor>,
}

impl ConversationSession {
    fn new() -> Self {
        Self {
            history: VecDeque::new(),
            last_active: Instant::now(),
            topic: None,
            cursor: None,
        }
    }
}

/// Concurrent session store keyed by conversation id
pub struct SessionStore {
    sessions: DashMap<String, ConversationSession>,
    max_history: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(max_history: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            max_history,
            idle_timeout,
        }
    }

    /// Purge the session entirely if it has been idle past the timeout.
    /// Must run before any other read for the conversation.
    pub fn sweep(&self, conversation_id: &str) {
        let expired = self
            .sessions
            .get(conversation_id)
            .map(|s| s.last_active.elapsed() > self.idle_timeout)
            .unwrap_or(false);

        if expired {
            self.sessions.remove(conversation_id);
            tracing::debug!(conversation_id, "Expired idle session");
        }
    }

    /// Append a message to the history (lowercased) and refresh last-active
    pub fn touch(&self, conversation_id: &str, message: &str) {
        let mut session = self
            .sessions
            .entry(conversation_id.to_string())
            .or_insert_with(ConversationSession::new);

        session.history.push_back(message.trim().to_lowercase());
        while session.history.len() > self.max_history {
            session.history.pop_front();
        }
        session.last_active = Instant::now();
    }

    /// Last `n` history messages, oldest first
    pub fn recent(&self, conversation_id: &str, n: usize) -> Vec<String> {
        self.sessions
            .get(conversation_id)
            .map(|s| {
                s.history
                    .iter()
                    .rev()
                    .take(n)
                    .rev()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn context(&self, conversation_id: &str) -> Option<Topic> {
        self.sessions.get(conversation_id).and_then(|s| s.topic)
    }

    pub fn set_context(&self, conversation_id: &str, topic: Topic) {
        let mut session = self
            .sessions
            .entry(conversation_id.to_string())
            .or_insert_with(ConversationSession::new);
        session.topic = Some(topic);
    }

    /// Rolling context check: an already-inferred topic sticks; otherwise the
    /// last three history messages are scanned against the topic trigger
    /// lists and the first match is stored and returned.
    pub fn infer_topic(&self, conversation_id: &str) -> Option<Topic> {
        if let Some(topic) = self.context(conversation_id) {
            return Some(topic);
        }

        let joined = self.recent(conversation_id, 3).join(" ");
        for (topic, triggers) in TOPIC_TRIGGERS {
            if triggers.iter().any(|t| joined.contains(t)) {
                self.set_context(conversation_id, *topic);
                tracing::debug!(conversation_id, topic = topic.as_str(), "Conversation topic inferred");
                return Some(*topic);
            }
        }
        None
    }

    pub fn tree_cursor(&self, conversation_id: &str) -> Option<TreeCursor> {
        self.sessions
            .get(conversation_id)
            .and_then(|s| s.cursor.clone())
    }

    pub fn set_tree_cursor(&self, conversation_id: &str, flow: &str, node: &str) {
        let mut session = self
            .sessions
            .entry(conversation_id.to_string())
            .or_insert_with(ConversationSession::new);
        session.cursor = Some(TreeCursor {
            flow: flow.to_string(),
            node: node.to_string(),
        });
    }

    pub fn clear_tree_cursor(&self, conversation_id: &str) {
        if let Some(mut session) = self.sessions.get_mut(conversation_id) {
            session.cursor = None;
        }
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(30 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_lowercased_and_bounded() {
        let store = SessionStore::new(10, Duration::from_secs(1800));

        for i in 0..11 {
            store.touch("conv", &format!("Message {i}"));
        }

        let recent = store.recent("conv", 20);
        assert_eq!(recent.len(), 10);
        // Oldest message was evicted
        assert_eq!(recent[0], "message 1");
        assert_eq!(recent[9], "message 10");
    }

    #[test]
    fn recent_returns_last_n_oldest_first() {
        let store = SessionStore::default();
        store.touch("conv", "one");
        store.touch("conv", "two");
        store.touch("conv", "three");
        store.touch("conv", "four");

        assert_eq!(store.recent("conv", 3), vec!["two", "three", "four"]);
    }

    #[test]
    fn sweep_purges_idle_sessions_entirely() {
        let store = SessionStore::new(10, Duration::from_millis(5));
        store.touch("conv", "my account is locked");
        store.set_context("conv", Topic::Account);
        store.set_tree_cursor("conv", "account", "start");

        std::thread::sleep(Duration::from_millis(20));
        store.sweep("conv");

        assert!(store.recent("conv", 3).is_empty());
        assert!(store.context("conv").is_none());
        assert!(store.tree_cursor("conv").is_none());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn sweep_keeps_fresh_sessions() {
        let store = SessionStore::new(10, Duration::from_secs(1800));
        store.touch("conv", "hello");
        store.sweep("conv");
        assert_eq!(store.recent("conv", 3), vec!["hello"]);
    }

    #[test]
    fn infer_topic_scans_last_three_messages() {
        let store = SessionStore::default();
        store.touch("conv", "hello there");
        store.touch("conv", "i have a question");
        store.touch("conv", "it is about my invoice");

        assert_eq!(store.infer_topic("conv"), Some(Topic::Payment));
        // Topic sticks once inferred
        store.touch("conv", "something unrelated");
        assert_eq!(store.infer_topic("conv"), Some(Topic::Payment));
    }

    #[test]
    fn infer_topic_ignores_messages_older_than_three() {
        let store = SessionStore::default();
        store.touch("conv", "problem with my account");
        store.touch("conv", "one");
        store.touch("conv", "two");
        store.touch("conv", "three");

        // "account" and "problem" have rolled out of the window
        assert_eq!(store.infer_topic("conv"), None);
    }

    #[test]
    fn sessions_are_independent() {
        let store = SessionStore::default();
        store.touch("a", "login trouble");
        store.touch("b", "hello");

        assert_eq!(store.infer_topic("a"), Some(Topic::Account));
        assert_eq!(store.infer_topic("b"), None);
    }
}
