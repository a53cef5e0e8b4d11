//! Guided-flow decision trees
//!
//! A flow topology is an entry pattern plus a table of named nodes. Each
//! non-start node carries a fixed reply and either a keyword→node map or no
//! children (terminal). The engine is stateless; the per-conversation cursor
//! lives in the session store.
//!
//! Flow mechanics:
//! - With no cursor, the entry pattern is matched against the message; on a
//!   hit the start prompt is emitted and the stored cursor stays at the
//!   flow's root. The flow does not advance past `start` until a child
//!   keyword is seen on a later message.
//! - At a node with children, the first child whose keyword appears in the
//!   message (case-insensitive substring) becomes the new cursor and its
//!   reply is returned.
//! - A terminal node's reply is returned once; the cursor is torn down at
//!   the next invocation check.
//! - No match at any level returns `None` and the pipeline continues.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::session::SessionStore;

/// Name of the root node every topology must define
pub const START_NODE: &str = "start";

/// One node in a guided flow
#[derive(Debug, Clone)]
pub struct FlowNode {
    pub reply: String,
    /// Keyword→node transitions, scanned in order; `None` marks a terminal
    pub children: Option<Vec<(String, String)>>,
}

impl FlowNode {
    pub fn terminal(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            children: None,
        }
    }

    pub fn with_children(reply: &str, children: &[(&str, &str)]) -> Self {
        Self {
            reply: reply.to_string(),
            children: Some(
                children
                    .iter()
                    .map(|(k, n)| (k.to_string(), n.to_string()))
                    .collect(),
            ),
        }
    }
}

/// One guided-flow topology
#[derive(Debug, Clone)]
pub struct FlowTopology {
    pub name: String,
    /// Entry pattern matched against the lowered message when no flow is active
    pub entry: Regex,
    pub nodes: HashMap<String, FlowNode>,
}

static ACCOUNT_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new("account|profile").expect("static account entry pattern"));

impl FlowTopology {
    /// The built-in account management flow
    pub fn account() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            START_NODE.to_string(),
            FlowNode::with_children(
                "What would you like to do? (update info, reset password, delete account)",
                &[
                    ("update info", "update_info"),
                    ("reset password", "reset_password"),
                    ("delete account", "delete_account"),
                ],
            ),
        );
        nodes.insert(
            "update_info".to_string(),
            FlowNode::terminal("Go to Settings > Profile > Edit"),
        );
        nodes.insert(
            "reset_password".to_string(),
            FlowNode::terminal("Visit our password reset page at example.com/reset"),
        );
        nodes.insert(
            "delete_account".to_string(),
            FlowNode::terminal(
                "Account deletion is permanent. Go to Settings > Account > Delete Account to continue",
            ),
        );

        Self {
            name: "account".to_string(),
            entry: ACCOUNT_ENTRY.clone(),
            nodes,
        }
    }
}

/// Guided-flow engine holding the registered topologies
pub struct DecisionTreeEngine {
    flows: Vec<FlowTopology>,
}

impl DecisionTreeEngine {
    /// Engine with the built-in account flow registered
    pub fn new() -> Self {
        Self {
            flows: vec![FlowTopology::account()],
        }
    }

    /// Register an additional topology; the engine itself never changes
    pub fn register(&mut self, flow: FlowTopology) {
        self.flows.push(flow);
    }

    /// Advance the conversation's flow by one message
    pub fn step(
        &self,
        sessions: &SessionStore,
        conversation_id: &str,
        message: &str,
    ) -> Option<String> {
        let lowered = message.to_lowercase();

        if let Some(cursor) = sessions.tree_cursor(conversation_id) {
            match self.flows.iter().find(|f| f.name == cursor.flow) {
                Some(flow) => match flow.nodes.get(&cursor.node) {
                    Some(node) => match &node.children {
                        Some(children) => {
                            for (keyword, next_name) in children {
                                if lowered.contains(keyword.as_str()) {
                                    let next = flow.nodes.get(next_name)?;
                                    sessions.set_tree_cursor(
                                        conversation_id,
                                        &flow.name,
                                        next_name,
                                    );
                                    tracing::debug!(
                                        conversation_id,
                                        flow = %flow.name,
                                        node = %next_name,
                                        "Guided flow advanced"
                                    );
                                    return Some(next.reply.clone());
                                }
                            }
                            // Active flow, no child matched: stay put
                            return None;
                        }
                        // Terminal reply was already served; tear the flow down
                        None => sessions.clear_tree_cursor(conversation_id),
                    },
                    None => sessions.clear_tree_cursor(conversation_id),
                },
                None => sessions.clear_tree_cursor(conversation_id),
            }
        }

        // No active flow: try each topology's entry pattern
        for flow in &self.flows {
            if flow.entry.is_match(&lowered) {
                let start = flow.nodes.get(START_NODE)?;
                sessions.set_tree_cursor(conversation_id, &flow.name, START_NODE);
                tracing::debug!(conversation_id, flow = %flow.name, "Guided flow entered");
                return Some(start.reply.clone());
            }
        }

        None
    }
}

impl Default for DecisionTreeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store() -> SessionStore {
        SessionStore::new(10, Duration::from_secs(1800))
    }

    #[test]
    fn entry_match_emits_start_prompt_and_holds_at_root() {
        let engine = DecisionTreeEngine::new();
        let sessions = store();

        let reply = engine.step(&sessions, "conv", "I need help with my account");
        assert_eq!(
            reply.as_deref(),
            Some("What would you like to do? (update info, reset password, delete account)")
        );

        let cursor = sessions.tree_cursor("conv").unwrap();
        assert_eq!(cursor.flow, "account");
        assert_eq!(cursor.node, START_NODE);
    }

    #[test]
    fn child_keyword_advances_the_flow() {
        let engine = DecisionTreeEngine::new();
        let sessions = store();

        engine.step(&sessions, "conv", "my account please");
        let reply = engine.step(&sessions, "conv", "reset password");
        assert_eq!(
            reply.as_deref(),
            Some("Visit our password reset page at example.com/reset")
        );
        assert_eq!(sessions.tree_cursor("conv").unwrap().node, "reset_password");
    }

    #[test]
    fn terminal_is_torn_down_on_next_step() {
        let engine = DecisionTreeEngine::new();
        let sessions = store();

        engine.step(&sessions, "conv", "account");
        engine.step(&sessions, "conv", "update info");

        // Next message hits the terminal check: cursor cleared, no entry match
        let reply = engine.step(&sessions, "conv", "what is the weather");
        assert!(reply.is_none());
        assert!(sessions.tree_cursor("conv").is_none());
    }

    #[test]
    fn no_child_match_keeps_cursor() {
        let engine = DecisionTreeEngine::new();
        let sessions = store();

        engine.step(&sessions, "conv", "account");
        let reply = engine.step(&sessions, "conv", "something unrelated");
        assert!(reply.is_none());
        assert_eq!(sessions.tree_cursor("conv").unwrap().node, START_NODE);
    }

    #[test]
    fn terminal_message_can_reenter_via_entry_pattern() {
        let engine = DecisionTreeEngine::new();
        let sessions = store();

        engine.step(&sessions, "conv", "account");
        engine.step(&sessions, "conv", "delete account");

        // After teardown the same message may start the flow again
        let reply = engine.step(&sessions, "conv", "my profile");
        assert_eq!(
            reply.as_deref(),
            Some("What would you like to do? (update info, reset password, delete account)")
        );
    }

    #[test]
    fn additional_flows_can_be_registered() {
        let mut engine = DecisionTreeEngine::new();
        let mut nodes = HashMap::new();
        nodes.insert(
            START_NODE.to_string(),
            FlowNode::with_children("Refund or invoice?", &[("refund", "refund")]),
        );
        nodes.insert(
            "refund".to_string(),
            FlowNode::terminal("Refunds take 5-7 business days"),
        );
        engine.register(FlowTopology {
            name: "billing".to_string(),
            entry: Regex::new("billing").unwrap(),
            nodes,
        });

        let sessions = store();
        let reply = engine.step(&sessions, "conv", "billing question");
        assert_eq!(reply.as_deref(), Some("Refund or invoice?"));
    }
}
