//! Intent resolution engine
//!
//! The decision core of the chat agent:
//! - Per-conversation session state with lazy expiry
//! - Guided-flow decision trees
//! - Priority-ordered keyword pattern rules
//! - Trained-corpus scoring and ranking
//! - Learning/escalation for unanswered questions
//! - The fixed-order resolution pipeline tying it all together

pub mod decision_tree;
pub mod learning;
pub mod patterns;
pub mod pipeline;
pub mod scorer;
pub mod session;

pub use decision_tree::{DecisionTreeEngine, FlowNode, FlowTopology, START_NODE};
pub use learning::LearningManager;
pub use pipeline::{HandledMessage, IntentPipeline, PipelineConfig};
pub use scorer::{CorpusMatch, CorpusScorer};
pub use session::{SessionStore, Topic, TreeCursor};
