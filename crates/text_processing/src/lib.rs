//! Lexical analysis for the chat agent
//!
//! Pure functions over static tables: keyword extraction, coarse sentiment,
//! and topical category detection. All word lists are loaded once at process
//! start and shared.

pub mod analyzer;
pub mod vocabulary;

pub use analyzer::{analyze, tokenize, AnalysisResult, Sentiment};
pub use vocabulary::{detect_categories, CATEGORY_VOCABULARY};
