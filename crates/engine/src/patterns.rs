//! Keyword pattern rules
//!
//! A fixed, priority-ordered rule table for common intents. Unlike the corpus
//! scorer this is not a scored match: rules are sorted by descending priority
//! once, then evaluated rule-by-rule, keyword-by-keyword, and the first hit
//! wins outright.
//!
//! The bare topic words for guided flows (account, profile) are deliberately
//! not rule keywords; those messages belong to the decision tree.

use once_cell::sync::Lazy;

struct PatternRule {
    keywords: &'static [&'static str],
    response: &'static str,
    priority: u8,
}

static PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        keywords: &["hello", "hi", "hey", "greetings"],
        response: "Hello there! How can I help you today?",
        priority: 1,
    },
    PatternRule {
        keywords: &["login", "signin", "register"],
        response: "For account help: go to Settings > Account or ask about login, password, or profile",
        priority: 3,
    },
    PatternRule {
        keywords: &["payment", "bill", "invoice", "refund", "charge"],
        response: "Payment support: visit Settings > Billing or ask about invoices, refunds, or charges",
        priority: 3,
    },
    PatternRule {
        keywords: &["thank", "thanks", "appreciate", "grateful"],
        response: "You're very welcome! Let me know if you need anything else.",
        priority: 1,
    },
    PatternRule {
        keywords: &["bug", "error", "crash", "glitch"],
        response: "Technical support: please describe your issue including device model and app version",
        priority: 4,
    },
];

/// Rules sorted once by descending priority; the sort is stable so equal
/// priorities keep their declaration order
static RULES_BY_PRIORITY: Lazy<Vec<&'static PatternRule>> = Lazy::new(|| {
    let mut rules: Vec<&PatternRule> = PATTERN_RULES.iter().collect();
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    rules
});

/// First rule whose keyword set intersects the input keywords
pub fn match_keywords(keywords: &[String]) -> Option<&'static str> {
    for rule in RULES_BY_PRIORITY.iter() {
        for keyword in keywords {
            if rule.keywords.contains(&keyword.as_str()) {
                tracing::debug!(keyword = %keyword, priority = rule.priority, "Keyword pattern matched");
                return Some(rule.response);
            }
        }
    }
    None
}
