//! Heuristic mining of domain knowledge from conversation text.
//!
//! Concepts come from the query, facts and examples from the response. The rules are
//! deliberately simple: long non-stop-word tokens for concepts, short declarative
//! lines for facts, and "such as:"-style lead-ins for examples.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::types::{DomainKnowledge, TrainingConversation};
use crate::matcher::tokenize;

pub const MAX_CONCEPTS: usize = 2;
pub const MAX_FACTS: usize = 5;
pub const MAX_EXAMPLES: usize = 3;
const MIN_FACT_CHARS: usize = 10;
const MAX_FACT_CHARS: usize = 200;

const STOP_WORDS: &[&str] = &[
    "which", "where", "whose", "would", "could", "should", "might", "shall", "about", "there",
    "their", "these", "those", "explain", "please", "really", "think", "anything", "something",
];

static BULLET_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n|[•●▪]").unwrap());
static LEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*+]\s+|\d+[.)]\s+)").unwrap());
static STATIVE_VERB: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:is|are|can|will)\b").unwrap());
static EXAMPLE_LEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:examples?|such as|like|including):\s*([^\n.]{5,99})").unwrap()
});

/// First two tokens longer than four characters that are not stop words, capitalized.
pub fn extract_concepts(query: &str) -> Vec<String> {
    tokenize(query)
        .into_iter()
        .filter(|t| t.chars().count() > 4 && !STOP_WORDS.contains(&t.as_str()))
        .take(MAX_CONCEPTS)
        .map(|t| capitalize(&t))
        .collect()
}

/// Declarative lines (10–200 chars, not questions or headers, with is/are/can/will).
pub fn extract_facts(response: &str) -> Vec<String> {
    BULLET_SPLIT
        .split(response)
        .map(|line| LEADING_MARKER.replace(line.trim(), "").trim().to_string())
        .filter(|line| {
            let len = line.chars().count();
            (MIN_FACT_CHARS..=MAX_FACT_CHARS).contains(&len)
                && !line.contains('?')
                && !is_header(line)
                && STATIVE_VERB.is_match(line)
        })
        .take(MAX_FACTS)
        .collect()
}

/// Text following "example(s):", "such as:", "like:" or "including:".
pub fn extract_examples(response: &str) -> Vec<String> {
    EXAMPLE_LEAD
        .captures_iter(response)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|e| e.chars().count() >= 5)
        .take(MAX_EXAMPLES)
        .collect()
}

/// Group mined knowledge by category. Concepts with no facts are dropped.
pub fn mine_domain_knowledge(
    conversations: &[TrainingConversation],
) -> BTreeMap<String, Vec<DomainKnowledge>> {
    let mut by_category: BTreeMap<String, Vec<DomainKnowledge>> = BTreeMap::new();

    for conversation in conversations {
        let facts = extract_facts(&conversation.response);
        if facts.is_empty() {
            tracing::trace!(query = %conversation.query, "no facts mined, skipping");
            continue;
        }
        let examples = extract_examples(&conversation.response);
        let items = by_category.entry(conversation.category.clone()).or_default();
        for concept in extract_concepts(&conversation.query) {
            items.push(DomainKnowledge {
                concept,
                facts: facts.clone(),
                examples: examples.clone(),
            });
        }
    }

    by_category.retain(|_, items| !items.is_empty());
    by_category
}

fn is_header(line: &str) -> bool {
    line.starts_with('#') || (line.starts_with("**") && line.ends_with("**"))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Complexity;

    #[test]
    fn concepts_skip_short_and_stop_words() {
        assert_eq!(
            extract_concepts("Could you explain ownership and borrowing in Rust?"),
            vec!["Ownership", "Borrowing"]
        );
        assert!(extract_concepts("what is it?").is_empty());
    }

    #[test]
    fn facts_filter_lines() {
        let response = "**Overview**\n\
                        - Ownership is Rust's memory model.\n\
                        Why does it matter?\n\
                        short one\n\
                        • Borrowing can be shared or mutable.\n\
                        1. The compiler will reject dangling references.\n\
                        This line has no stative verb at all.";
        assert_eq!(
            extract_facts(response),
            vec![
                "Ownership is Rust's memory model.",
                "Borrowing can be shared or mutable.",
                "The compiler will reject dangling references.",
            ]
        );
    }

    #[test]
    fn facts_are_capped() {
        let response = (0..10)
            .map(|i| format!("Fact number {i} is true."))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(extract_facts(&response).len(), MAX_FACTS);
    }

    #[test]
    fn overly_long_lines_are_not_facts() {
        let long = format!("This is {}", "x".repeat(250));
        assert!(extract_facts(&long).is_empty());
    }

    #[test]
    fn examples_follow_lead_ins() {
        let response = "Popular crates, such as: serde and tokio. \
                        Examples: ripgrep, fd\nTools like: cargo-watch";
        assert_eq!(
            extract_examples(response),
            vec!["serde and tokio", "ripgrep, fd", "cargo-watch"]
        );
        assert!(extract_examples("such as: ab").is_empty());
    }

    #[test]
    fn mining_groups_and_skips_factless() {
        let conversations = vec![
            TrainingConversation {
                query: "Explain ownership semantics".into(),
                response: "Ownership is how Rust manages memory.\nExample: moving a String".into(),
                rating: 5,
                category: "rust".into(),
                complexity: Complexity::Moderate,
                tags: vec![],
            },
            TrainingConversation {
                query: "Tell me about gardens".into(),
                response: "Hmm, not sure.".into(),
                rating: 4,
                category: "hobby".into(),
                complexity: Complexity::Simple,
                tags: vec![],
            },
        ];
        let mined = mine_domain_knowledge(&conversations);
        assert_eq!(mined.len(), 1);
        let rust = &mined["rust"];
        assert_eq!(rust.len(), 2);
        assert_eq!(rust[0].concept, "Ownership");
        assert_eq!(rust[1].concept, "Semantics");
        assert_eq!(rust[0].facts, vec!["Ownership is how Rust manages memory."]);
        assert_eq!(rust[0].examples, vec!["moving a String"]);
    }
}
