//! Feedback-driven learning.
//!
//! A feedback score in `[0, 1]` nudges the confidence of every node the query talks
//! about by `learning_rate × (feedback − 0.5)` and adapts the user's preferences.
//! Confidence is clamped to `[0.1, 1.0]` on every update so a node can always recover.

use serde::Serialize;

use crate::graph::{clamp_confidence, KnowledgeGraph};
use crate::reasoning::context::{
    CommunicationStyle, ConversationContext, ResponseLength, UserPreferences,
};

pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
/// Feedback above this asks for more detail.
pub const POSITIVE_FEEDBACK: f64 = 0.7;
/// Feedback below this flips formal/casual.
pub const NEGATIVE_FEEDBACK: f64 = 0.3;

#[derive(Debug, Clone, Serialize)]
pub struct LearningOutcome {
    pub concepts: Vec<String>,
    pub nodes_updated: usize,
    pub preferences_changed: bool,
}

/// Apply one round of feedback for `query` to the graph and to `context`.
pub fn learn_from_interaction(
    graph: &mut KnowledgeGraph,
    query: &str,
    response: &str,
    feedback: f64,
    context: &mut ConversationContext,
    learning_rate: f64,
) -> LearningOutcome {
    let feedback = if feedback.is_nan() { 0.5 } else { feedback.clamp(0.0, 1.0) };
    let concepts = graph.extract_concepts(query);
    let nodes_updated = adjust_confidence(graph, &concepts, feedback, learning_rate);
    let preferences_changed = adapt_preferences(&mut context.user_preferences, feedback);

    if !context.rate_turn(query, feedback) {
        context.record_turn(query, response);
        context.rate_turn(query, feedback);
    }

    tracing::debug!(
        concepts = concepts.len(),
        nodes_updated,
        feedback,
        "learned from interaction"
    );

    LearningOutcome {
        concepts,
        nodes_updated,
        preferences_changed,
    }
}

/// Shift confidence of every node whose concept contains one of `concepts`.
///
/// Returns the number of nodes touched. Each node is adjusted at most once per call.
pub fn adjust_confidence(
    graph: &mut KnowledgeGraph,
    concepts: &[String],
    feedback: f64,
    learning_rate: f64,
) -> usize {
    if concepts.is_empty() {
        return 0;
    }
    let delta = learning_rate * (feedback - 0.5);
    let mut updated = 0;
    for node in graph.nodes_mut() {
        let concept = node.concept.to_lowercase();
        if concepts.iter().any(|c| concept.contains(c.as_str())) {
            node.confidence = clamp_confidence(node.confidence + delta);
            node.touch();
            updated += 1;
        }
    }
    updated
}

/// Strong praise asks for detail; strong criticism flips formal/casual.
pub fn adapt_preferences(preferences: &mut UserPreferences, feedback: f64) -> bool {
    if feedback > POSITIVE_FEEDBACK {
        let changed = preferences.response_length != ResponseLength::Detailed;
        preferences.response_length = ResponseLength::Detailed;
        changed
    } else if feedback < NEGATIVE_FEEDBACK {
        preferences.communication_style = match preferences.communication_style {
            CommunicationStyle::Formal => CommunicationStyle::Casual,
            _ => CommunicationStyle::Formal,
        };
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;

    fn graph() -> KnowledgeGraph {
        let mut g = KnowledgeGraph::new(&GraphConfig::default());
        g.add_knowledge("Rust Programming", "programming", vec!["Rust is fast.".into()], vec![])
            .unwrap();
        g.add_knowledge("Gardening", "hobby", vec!["Gardening is calm.".into()], vec![])
            .unwrap();
        g
    }

    fn confidence(g: &KnowledgeGraph, id: &str) -> f64 {
        g.get(id).unwrap().confidence
    }

    #[test]
    fn positive_feedback_raises_matching_nodes_only() {
        let mut g = graph();
        let mut ctx = ConversationContext::new("u");
        let out = learn_from_interaction(&mut g, "tell me about rust", "..", 1.0, &mut ctx, 0.1);
        assert_eq!(out.nodes_updated, 1);
        assert!((confidence(&g, "rust-programming") - 0.75).abs() < 1e-9);
        assert_eq!(confidence(&g, "gardening"), 0.7);
    }

    #[test]
    fn repeated_praise_is_monotone_and_capped() {
        let mut g = graph();
        let mut ctx = ConversationContext::new("u");
        let mut last = confidence(&g, "rust-programming");
        for _ in 0..50 {
            learn_from_interaction(&mut g, "rust", "..", 1.0, &mut ctx, 0.1);
            let now = confidence(&g, "rust-programming");
            assert!(now >= last);
            assert!(now <= 1.0);
            last = now;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn any_feedback_sequence_stays_in_range() {
        let mut g = graph();
        let mut ctx = ConversationContext::new("u");
        let feedback = [0.0, 0.0, 1.0, -4.0, 9.0, 0.5, f64::NAN, 0.0, 0.2, 0.9];
        for _ in 0..20 {
            for f in feedback {
                learn_from_interaction(&mut g, "rust gardening", "..", f, &mut ctx, 0.5);
                for node in g.nodes() {
                    assert!((0.1..=1.0).contains(&node.confidence), "{}", node.confidence);
                }
            }
        }
    }

    #[test]
    fn harsh_feedback_stops_at_floor() {
        let mut g = graph();
        let mut ctx = ConversationContext::new("u");
        for _ in 0..100 {
            learn_from_interaction(&mut g, "gardening", "..", 0.0, &mut ctx, 0.1);
        }
        assert_eq!(confidence(&g, "gardening"), 0.1);
        // and it can climb back
        learn_from_interaction(&mut g, "gardening", "..", 1.0, &mut ctx, 0.1);
        assert!(confidence(&g, "gardening") > 0.1);
    }

    #[test]
    fn preferences_adapt() {
        let mut prefs = UserPreferences::default();
        assert!(adapt_preferences(&mut prefs, 0.9));
        assert_eq!(prefs.response_length, ResponseLength::Detailed);
        assert!(!adapt_preferences(&mut prefs, 0.9));

        // friendly → formal → casual → formal
        assert!(adapt_preferences(&mut prefs, 0.1));
        assert_eq!(prefs.communication_style, CommunicationStyle::Formal);
        adapt_preferences(&mut prefs, 0.1);
        assert_eq!(prefs.communication_style, CommunicationStyle::Casual);
        adapt_preferences(&mut prefs, 0.1);
        assert_eq!(prefs.communication_style, CommunicationStyle::Formal);

        assert!(!adapt_preferences(&mut prefs, 0.5));
    }

    #[test]
    fn feedback_is_recorded_on_history() {
        let mut g = graph();
        let mut ctx = ConversationContext::new("u");
        ctx.record_turn("rust?", "Rust is fast.");
        learn_from_interaction(&mut g, "rust?", "Rust is fast.", 0.8, &mut ctx, 0.1);
        assert_eq!(ctx.history.len(), 1);
        assert_eq!(ctx.history[0].satisfaction, Some(0.8));

        learn_from_interaction(&mut g, "unseen", "reply", 0.4, &mut ctx, 0.1);
        assert_eq!(ctx.history.len(), 2);
        assert_eq!(ctx.history[1].satisfaction, Some(0.4));
    }
}
