//! Composes graph-backed answers for complex queries.
//!
//! Pipeline: mood → tone → concept extraction → traversal → factual excerpts →
//! follow-ups → response kind → complexity → confidence. The finished turn is
//! appended to the caller's [`ConversationContext`].

use std::collections::HashSet;

use super::classifier::{classify, Classification};
use super::context::{detect_mood, tone_prefix, ConversationContext, ResponseLength};
use crate::graph::{KnowledgeGraph, KnowledgeNode};
use crate::matcher::tokenize;
use crate::response::{Complexity, EngineResponse, ResponseType};

/// Nodes quoted in the answer body.
pub const MAX_FACT_NODES: usize = 3;
pub const MAX_FOLLOW_UPS: usize = 3;

const FOLLOW_UP_TEMPLATES: [&str; 3] = [
    "Would you like to know more about {}?",
    "How does {} relate to what you're working on?",
    "Should I explain how {} is used in practice?",
];

const NO_KNOWLEDGE: &str =
    "I don't have much on that yet. Could you tell me more about what you're looking for?";

#[derive(Debug, Clone)]
pub struct ComposedResponse {
    pub response: EngineResponse,
    pub classification: Classification,
    pub concepts: Vec<String>,
    /// Distinct nodes reached by traversal.
    pub matched_nodes: usize,
}

pub fn compose(
    graph: &KnowledgeGraph,
    query: &str,
    context: &mut ConversationContext,
    max_depth: usize,
) -> ComposedResponse {
    if let Some(mood) = detect_mood(query) {
        context.current_mood = mood.to_string();
    }
    let tone = tone_prefix(context.user_preferences.communication_style, &context.current_mood);

    let classification = classify(query);
    let concepts = graph.extract_concepts(query);
    let matched = rank_matches(graph.traverse_knowledge_graph(&concepts, max_depth), &concepts);
    let top: Vec<&KnowledgeNode> = matched.iter().take(MAX_FACT_NODES).collect();

    let mut text = String::from(tone);
    if top.is_empty() {
        text.push(' ');
        text.push_str(NO_KNOWLEDGE);
    } else {
        for node in &top {
            text.push_str("\n\n");
            text.push_str(&excerpt(node));
        }
        if context.user_preferences.response_length != ResponseLength::Brief {
            let related = related_concepts(&top);
            if !related.is_empty() {
                text.push_str(&format!("\n\nRelated topics: {}.", related.join(", ")));
            }
        }
    }

    let follow_up: Vec<String> = concepts
        .iter()
        .take(MAX_FOLLOW_UPS)
        .enumerate()
        .map(|(i, c)| FOLLOW_UP_TEMPLATES[i % FOLLOW_UP_TEMPLATES.len()].replace("{}", c))
        .collect();

    let kind = response_kind(query);

    let mut steps = vec![format!(
        "Recognized {} reasoning (confidence {:.2})",
        classification.style, classification.confidence
    )];
    if !concepts.is_empty() {
        steps.push(format!("Identified concepts: {}", concepts.join(", ")));
    }
    for node in &top {
        steps.push(format!(
            "Drew on {} ({}, confidence {:.2})",
            node.concept, node.category, node.confidence
        ));
    }
    steps.push(format!("Composed a {kind} response"));

    let word_count = query.split_whitespace().count();
    let complexity = complexity_grade(concepts.len(), matched.len(), word_count);
    let confidence = overall_confidence(&concepts, &matched, steps.len());

    context.record_turn(query, &text);

    let mut response = EngineResponse::new(text, kind, confidence);
    response.reasoning = Some(steps);
    response.follow_up = Some(follow_up);
    response.complexity = Some(complexity);
    response.sources = Some(top.iter().map(|n| n.concept.clone()).collect());

    ComposedResponse {
        response,
        classification,
        matched_nodes: matched.len(),
        concepts,
    }
}

/// Characteristic verbs decide the kind of answer; checked in this order.
pub fn response_kind(query: &str) -> ResponseType {
    let lower = query.to_lowercase();
    let tokens = tokenize(query);
    let has_word = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));

    if has_word(&["why", "how", "explain"]) {
        ResponseType::Reasoning
    } else if lower.contains("what is") || lower.contains("what are") || has_word(&["define", "definition"]) {
        ResponseType::Factual
    } else if has_word(&["create", "imagine", "design", "write"]) {
        ResponseType::Creative
    } else if has_word(&["analyze", "analyse", "compare", "evaluate"]) {
        ResponseType::Analytical
    } else {
        ResponseType::Conversational
    }
}

/// `0.3·concepts + 0.4·matched nodes + 0.1·query words`, bucketed.
pub fn complexity_grade(concepts: usize, matched_nodes: usize, query_words: usize) -> Complexity {
    let score = 0.3 * concepts as f64 + 0.4 * matched_nodes as f64 + 0.1 * query_words as f64;
    Complexity::from_score(score)
}

/// `0.4·coverage + 0.4·mean node confidence + 0.2·min(steps / 5, 1)`.
pub fn overall_confidence(concepts: &[String], matched: &[KnowledgeNode], steps: usize) -> f64 {
    let coverage = if concepts.is_empty() {
        0.5
    } else {
        (matched.len() as f64 / concepts.len() as f64).min(1.0)
    };
    let avg_confidence = if matched.is_empty() {
        0.0
    } else {
        matched.iter().map(|n| n.confidence).sum::<f64>() / matched.len() as f64
    };
    let depth = (steps as f64 / 5.0).min(1.0);
    0.4 * coverage + 0.4 * avg_confidence + 0.2 * depth
}

fn excerpt(node: &KnowledgeNode) -> String {
    let mut out = format!("**{}**", node.concept);
    if let Some(fact) = node.facts.first() {
        out.push_str(": ");
        out.push_str(fact);
    }
    if let Some(example) = node.examples.first() {
        out.push_str(&format!(" For example: {example}."));
    }
    out
}

fn related_concepts(top: &[&KnowledgeNode]) -> Vec<String> {
    let quoted: HashSet<&str> = top.iter().map(|n| n.concept.as_str()).collect();
    let mut seen = HashSet::new();
    top.iter()
        .flat_map(|n| n.relations.iter())
        .filter(|r| !quoted.contains(r.as_str()) && seen.insert(r.as_str()))
        .take(5)
        .cloned()
        .collect()
}

/// Drop repeated nodes (first occurrence wins), then order by confidence, highest first.
/// On equal confidence, nodes named by the query come before ones reached through relations.
fn rank_matches(nodes: Vec<KnowledgeNode>, concepts: &[String]) -> Vec<KnowledgeNode> {
    let mut seen = HashSet::new();
    let mut distinct: Vec<KnowledgeNode> =
        nodes.into_iter().filter(|n| seen.insert(n.id.clone())).collect();
    let named = |node: &KnowledgeNode| {
        let concept = node.concept.to_lowercase();
        concepts.iter().any(|c| concept.contains(c.as_str()))
    };
    distinct.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| named(b).cmp(&named(a)))
    });
    distinct
}
