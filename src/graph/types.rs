//! Knowledge node definitions.
//!
//! Defines [`KnowledgeNode`] (a concept with facts, examples and a confidence score),
//! [`RelationSet`] (the uniqueness-preserving list of related concept names) and the
//! helpers that keep ids and confidences well-formed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_CONFIDENCE: f64 = 0.1;
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Clamp a confidence into `[0.1, 1.0]`. NaN maps to the floor.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_CONFIDENCE;
    }
    value.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// Deterministic id for a concept: lower-case, runs of non-alphanumerics become `-`.
pub fn slugify(concept: &str) -> String {
    let mut slug = String::with_capacity(concept.len());
    let mut pending_dash = false;
    for c in concept.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Insertion-ordered set of related concept names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationSet(Vec<String>);

impl RelationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `concept` unless an equal name is already present. Returns whether it was added.
    pub fn insert(&mut self, concept: &str) -> bool {
        if self.contains(concept) {
            return false;
        }
        self.0.push(concept.to_string());
        true
    }

    pub fn contains(&self, concept: &str) -> bool {
        self.0.iter().any(|r| r == concept)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a RelationSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A concept in the knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeNode {
    /// Slug of `concept`, unique within a graph.
    pub id: String,
    pub concept: String,
    pub category: String,
    /// Concept names of related nodes (not ids).
    pub relations: RelationSet,
    pub facts: Vec<String>,
    pub examples: Vec<String>,
    /// Trust in this node, always within `[0.1, 1.0]`.
    pub confidence: f64,
    pub last_updated: DateTime<Utc>,
}

impl KnowledgeNode {
    pub fn new(
        concept: &str,
        category: &str,
        facts: Vec<String>,
        examples: Vec<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: slugify(concept),
            concept: concept.trim().to_string(),
            category: category.trim().to_string(),
            relations: RelationSet::new(),
            facts,
            examples,
            confidence: clamp_confidence(confidence),
            last_updated: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}
