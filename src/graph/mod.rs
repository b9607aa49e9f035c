//! The confidence-weighted knowledge graph.
//!
//! [`KnowledgeGraph`] owns the nodes in insertion order with a slug index on the side.
//! New knowledge goes through [`KnowledgeGraph::add_knowledge`], which inserts (or
//! merges into) a node and links it to lexically similar or same-category nodes.
//! Traversal lives in [`traverse`].

pub mod seed;
pub mod traverse;
pub mod types;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::GraphConfig;
use crate::error::{EngineError, EngineResult};
pub use types::{clamp_confidence, slugify, KnowledgeNode, RelationSet};

/// Result of an `add_knowledge` call.
#[derive(Debug, Clone, Serialize)]
pub struct AddKnowledgeResult {
    pub id: String,
    /// `true` if the slug already existed and facts/examples were merged into it.
    pub merged: bool,
    /// Number of other nodes this one was (newly) linked with.
    pub linked: usize,
}

#[derive(Debug, Clone)]
pub struct KnowledgeGraph {
    nodes: Vec<KnowledgeNode>,
    index: HashMap<String, usize>,
    initial_confidence: f64,
    relation_similarity: f64,
}

impl Default for KnowledgeGraph {
    fn default() -> Self {
        Self::new(&GraphConfig::default())
    }
}

impl KnowledgeGraph {
    pub fn new(config: &GraphConfig) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            initial_confidence: config.initial_confidence,
            relation_similarity: config.relation_similarity,
        }
    }

    /// A graph pre-populated with the built-in seed set.
    pub fn seeded(config: &GraphConfig) -> Self {
        let mut graph = Self::new(config);
        for item in seed::seed_knowledge() {
            if let Err(e) = graph.add_knowledge(&item.concept, &item.category, item.facts, item.examples) {
                tracing::warn!(error = %e, "skipping seed concept");
            }
        }
        graph
    }

    /// Rebuild a graph from previously exported nodes, keeping them as-is.
    pub fn from_nodes(config: &GraphConfig, nodes: Vec<KnowledgeNode>) -> Self {
        let mut graph = Self::new(config);
        for mut node in nodes {
            node.confidence = clamp_confidence(node.confidence);
            match graph.index.get(&node.id) {
                Some(&i) => graph.nodes[i] = node,
                None => {
                    graph.index.insert(node.id.clone(), graph.nodes.len());
                    graph.nodes.push(node);
                }
            }
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&KnowledgeNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Look a node up by concept text (via its slug).
    pub fn find_concept(&self, concept: &str) -> Option<&KnowledgeNode> {
        self.get(&slugify(concept))
    }

    pub fn nodes(&self) -> &[KnowledgeNode] {
        &self.nodes
    }

    /// Concept names in insertion order.
    pub fn all_concepts(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.concept.as_str()).collect()
    }

    pub(crate) fn nodes_mut(&mut self) -> std::slice::IterMut<'_, KnowledgeNode> {
        self.nodes.iter_mut()
    }

    /// Node count per category.
    pub fn categories(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for node in &self.nodes {
            *counts.entry(node.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Sum of relation-list lengths across all nodes (each link counted from both ends).
    pub fn relation_count(&self) -> usize {
        self.nodes.iter().map(|n| n.relations.len()).sum()
    }

    /// Insert a concept (confidence starts at the configured initial value) and link it.
    ///
    /// Adding an existing concept merges any new facts and examples into the node
    /// and leaves its confidence and relations alone.
    pub fn add_knowledge(
        &mut self,
        concept: &str,
        category: &str,
        facts: Vec<String>,
        examples: Vec<String>,
    ) -> EngineResult<AddKnowledgeResult> {
        let id = slugify(concept);
        if id.is_empty() {
            return Err(EngineError::InvalidKnowledge {
                concept: concept.to_string(),
                reason: "concept has no alphanumeric characters".into(),
            });
        }

        let merged = if let Some(&i) = self.index.get(&id) {
            let node = &mut self.nodes[i];
            merge_unique(&mut node.facts, facts);
            merge_unique(&mut node.examples, examples);
            node.touch();
            true
        } else {
            let node = KnowledgeNode::new(concept, category, facts, examples, self.initial_confidence);
            self.index.insert(id.clone(), self.nodes.len());
            self.nodes.push(node);
            false
        };

        let linked = self.update_relations(&id);
        tracing::debug!(id = %id, merged, linked, "knowledge added");

        Ok(AddKnowledgeResult { id, merged, linked })
    }

    /// Link node `id` with every other node that has a similar concept name or the same
    /// category. Links go both ways. Returns how many nodes gained a new link.
    pub fn update_relations(&mut self, id: &str) -> usize {
        let Some(&target) = self.index.get(id) else {
            return 0;
        };
        let concept = self.nodes[target].concept.clone();
        let category = self.nodes[target].category.clone();

        let mut partners: Vec<usize> = Vec::new();
        for (i, other) in self.nodes.iter().enumerate() {
            if i == target {
                continue;
            }
            let similar = word_overlap(&concept, &other.concept) > self.relation_similarity;
            if similar || other.category == category {
                partners.push(i);
            }
        }

        let mut linked = 0;
        for i in partners {
            let other_concept = self.nodes[i].concept.clone();
            let added_here = self.nodes[target].relations.insert(&other_concept);
            let added_there = self.nodes[i].relations.insert(&concept);
            if added_here || added_there {
                self.nodes[i].touch();
                linked += 1;
            }
        }
        if linked > 0 {
            self.nodes[target].touch();
        }
        linked
    }

    /// Lower-cased concept names of every node whose concept words appear in `query`.
    ///
    /// Words shorter than three characters are ignored so "a" or "of" never hit.
    pub fn extract_concepts(&self, query: &str) -> Vec<String> {
        let query = query.to_lowercase();
        let mut seen = HashSet::new();
        let mut concepts = Vec::new();

        for node in &self.nodes {
            let concept = node.concept.to_lowercase();
            let hit = query.contains(&concept)
                || concept
                    .split_whitespace()
                    .filter(|w| w.chars().count() >= 3)
                    .any(|w| query.contains(w));
            if hit && seen.insert(concept.clone()) {
                concepts.push(concept);
            }
        }
        concepts
    }
}

/// Jaccard similarity of the lower-cased whitespace tokens of two strings.
pub fn word_overlap(a: &str, b: &str) -> f64 {
    let a_words: HashSet<String> = a.split_whitespace().map(str::to_lowercase).collect();
    let b_words: HashSet<String> = b.split_whitespace().map(str::to_lowercase).collect();
    let union = a_words.union(&b_words).count();
    if union == 0 {
        return 0.0;
    }
    a_words.intersection(&b_words).count() as f64 / union as f64
}

fn merge_unique(into: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !into.contains(&item) {
            into.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> KnowledgeGraph {
        KnowledgeGraph::new(&GraphConfig::default())
    }

    fn add(graph: &mut KnowledgeGraph, concept: &str, category: &str) -> AddKnowledgeResult {
        graph
            .add_knowledge(concept, category, vec![format!("{concept} is a topic")], vec![])
            .unwrap()
    }

    #[test]
    fn add_creates_node_with_initial_confidence() {
        let mut g = graph();
        let result = add(&mut g, "Rust Programming", "programming");
        assert_eq!(result.id, "rust-programming");
        assert!(!result.merged);
        let node = g.get("rust-programming").unwrap();
        assert_eq!(node.confidence, 0.7);
        assert!(node.relations.is_empty());
    }

    #[test]
    fn same_category_links_both_ways() {
        let mut g = graph();
        add(&mut g, "Rust", "programming");
        let result = add(&mut g, "Python", "programming");
        assert_eq!(result.linked, 1);
        assert!(g.get("rust").unwrap().relations.contains("Python"));
        assert!(g.get("python").unwrap().relations.contains("Rust"));
    }

    #[test]
    fn similar_concepts_link_across_categories() {
        let mut g = graph();
        add(&mut g, "deep neural networks", "ai");
        // overlap: {deep, neural, networks} / {deep, neural, networks, models} = 0.75
        add(&mut g, "deep neural networks models", "research");
        assert!(g
            .get("deep-neural-networks")
            .unwrap()
            .relations
            .contains("deep neural networks models"));
    }

    #[test]
    fn dissimilar_concepts_stay_unlinked() {
        let mut g = graph();
        add(&mut g, "Gardening", "hobby");
        add(&mut g, "Databases", "programming");
        assert!(g.get("gardening").unwrap().relations.is_empty());
        assert!(g.get("databases").unwrap().relations.is_empty());
    }

    #[test]
    fn repeated_linking_does_not_duplicate_relations() {
        let mut g = graph();
        add(&mut g, "Rust", "programming");
        add(&mut g, "Python", "programming");
        assert_eq!(g.update_relations("rust"), 0);
        assert_eq!(g.update_relations("python"), 0);
        assert_eq!(g.get("rust").unwrap().relations.len(), 1);
    }

    #[test]
    fn re_adding_merges_facts() {
        let mut g = graph();
        g.add_knowledge("Rust", "programming", vec!["Rust is fast".into()], vec![])
            .unwrap();
        let result = g
            .add_knowledge(
                "rust",
                "programming",
                vec!["Rust is fast".into(), "Rust is safe".into()],
                vec!["ripgrep".into()],
            )
            .unwrap();
        assert!(result.merged);
        assert_eq!(g.len(), 1);
        let node = g.get("rust").unwrap();
        assert_eq!(node.facts, vec!["Rust is fast", "Rust is safe"]);
        assert_eq!(node.examples, vec!["ripgrep"]);
    }

    #[test]
    fn empty_concept_is_rejected() {
        let mut g = graph();
        let err = g.add_knowledge("  ?! ", "misc", vec![], vec![]).unwrap_err();
        assert!(err.to_string().contains("invalid knowledge"));
        assert!(g.is_empty());
    }

    #[test]
    fn word_overlap_is_jaccard() {
        assert_eq!(word_overlap("a b", "a b"), 1.0);
        assert_eq!(word_overlap("a b", "b c"), 1.0 / 3.0);
        assert_eq!(word_overlap("", ""), 0.0);
        assert_eq!(word_overlap("Rust", "rust"), 1.0);
    }

    #[test]
    fn extract_concepts_matches_words() {
        let mut g = graph();
        add(&mut g, "Machine Learning", "ai");
        add(&mut g, "Gardening", "hobby");
        let concepts = g.extract_concepts("How does learning from data work?");
        assert_eq!(concepts, vec!["machine learning"]);
        assert!(g.extract_concepts("nothing relevant here").is_empty());
    }

    #[test]
    fn seeded_graph_is_linked() {
        let g = KnowledgeGraph::seeded(&GraphConfig::default());
        assert!(g.len() >= 5);
        assert!(g.relation_count() > 0);
        assert!(g.nodes().iter().all(|n| (0.1..=1.0).contains(&n.confidence)));
    }

    #[test]
    fn from_nodes_clamps_and_indexes() {
        let mut node = KnowledgeNode::new("Rust", "programming", vec![], vec![], 0.5);
        node.confidence = 9.0;
        let g = KnowledgeGraph::from_nodes(&GraphConfig::default(), vec![node]);
        assert_eq!(g.find_concept("RUST").unwrap().confidence, 1.0);
    }
}
