//! Depth-bounded multi-hop traversal.
//!
//! Starting from each seed concept, collect every node whose concept or relations
//! mention it, then follow the collected nodes' relations one hop deeper. A visited
//! set per seed (keyed on the lower-cased concept) stops relation cycles.

use std::collections::HashSet;

use super::{KnowledgeGraph, KnowledgeNode};

pub const DEFAULT_MAX_DEPTH: usize = 3;

/// One collected node and the hop at which it was reached (seeds are hop 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalHit {
    pub index: usize,
    pub depth: usize,
}

impl KnowledgeGraph {
    /// Nodes reachable from `seeds` within `max_depth` hops.
    ///
    /// The same node may appear more than once when it is reached from different
    /// seeds or through different concepts.
    pub fn traverse_knowledge_graph(&self, seeds: &[String], max_depth: usize) -> Vec<KnowledgeNode> {
        self.traverse_hits(seeds, max_depth)
            .into_iter()
            .map(|hit| self.nodes[hit.index].clone())
            .collect()
    }

    pub fn traverse_hits(&self, seeds: &[String], max_depth: usize) -> Vec<TraversalHit> {
        let mut hits = Vec::new();
        for seed in seeds {
            let mut visited = HashSet::new();
            self.visit(seed, 0, max_depth, &mut visited, &mut hits);
        }
        hits
    }

    fn visit(
        &self,
        concept: &str,
        depth: usize,
        max_depth: usize,
        visited: &mut HashSet<String>,
        hits: &mut Vec<TraversalHit>,
    ) {
        if depth >= max_depth {
            return;
        }
        let key = concept.trim().to_lowercase();
        if key.is_empty() || !visited.insert(key.clone()) {
            return;
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let mentions = node.concept.to_lowercase().contains(&key)
                || node.relations.iter().any(|r| r.to_lowercase().contains(&key));
            if !mentions {
                continue;
            }
            hits.push(TraversalHit { index, depth });
            for relation in &node.relations {
                self.visit(relation, depth + 1, max_depth, visited, hits);
            }
        }
    }
}
