//! The engine: one object owning the matcher, the knowledge graph, and per-user
//! conversation contexts.
//!
//! The graph sits behind an `RwLock`, so every confidence read-modify-write happens
//! under the write lock. Contexts sit behind a `Mutex`. When both are needed the graph
//! lock is always taken first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::ParleyConfig;
use crate::error::{EngineError, EngineResult};
use crate::graph::{slugify, AddKnowledgeResult, KnowledgeGraph, KnowledgeNode};
use crate::learning::{self, LearningOutcome};
use crate::matcher::PatternMatcher;
use crate::reasoning::{compose, ConversationContext};
use crate::response::{EngineResponse, ResponseType};
use crate::training::{DomainKnowledge, TrainingConversation};

pub const SNAPSHOT_VERSION: u32 = 1;
/// User id for composed answers that were not tied to a caller.
pub const ANONYMOUS_USER: &str = "anonymous";
/// User id of the scratch context used while training.
const TRAINER_USER: &str = "auto-trainer";

/// What the auto-trainer needs from an engine.
pub trait ConversationEngine: Send + Sync {
    /// Lightweight intent response from the pattern matcher.
    fn match_input(&self, text: &str) -> EngineResponse;

    /// Learn from every conversation in `batch`. Returns how many were learned from.
    ///
    /// A malformed record fails the whole batch before anything is applied.
    fn train_batch(&self, batch: &[TrainingConversation]) -> EngineResult<usize>;

    /// Add mined knowledge under `domain`. Returns the number of new nodes created.
    fn add_domain_knowledge(&self, domain: &str, items: &[DomainKnowledge]) -> EngineResult<usize>;

    fn metrics(&self) -> EngineMetrics;
}

/// Engine statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineMetrics {
    pub knowledge_nodes: usize,
    pub relations: usize,
    pub average_confidence: f64,
    pub by_category: BTreeMap<String, usize>,
    pub intents: usize,
    pub patterns: usize,
    pub active_contexts: usize,
    pub total_turns: usize,
    pub rated_turns: usize,
    pub queries_answered: u64,
    pub feedback_events: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Serializable copy of the engine's mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub nodes: Vec<KnowledgeNode>,
    #[serde(default)]
    pub contexts: Vec<ConversationContext>,
    #[serde(default)]
    pub queries_answered: u64,
    #[serde(default)]
    pub feedback_events: u64,
}

pub struct Engine {
    config: ParleyConfig,
    matcher: PatternMatcher,
    graph: RwLock<KnowledgeGraph>,
    contexts: Mutex<HashMap<String, ConversationContext>>,
    seeded: bool,
    queries_answered: AtomicU64,
    feedback_events: AtomicU64,
}

impl Engine {
    /// Engine with the default intent library and the built-in seed graph.
    pub fn new(config: ParleyConfig) -> Self {
        Self::build(config, true)
    }

    /// Engine with the default intent library and an empty graph.
    pub fn empty(config: ParleyConfig) -> Self {
        Self::build(config, false)
    }

    pub fn with_defaults() -> Self {
        Self::new(ParleyConfig::default())
    }

    fn build(config: ParleyConfig, seeded: bool) -> Self {
        let matcher = PatternMatcher::with_default_library(&config.matcher);
        let graph = Self::initial_graph(&config, seeded);
        tracing::debug!(nodes = graph.len(), intents = matcher.library().len(), "engine ready");
        Self {
            config,
            matcher,
            graph: RwLock::new(graph),
            contexts: Mutex::new(HashMap::new()),
            seeded,
            queries_answered: AtomicU64::new(0),
            feedback_events: AtomicU64::new(0),
        }
    }

    fn initial_graph(config: &ParleyConfig, seeded: bool) -> KnowledgeGraph {
        if seeded {
            KnowledgeGraph::seeded(&config.graph)
        } else {
            KnowledgeGraph::new(&config.graph)
        }
    }

    pub fn config(&self) -> &ParleyConfig {
        &self.config
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    /// Answer an utterance.
    ///
    /// A direct intent match wins. Otherwise, if the utterance mentions anything the
    /// graph knows about, a composed answer is returned. Failing both, the matcher's
    /// hedged or help reply is returned as-is.
    pub fn respond(&self, utterance: &str, user_id: Option<&str>) -> EngineResult<EngineResponse> {
        self.queries_answered.fetch_add(1, Ordering::Relaxed);

        let matched = self.matcher.respond(utterance);
        if matched.response_type == ResponseType::Text || utterance.trim().is_empty() {
            self.record_matched_turn(utterance, &matched, user_id)?;
            return Ok(matched);
        }

        let knows_about = !self.read_graph()?.extract_concepts(utterance).is_empty();
        if knows_about {
            return self.compose_response(utterance, user_id);
        }

        self.record_matched_turn(utterance, &matched, user_id)?;
        Ok(matched)
    }

    /// Graph-backed answer for a complex query. The turn lands in the caller's context.
    pub fn compose_response(&self, query: &str, user_id: Option<&str>) -> EngineResult<EngineResponse> {
        let graph = self.read_graph()?;
        let max_depth = self.config.graph.max_depth;

        let composed = match user_id {
            Some(user) => {
                let mut contexts = self.lock_contexts()?;
                let context = contexts
                    .entry(user.to_string())
                    .or_insert_with(|| ConversationContext::new(user));
                compose(&graph, query, context, max_depth)
            }
            None => compose(&graph, query, &mut ConversationContext::new(ANONYMOUS_USER), max_depth),
        };

        tracing::debug!(
            style = %composed.classification.style,
            concepts = composed.concepts.len(),
            matched_nodes = composed.matched_nodes,
            confidence = composed.response.confidence,
            "composed response"
        );
        Ok(composed.response)
    }

    /// Apply user feedback for a past exchange.
    pub fn learn_from_interaction(
        &self,
        user_id: &str,
        query: &str,
        response: &str,
        feedback: f64,
    ) -> EngineResult<LearningOutcome> {
        let mut graph = self.write_graph()?;
        let mut contexts = self.lock_contexts()?;
        let context = contexts
            .entry(user_id.to_string())
            .or_insert_with(|| ConversationContext::new(user_id));

        let outcome = learning::learn_from_interaction(
            &mut graph,
            query,
            response,
            feedback,
            context,
            self.config.graph.learning_rate,
        );
        self.feedback_events.fetch_add(1, Ordering::Relaxed);
        Ok(outcome)
    }

    pub fn add_knowledge(
        &self,
        concept: &str,
        category: &str,
        facts: Vec<String>,
        examples: Vec<String>,
    ) -> EngineResult<AddKnowledgeResult> {
        self.write_graph()?.add_knowledge(concept, category, facts, examples)
    }

    /// Nodes reachable from `seeds`, bounded by `max_depth` (the configured depth if `None`).
    pub fn traverse(&self, seeds: &[String], max_depth: Option<usize>) -> EngineResult<Vec<KnowledgeNode>> {
        let depth = max_depth.unwrap_or(self.config.graph.max_depth);
        Ok(self.read_graph()?.traverse_knowledge_graph(seeds, depth))
    }

    /// Copy of the node for `concept`, if the graph has one.
    pub fn node(&self, concept: &str) -> EngineResult<Option<KnowledgeNode>> {
        Ok(self.read_graph()?.find_concept(concept).cloned())
    }

    /// Copy of a user's context, if they have talked to the engine.
    pub fn context(&self, user_id: &str) -> EngineResult<Option<ConversationContext>> {
        Ok(self.lock_contexts()?.get(user_id).cloned())
    }

    pub fn snapshot(&self) -> EngineResult<EngineSnapshot> {
        let graph = self.read_graph()?;
        let contexts = self.lock_contexts()?;
        let mut contexts: Vec<ConversationContext> = contexts.values().cloned().collect();
        contexts.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        Ok(EngineSnapshot {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            nodes: graph.nodes().to_vec(),
            contexts,
            queries_answered: self.queries_answered.load(Ordering::Relaxed),
            feedback_events: self.feedback_events.load(Ordering::Relaxed),
        })
    }

    /// Replace all mutable state with `snapshot`.
    pub fn restore(&self, snapshot: EngineSnapshot) -> EngineResult<()> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(EngineError::UnsupportedSnapshot {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        let mut graph = self.write_graph()?;
        let mut contexts = self.lock_contexts()?;

        *graph = KnowledgeGraph::from_nodes(&self.config.graph, snapshot.nodes);
        *contexts = snapshot
            .contexts
            .into_iter()
            .map(|c| (c.user_id.clone(), c))
            .collect();
        self.queries_answered.store(snapshot.queries_answered, Ordering::Relaxed);
        self.feedback_events.store(snapshot.feedback_events, Ordering::Relaxed);

        tracing::info!(nodes = graph.len(), contexts = contexts.len(), "engine restored");
        Ok(())
    }

    /// Back to the state the engine was constructed in.
    pub fn reset(&self) -> EngineResult<()> {
        let mut graph = self.write_graph()?;
        let mut contexts = self.lock_contexts()?;
        *graph = Self::initial_graph(&self.config, self.seeded);
        contexts.clear();
        self.queries_answered.store(0, Ordering::Relaxed);
        self.feedback_events.store(0, Ordering::Relaxed);
        tracing::info!(nodes = graph.len(), "engine reset");
        Ok(())
    }

    fn record_matched_turn(
        &self,
        utterance: &str,
        response: &EngineResponse,
        user_id: Option<&str>,
    ) -> EngineResult<()> {
        if let Some(user) = user_id {
            self.lock_contexts()?
                .entry(user.to_string())
                .or_insert_with(|| ConversationContext::new(user))
                .record_turn(utterance, &response.text);
        }
        Ok(())
    }

    fn read_graph(&self) -> EngineResult<RwLockReadGuard<'_, KnowledgeGraph>> {
        self.graph
            .read()
            .map_err(|e| EngineError::LockPoisoned(e.to_string()))
    }

    fn write_graph(&self) -> EngineResult<RwLockWriteGuard<'_, KnowledgeGraph>> {
        self.graph
            .write()
            .map_err(|e| EngineError::LockPoisoned(e.to_string()))
    }

    fn lock_contexts(&self) -> EngineResult<MutexGuard<'_, HashMap<String, ConversationContext>>> {
        self.contexts
            .lock()
            .map_err(|e| EngineError::LockPoisoned(e.to_string()))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ConversationEngine for Engine {
    fn match_input(&self, text: &str) -> EngineResponse {
        self.matcher.respond(text)
    }

    fn train_batch(&self, batch: &[TrainingConversation]) -> EngineResult<usize> {
        for (index, conversation) in batch.iter().enumerate() {
            conversation
                .validate()
                .map_err(|reason| EngineError::MalformedConversation { index, reason })?;
        }

        let mut graph = self.write_graph()?;
        let mut scratch = ConversationContext::new(TRAINER_USER);
        let mut nodes_updated = 0;
        for conversation in batch {
            let outcome = learning::learn_from_interaction(
                &mut graph,
                &conversation.query,
                &conversation.response,
                conversation.feedback(),
                &mut scratch,
                self.config.graph.learning_rate,
            );
            nodes_updated += outcome.nodes_updated;
        }
        tracing::debug!(conversations = batch.len(), nodes_updated, "batch applied");
        Ok(batch.len())
    }

    fn add_domain_knowledge(&self, domain: &str, items: &[DomainKnowledge]) -> EngineResult<usize> {
        for item in items {
            if slugify(&item.concept).is_empty() {
                return Err(EngineError::InvalidKnowledge {
                    concept: item.concept.clone(),
                    reason: "concept has no alphanumeric characters".into(),
                });
            }
            if item.facts.is_empty() {
                return Err(EngineError::InvalidKnowledge {
                    concept: item.concept.clone(),
                    reason: "no facts".into(),
                });
            }
        }

        let mut graph = self.write_graph()?;
        let mut created = 0;
        for item in items {
            let result =
                graph.add_knowledge(&item.concept, domain, item.facts.clone(), item.examples.clone())?;
            if !result.merged {
                created += 1;
            }
        }
        tracing::info!(domain, items = items.len(), created, "domain knowledge applied");
        Ok(created)
    }

    fn metrics(&self) -> EngineMetrics {
        let graph = self.graph.read().unwrap_or_else(PoisonError::into_inner);
        let contexts = self.contexts.lock().unwrap_or_else(PoisonError::into_inner);

        let nodes = graph.nodes();
        let average_confidence = if nodes.is_empty() {
            0.0
        } else {
            nodes.iter().map(|n| n.confidence).sum::<f64>() / nodes.len() as f64
        };
        let history = contexts.values().flat_map(|c| c.history.iter());

        EngineMetrics {
            knowledge_nodes: graph.len(),
            relations: graph.relation_count(),
            average_confidence,
            by_category: graph.categories(),
            intents: self.matcher.library().len(),
            patterns: self.matcher.pattern_count(),
            active_contexts: contexts.len(),
            total_turns: history.clone().count(),
            rated_turns: history.filter(|h| h.satisfaction.is_some()).count(),
            queries_answered: self.queries_answered.load(Ordering::Relaxed),
            feedback_events: self.feedback_events.load(Ordering::Relaxed),
            last_updated: nodes.iter().map(|n| n.last_updated).max(),
        }
    }
}
