#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parley::config::ParleyConfig;
use parley::engine::{ConversationEngine, Engine, EngineMetrics};
use parley::error::{EngineError, EngineResult};
use parley::response::{Complexity, EngineResponse};
use parley::training::{AutoTrainerConfig, DomainKnowledge, TrainingConversation};

/// Engine over the built-in seed graph with default settings.
pub fn seeded_engine() -> Engine {
    Engine::new(ParleyConfig::default())
}

/// Engine with no knowledge at all.
pub fn empty_engine() -> Engine {
    Engine::empty(ParleyConfig::default())
}

/// Trainer config with no delay between batches.
pub fn fast_trainer(batch_size: usize) -> AutoTrainerConfig {
    AutoTrainerConfig {
        batch_size,
        delay_between_batches: Duration::ZERO,
        minimum_rating: 1,
        ..AutoTrainerConfig::default()
    }
}

pub fn conversation(
    query: &str,
    response: &str,
    rating: u8,
    category: &str,
    complexity: Complexity,
) -> TrainingConversation {
    TrainingConversation {
        query: query.to_string(),
        response: response.to_string(),
        rating,
        category: category.to_string(),
        complexity,
        tags: Vec::new(),
    }
}

/// `n` well-formed, 5-star conversations about ownership in `category`.
pub fn ownership_conversations(n: usize, category: &str) -> Vec<TrainingConversation> {
    (0..n)
        .map(|i| {
            conversation(
                &format!("Question {i} about ownership"),
                "Ownership is how Rust manages memory.\nExamples: moving a String into a function",
                5,
                category,
                Complexity::Moderate,
            )
        })
        .collect()
}

/// Delegates to a real engine but fails the `fail_on`-th call (0-based) to `train_batch`,
/// or every `add_domain_knowledge` call for `fail_domain`.
pub struct FlakyEngine {
    pub inner: Engine,
    fail_on: Option<usize>,
    fail_domain: Option<String>,
    calls: AtomicUsize,
}

impl FlakyEngine {
    pub fn new(inner: Engine, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on: Some(fail_on),
            fail_domain: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_domain(inner: Engine, domain: &str) -> Self {
        Self {
            inner,
            fail_on: None,
            fail_domain: Some(domain.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConversationEngine for FlakyEngine {
    fn match_input(&self, text: &str) -> EngineResponse {
        self.inner.match_input(text)
    }

    fn train_batch(&self, batch: &[TrainingConversation]) -> EngineResult<usize> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if Some(call) == self.fail_on {
            return Err(EngineError::MalformedConversation {
                index: 0,
                reason: "injected failure".into(),
            });
        }
        self.inner.train_batch(batch)
    }

    fn add_domain_knowledge(&self, domain: &str, items: &[DomainKnowledge]) -> EngineResult<usize> {
        if self.fail_domain.as_deref() == Some(domain) {
            return Err(EngineError::InvalidKnowledge {
                concept: domain.to_string(),
                reason: "injected failure".into(),
            });
        }
        self.inner.add_domain_knowledge(domain, items)
    }

    fn metrics(&self) -> EngineMetrics {
        self.inner.metrics()
    }
}
