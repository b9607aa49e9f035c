//! Typed errors for the engine and the auto-trainer.
//!
//! [`EngineError`] covers failures inside a single engine call (a malformed training
//! record, an unusable knowledge item). The trainer records these per batch and keeps
//! going. [`TrainerError`] is fatal: it ends a training run with `status = error`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A training record that cannot be learned from.
    #[error("malformed training conversation #{index}: {reason}")]
    MalformedConversation { index: usize, reason: String },

    /// A knowledge item that cannot be inserted into the graph.
    #[error("invalid knowledge for concept '{concept}': {reason}")]
    InvalidKnowledge { concept: String, reason: String },

    #[error("snapshot version {found} is newer than supported version {supported}")]
    UnsupportedSnapshot { found: u32, supported: u32 },

    /// Shared state was poisoned by a panic in another thread.
    #[error("engine state lock poisoned: {0}")]
    LockPoisoned(String),
}

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("invalid trainer configuration: {0}")]
    InvalidConfig(String),

    #[error("training cancelled after {batches_completed} of {total_batches} batches")]
    Cancelled {
        batches_completed: usize,
        total_batches: usize,
    },

    #[error("training exceeded its deadline of {0:?}")]
    DeadlineExceeded(std::time::Duration),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
