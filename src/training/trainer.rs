//! Batch driver for bulk training.
//!
//! Filters the input, splits it into batches, and hands each batch to the engine on
//! the blocking pool. A batch that fails is recorded in `errors` and the run moves on.
//! Knowledge is mined once all batches are through. Bad configuration, cancellation,
//! and an exceeded `max_duration` end the run with `status = error`.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::extract::mine_domain_knowledge;
use super::types::{AutoTrainerConfig, TrainingConversation, TrainingProgress, TrainingStatus};
use crate::engine::ConversationEngine;
use crate::error::TrainerError;

/// Read-only view of a running trainer's progress. Cheap to clone.
#[derive(Clone)]
pub struct ProgressHandle(Arc<RwLock<TrainingProgress>>);

impl ProgressHandle {
    pub fn snapshot(&self) -> TrainingProgress {
        match self.0.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut TrainingProgress)) {
        match self.0.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

pub struct AutoTrainer<E> {
    engine: Arc<E>,
    config: AutoTrainerConfig,
    progress: ProgressHandle,
}

impl<E: ConversationEngine + 'static> AutoTrainer<E> {
    pub fn new(engine: Arc<E>, config: AutoTrainerConfig) -> Self {
        Self {
            engine,
            config,
            progress: ProgressHandle(Arc::new(RwLock::new(TrainingProgress::started()))),
        }
    }

    pub fn config(&self) -> &AutoTrainerConfig {
        &self.config
    }

    /// Point-in-time copy of the current progress.
    pub fn progress(&self) -> TrainingProgress {
        self.progress.snapshot()
    }

    /// Handle for polling progress from another task while [`run`](Self::run) is in flight.
    pub fn progress_handle(&self) -> ProgressHandle {
        self.progress.clone()
    }

    /// Train on `data`. Returns the final progress, or the fatal error that ended the run.
    pub async fn run(
        &self,
        data: Vec<TrainingConversation>,
        cancel: CancellationToken,
    ) -> Result<TrainingProgress, TrainerError> {
        self.progress.update(|p| *p = TrainingProgress::started());

        match self.run_inner(data, &cancel).await {
            Ok(()) => {
                self.progress.update(|p| {
                    p.status = TrainingStatus::Completed;
                    p.training_end_time = Some(Utc::now());
                });
                let progress = self.progress();
                tracing::info!(
                    processed = progress.processed_conversations,
                    batches = progress.batches_processed,
                    knowledge_nodes = progress.knowledge_nodes_added,
                    errors = progress.errors.len(),
                    "training completed"
                );
                Ok(progress)
            }
            Err(e) => {
                tracing::error!(error = %e, "training failed");
                self.progress.update(|p| {
                    p.status = TrainingStatus::Error;
                    p.errors.push(e.to_string());
                    p.training_end_time = Some(Utc::now());
                });
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        data: Vec<TrainingConversation>,
        cancel: &CancellationToken,
    ) -> Result<(), TrainerError> {
        self.config.validate()?;
        let started = Instant::now();

        let received = data.len();
        let filtered: Vec<TrainingConversation> =
            data.into_iter().filter(|c| self.config.accepts(c)).collect();
        let batches: Vec<Vec<TrainingConversation>> = filtered
            .chunks(self.config.batch_size)
            .map(<[TrainingConversation]>::to_vec)
            .collect();
        let total_batches = batches.len();
        let average_rating = if filtered.is_empty() {
            0.0
        } else {
            filtered.iter().map(|c| f64::from(c.rating)).sum::<f64>() / filtered.len() as f64
        };

        self.progress.update(|p| {
            p.total_conversations = filtered.len();
            p.total_batches = total_batches;
            p.average_rating = average_rating;
        });
        tracing::info!(
            received,
            kept = filtered.len(),
            batches = total_batches,
            batch_size = self.config.batch_size,
            "starting training run"
        );

        for (i, batch) in batches.into_iter().enumerate() {
            self.check_interrupts(cancel, started, i, total_batches)?;

            let size = batch.len();
            let engine = Arc::clone(&self.engine);
            let outcome = tokio::task::spawn_blocking(move || engine.train_batch(&batch)).await;

            match outcome {
                Ok(Ok(learned)) => {
                    tracing::debug!(batch = i + 1, learned, "batch trained");
                    self.progress.update(|p| {
                        p.processed_conversations += size;
                        p.batches_processed += 1;
                    });
                }
                Ok(Err(e)) => self.record_batch_failure(i, total_batches, &e.to_string()),
                Err(join) => self.record_batch_failure(i, total_batches, &join.to_string()),
            }

            let is_last = i + 1 == total_batches;
            if !is_last && !self.config.delay_between_batches.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        return Err(TrainerError::Cancelled {
                            batches_completed: i + 1,
                            total_batches,
                        });
                    }
                    _ = tokio::time::sleep(self.config.delay_between_batches) => {}
                }
            }
        }

        self.check_interrupts(cancel, started, total_batches, total_batches)?;
        self.add_mined_knowledge(&filtered).await;
        Ok(())
    }

    fn check_interrupts(
        &self,
        cancel: &CancellationToken,
        started: Instant,
        batches_completed: usize,
        total_batches: usize,
    ) -> Result<(), TrainerError> {
        if cancel.is_cancelled() {
            return Err(TrainerError::Cancelled {
                batches_completed,
                total_batches,
            });
        }
        if let Some(limit) = self.config.max_duration {
            if started.elapsed() > limit {
                return Err(TrainerError::DeadlineExceeded(limit));
            }
        }
        Ok(())
    }

    fn record_batch_failure(&self, index: usize, total: usize, reason: &str) {
        tracing::warn!(batch = index + 1, total, error = reason, "batch failed, continuing");
        self.progress.update(|p| {
            p.batches_processed += 1;
            p.errors.push(format!("batch {}/{} failed: {}", index + 1, total, reason));
        });
    }

    /// Mine knowledge per category and hand it to the engine. Failures are recorded.
    async fn add_mined_knowledge(&self, conversations: &[TrainingConversation]) {
        let mined = mine_domain_knowledge(conversations);
        for (category, items) in mined {
            let engine = Arc::clone(&self.engine);
            let domain = category.clone();
            let outcome =
                tokio::task::spawn_blocking(move || engine.add_domain_knowledge(&domain, &items))
                    .await;

            let result = match outcome {
                Ok(r) => r.map_err(|e| e.to_string()),
                Err(join) => Err(join.to_string()),
            };
            match result {
                Ok(added) => {
                    tracing::debug!(category = %category, added, "domain knowledge added");
                    self.progress.update(|p| {
                        p.categories_added.insert(category);
                        p.knowledge_nodes_added += added;
                    });
                }
                Err(reason) => {
                    tracing::warn!(category = %category, error = %reason, "knowledge mining failed");
                    self.progress.update(|p| {
                        p.errors
                            .push(format!("knowledge for category '{category}' failed: {reason}"));
                    });
                }
            }
        }
    }
}
