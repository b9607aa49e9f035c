//! Training data, run configuration, and run progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::config::TrainingConfig;
use crate::error::TrainerError;
use crate::response::Complexity;

/// One rated example exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingConversation {
    pub query: String,
    pub response: String,
    /// 1 (useless) to 5 (excellent).
    pub rating: u8,
    pub category: String,
    pub complexity: Complexity,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TrainingConversation {
    /// Rating mapped onto the `[0, 1]` feedback scale.
    pub fn feedback(&self) -> f64 {
        f64::from(self.rating) / 5.0
    }

    /// Why this record cannot be learned from, if it can't.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=5).contains(&self.rating) {
            return Err(format!("rating {} is outside 1..=5", self.rating));
        }
        if self.query.trim().is_empty() {
            return Err("query is empty".into());
        }
        if self.response.trim().is_empty() {
            return Err("response is empty".into());
        }
        Ok(())
    }
}

/// A mined or supplied `(concept, facts, examples)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainKnowledge {
    pub concept: String,
    pub facts: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AutoTrainerConfig {
    pub batch_size: usize,
    pub delay_between_batches: Duration,
    pub filter_by_complexity: Option<Vec<Complexity>>,
    pub filter_by_category: Option<Vec<String>>,
    pub minimum_rating: u8,
    /// Give up (fatally) once the run has taken longer than this.
    pub max_duration: Option<Duration>,
}

impl Default for AutoTrainerConfig {
    fn default() -> Self {
        Self::from(&TrainingConfig::default())
    }
}

impl From<&TrainingConfig> for AutoTrainerConfig {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            delay_between_batches: Duration::from_millis(config.delay_between_batches_ms),
            filter_by_complexity: None,
            filter_by_category: None,
            minimum_rating: config.minimum_rating,
            max_duration: (config.max_duration_secs > 0)
                .then(|| Duration::from_secs(config.max_duration_secs)),
        }
    }
}

impl AutoTrainerConfig {
    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.batch_size == 0 {
            return Err(TrainerError::InvalidConfig("batch_size must be at least 1".into()));
        }
        if !(1..=5).contains(&self.minimum_rating) {
            return Err(TrainerError::InvalidConfig(format!(
                "minimum_rating must be within 1..=5, got {}",
                self.minimum_rating
            )));
        }
        Ok(())
    }

    /// Rating floor plus the optional complexity and category allow-lists.
    pub fn accepts(&self, conversation: &TrainingConversation) -> bool {
        if conversation.rating < self.minimum_rating {
            return false;
        }
        if let Some(ref allowed) = self.filter_by_complexity {
            if !allowed.contains(&conversation.complexity) {
                return false;
            }
        }
        if let Some(ref allowed) = self.filter_by_category {
            if !allowed.iter().any(|c| c == &conversation.category) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    Running,
    Completed,
    Error,
}

impl TrainingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingProgress {
    /// Conversations left after filtering.
    pub total_conversations: usize,
    /// Conversations in batches that trained successfully.
    pub processed_conversations: usize,
    pub total_batches: usize,
    /// Batches attempted so far, failed ones included.
    pub batches_processed: usize,
    pub categories_added: BTreeSet<String>,
    pub knowledge_nodes_added: usize,
    pub average_rating: f64,
    pub training_start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_end_time: Option<DateTime<Utc>>,
    pub status: TrainingStatus,
    pub errors: Vec<String>,
}

impl TrainingProgress {
    pub fn started() -> Self {
        Self {
            total_conversations: 0,
            processed_conversations: 0,
            total_batches: 0,
            batches_processed: 0,
            categories_added: BTreeSet::new(),
            knowledge_nodes_added: 0,
            average_rating: 0.0,
            training_start_time: Utc::now(),
            training_end_time: None,
            status: TrainingStatus::Running,
            errors: Vec::new(),
        }
    }

    /// Wall-clock duration of the run, up to now if it is still going.
    pub fn elapsed(&self) -> chrono::Duration {
        self.training_end_time.unwrap_or_else(Utc::now) - self.training_start_time
    }
}
