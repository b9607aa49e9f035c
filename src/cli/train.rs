//! CLI `train` command: bulk training with a live progress bar.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use parley::config::ParleyConfig;
use parley::response::Complexity;
use parley::training::{AutoTrainer, AutoTrainerConfig, TrainingConversation};

/// Command-line overrides on top of the `[training]` config section.
pub struct TrainOverrides {
    pub batch_size: Option<usize>,
    pub min_rating: Option<u8>,
    pub delay_ms: Option<u64>,
    pub categories: Vec<String>,
    pub complexities: Vec<Complexity>,
}

impl TrainOverrides {
    fn apply(self, mut trainer: AutoTrainerConfig) -> AutoTrainerConfig {
        if let Some(size) = self.batch_size {
            trainer.batch_size = size;
        }
        if let Some(rating) = self.min_rating {
            trainer.minimum_rating = rating;
        }
        if let Some(ms) = self.delay_ms {
            trainer.delay_between_batches = Duration::from_millis(ms);
        }
        if !self.categories.is_empty() {
            trainer.filter_by_category = Some(self.categories);
        }
        if !self.complexities.is_empty() {
            trainer.filter_by_complexity = Some(self.complexities);
        }
        trainer
    }
}

pub async fn train(config: &ParleyConfig, file: &Path, overrides: TrainOverrides) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read training file: {}", file.display()))?;
    let data: Vec<TrainingConversation> =
        serde_json::from_str(&json).context("failed to parse training JSON")?;

    let engine = Arc::new(super::open_engine(config)?);
    let trainer_config = overrides.apply(AutoTrainerConfig::from(&config.training));
    let trainer = AutoTrainer::new(Arc::clone(&engine), trainer_config);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    println!("Training on {} conversations...", data.len());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} batches ({elapsed}) {msg}")
            .context("invalid progress template")?
            .progress_chars("##-"),
    );

    let handle = trainer.progress_handle();
    let poll_bar = pb.clone();
    let poller = tokio::spawn(async move {
        loop {
            let progress = handle.snapshot();
            poll_bar.set_length(progress.total_batches as u64);
            poll_bar.set_position(progress.batches_processed as u64);
            poll_bar.set_message(format!("{} errors", progress.errors.len()));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    });

    let result = trainer.run(data, cancel).await;
    poller.abort();
    pb.finish_and_clear();

    let progress = trainer.progress();
    println!("Status:                {}", progress.status);
    println!(
        "Conversations trained: {}/{}",
        progress.processed_conversations, progress.total_conversations
    );
    println!(
        "Batches:               {}/{}",
        progress.batches_processed, progress.total_batches
    );
    println!("Average rating:        {:.2}", progress.average_rating);
    println!("Knowledge nodes added: {}", progress.knowledge_nodes_added);
    if !progress.categories_added.is_empty() {
        let categories: Vec<&str> = progress.categories_added.iter().map(String::as_str).collect();
        println!("Categories:            {}", categories.join(", "));
    }
    println!("Elapsed:               {}ms", progress.elapsed().num_milliseconds());
    for error in &progress.errors {
        eprintln!("  error: {error}");
    }

    // Partial training is still worth keeping.
    super::save_engine(config, &engine)?;
    result.map(|_| ()).context("training did not complete")
}
