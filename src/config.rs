use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ParleyConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub matcher: MatcherConfig,
    pub graph: GraphConfig,
    pub training: TrainingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Where the CLI keeps the engine snapshot between invocations.
    pub snapshot_path: String,
    /// Load the built-in seed graph when no snapshot exists.
    pub seed_on_empty: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MatcherConfig {
    /// Inputs longer than this are truncated before scoring.
    pub max_input_chars: usize,
    /// Soft deadline for one pattern scan. `0` disables it.
    pub scan_deadline_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GraphConfig {
    pub max_depth: usize,
    pub initial_confidence: f64,
    pub relation_similarity: f64,
    pub learning_rate: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrainingConfig {
    pub batch_size: usize,
    pub delay_between_batches_ms: u64,
    pub minimum_rating: u8,
    /// Whole-run deadline in seconds. `0` disables it.
    pub max_duration_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let snapshot_path = default_parley_dir()
            .join("engine.json")
            .to_string_lossy()
            .into_owned();
        Self {
            snapshot_path,
            seed_on_empty: true,
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 2000,
            scan_deadline_ms: 250,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            initial_confidence: 0.7,
            relation_similarity: 0.6,
            learning_rate: 0.1,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            delay_between_batches_ms: 100,
            minimum_rating: 3,
            max_duration_secs: 0,
        }
    }
}

impl MatcherConfig {
    pub fn scan_deadline(&self) -> Option<Duration> {
        (self.scan_deadline_ms > 0).then(|| Duration::from_millis(self.scan_deadline_ms))
    }
}

/// Returns `~/.parley/`
pub fn default_parley_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".parley")
}

/// Returns the default config file path: `~/.parley/config.toml`
pub fn default_config_path() -> PathBuf {
    default_parley_dir().join("config.toml")
}

impl ParleyConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            ParleyConfig::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides (PARLEY_SNAPSHOT, PARLEY_LOG_LEVEL,
    /// PARLEY_BATCH_SIZE).
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("PARLEY_SNAPSHOT") {
            self.storage.snapshot_path = val;
        }
        if let Ok(val) = std::env::var("PARLEY_LOG_LEVEL") {
            self.logging.log_level = val;
        }
        if let Ok(val) = std::env::var("PARLEY_BATCH_SIZE") {
            self.training.batch_size = val
                .parse()
                .with_context(|| format!("PARLEY_BATCH_SIZE is not a number: {val}"))?;
        }
        Ok(())
    }

    /// Resolve the snapshot path, expanding `~` if needed.
    pub fn resolved_snapshot_path(&self) -> PathBuf {
        expand_tilde(&self.storage.snapshot_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
