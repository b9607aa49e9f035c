pub mod ask;
pub mod chat;
pub mod export;
pub mod feedback;
pub mod reset;
pub mod seed;
pub mod stats;
pub mod train;

use anyhow::{ensure, Context, Result};
use std::io::Write;
use std::path::Path;

use parley::config::ParleyConfig;
use parley::engine::{Engine, EngineSnapshot};
use parley::response::EngineResponse;

/// Build an engine from the saved snapshot, or a fresh one if there is none yet.
pub fn open_engine(config: &ParleyConfig) -> Result<Engine> {
    let path = config.resolved_snapshot_path();
    let engine = if config.storage.seed_on_empty {
        Engine::new(config.clone())
    } else {
        Engine::empty(config.clone())
    };

    if path.exists() {
        let snapshot = read_snapshot(&path)?;
        engine
            .restore(snapshot)
            .with_context(|| format!("failed to restore snapshot: {}", path.display()))?;
    } else {
        tracing::info!("no snapshot at {}, starting fresh", path.display());
    }
    Ok(engine)
}

pub fn read_snapshot(path: &Path) -> Result<EngineSnapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot: {}", path.display()))?;
    serde_json::from_str(&json).context("failed to parse snapshot JSON")
}

/// Persist the engine's state. Uses atomic write (tmp + rename).
pub fn save_engine(config: &ParleyConfig, engine: &Engine) -> Result<()> {
    let path = config.resolved_snapshot_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create snapshot dir: {}", parent.display()))?;
    }

    let snapshot = engine.snapshot()?;
    let json = serde_json::to_string_pretty(&snapshot)?;

    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, json)
        .with_context(|| format!("failed to write temp file: {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, &path).context("failed to rename temp file")?;

    tracing::debug!(path = %path.display(), nodes = snapshot.nodes.len(), "snapshot saved");
    Ok(())
}

/// Print a response body with its optional lists underneath.
pub fn print_response(response: &EngineResponse) {
    // stdout closed under us; nothing left to report to
    let _ = write_response(&mut std::io::stdout().lock(), response);
}

pub fn write_response(out: &mut impl Write, response: &EngineResponse) -> std::io::Result<()> {
    writeln!(out, "{}", response.text)?;
    if let Some(ref suggestions) = response.suggestions {
        if !suggestions.is_empty() {
            writeln!(out)?;
            writeln!(out, "Try: {}", suggestions.join(" | "))?;
        }
    }
    if let Some(ref follow_up) = response.follow_up {
        for question in follow_up {
            writeln!(out, "  > {question}")?;
        }
    }
    eprintln!(
        "[{} · confidence {:.2}{}]",
        response.response_type,
        response.confidence,
        response
            .complexity
            .map(|c| format!(" · {c}"))
            .unwrap_or_default()
    );
    Ok(())
}

/// Parse a feedback score and require it to lie in `[0, 1]`.
pub fn parse_score(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    ensure!(!raw.is_empty(), "a score is required, e.g. 0.8");
    let score: f64 = raw.parse().with_context(|| format!("not a score: {raw}"))?;
    check_score(score)?;
    Ok(score)
}

pub fn check_score(score: f64) -> Result<()> {
    ensure!((0.0..=1.0).contains(&score), "score must be within [0, 1], got {score}");
    Ok(())
}
