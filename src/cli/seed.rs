use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use parley::config::ParleyConfig;

/// Seed file format: one entry per concept.
#[derive(Debug, Deserialize)]
struct SeedEntry {
    concept: String,
    category: String,
    #[serde(default)]
    facts: Vec<String>,
    #[serde(default)]
    examples: Vec<String>,
}

/// Add knowledge from a JSON file.
///
/// Existing concepts get the new facts and examples merged in. Entries that cannot be
/// added are reported and skipped.
pub fn seed(config: &ParleyConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read seed file: {}", file.display()))?;
    let entries: Vec<SeedEntry> = serde_json::from_str(&json).context("failed to parse seed JSON")?;

    let engine = super::open_engine(config)?;

    let mut added = 0u64;
    let mut merged = 0u64;
    let mut skipped = 0u64;

    println!("Seeding {} concepts...", entries.len());

    for entry in entries {
        match engine.add_knowledge(&entry.concept, &entry.category, entry.facts, entry.examples) {
            Ok(result) if result.merged => merged += 1,
            Ok(_) => added += 1,
            Err(e) => {
                eprintln!("  skipped '{}': {e}", entry.concept);
                skipped += 1;
            }
        }
    }

    super::save_engine(config, &engine)?;
    println!("Seed complete: {added} added, {merged} merged, {skipped} skipped.");
    Ok(())
}
