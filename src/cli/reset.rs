//! CLI `reset` command: restore the initial engine state after user confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use parley::config::ParleyConfig;

/// Drop learned knowledge and conversation history after user confirmation.
pub fn reset(config: &ParleyConfig, yes: bool) -> Result<()> {
    let path = config.resolved_snapshot_path();

    if !yes {
        println!("WARNING: This will discard all learned knowledge, confidence and conversation history.");
        println!("Snapshot: {}", path.display());
        print!("\nType YES to confirm: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if input.trim() != "YES" {
            bail!("reset cancelled");
        }
    }

    let engine = super::open_engine(config)?;
    engine.reset()?;
    super::save_engine(config, &engine)?;

    println!("Engine reset complete.");
    Ok(())
}
