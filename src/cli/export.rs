use anyhow::Result;

use parley::config::ParleyConfig;

/// Export the engine snapshot (nodes and conversation contexts) as JSON to stdout.
pub fn export(config: &ParleyConfig) -> Result<()> {
    let engine = super::open_engine(config)?;
    let snapshot = engine.snapshot()?;

    let json = serde_json::to_string_pretty(&snapshot)?;
    println!("{json}");

    eprintln!(
        "Exported {} knowledge nodes and {} conversation contexts.",
        snapshot.nodes.len(),
        snapshot.contexts.len()
    );

    Ok(())
}
