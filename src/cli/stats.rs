use anyhow::Result;

use parley::config::ParleyConfig;
use parley::engine::ConversationEngine;

/// Display engine statistics in the terminal.
pub fn stats(config: &ParleyConfig, json: bool) -> Result<()> {
    let engine = super::open_engine(config)?;
    let metrics = engine.metrics();

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!("Engine Statistics");
    println!("{}", "=".repeat(40));
    println!("  Knowledge nodes:     {}", metrics.knowledge_nodes);
    println!("  Relations:           {}", metrics.relations);
    println!("  Avg confidence:      {:.3}", metrics.average_confidence);
    println!();

    println!("By Category:");
    for (category, count) in &metrics.by_category {
        println!("  {:<16} {}", category, count);
    }
    println!();

    println!("Intents:               {} ({} patterns)", metrics.intents, metrics.patterns);
    println!("Conversations:         {}", metrics.active_contexts);
    println!("Turns:                 {} ({} rated)", metrics.total_turns, metrics.rated_turns);
    println!("Queries answered:      {}", metrics.queries_answered);
    println!("Feedback events:       {}", metrics.feedback_events);

    if let Some(ref updated) = metrics.last_updated {
        println!("Last knowledge update: {updated}");
    }
    println!("Snapshot:              {}", config.resolved_snapshot_path().display());

    Ok(())
}
