use anyhow::Result;

use parley::config::ParleyConfig;

/// Apply a feedback score for an exchange.
pub fn feedback(
    config: &ParleyConfig,
    user: &str,
    query: &str,
    response: &str,
    score: f64,
) -> Result<()> {
    super::check_score(score)?;

    let engine = super::open_engine(config)?;
    let outcome = engine.learn_from_interaction(user, query, response, score)?;

    if outcome.concepts.is_empty() {
        println!("No known concepts in that query; nothing to adjust.");
    } else {
        println!("Concepts:       {}", outcome.concepts.join(", "));
        println!("Nodes updated:  {}", outcome.nodes_updated);
    }
    if outcome.preferences_changed {
        println!("Preferences for '{user}' were updated.");
    }

    super::save_engine(config, &engine)
}
