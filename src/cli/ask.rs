use anyhow::Result;

use parley::config::ParleyConfig;

/// Answer one utterance and save the updated state.
pub fn ask(config: &ParleyConfig, text: &str, user: Option<&str>, json: bool) -> Result<()> {
    let engine = super::open_engine(config)?;
    let response = engine.respond(text, user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        super::print_response(&response);
    }

    super::save_engine(config, &engine)
}
