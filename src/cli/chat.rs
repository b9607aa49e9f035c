//! CLI `chat` command: a line-oriented session on stdin.

use anyhow::Result;
use std::io::{BufRead, Write};

use parley::config::ParleyConfig;
use parley::engine::Engine;

pub fn chat(config: &ParleyConfig, user: &str) -> Result<()> {
    let engine = super::open_engine(config)?;

    let session = run_session(&engine, user, std::io::stdin().lock(), std::io::stdout().lock());
    // Turns taken before a failure are still worth keeping.
    let saved = super::save_engine(config, &engine);
    session.and(saved)
}

/// Read utterances from `input` until EOF or `/quit`. Bad `/rate` arguments are
/// reported and the session carries on.
pub fn run_session(engine: &Engine, user: &str, input: impl BufRead, mut out: impl Write) -> Result<()> {
    let mut last: Option<(String, String)> = None;

    writeln!(out, "parley chat as '{user}'. /rate <0-1> rates the last answer, /quit exits.")?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();

        if line == "/quit" || line == "/exit" {
            break;
        }
        if let Some(raw) = line.strip_prefix("/rate") {
            match (&last, super::parse_score(raw)) {
                (None, _) => writeln!(out, "Nothing to rate yet.")?,
                (Some(_), Err(e)) => writeln!(out, "{e}. Usage: /rate <0-1>")?,
                (Some((query, response)), Ok(score)) => {
                    let outcome = engine.learn_from_interaction(user, query, response, score)?;
                    writeln!(
                        out,
                        "Thanks! Updated {} node(s){}.",
                        outcome.nodes_updated,
                        if outcome.preferences_changed { " and your preferences" } else { "" }
                    )?;
                }
            }
        } else if !line.is_empty() {
            let response = engine.respond(line, Some(user))?;
            super::write_response(&mut out, &response)?;
            last = Some((line.to_string(), response.text));
        }

        write!(out, "> ")?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley::config::ParleyConfig;

    fn transcript(engine: &Engine, script: &str) -> String {
        let mut out = Vec::new();
        run_session(engine, "bob", script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn bad_ratings_do_not_end_the_session() {
        let engine = Engine::new(ParleyConfig::default());
        let out = transcript(
            &engine,
            "/rate 1\ntell me about rust\n/rate great\n/rate\n/rate 5\n/rate 0.9\nhi\n/quit\nhello\n",
        );

        assert!(out.contains("Nothing to rate yet."));
        assert!(out.contains("not a score: great"));
        assert!(out.contains("a score is required"));
        assert!(out.contains("score must be within [0, 1], got 5"));
        assert_eq!(out.matches("Thanks! Updated").count(), 1);

        let context = engine.context("bob").unwrap().unwrap();
        let inputs: Vec<&str> = context.history.iter().map(|t| t.input.as_str()).collect();
        assert_eq!(inputs, vec!["tell me about rust", "hi"]);
        assert_eq!(context.history[0].satisfaction, Some(0.9));
    }
}
