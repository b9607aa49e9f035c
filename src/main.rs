mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use parley::config::ParleyConfig;
use parley::response::Complexity;

#[derive(Parser)]
#[command(name = "parley", version, about = "Conversational reasoning engine with a self-training knowledge graph")]
struct Cli {
    /// Path to config.toml (defaults to ~/.parley/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a single utterance
    Ask {
        text: String,
        /// Conversation context to use
        #[arg(long)]
        user: Option<String>,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive session on stdin (`/rate <0-1>` rates the last answer, `/quit` exits)
    Chat {
        #[arg(long, default_value = "local")]
        user: String,
    },
    /// Rate a past exchange
    Feedback {
        #[arg(long, default_value = "local")]
        user: String,
        #[arg(long)]
        query: String,
        #[arg(long, default_value = "")]
        response: String,
        /// Score in [0, 1]
        #[arg(long)]
        score: f64,
    },
    /// Train from a JSON array of rated conversations
    Train {
        file: PathBuf,
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long)]
        min_rating: Option<u8>,
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Only train on these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Only train on these complexities (repeatable)
        #[arg(long = "complexity")]
        complexities: Vec<Complexity>,
    },
    /// Add knowledge from a JSON array of {concept, category, facts, examples}
    Seed { file: PathBuf },
    /// Show engine statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Print the engine snapshot as JSON
    Export,
    /// Restore the engine to its initial state
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => ParleyConfig::load_from(path)?,
        None => ParleyConfig::load()?,
    };

    // Log to stderr so stdout stays clean for answers and JSON output.
    let filter = EnvFilter::try_new(&config.logging.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Ask { text, user, json } => cli::ask::ask(&config, &text, user.as_deref(), json)?,
        Command::Chat { user } => cli::chat::chat(&config, &user)?,
        Command::Feedback {
            user,
            query,
            response,
            score,
        } => cli::feedback::feedback(&config, &user, &query, &response, score)?,
        Command::Train {
            file,
            batch_size,
            min_rating,
            delay_ms,
            categories,
            complexities,
        } => {
            let overrides = cli::train::TrainOverrides {
                batch_size,
                min_rating,
                delay_ms,
                categories,
                complexities,
            };
            cli::train::train(&config, &file, overrides).await?
        }
        Command::Seed { file } => cli::seed::seed(&config, &file)?,
        Command::Stats { json } => cli::stats::stats(&config, json)?,
        Command::Export => cli::export::export(&config)?,
        Command::Reset { yes } => cli::reset::reset(&config, yes)?,
    }

    Ok(())
}
