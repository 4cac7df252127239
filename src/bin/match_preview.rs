//! Match preview binary - shows what the configured patterns extract from sample chat lines
//!
//! Usage:
//!   cargo run --bin match-preview -- --user Alice < samples.txt
//!   cargo run --bin match-preview -- --config config/match.json --user Alice < samples.txt
//!
//! Each input line is treated as the plain text of a system chat message sent to
//! the given player. Output is one line per input: the extracted text, or `-`
//! when the message would not be offered for translation.
//!
//! Optional:
//! - MATCH_CONFIG_PATH (defaults to config/match.json, overridden by --config)

use anyhow::{bail, Context, Result};
use chat_translator::{config::MatchConfig, pattern::PatternExtractor};
use std::io::{self, BufRead, Write};
use tracing::info;
use uuid::Uuid;

struct PreviewArgs {
    config_path: String,
    user: String,
}

impl PreviewArgs {
    fn parse() -> Result<Self> {
        let mut config_path = std::env::var("MATCH_CONFIG_PATH")
            .unwrap_or_else(|_| "config/match.json".to_string());
        let mut user = "Player".to_string();

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config_path = args.next().context("--config needs a path")?,
                "--user" => user = args.next().context("--user needs a name")?,
                other => bail!("Unknown argument: {}", other),
            }
        }

        Ok(Self { config_path, user })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_translator=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let args = PreviewArgs::parse()?;
    let config = MatchConfig::load(&args.config_path)?;
    info!("Loaded {} patterns from {}", config.include.len(), args.config_path);

    let extractor = PatternExtractor::new(&config.include)?;
    let user_id = Uuid::new_v4();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        match extractor.extract(&line, user_id, &args.user) {
            Some(text) => writeln!(out, "{}", text)?,
            None => writeln!(out, "-")?,
        }
    }

    Ok(())
}
