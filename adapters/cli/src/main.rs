#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Whack-a-Mole session.

mod headless;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use whack_session::SessionConfig;
use whack_system_hud::Hud;

use self::headless::{run_session, ConsoleSink, PlayerConfig};

/// Plays a Whack-a-Mole session against a scripted player.
#[derive(Debug, Parser)]
#[command(name = "whack-a-mole", version, about)]
struct Cli {
    /// TOML file with session settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Session length in seconds, overriding the config file.
    #[arg(long)]
    duration: Option<f32>,
    /// Seed for hole selection, overriding the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,
    /// Probability that the player whacks a mole.
    #[arg(long, default_value_t = 0.6, value_parser = parse_probability)]
    hit_rate: f64,
    /// Player reaction time in milliseconds.
    #[arg(long, default_value_t = 400)]
    reaction_ms: u64,
}

/// Entry point for the Whack-a-Mole command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(duration) = cli.duration {
        config.duration_secs = duration;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let hud = Hud::new()
        .with_time_sink(ConsoleSink::default())
        .with_score_sink(ConsoleSink::default());
    let player = PlayerConfig {
        hit_rate: cli.hit_rate,
        reaction: Duration::from_millis(cli.reaction_ms),
        seed: config.seed.rotate_left(17),
    };

    let outcome = run_session(&config, player, Duration::from_millis(cli.frame_ms), hud)?;
    println!(
        "Final score: {} ({} of {} moles whacked)",
        outcome.score, outcome.whacked, outcome.spawned
    );
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read session config at {}", path.display()))?;
    parse_config(&contents)
}

fn parse_config(contents: &str) -> Result<SessionConfig> {
    toml::from_str(contents).context("failed to parse session config toml contents")
}

fn parse_probability(value: &str) -> Result<f64, String> {
    let probability: f64 = value
        .parse()
        .map_err(|error| format!("`{value}` is not a number: {error}"))?;
    if (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(format!("`{value}` is not within 0.0..=1.0"))
    }
}
