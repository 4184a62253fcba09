//! Settlers simulation harness.
//!
//! Plays a batch of seeded games between scripted agents and prints who won.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod harness;

use config::SimConfig;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimConfig::from_env()?;
    info!(
        games = config.games,
        players = config.players,
        seed = config.base_seed,
        "Starting simulation..."
    );

    let (summary, last) = harness::run(&config)?;
    println!("{summary}");

    if let (Some(path), Some(report)) = (&config.snapshot_path, last) {
        std::fs::write(path, report.snapshot.to_json()?)?;
        info!(path = %path.display(), seed = report.seed, "wrote final snapshot");
    }

    Ok(())
}
