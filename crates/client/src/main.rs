//! Headless combat client.
//!
//! Loads a scenario, lets an auto-pilot play the player and prints every
//! event as a JSON line on stdout. Logs go to stderr.
//!
//! ```bash
//! COMBAT_SEED=7 RUST_LOG=combat_core=debug cargo run -p combat-cli -- demos/warehouse.ron
//! ```
mod config;

use anyhow::{Context, Result};
use combat_runtime::{
    AutoPlayer, CueDurations, EncounterRunner, Event, Scenario, TimedEffects, Topic,
};
use tokio::sync::broadcast::{self, error::RecvError};

use config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = CliConfig::from_env();
    if let Some(path) = std::env::args_os().nth(1) {
        config.scenario = path.into();
    }
    tracing::info!(scenario = %config.scenario.display(), seed = ?config.seed, "starting");

    let scenario = Scenario::load(&config.scenario)
        .with_context(|| format!("loading {}", config.scenario.display()))?;
    let catalog = scenario.build_catalog();
    let mut runner = EncounterRunner::from_scenario(
        &scenario,
        config.runtime_config(),
        TimedEffects::new(CueDurations::default()),
        AutoPlayer::new(std::sync::Arc::new(catalog)),
    );

    let printers: Vec<_> = runner
        .events()
        .subscribe_multiple(&Topic::ALL)
        .into_iter()
        .map(|(topic, rx)| tokio::spawn(print_events(topic, rx)))
        .collect();

    let outcome = runner
        .run(&scenario.participants())
        .await
        .context("running encounter")?;

    let state = runner.into_state();
    for combatant in state.roster.iter() {
        tracing::info!(
            id = %combatant.id,
            name = %combatant.name,
            position = %combatant.position,
            incapacitated = combatant.body.is_incapacitated(),
            "survivor"
        );
    }
    tracing::info!(%outcome, "done");

    // Receivers finish once the runner's bus is dropped.
    for printer in printers {
        printer.await.context("event printer panicked")??;
    }
    Ok(())
}

async fn print_events(topic: Topic, mut rx: broadcast::Receiver<Event>) -> Result<()> {
    loop {
        match rx.recv().await {
            Ok(event) => {
                let line = serde_json::to_string(&event).context("encoding event")?;
                println!("{line}");
            }
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(?topic, missed, "event printer fell behind");
            }
            Err(RecvError::Closed) => return Ok(()),
        }
    }
}
