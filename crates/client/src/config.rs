//! Client configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use combat_core::CombatConfig;
use combat_runtime::RuntimeConfig;

/// Settings for one CLI run.
///
/// Environment variables:
/// - `COMBAT_SCENARIO` - scenario file (default: `demos/warehouse.ron`)
/// - `COMBAT_SEED` - replaces the scenario seed
/// - `COMBAT_EFFECT_RETRIES` - effect-gate polls before a turn is forced
/// - `COMBAT_EFFECT_INTERVAL_MS` - delay between effect-gate polls
/// - `COMBAT_AI_LOOP_CAP` - NPC decisions per turn
/// - `COMBAT_MAX_ROUNDS` - rounds before the host calls the fight (0 = no cap)
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub scenario: PathBuf,
    pub seed: Option<u64>,
    pub effect_retries: u32,
    pub effect_interval: Duration,
    pub ai_loop_cap: u32,
    pub max_rounds: Option<u32>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            scenario: PathBuf::from("demos/warehouse.ron"),
            seed: None,
            effect_retries: CombatConfig::DEFAULT_EFFECT_WAIT_RETRIES,
            effect_interval: Duration::from_millis(CombatConfig::DEFAULT_EFFECT_WAIT_INTERVAL_MS),
            ai_loop_cap: CombatConfig::DEFAULT_AI_LOOP_CAP,
            max_rounds: Some(RuntimeConfig::DEFAULT_MAX_ROUNDS),
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = read_env::<PathBuf>("COMBAT_SCENARIO") {
            config.scenario = path;
        }
        config.seed = read_env("COMBAT_SEED");
        if let Some(retries) = read_env("COMBAT_EFFECT_RETRIES") {
            config.effect_retries = retries;
        }
        if let Some(ms) = read_env("COMBAT_EFFECT_INTERVAL_MS") {
            config.effect_interval = Duration::from_millis(ms);
        }
        if let Some(cap) = read_env::<u32>("COMBAT_AI_LOOP_CAP") {
            config.ai_loop_cap = cap.max(1);
        }
        if let Some(rounds) = read_env::<u32>("COMBAT_MAX_ROUNDS") {
            config.max_rounds = (rounds > 0).then_some(rounds);
        }

        config
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            combat: CombatConfig::default()
                .with_effect_wait(self.effect_retries, self.effect_interval)
                .with_ai_loop_cap(self.ai_loop_cap),
            seed: self.seed,
            max_rounds: self.max_rounds,
            ..RuntimeConfig::default()
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
