//! Async host loop for one encounter.
//!
//! The engine never blocks; every place it has to wait comes back as an
//! [`Advance`]. [`EncounterRunner`] owns those suspension points: it sleeps
//! between effect-gate polls, awaits the [`PlayerController`] when the
//! engine parks for player input, and publishes drained events on the
//! [`EventBus`] after every step.

use tokio::sync::broadcast;

use combat_core::{
    Advance, AttackKind, Awaiting, CombatConfig, CombatEngine, CombatEnv, CombatEvent, CombatState,
    DefenseKind, EncounterOutcome, EntityId, ExploreChoice,
};

use crate::api::{PlayerController, Result};
use crate::events::{Event, EventBus, HostEvent, Topic};
use crate::oracle::{OracleManager, TimedEffects};
use crate::scenario::Scenario;

/// Runtime configuration shared by the runner and its collaborators.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    pub event_buffer_size: usize,
    /// Replaces the scenario seed when set.
    pub seed: Option<u64>,
    /// Refused player declarations in a row before the runner ends the turn.
    pub max_rejections: u32,
    /// Once this round is reached the host ends an undecided encounter at
    /// the next turn boundary.
    pub max_rounds: Option<u32>,
}

impl RuntimeConfig {
    pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 1024;
    pub const DEFAULT_MAX_REJECTIONS: u32 = 3;
    pub const DEFAULT_MAX_ROUNDS: u32 = 100;
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER_SIZE,
            seed: None,
            max_rejections: Self::DEFAULT_MAX_REJECTIONS,
            max_rounds: Some(Self::DEFAULT_MAX_ROUNDS),
        }
    }
}

/// Drives a [`CombatState`] through encounters against a set of oracles.
pub struct EncounterRunner {
    config: RuntimeConfig,
    state: CombatState,
    oracles: OracleManager,
    controller: Box<dyn PlayerController>,
    bus: EventBus,
    rejections: u32,
    last_round: u32,
}

impl EncounterRunner {
    pub fn new(
        config: RuntimeConfig,
        state: CombatState,
        oracles: OracleManager,
        controller: impl PlayerController + 'static,
    ) -> Self {
        let bus = EventBus::with_capacity(config.event_buffer_size);
        Self {
            config,
            state,
            oracles,
            controller: Box::new(controller),
            bus,
            rejections: 0,
            last_round: 0,
        }
    }

    /// Builds state and oracles from a scenario. The runtime's combat config
    /// and seed take precedence.
    pub fn from_scenario(
        scenario: &Scenario,
        config: RuntimeConfig,
        effects: TimedEffects,
        controller: impl PlayerController + 'static,
    ) -> Self {
        let state = scenario.create_initial_state(config.combat.clone(), config.seed);
        let oracles = scenario.create_oracles(effects);
        Self::new(config, state, oracles, controller)
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn into_state(self) -> CombatState {
        self.state
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    /// A handle on the bus; clones share channels.
    pub fn events(&self) -> EventBus {
        self.bus.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> Option<broadcast::Receiver<Event>> {
        self.bus.subscribe(topic)
    }

    fn engine(&mut self) -> CombatEngine<'_> {
        CombatEngine::new(&mut self.state)
    }

    /// Runs one encounter between `participants` to its end.
    ///
    /// Controller failures and refused declarations never end the encounter;
    /// only engine failures that are not rejections are returned.
    pub async fn run(&mut self, participants: &[EntityId]) -> Result<EncounterOutcome> {
        let oracles = self.oracles.clone();
        let env = oracles.env();
        self.rejections = 0;
        self.last_round = 0;
        tracing::info!(participants = participants.len(), "encounter starting");

        let mut advance = self.engine().start_encounter(env, participants)?;
        loop {
            self.flush();
            advance = match advance {
                Advance::Ended(outcome) => return Ok(self.finish(outcome)),
                Advance::Waiting { retry_in } => {
                    tracing::trace!(?retry_in, "effect playing; waiting");
                    tokio::time::sleep(retry_in).await;
                    self.engine().advance_turn(env)?
                }
                Advance::TurnEnded { actor } => {
                    if self.past_round_limit() {
                        return Ok(self.stop_at_round_limit());
                    }
                    tracing::trace!(%actor, "turn over");
                    self.engine().advance_turn(env)?
                }
                Advance::AwaitingPlayer(awaiting) => {
                    let notice = Event::Host(HostEvent::AwaitingPlayer(awaiting));
                    self.bus.publish(notice);
                    match awaiting {
                        Awaiting::Command { actor } => self.player_command(env, actor).await?,
                        Awaiting::Defense {
                            attacker,
                            defender,
                            attack,
                        } => self.player_defense(env, attacker, defender, attack).await?,
                    }
                }
            };
        }
    }

    async fn player_command(&mut self, env: CombatEnv<'_>, actor: EntityId) -> Result<Advance> {
        let command = match self.controller.next_command(actor, &self.state).await {
            Ok(command) => command,
            Err(error) => {
                tracing::warn!(%actor, %error, "controller failed; ending the player's turn");
                self.bus.publish(Event::Host(HostEvent::ControllerFailed {
                    actor,
                    message: error.to_string(),
                }));
                self.rejections = 0;
                return Ok(self.engine().end_turn()?);
            }
        };
        tracing::debug!(%actor, ?command, "player command");

        match self.engine().command(env, command) {
            Ok(advance) => {
                self.rejections = 0;
                Ok(advance)
            }
            Err(error) if error.rejection().is_some() => {
                self.rejections += 1;
                tracing::debug!(%actor, %error, streak = self.rejections, "command refused");
                if self.rejections < self.config.max_rejections {
                    return Ok(Advance::AwaitingPlayer(Awaiting::Command { actor }));
                }
                tracing::info!(%actor, rejections = self.rejections, "too many refusals; ending turn");
                self.bus.publish(Event::Host(HostEvent::RejectionLimit {
                    actor,
                    rejections: self.rejections,
                }));
                self.rejections = 0;
                Ok(self.engine().end_turn()?)
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn player_defense(
        &mut self,
        env: CombatEnv<'_>,
        attacker: EntityId,
        defender: EntityId,
        attack: AttackKind,
    ) -> Result<Advance> {
        let requested = match self
            .controller
            .choose_defense(defender, attacker, attack, &self.state)
            .await
        {
            Ok(kind) => kind,
            Err(error) => {
                tracing::warn!(%defender, %error, "controller failed; defending passively");
                self.bus.publish(Event::Host(HostEvent::ControllerFailed {
                    actor: defender,
                    message: error.to_string(),
                }));
                DefenseKind::None
            }
        };
        tracing::debug!(%defender, %attacker, ?requested, "player defense");

        match self.engine().declare_defense(env, requested) {
            Err(error) if error.rejection().is_some() && requested != DefenseKind::None => {
                tracing::debug!(%defender, %error, "defense refused; defending passively");
                Ok(self.engine().declare_defense(env, DefenseKind::None)?)
            }
            other => Ok(other?),
        }
    }

    /// One out-of-combat step for `npc`, published like any other event.
    pub fn explore_step(&mut self, npc: EntityId) -> Result<ExploreChoice> {
        let oracles = self.oracles.clone();
        let choice = self.engine().explore_step(oracles.env(), npc)?;
        self.flush();
        Ok(choice)
    }

    /// Ends the running encounter from the outside.
    pub fn end_encounter(&mut self) -> EncounterOutcome {
        let outcome = self.engine().end_encounter();
        self.flush();
        outcome
    }

    fn past_round_limit(&self) -> bool {
        self.config
            .max_rounds
            .is_some_and(|limit| self.last_round >= limit)
    }

    fn stop_at_round_limit(&mut self) -> EncounterOutcome {
        tracing::warn!(rounds = self.last_round, "round limit reached; ending encounter");
        self.bus.publish(Event::Host(HostEvent::RoundLimit {
            rounds: self.last_round,
        }));
        let outcome = self.end_encounter();
        self.finish(outcome)
    }

    fn finish(&mut self, outcome: EncounterOutcome) -> EncounterOutcome {
        self.flush();
        tracing::info!(%outcome, rounds = self.last_round, "encounter finished");
        self.bus.publish(Event::Host(HostEvent::EncounterFinished {
            outcome,
            rounds: self.last_round,
        }));
        outcome
    }

    fn flush(&mut self) {
        for event in self.state.drain_events() {
            if let CombatEvent::RoundStarted { round } = event {
                self.last_round = round.0;
            }
            self.bus.publish(Event::Combat(event));
        }
    }
}
