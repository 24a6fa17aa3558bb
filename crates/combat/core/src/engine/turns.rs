//! Encounter lifecycle and turn advancement.

use std::collections::BTreeSet;

use super::{
    Advance, Awaiting, CombatEngine, CombatError, CombatEvent, CombatPhase, Encounter,
    EncounterOutcome, GateState, InitiativeTracker, MissingReference, TurnSession,
};
use crate::combat::{CrisisResolution, DeathCause, threat, tick_crises};
use crate::env::{CombatEnv, Dice};
use crate::state::{Combatant, EntityId};

impl CombatEngine<'_> {
    /// Rolls initiative for `participants` and starts the first turn.
    ///
    /// Unknown ids are skipped. An encounter that is already decided (one
    /// team only) ends immediately.
    pub fn start_encounter(
        &mut self,
        env: CombatEnv<'_>,
        participants: &[EntityId],
    ) -> Result<Advance, CombatError> {
        if self.state.encounter.is_active() {
            return Err(CombatError::EncounterInProgress);
        }
        let rng = env.rng()?;

        let mut seen = BTreeSet::new();
        let roster = &self.state.roster;
        let combatants: Vec<&Combatant> = participants
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| {
                let combatant = roster.get(*id);
                if combatant.is_none() {
                    tracing::warn!(%id, "participant not in roster; skipped");
                }
                combatant
            })
            .collect();
        let mut dice = Dice::new(rng, &mut self.state.cursor);
        let tracker = InitiativeTracker::roll(combatants, &mut dice);

        for combatant in self.state.roster.iter_mut() {
            if tracker.contains(combatant.id) {
                combatant.clear_encounter_state();
            }
        }

        let order = tracker.entries().to_vec();
        tracing::info!(
            order = ?order.iter().map(|e| (e.entity.0, e.roll)).collect::<Vec<_>>(),
            "initiative rolled"
        );
        self.state.encounter = Encounter {
            player_involved: order.iter().any(|e| e.is_player),
            tracker,
            ..Encounter::default()
        };
        self.state.emit(CombatEvent::EncounterStarted { order });
        self.transition(CombatPhase::NextTurn)?;

        if let Some(outcome) = self.decided_outcome() {
            return Ok(Advance::Ended(self.conclude(outcome)));
        }
        self.advance_turn(env)
    }

    /// Starts the next turn.
    ///
    /// While the presentation sink reports an effect playing this returns
    /// [`Advance::Waiting`], up to the configured retry count; after that the
    /// turn proceeds anyway. Parked phases simply repeat what they wait for.
    pub fn advance_turn(&mut self, env: CombatEnv<'_>) -> Result<Advance, CombatError> {
        let result = self.next_turn(env);
        self.contain(result)
    }

    fn next_turn(&mut self, env: CombatEnv<'_>) -> Result<Advance, CombatError> {
        match self.state.encounter.phase {
            CombatPhase::Idle => return Err(CombatError::NoActiveEncounter),
            CombatPhase::Ended => return Ok(self.outcome_advance()),
            CombatPhase::PlayerAttackDeclare => {
                let actor = self.session()?.actor;
                return Ok(Advance::AwaitingPlayer(Awaiting::Command { actor }));
            }
            CombatPhase::PlayerDefenseDeclare => return self.awaiting_defense(),
            CombatPhase::NextTurn => {}
            from => {
                return Err(CombatError::IllegalTransition {
                    from,
                    to: CombatPhase::NextTurn,
                });
            }
        }

        let retries = self.state.config.effect_wait_retries;
        match self
            .state
            .encounter
            .gate
            .poll(env.effect_in_progress(), retries)
        {
            GateState::Wait => {
                return Ok(Advance::Waiting {
                    retry_in: self.state.config.effect_wait_interval,
                });
            }
            GateState::Forced { polls } => {
                tracing::warn!(polls, "effect still playing after retries; advancing anyway");
                self.state.emit(CombatEvent::EffectGateForced { polls });
            }
            GateState::Open => {}
        }

        let tracker = &mut self.state.encounter.tracker;
        if tracker.is_empty() {
            return Ok(self.abort(MissingReference::InitiativeEntry));
        }
        let wrapped = tracker.advance();
        let round = tracker.round();
        let current = tracker.current().map(|entry| entry.entity);
        if wrapped {
            tracing::info!(%round, "new round");
            self.state.emit(CombatEvent::RoundStarted { round });
        }
        let Some(actor) = current else {
            return Ok(self.abort(MissingReference::InitiativeEntry));
        };
        let Some(combatant) = self.state.roster.get_mut(actor) else {
            return Ok(self.abort(MissingReference::Combatant(actor)));
        };

        combatant.begin_turn();
        let resolutions = tick_crises(&mut combatant.body);
        let incapacitated = combatant.body.is_incapacitated();
        let is_player = combatant.is_player();

        for resolution in resolutions {
            self.state.emit(CombatEvent::CrisisResolved {
                target: actor,
                resolution,
            });
            if let CrisisResolution::Died(cause) = resolution {
                self.kill(actor, cause);
            }
        }
        if let Some(ended) = self.ended() {
            return Ok(ended);
        }
        if !self.state.roster.contains(actor) {
            return Ok(Advance::TurnEnded { actor });
        }
        if incapacitated {
            tracing::debug!(%actor, "incapacitated; turn skipped");
            self.state.emit(CombatEvent::TurnSkipped { actor });
            return Ok(Advance::TurnEnded { actor });
        }

        self.state.encounter.session = Some(TurnSession::new(actor));
        tracing::debug!(%actor, %round, "turn started");
        self.state.emit(CombatEvent::TurnStarted { actor, round });

        if is_player {
            self.transition(CombatPhase::PlayerAttackDeclare)?;
            Ok(Advance::AwaitingPlayer(Awaiting::Command { actor }))
        } else {
            self.transition(CombatPhase::AttackerDeclare)?;
            self.run_npc(env)
        }
    }

    /// Ends the player's turn early, forgoing the remaining points.
    pub fn end_turn(&mut self) -> Result<Advance, CombatError> {
        if self.state.encounter.phase != CombatPhase::PlayerAttackDeclare {
            return Err(crate::action::Rejection::NotAwaitingDeclaration.into());
        }
        self.finish_turn(true)
    }

    /// Ends the encounter, clearing grapples, cached cover and the tracker.
    ///
    /// Idempotent: a second call changes nothing and returns the same outcome.
    pub fn end_encounter(&mut self) -> EncounterOutcome {
        self.conclude(EncounterOutcome::Ended)
    }

    pub(super) fn finish_turn(&mut self, forfeited: bool) -> Result<Advance, CombatError> {
        if let Some(ended) = self.ended() {
            return Ok(ended);
        }
        let Some(session) = self.state.encounter.session.take() else {
            return Ok(self.abort(MissingReference::Session));
        };
        let actor = session.actor;
        if forfeited {
            if let Some(combatant) = self.state.roster.get_mut(actor) {
                combatant.points.clear();
            }
        }
        tracing::debug!(%actor, forfeited, "turn ended");
        self.state.emit(CombatEvent::TurnEnded { actor, forfeited });
        self.transition(CombatPhase::NextTurn)?;
        Ok(Advance::TurnEnded { actor })
    }

    pub(super) fn awaiting_defense(&self) -> Result<Advance, CombatError> {
        let session = self.session()?;
        let pending = session.pending.ok_or(MissingReference::PendingAction)?;
        let defender = session.defender.ok_or(MissingReference::PendingAction)?;
        Ok(Advance::AwaitingPlayer(Awaiting::Defense {
            attacker: pending.actor,
            defender,
            attack: pending.attack,
        }))
    }

    /// Removes a dead combatant from initiative, grapples, aggro lists and
    /// the world registry, then checks whether the encounter is decided.
    pub(super) fn kill(&mut self, id: EntityId, cause: DeathCause) {
        let was_player = self
            .state
            .roster
            .get(id)
            .is_some_and(|combatant| combatant.is_player());
        tracing::info!(%id, ?cause, "combatant died");
        self.state.emit(CombatEvent::CombatantDied { target: id, cause });

        self.state.encounter.tracker.remove(id);
        for combatant in self.state.roster.iter_mut() {
            if combatant.grappling == Some(id) {
                combatant.grappling = None;
            }
            if combatant.grappled_by == Some(id) {
                combatant.grappled_by = None;
            }
        }
        threat::forget(&mut self.state.roster, id);
        self.state.roster.remove(id);
        if let Some(session) = self.state.encounter.session.as_mut() {
            if session.defender == Some(id) {
                session.defender = None;
            }
        }

        if !self.state.encounter.is_active() {
            return;
        }
        if was_player {
            self.conclude(EncounterOutcome::Defeat);
        } else if let Some(outcome) = self.decided_outcome() {
            self.conclude(outcome);
        }
    }

    /// Outcome if at most one team is left in initiative.
    fn decided_outcome(&self) -> Option<EncounterOutcome> {
        let encounter = &self.state.encounter;
        let entries = encounter.tracker.entries();
        let player_alive = entries.iter().any(|entry| entry.is_player);
        if encounter.player_involved && !player_alive {
            return Some(EncounterOutcome::Defeat);
        }
        let teams: BTreeSet<_> = entries
            .iter()
            .filter_map(|entry| self.state.roster.get(entry.entity).map(|c| c.team))
            .collect();
        if teams.len() > 1 {
            return None;
        }
        Some(if player_alive {
            EncounterOutcome::Victory
        } else {
            EncounterOutcome::Ended
        })
    }

    /// Turns a missing reference raised inside a live encounter into an
    /// aborted encounter; every other result passes through.
    pub(super) fn contain(
        &mut self,
        result: Result<Advance, CombatError>,
    ) -> Result<Advance, CombatError> {
        match result {
            Err(CombatError::MissingReference(missing)) if self.state.encounter.is_active() => {
                Ok(self.abort(missing))
            }
            other => other,
        }
    }

    pub(super) fn abort(&mut self, missing: MissingReference) -> Advance {
        tracing::error!(%missing, "missing reference; ending encounter");
        Advance::Ended(self.conclude(EncounterOutcome::Aborted))
    }

    fn conclude(&mut self, outcome: EncounterOutcome) -> EncounterOutcome {
        for combatant in self.state.roster.iter_mut() {
            combatant.clear_encounter_state();
        }
        let encounter = &mut self.state.encounter;
        encounter.tracker.clear();
        encounter.session = None;
        encounter.gate = Default::default();
        if !encounter.is_active() {
            return encounter.outcome.unwrap_or(outcome);
        }

        let from = encounter.phase;
        encounter.phase = CombatPhase::Ended;
        encounter.outcome = Some(outcome);
        self.state.emit(CombatEvent::PhaseChanged {
            from,
            to: CombatPhase::Ended,
        });
        if outcome == EncounterOutcome::Defeat {
            tracing::warn!("player died; game over");
            self.state.emit(CombatEvent::GameOver);
        }
        tracing::info!(%outcome, "encounter ended");
        self.state.emit(CombatEvent::EncounterEnded { outcome });
        outcome
    }

    pub(super) fn outcome_advance(&self) -> Advance {
        Advance::Ended(
            self.state
                .encounter
                .outcome
                .unwrap_or(EncounterOutcome::Ended),
        )
    }
}
