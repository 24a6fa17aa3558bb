//! NPC turns: the bounded AI loop and out-of-combat exploration.

use super::declare::AttackFlow;
use super::resolve::DamageSpec;
use super::{
    Advance, AiTurnState, CombatEngine, CombatError, CombatEvent, CombatPhase, MissingReference,
};
use crate::action::Rejection;
use crate::ai::{self, AiContext, ExploreChoice, NpcStep, StopReason, should_take_fall};
use crate::combat::{DamageType, roll_fall_damage};
use crate::env::{CombatEnv, Dice, DropOption};
use crate::state::{BodyPart, EntityId};

impl CombatEngine<'_> {
    /// Runs the current NPC's turn until it stops, runs dry, hits the loop
    /// cap or attacks the player (which parks for the player's defense).
    pub(super) fn run_npc(&mut self, env: CombatEnv<'_>) -> Result<Advance, CombatError> {
        let cap = self.state.config.ai_loop_cap;
        loop {
            if let Some(ended) = self.ended() {
                return Ok(ended);
            }
            let actor = self.session()?.actor;
            let Some(npc) = self.state.roster.get(actor) else {
                break;
            };
            if npc.points.exhausted() {
                tracing::trace!(%actor, reason = ?StopReason::OutOfPoints, "npc stops");
                break;
            }
            let ai = &mut self.session_mut()?.ai;
            ai.iterations += 1;
            if ai.iterations > cap {
                tracing::warn!(%actor, cap, reason = ?StopReason::LoopCap, "npc loop cap reached");
                break;
            }

            self.transition(CombatPhase::AttackerDeclare)?;
            let decision = self.think(env, actor)?;
            if let Some(npc) = self.state.roster.get_mut(actor) {
                npc.memory.target = decision.target;
                if let Some(seen) = decision.sighting {
                    npc.memory.remember_sighting(seen.target, seen.position, seen.round);
                }
            }
            tracing::debug!(%actor, step = ?decision.step, "npc decision");

            match decision.step {
                NpcStep::Attack(declaration) => {
                    let flow = self
                        .prepare_attack(env, actor, &declaration)
                        .and_then(|prepared| self.commit_attack(env, prepared));
                    match flow {
                        Ok(AttackFlow::AwaitingDefense) => return self.awaiting_defense(),
                        Ok(AttackFlow::Resolved) => {}
                        Err(error) => {
                            self.absorb(actor, error, |ai| ai.attack_blocked = true)?;
                        }
                    }
                }
                NpcStep::Reload(hand) => {
                    if let Err(error) = self.reload(env, actor, hand) {
                        self.absorb(actor, error, |ai| ai.reload_blocked = true)?;
                    }
                }
                NpcStep::Drop(option) => match self.take_drop(env, actor, option) {
                    Ok(_) => {}
                    Err(error) => self.absorb(actor, error, |ai| ai.drop_declined = true)?,
                },
                NpcStep::Move { toward } => match self.step_toward(env, actor, toward) {
                    Ok(()) => {
                        if let Ok(session) = self.session_mut() {
                            session.ai.attack_blocked = false;
                        }
                    }
                    Err(error) => self.absorb(actor, error, |ai| ai.move_blocked = true)?,
                },
                NpcStep::Stop(reason) => {
                    tracing::trace!(%actor, ?reason, "npc stops");
                    break;
                }
            }
        }
        self.finish_turn(false)
    }

    fn think(&mut self, env: CombatEnv<'_>, actor: EntityId) -> Result<ai::Decision, CombatError> {
        let rng = env.rng()?;
        let state = &mut *self.state;
        let npc = state
            .roster
            .get(actor)
            .ok_or(MissingReference::Combatant(actor))?;
        let turn = state
            .encounter
            .session
            .as_ref()
            .map(|session| session.ai)
            .unwrap_or_default();
        let ctx = AiContext::new(
            npc,
            &state.roster,
            &state.encounter.tracker,
            &state.config,
            env,
        );
        let mut dice = Dice::new(rng, &mut state.cursor);
        Ok(ai::decide(&ctx, &turn, &mut dice)?)
    }

    /// Turns a rejection into "try something else"; anything else propagates.
    fn absorb(
        &mut self,
        actor: EntityId,
        error: CombatError,
        mark: impl FnOnce(&mut AiTurnState),
    ) -> Result<(), CombatError> {
        if error.rejection().is_none() {
            return Err(error);
        }
        self.note_rejection(actor, &error);
        // Nothing from a refused declaration survives.
        if let Ok(session) = self.session_mut() {
            session.pending = None;
            mark(&mut session.ai);
        }
        Ok(())
    }

    /// Voluntary drop off a ledge for one movement point.
    ///
    /// Gated by the willpower check; a refusal is recorded and costs nothing.
    /// Landing deals `(h - 1)d6` to a random leg, ignoring armor.
    pub(super) fn take_drop(
        &mut self,
        env: CombatEnv<'_>,
        actor: EntityId,
        option: DropOption,
    ) -> Result<bool, CombatError> {
        let rng = env.rng()?;
        let state = &mut *self.state;
        let npc = state
            .roster
            .get(actor)
            .ok_or(MissingReference::Combatant(actor))?;
        if npc.points.movement == 0 {
            return Err(Rejection::NoMovementPoints.into());
        }
        let from = npc.position;
        let mut dice = Dice::new(rng, &mut state.cursor);
        let check = should_take_fall(npc, option.fall_height, &mut dice);

        if !check.accepted {
            self.state.emit(CombatEvent::FallRefused {
                actor,
                fall_height: option.fall_height,
                roll: check.roll,
                difficulty: check.difficulty,
            });
            if let Ok(session) = self.session_mut() {
                session.ai.drop_declined = true;
            }
            return Ok(false);
        }

        self.break_grapples(actor);
        self.relocate(actor, option.landing);
        if let Some(npc) = self.state.roster.get_mut(actor) {
            npc.points.movement -= 1;
        }
        tracing::debug!(%actor, %from, to = %option.landing, height = option.fall_height, "dropped");
        self.state.emit(CombatEvent::Dropped {
            actor,
            from,
            to: option.landing,
            fall_height: option.fall_height,
        });

        if option.fall_height > 1 {
            let mut dice = Dice::new(rng, &mut self.state.cursor);
            let leg = if dice.roll(2) == 1 {
                BodyPart::LeftLeg
            } else {
                BodyPart::RightLeg
            };
            let raw = roll_fall_damage(option.fall_height, &mut dice);
            self.apply_damage(DamageSpec {
                target: actor,
                source: None,
                part: leg,
                raw,
                damage_type: DamageType::Fall,
                armored: false,
                force_destroy: false,
            });
        }
        Ok(true)
    }

    /// One free step of non-combat behaviour for `npc`.
    ///
    /// Outside encounters there is no point economy; the step is taken if the
    /// pathing collaborator offers one.
    pub fn explore_step(
        &mut self,
        env: CombatEnv<'_>,
        npc: EntityId,
    ) -> Result<ExploreChoice, CombatError> {
        if self.state.encounter.tracker.contains(npc) {
            return Err(CombatError::EncounterInProgress);
        }
        let rng = env.rng()?;
        let state = &mut *self.state;
        let me = state
            .roster
            .get(npc)
            .ok_or(MissingReference::Combatant(npc))?;
        let from = me.position;
        let ctx = AiContext::new(
            me,
            &state.roster,
            &state.encounter.tracker,
            &state.config,
            env,
        );
        let mut dice = Dice::new(rng, &mut state.cursor);
        let choice = ai::explore_choice(&ctx, &mut dice);

        if let Some(me) = self.state.roster.get_mut(npc) {
            me.memory.exploration_target = choice.destination();
        }
        let Some(destination) = choice.destination().filter(|at| *at != from) else {
            return Ok(choice);
        };
        let occupied = self.state.roster.occupied_tiles(npc);
        let Some(step) = env.pathing()?.next_step(from, destination, &occupied) else {
            tracing::trace!(%npc, ?choice, "no path; staying put");
            return Ok(choice);
        };
        self.relocate(npc, step.position);
        self.state.emit(CombatEvent::Moved {
            actor: npc,
            from,
            to: step.position,
            cost: step.cost(),
        });
        Ok(choice)
    }
}
