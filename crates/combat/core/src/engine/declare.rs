//! Declarations: validation and the point costs they carry.
//!
//! Every `prepare_*` check runs before any state changes, so a rejected
//! declaration leaves the encounter exactly as it was.

use super::{Advance, Awaiting, CombatEngine, CombatError, CombatEvent, CombatPhase};
use super::MissingReference;
use crate::action::{
    ActionType, AttackDeclaration, AttackKind, FireMode, Hand, PendingCombatAction,
    PlayerCommand, Rejection, TargetRef,
};
use crate::combat::{DefenseKind, best_defense, legalize};
use crate::env::{CombatEnv, EffectCue, FireModes};
use crate::state::{BodyPart, Combatant, EntityId, Position};

/// A validated attack ready to be committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct PreparedAttack {
    pub pending: PendingCombatAction,
    pub target_position: Position,
    pub volley: u32,
    pub consumes_ammo: bool,
}

/// Where an attack went after commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum AttackFlow {
    Resolved,
    /// Parked in `PlayerDefenseDeclare`.
    AwaitingDefense,
}

impl CombatEngine<'_> {
    /// Applies one player command during the player's turn.
    ///
    /// Rejections are returned as [`CombatError::InvalidAction`] with the
    /// encounter unchanged, so the host can re-prompt. When the player runs
    /// out of points the turn ends on its own.
    pub fn command(
        &mut self,
        env: CombatEnv<'_>,
        command: PlayerCommand,
    ) -> Result<Advance, CombatError> {
        let result = self.apply_command(env, command);
        self.contain(result)
    }

    fn apply_command(
        &mut self,
        env: CombatEnv<'_>,
        command: PlayerCommand,
    ) -> Result<Advance, CombatError> {
        if self.state.encounter.phase != CombatPhase::PlayerAttackDeclare {
            return Err(Rejection::NotAwaitingDeclaration.into());
        }
        let actor = self.session()?.actor;

        let result = match command {
            PlayerCommand::Attack(declaration) => self
                .prepare_attack(env, actor, &declaration)
                .and_then(|prepared| {
                    self.transition(CombatPhase::AttackerDeclare)?;
                    self.commit_attack(env, prepared)
                })
                .map(|_| ()),
            PlayerCommand::Move { toward } => self.step_toward(env, actor, toward),
            PlayerCommand::Reload { hand } => self.reload(env, actor, hand),
            PlayerCommand::Grapple { target } => self.grapple(actor, target),
            PlayerCommand::EndTurn => return self.finish_turn(true),
        };
        if let Err(error) = result {
            self.note_rejection(actor, &error);
            return Err(error);
        }

        if let Some(ended) = self.ended() {
            return Ok(ended);
        }
        if self.state.encounter.phase == CombatPhase::PlayerDefenseDeclare {
            return self.awaiting_defense();
        }
        let exhausted = self
            .state
            .roster
            .get(actor)
            .is_none_or(|player| player.points.exhausted());
        if exhausted {
            return self.finish_turn(false);
        }
        self.transition(CombatPhase::PlayerAttackDeclare)?;
        Ok(Advance::AwaitingPlayer(Awaiting::Command { actor }))
    }

    /// Resolves the parked attack on the player with the declared defense,
    /// then lets the attacking NPC carry on with its turn.
    pub fn declare_defense(
        &mut self,
        env: CombatEnv<'_>,
        requested: DefenseKind,
    ) -> Result<Advance, CombatError> {
        let result = self.resolve_defense(env, requested);
        self.contain(result)
    }

    fn resolve_defense(
        &mut self,
        env: CombatEnv<'_>,
        requested: DefenseKind,
    ) -> Result<Advance, CombatError> {
        if self.state.encounter.phase != CombatPhase::PlayerDefenseDeclare {
            return Err(Rejection::NotAwaitingDeclaration.into());
        }
        let Some(defender_id) = self.session()?.defender else {
            return Ok(self.abort(MissingReference::PendingAction));
        };
        let Some(pending) = self.session()?.pending else {
            return Ok(self.abort(MissingReference::PendingAction));
        };
        let Some(defender) = self.state.roster.get(defender_id) else {
            return Ok(self.abort(MissingReference::Combatant(defender_id)));
        };

        let holds_melee = holds_melee_weapon(env, defender);
        let defense = match legalize(requested, &pending.attack, holds_melee) {
            Ok(defense) => defense,
            Err(rejection) => {
                self.state.emit(CombatEvent::Rejected {
                    actor: defender_id,
                    reason: rejection.clone(),
                });
                return Err(rejection.into());
            }
        };

        self.transition(CombatPhase::DefenderDeclare)?;
        self.resolve_single(env, defense)?;
        self.run_npc(env)
    }

    pub(super) fn note_rejection(&mut self, actor: EntityId, error: &CombatError) {
        if let Some(reason) = error.rejection() {
            tracing::debug!(%actor, %reason, "declaration rejected");
            self.state.emit(CombatEvent::Rejected {
                actor,
                reason: reason.clone(),
            });
        }
    }

    /// Checks an attack declaration against the actor's turn, points,
    /// weapons, ammunition, target and range.
    pub(super) fn prepare_attack(
        &self,
        env: CombatEnv<'_>,
        actor: EntityId,
        declaration: &AttackDeclaration,
    ) -> Result<PreparedAttack, CombatError> {
        let session = self.session()?;
        if session.actor != actor {
            return Err(Rejection::NotYourTurn { actor }.into());
        }
        let attacker = self
            .state
            .roster
            .get(actor)
            .ok_or(MissingReference::Combatant(actor))?;
        if attacker.points.action == 0 {
            return Err(Rejection::NoActionPoints.into());
        }

        let slot = match declaration.hand {
            Hand::Main => attacker.loadout.main_hand,
            Hand::Off => {
                let slot = attacker
                    .loadout
                    .off_hand
                    .ok_or(Rejection::NoOffHandWeapon)?;
                if !session.main_attack_made {
                    return Err(Rejection::OffHandWithoutMainAttack.into());
                }
                Some(slot)
            }
        };
        let weapon = slot.map(|slot| env.weapon(slot.weapon)).transpose()?;
        let attack = AttackKind::classify(weapon.as_ref());

        if declaration.fire_mode != FireMode::Single {
            let modes = weapon.as_ref().map_or(FireModes::empty(), |w| w.fire_modes);
            if !modes.contains(declaration.fire_mode.flag()) {
                return Err(Rejection::FireModeUnsupported.into());
            }
        }

        let config = &self.state.config;
        let mut volley = match declaration.fire_mode {
            FireMode::Single => 1,
            FireMode::Burst => config.burst_count,
            FireMode::Automatic => config.auto_count,
        };
        let consumes_ammo = weapon.as_ref().is_some_and(|w| w.magazine.is_some());
        if consumes_ammo {
            let loaded = slot.map_or(0, |slot| slot.loaded);
            if loaded == 0 {
                return Err(Rejection::OutOfAmmo.into());
            }
            volley = volley.min(loaded);
        }

        let target_position = match declaration.target {
            TargetRef::Entity(id) => {
                let target = self
                    .state
                    .roster
                    .get(id)
                    .filter(|_| self.state.encounter.tracker.contains(id))
                    .ok_or(Rejection::TargetNotInEncounter { target: id })?;
                if !attacker.is_hostile_to(target) {
                    return Err(Rejection::TargetNotHostile { target: id }.into());
                }
                target.position
            }
            TargetRef::Tile(position) => {
                if !attack.is_explosive() {
                    return Err(Rejection::NeedsCreatureTarget.into());
                }
                position
            }
        };

        if attack.is_close_combat() {
            if !attacker.position.within(target_position, config.melee_reach) {
                return Err(Rejection::OutOfRange.into());
            }
        } else if !env.can_see(attacker.position, target_position) {
            return Err(Rejection::NoLineOfSight.into());
        }

        Ok(PreparedAttack {
            pending: PendingCombatAction {
                actor,
                target: declaration.target,
                weapon: slot.map(|slot| slot.weapon),
                attack,
                body_part: declaration.body_part,
                fire_mode: declaration.fire_mode,
                hand: declaration.hand,
                action_type: ActionType::Attack,
            },
            target_position,
            volley,
            consumes_ammo,
        })
    }

    /// Pays for a prepared attack and runs it through resolution, or parks
    /// for the player's defense.
    pub(super) fn commit_attack(
        &mut self,
        env: CombatEnv<'_>,
        prepared: PreparedAttack,
    ) -> Result<AttackFlow, CombatError> {
        let PreparedAttack {
            pending,
            target_position,
            volley,
            consumes_ammo,
        } = prepared;

        let attacker = self
            .state
            .roster
            .get_mut(pending.actor)
            .ok_or(MissingReference::Combatant(pending.actor))?;
        attacker.points.action = attacker.points.action.saturating_sub(1);
        if consumes_ammo {
            if let Some(slot) = attacker.loadout.slot_mut(pending.hand) {
                slot.loaded = slot.loaded.saturating_sub(volley);
            }
        }
        let from = attacker.position;

        let session = self.session_mut()?;
        session.clear_declaration();
        session.pending = Some(pending);
        session.volley = volley;
        session.defender = pending.target.entity();
        if pending.hand == Hand::Main {
            session.main_attack_made = true;
        }

        tracing::debug!(
            actor = %pending.actor,
            target = ?pending.target,
            attack = ?pending.attack,
            volley,
            "attack declared"
        );
        env.cue(if pending.attack.is_close_combat() {
            EffectCue::MeleeSwing {
                actor: pending.actor,
                at: target_position,
            }
        } else {
            EffectCue::Projectile {
                from,
                to: target_position,
            }
        });

        if let AttackKind::Explosive {
            delivery,
            radius_tiles,
            explodes_on_impact,
            ..
        } = pending.attack
        {
            self.resolve_blast(env, delivery, radius_tiles, explodes_on_impact)?;
            return Ok(AttackFlow::Resolved);
        }

        let defender_id = pending
            .target
            .entity()
            .ok_or(MissingReference::PendingAction)?;
        let defender = self
            .state
            .roster
            .get(defender_id)
            .ok_or(MissingReference::Combatant(defender_id))?;

        if defender.is_player() && pending.attack.allows_active_defense() {
            self.transition(CombatPhase::PlayerDefenseDeclare)?;
            return Ok(AttackFlow::AwaitingDefense);
        }

        let holds_melee = holds_melee_weapon(env, defender);
        let cover = self.defender_cover(env, defender_id);
        let defense = self
            .state
            .roster
            .get(defender_id)
            .map_or(DefenseKind::None, |defender| {
                best_defense(defender, &pending.attack, holds_melee, cover)
            });
        self.transition(CombatPhase::DefenderDeclare)?;
        self.resolve_single(env, defense)?;
        Ok(AttackFlow::Resolved)
    }

    /// Moves rounds from reserve into the magazine for one action point.
    pub(super) fn reload(
        &mut self,
        env: CombatEnv<'_>,
        actor: EntityId,
        hand: Hand,
    ) -> Result<(), CombatError> {
        let combatant = self
            .state
            .roster
            .get(actor)
            .ok_or(MissingReference::Combatant(actor))?;
        if combatant.points.action == 0 {
            return Err(Rejection::NoActionPoints.into());
        }
        let slot = *combatant.loadout.slot(hand).ok_or(match hand {
            Hand::Main => Rejection::NoWeapon,
            Hand::Off => Rejection::NoOffHandWeapon,
        })?;
        let capacity = env
            .weapon(slot.weapon)?
            .magazine
            .ok_or(Rejection::NotReloadable)?;
        if slot.loaded >= capacity {
            return Err(Rejection::MagazineFull.into());
        }
        if slot.reserve == 0 {
            return Err(Rejection::OutOfAmmo.into());
        }
        let pending = PendingCombatAction {
            actor,
            target: TargetRef::Entity(actor),
            weapon: Some(slot.weapon),
            attack: AttackKind::Unarmed,
            body_part: BodyPart::Torso,
            fire_mode: FireMode::Single,
            hand,
            action_type: ActionType::Reload,
        };
        self.transition(CombatPhase::Reload)?;
        self.session_mut()?.pending = Some(pending);

        let combatant = self
            .state
            .roster
            .get_mut(actor)
            .ok_or(MissingReference::Combatant(actor))?;
        combatant.points.action -= 1;
        let (loaded, reserve) = match combatant.loadout.slot_mut(hand) {
            Some(slot) => {
                let moved = (capacity - slot.loaded).min(slot.reserve);
                slot.loaded += moved;
                slot.reserve -= moved;
                (slot.loaded, slot.reserve)
            }
            None => (0, 0),
        };
        self.session_mut()?.pending = None;

        tracing::debug!(%actor, ?hand, loaded, reserve, "reloaded");
        self.state.emit(CombatEvent::Reloaded {
            actor,
            hand,
            loaded,
            reserve,
        });
        Ok(())
    }

    /// Grabs an adjacent hostile, or lets go of the one already held.
    pub(super) fn grapple(&mut self, actor: EntityId, target: EntityId) -> Result<(), CombatError> {
        let grappler = self
            .state
            .roster
            .get(actor)
            .ok_or(MissingReference::Combatant(actor))?;
        if grappler.points.action == 0 {
            return Err(Rejection::NoActionPoints.into());
        }
        let victim = self
            .state
            .roster
            .get(target)
            .filter(|_| self.state.encounter.tracker.contains(target))
            .ok_or(Rejection::TargetNotInEncounter { target })?;
        if !grappler.is_hostile_to(victim) {
            return Err(Rejection::TargetNotHostile { target }.into());
        }
        let releasing = grappler.grappling == Some(target);
        if !releasing
            && !grappler
                .position
                .within(victim.position, self.state.config.melee_reach)
        {
            return Err(Rejection::GrappleOutOfReach.into());
        }
        let previous = grappler.grappling.filter(|held| *held != target);

        self.transition(CombatPhase::Grapple)?;
        self.session_mut()?.pending = Some(PendingCombatAction {
            actor,
            target: TargetRef::Entity(target),
            weapon: None,
            attack: AttackKind::Unarmed,
            body_part: BodyPart::Torso,
            fire_mode: FireMode::Single,
            hand: Hand::Main,
            action_type: ActionType::Grapple,
        });

        if let Some(grappler) = self.state.roster.get_mut(actor) {
            grappler.points.action -= 1;
        }
        if let Some(previous) = previous {
            self.release_grapple(actor, previous);
        }
        if releasing {
            self.release_grapple(actor, target);
        } else {
            if let Some(grappler) = self.state.roster.get_mut(actor) {
                grappler.grappling = Some(target);
            }
            if let Some(victim) = self.state.roster.get_mut(target) {
                victim.grappled_by = Some(actor);
            }
            tracing::debug!(%actor, %target, "grapple established");
            self.state
                .emit(CombatEvent::GrappleStarted { actor, target });
        }
        self.session_mut()?.pending = None;
        Ok(())
    }

    fn release_grapple(&mut self, actor: EntityId, target: EntityId) {
        if let Some(grappler) = self.state.roster.get_mut(actor) {
            grappler.grappling = None;
        }
        if let Some(victim) = self.state.roster.get_mut(target) {
            if victim.grappled_by == Some(actor) {
                victim.grappled_by = None;
            }
        }
        tracing::debug!(%actor, %target, "grapple released");
        self.state
            .emit(CombatEvent::GrappleReleased { actor, target });
    }

    /// Breaks every grapple `mover` takes part in.
    pub(super) fn break_grapples(&mut self, mover: EntityId) {
        let Some(combatant) = self.state.roster.get(mover) else {
            return;
        };
        let held = combatant.grappling;
        let holder = combatant.grappled_by;
        if let Some(target) = held {
            self.release_grapple(mover, target);
        }
        if let Some(holder) = holder {
            self.release_grapple(holder, mover);
        }
    }

    /// Takes one step toward `destination`, paying `1 + door cost` movement
    /// points.
    pub(super) fn step_toward(
        &mut self,
        env: CombatEnv<'_>,
        actor: EntityId,
        destination: Position,
    ) -> Result<(), CombatError> {
        let combatant = self
            .state
            .roster
            .get(actor)
            .ok_or(MissingReference::Combatant(actor))?;
        if combatant.points.movement == 0 {
            return Err(Rejection::NoMovementPoints.into());
        }
        let from = combatant.position;
        let occupied = self.state.roster.occupied_tiles(actor);
        let step = env
            .pathing()?
            .next_step(from, destination, &occupied)
            .ok_or(Rejection::PathBlocked)?;
        let cost = step.cost();
        if cost > combatant.points.movement {
            return Err(Rejection::NoMovementPoints.into());
        }

        self.break_grapples(actor);
        self.relocate(actor, step.position);
        if let Some(combatant) = self.state.roster.get_mut(actor) {
            combatant.points.movement -= cost;
        }
        tracing::trace!(%actor, %from, to = %step.position, cost, "moved");
        self.state.emit(CombatEvent::Moved {
            actor,
            from,
            to: step.position,
            cost,
        });
        Ok(())
    }

    /// Puts `actor` on `to`, invalidating position-dependent caches.
    pub(super) fn relocate(&mut self, actor: EntityId, to: Position) {
        if let Some(combatant) = self.state.roster.get_mut(actor) {
            combatant.position = to;
            combatant.moved_this_turn = true;
            combatant.cached_cover = None;
            combatant.memory.visit(to);
        }
    }
}

/// True if either hand holds a melee-tagged weapon.
pub(super) fn holds_melee_weapon(env: CombatEnv<'_>, combatant: &Combatant) -> bool {
    combatant
        .loadout
        .held()
        .any(|slot| env.weapon(slot.weapon).is_ok_and(|weapon| weapon.is_melee()))
}
