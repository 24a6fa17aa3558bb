//! Roll resolution and damage application.

use super::{CombatEngine, CombatError, CombatEvent, CombatPhase, MissingReference};
use crate::action::{Delivery, PendingCombatAction, TargetRef};
use crate::combat::area::{dodge_succeeds, roll_blast_dodge};
use crate::combat::{
    AttackInputs, DamageType, DefenseInputs, DefenseKind, Exposure, Hit, WoundOutcome, affected,
    apply_wound, cover_bonus, decide, mitigate, plan_blast, roll_attack, roll_defense,
    roll_unarmed_damage, roll_weapon_damage, threat,
};
use crate::env::{AmbientLight, CombatEnv, Dice, EffectCue, WeaponData};
use crate::state::{BodyPart, EntityId, Position, Skill};

/// One batch of damage headed for one body part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct DamageSpec {
    pub target: EntityId,
    pub source: Option<EntityId>,
    pub part: BodyPart,
    pub raw: u32,
    pub damage_type: DamageType,
    /// Falls bypass armor.
    pub armored: bool,
    pub force_destroy: bool,
}

impl CombatEngine<'_> {
    /// Rolls the pending attack (every projectile of the volley) against one
    /// defense roll and applies the hits to the declared body part.
    pub(super) fn resolve_single(
        &mut self,
        env: CombatEnv<'_>,
        defense_kind: DefenseKind,
    ) -> Result<(), CombatError> {
        let session = self.session_mut()?;
        let pending = session
            .pending
            .take()
            .ok_or(MissingReference::PendingAction)?;
        let volley = session.volley.max(1);
        let defender_id = session.defender.ok_or(MissingReference::PendingAction)?;

        self.transition(CombatPhase::DefenderDeclare)?;
        let cover = self.defender_cover(env, defender_id);
        let weapon = pending.weapon.map(|id| env.weapon(id)).transpose()?;
        let rng = env.rng()?;

        let roster = &self.state.roster;
        let attacker = roster
            .get(pending.actor)
            .ok_or(MissingReference::Combatant(pending.actor))?;
        let defender = roster
            .get(defender_id)
            .ok_or(MissingReference::Combatant(defender_id))?;
        let attack_inputs = AttackInputs::for_attacker(
            attacker,
            pending.attack,
            pending.body_part,
            pending.fire_mode,
            pending.hand,
        )
        .at_distance_squared(attacker.position.distance_squared(defender.position))
        .in_darkness(in_darkness(env, defender.position));
        let defense_inputs = DefenseInputs::for_defender(defender, defense_kind, cover);
        let unarmed = attacker.skill_modifier(Skill::Unarmed);

        self.transition(CombatPhase::ResolveRolls)?;
        let mut dice = Dice::new(rng, &mut self.state.cursor);
        let defense = roll_defense(&defense_inputs, &mut dice);
        let mut exchanges = Vec::with_capacity(volley as usize);
        let mut hits = Vec::new();
        for _ in 0..volley {
            let attack = roll_attack(&attack_inputs, &mut dice);
            let verdict = decide(&attack, &defense);
            if verdict.hit {
                hits.push(roll_damage(weapon.as_ref(), unarmed, &mut dice));
            }
            exchanges.push((attack, verdict));
        }

        for (attack, verdict) in exchanges {
            tracing::debug!(
                attacker = %pending.actor,
                defender = %defender_id,
                attack = attack.total,
                defense = defense.total,
                hit = verdict.hit,
                decided_by = ?verdict.decided_by,
                "attack resolved"
            );
            self.state.emit(CombatEvent::AttackResolved {
                attacker: pending.actor,
                defender: defender_id,
                attack,
                defense_kind,
                defense: defense.clone(),
                verdict,
            });
        }

        self.transition(CombatPhase::ApplyDamage)?;
        let damage_type = weapon
            .as_ref()
            .map_or(DamageType::Physical, |w| w.damage_type);
        for raw in hits {
            if !self.state.roster.contains(defender_id) || self.ended().is_some() {
                break;
            }
            self.apply_damage(DamageSpec {
                target: defender_id,
                source: Some(pending.actor),
                part: pending.body_part,
                raw,
                damage_type,
                armored: true,
                force_destroy: false,
            });
        }
        Ok(())
    }

    /// Resolves an explosive: throw or shot against the primary target, then
    /// torso damage to every combatant inside the radius.
    pub(super) fn resolve_blast(
        &mut self,
        env: CombatEnv<'_>,
        delivery: Delivery,
        radius: u32,
        explodes_on_impact: bool,
    ) -> Result<(), CombatError> {
        let pending = self
            .session_mut()?
            .pending
            .take()
            .ok_or(MissingReference::PendingAction)?;
        let PendingCombatAction { actor, target, .. } = pending;
        let weapon = pending.weapon.map(|id| env.weapon(id)).transpose()?;
        let rng = env.rng()?;

        let primary = target.entity();
        let impact = match target {
            TargetRef::Entity(id) => self
                .state
                .roster
                .get(id)
                .map(|c| c.position)
                .ok_or(MissingReference::Combatant(id))?,
            TargetRef::Tile(position) => position,
        };

        self.transition(CombatPhase::DefenderDeclare)?;
        let cover = primary.map_or(0, |id| self.defender_cover(env, id));
        let attacker = self
            .state
            .roster
            .get(actor)
            .ok_or(MissingReference::Combatant(actor))?;
        let attack_inputs = AttackInputs::for_attacker(
            attacker,
            pending.attack,
            BodyPart::Torso,
            pending.fire_mode,
            pending.hand,
        )
        .at_distance_squared(attacker.position.distance_squared(impact))
        .in_darkness(in_darkness(env, impact));
        let passive = primary
            .and_then(|id| self.state.roster.get(id))
            .map(|primary| DefenseInputs::for_defender(primary, DefenseKind::None, cover));

        self.transition(CombatPhase::ResolveRolls)?;
        let mut dice = Dice::new(rng, &mut self.state.cursor);
        let throw = roll_attack(&attack_inputs, &mut dice);
        let mut struck = false;
        if let (Some(primary), Some(passive)) = (primary, passive) {
            let defense = roll_defense(&passive, &mut dice);
            let verdict = decide(&throw, &defense);
            struck = verdict.hit;
            self.state.emit(CombatEvent::AttackResolved {
                attacker: actor,
                defender: primary,
                attack: throw.clone(),
                defense_kind: DefenseKind::None,
                defense,
                verdict,
            });
        }

        env.cue(EffectCue::Explosion { at: impact, radius });
        let caught = affected(&self.state.roster, impact, radius);
        tracing::info!(
            %actor,
            at = %impact,
            radius,
            struck,
            affected = caught.len(),
            "explosion"
        );
        self.state.emit(CombatEvent::Exploded {
            at: impact,
            radius,
            affected: caught.clone(),
        });

        self.transition(CombatPhase::ApplyDamage)?;
        let damage_type = weapon.as_ref().map_or(DamageType::Blast, |w| w.damage_type);
        for exposure in plan_blast(&caught, primary, struck, delivery) {
            if self.ended().is_some() {
                break;
            }
            let Some(victim) = self.state.roster.get(exposure.target) else {
                continue;
            };
            let mut dice = Dice::new(rng, &mut self.state.cursor);
            if exposure.exposure == Exposure::Dodgeable {
                let dodge = roll_blast_dodge(victim, &mut dice);
                if dodge_succeeds(&dodge, &throw) {
                    tracing::debug!(target = %exposure.target, "blast dodged");
                    self.state.emit(CombatEvent::BlastDodged {
                        target: exposure.target,
                        dodge,
                    });
                    continue;
                }
            }
            let raw = weapon
                .as_ref()
                .map_or(0, |w| roll_weapon_damage(&w.damage, &mut dice));
            self.apply_damage(DamageSpec {
                target: exposure.target,
                source: Some(actor),
                part: BodyPart::Torso,
                raw,
                damage_type,
                armored: true,
                force_destroy: explodes_on_impact && exposure.exposure == Exposure::Direct,
            });
        }
        Ok(())
    }

    /// Mitigates, wounds, records threat and handles death for one hit.
    pub(super) fn apply_damage(&mut self, spec: DamageSpec) -> Option<WoundOutcome> {
        let crisis_turns = self.state.config.crisis_turns;
        let target = self.state.roster.get_mut(spec.target)?;
        let armor = if spec.armored {
            target.armor.for_part(spec.part)
        } else {
            0
        };
        let effective = mitigate(spec.raw, armor);
        let outcome = apply_wound(
            &mut target.body,
            Hit {
                part: spec.part,
                effective,
                damage_type: spec.damage_type,
                force_destroy: spec.force_destroy,
            },
            crisis_turns,
        );

        tracing::debug!(
            target = %spec.target,
            part = %spec.part,
            raw = spec.raw,
            effective,
            ?outcome,
            "damage applied"
        );
        self.state.emit(CombatEvent::DamageApplied {
            target: spec.target,
            source: spec.source,
            part: spec.part,
            damage_type: spec.damage_type,
            raw: spec.raw,
            effective,
            outcome,
        });
        if outcome == WoundOutcome::EnteredCrisis {
            self.state.emit(CombatEvent::CrisisEntered {
                target: spec.target,
                part: spec.part,
                damage_type: spec.damage_type,
            });
        }

        if let Some(attacker) = spec.source.filter(|source| *source != spec.target) {
            if effective > 0 {
                let recipients =
                    threat::record_hit(&mut self.state.roster, spec.target, attacker, effective);
                if self.state.roster.contains(attacker) {
                    self.state.emit(CombatEvent::AggroShared {
                        victim: spec.target,
                        attacker,
                        amount: effective,
                        recipients,
                    });
                }
            }
        }

        if let WoundOutcome::Killed(cause) = outcome {
            self.kill(spec.target, cause);
        }
        Some(outcome)
    }

    /// Cover bonus at the defender's tile, cached until the defender moves.
    pub(super) fn defender_cover(&mut self, env: CombatEnv<'_>, defender: EntityId) -> i32 {
        let Some(combatant) = self.state.roster.get_mut(defender) else {
            return 0;
        };
        if let Some(cover) = combatant.cached_cover {
            return cover;
        }
        let cover = match env.tiles() {
            Ok(tiles) => cover_bonus(tiles, combatant.position),
            Err(error) => {
                tracing::warn!(%error, "no tile oracle; cover treated as 0");
                0
            }
        };
        combatant.cached_cover = Some(cover);
        cover
    }
}

/// Dark ambient light with no light source on the tile.
fn in_darkness(env: CombatEnv<'_>, position: Position) -> bool {
    env.tiles().is_ok_and(|tiles| {
        tiles.ambient_light() == AmbientLight::Dark && !tiles.is_lit(position)
    })
}

fn roll_damage(weapon: Option<&WeaponData>, unarmed: i32, dice: &mut Dice<'_>) -> u32 {
    match weapon {
        Some(weapon) => roll_weapon_damage(&weapon.damage, dice),
        None => roll_unarmed_damage(unarmed, dice),
    }
}
