//! One iteration of the NPC action loop.

use super::explore::explore_choice;
use super::fall::best_drop;
use super::orders::{chase_allowed, engage_allowed, holds_position, regroup};
use super::targeting::acquire_target;
use super::{AiContext, Decision, NpcStep, StopReason};
use crate::action::{AttackDeclaration, AttackKind, Hand};
use crate::engine::AiTurnState;
use crate::env::{Dice, OracleError, WeaponData};
use crate::state::{Combatant, Sighting};

/// Chooses the next step, in priority order: attack (reloading first when
/// the magazine is empty), regroup under orders, a tactical drop, a step
/// toward the target, stop.
///
/// `turn` holds the options already tried and refused this turn, so a
/// rejected step is never proposed twice in a row.
pub fn decide(
    ctx: &AiContext<'_>,
    turn: &AiTurnState,
    dice: &mut Dice<'_>,
) -> Result<Decision, OracleError> {
    let me = ctx.me;
    if me.points.exhausted() {
        return Ok(Decision::stop(me.memory.target, StopReason::OutOfPoints));
    }

    let Some(target) = acquire_target(ctx).and_then(|id| ctx.roster.get(id)) else {
        return Ok(without_target(ctx, turn, dice));
    };
    let mut decision = Decision {
        target: Some(target.id),
        sighting: Some(Sighting {
            target: target.id,
            position: target.position,
            round: ctx.round,
        }),
        step: NpcStep::Stop(StopReason::NothingProductive),
    };

    let weapon = ctx.weapon(Hand::Main)?;
    let attack = AttackKind::classify(weapon.as_ref());
    let in_reach = me.position.within(target.position, ctx.config.melee_reach);
    let feasible = if attack.is_close_combat() {
        in_reach
    } else {
        ctx.env.can_see(me.position, target.position)
    };

    if feasible
        && me.points.action > 0
        && !turn.attack_blocked
        && engage_allowed(ctx, target.position)
    {
        match ammunition(me, weapon.as_ref()) {
            Ammo::Ready => {
                decision.step = NpcStep::Attack(AttackDeclaration::at(target.id));
                return Ok(decision);
            }
            Ammo::NeedsReload if !turn.reload_blocked => {
                decision.step = NpcStep::Reload(Hand::Main);
                return Ok(decision);
            }
            Ammo::NeedsReload | Ammo::Empty => {}
        }
    }

    let can_move = me.points.movement > 0 && !turn.move_blocked;
    if can_move {
        if let Some(anchor) = regroup(ctx) {
            decision.step = NpcStep::Move { toward: anchor };
            return Ok(decision);
        }
    }

    if can_move && !turn.drop_declined && !holds_position(ctx) {
        let options = ctx
            .env
            .pathing()
            .map(|pathing| pathing.drop_options(me.position))
            .unwrap_or_default();
        if let Some(drop) = best_drop(me.position, target.position, &options) {
            decision.step = NpcStep::Drop(drop);
            return Ok(decision);
        }
    }

    if can_move && !in_reach && chase_allowed(ctx, target.position) {
        decision.step = NpcStep::Move {
            toward: target.position,
        };
        return Ok(decision);
    }

    decision.step = NpcStep::Stop(if holds_position(ctx) {
        StopReason::HoldingPosition
    } else {
        StopReason::NothingProductive
    });
    Ok(decision)
}

/// No valid target: chase a fresh sighting, otherwise fall back to
/// exploration for the rest of the turn.
fn without_target(ctx: &AiContext<'_>, turn: &AiTurnState, dice: &mut Dice<'_>) -> Decision {
    let me = ctx.me;
    let can_move = me.points.movement > 0 && !turn.move_blocked && !holds_position(ctx);

    if let Some(sighting) = me.memory.fresh_sighting(ctx.round, ctx.config.memory_ttl_rounds) {
        if can_move && sighting.position != me.position {
            tracing::trace!(npc = %me.id, to = %sighting.position, "chasing last sighting");
            return Decision {
                target: None,
                sighting: None,
                step: NpcStep::Move {
                    toward: sighting.position,
                },
            };
        }
    }

    if can_move {
        if let Some(destination) = explore_choice(ctx, dice)
            .destination()
            .filter(|at| *at != me.position)
        {
            return Decision {
                target: None,
                sighting: None,
                step: NpcStep::Move {
                    toward: destination,
                },
            };
        }
    }
    Decision::stop(None, StopReason::NoTarget)
}

enum Ammo {
    Ready,
    NeedsReload,
    Empty,
}

fn ammunition(me: &Combatant, weapon: Option<&WeaponData>) -> Ammo {
    let tracks_ammo = weapon.is_some_and(|w| w.magazine.is_some());
    match me.loadout.main_hand {
        Some(slot) if tracks_ammo && slot.loaded == 0 => {
            if slot.reserve > 0 {
                Ammo::NeedsReload
            } else {
                Ammo::Empty
            }
        }
        _ => Ammo::Ready,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::engine::{InitiativeEntry, InitiativeTracker};
    use crate::env::{DropOption, RollCursor};
    use crate::state::{EntityId, Position, Roster, Round, WeaponSlot};
    use crate::testing::{PISTOL, ScriptedRng, TestOracles, TestPathing, npc_at, raider_at};

    fn tracker_for(roster: &Roster) -> InitiativeTracker {
        InitiativeTracker::from_entries(
            roster
                .iter()
                .map(|c| InitiativeEntry {
                    entity: c.id,
                    roll: 10,
                    is_player: c.is_player(),
                })
                .collect(),
        )
    }

    fn decide_for(roster: &Roster, oracles: &TestOracles, turn: AiTurnState) -> Decision {
        let tracker = tracker_for(roster);
        let config = CombatConfig::default();
        let ctx = AiContext::new(
            roster.get(EntityId(1)).unwrap(),
            roster,
            &tracker,
            &config,
            oracles.env(),
        );
        let rng = ScriptedRng::default();
        let mut cursor = RollCursor::new(0);
        let mut dice = Dice::new(&rng, &mut cursor);
        decide(&ctx, &turn, &mut dice).unwrap()
    }

    #[test]
    fn adjacent_brawler_attacks() {
        let roster: Roster = [
            npc_at(EntityId(1), Position::flat(0, 0)),
            raider_at(EntityId(2), Position::flat(1, 0)),
        ]
        .into_iter()
        .collect();
        let decision = decide_for(&roster, &TestOracles::default(), AiTurnState::default());

        assert_eq!(decision.target, Some(EntityId(2)));
        assert_eq!(
            decision.step,
            NpcStep::Attack(AttackDeclaration::at(EntityId(2)))
        );
        assert_eq!(decision.sighting.map(|s| s.position), Some(Position::flat(1, 0)));
    }

    #[test]
    fn distant_brawler_closes_in() {
        let roster: Roster = [
            npc_at(EntityId(1), Position::flat(0, 0)),
            raider_at(EntityId(2), Position::flat(5, 0)),
        ]
        .into_iter()
        .collect();
        let decision = decide_for(&roster, &TestOracles::default(), AiTurnState::default());

        assert_eq!(
            decision.step,
            NpcStep::Move {
                toward: Position::flat(5, 0)
            }
        );
    }

    #[test]
    fn empty_magazine_reloads_before_shooting() {
        let shooter = npc_at(EntityId(1), Position::flat(0, 0))
            .with_main_hand(WeaponSlot::with_ammo(PISTOL, 0, 6));
        let roster: Roster = [shooter, raider_at(EntityId(2), Position::flat(5, 0))]
            .into_iter()
            .collect();
        let oracles = TestOracles::default();

        let decision = decide_for(&roster, &oracles, AiTurnState::default());
        assert_eq!(decision.step, NpcStep::Reload(Hand::Main));

        let refused = AiTurnState {
            reload_blocked: true,
            ..AiTurnState::default()
        };
        let decision = decide_for(&roster, &oracles, refused);
        assert!(matches!(decision.step, NpcStep::Move { .. }));
    }

    #[test]
    fn worthwhile_drop_beats_walking() {
        let roster: Roster = [
            npc_at(EntityId(1), Position::new(0, 0, 2)),
            raider_at(EntityId(2), Position::new(4, 0, 0)),
        ]
        .into_iter()
        .collect();
        let ledge = DropOption {
            landing: Position::new(1, 0, 0),
            fall_height: 2,
        };
        let oracles = TestOracles {
            pathing: TestPathing::open().with_drop(Position::new(0, 0, 2), ledge),
            ..TestOracles::default()
        };

        let decision = decide_for(&roster, &oracles, AiTurnState::default());
        assert_eq!(decision.step, NpcStep::Drop(ledge));

        let declined = AiTurnState {
            drop_declined: true,
            ..AiTurnState::default()
        };
        let decision = decide_for(&roster, &oracles, declined);
        assert!(matches!(decision.step, NpcStep::Move { .. }));
    }

    #[test]
    fn lost_target_chases_fresh_sighting() {
        let mut hunter = npc_at(EntityId(1), Position::flat(0, 0));
        hunter.memory.remember_sighting(EntityId(9), Position::flat(6, 2), Round(1));
        let roster: Roster = [hunter, npc_at(EntityId(5), Position::flat(2, 2))]
            .into_iter()
            .collect();

        let decision = decide_for(&roster, &TestOracles::default(), AiTurnState::default());
        assert_eq!(decision.target, None);
        assert_eq!(
            decision.step,
            NpcStep::Move {
                toward: Position::flat(6, 2)
            }
        );
    }

    #[test]
    fn spent_npc_stops() {
        let mut tired = npc_at(EntityId(1), Position::flat(0, 0));
        tired.points.clear();
        let roster: Roster = [tired, raider_at(EntityId(2), Position::flat(1, 0))]
            .into_iter()
            .collect();

        let decision = decide_for(&roster, &TestOracles::default(), AiTurnState::default());
        assert_eq!(decision.step, NpcStep::Stop(StopReason::OutOfPoints));
    }
}
