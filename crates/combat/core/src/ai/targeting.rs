//! Target acquisition.
//!
//! Phase 1 trusts the aggro list: the highest-threat entry that is still a
//! legal target wins outright. Phase 2 scores every visible hostile with a
//! single weighted function.

use super::AiContext;
use crate::state::{Combatant, EntityId};

/// Alive, hostile, in the encounter and in line of sight.
pub fn is_valid_target(ctx: &AiContext<'_>, candidate: &Combatant) -> bool {
    let me = ctx.me;
    candidate.id != me.id
        && me.is_hostile_to(candidate)
        && ctx.tracker.contains(candidate.id)
        && ctx.env.can_see(me.position, candidate.position)
}

/// Keeps the current target while it stays valid; otherwise selects anew.
pub fn acquire_target(ctx: &AiContext<'_>) -> Option<EntityId> {
    let current = ctx
        .me
        .memory
        .target
        .and_then(|id| ctx.roster.get(id))
        .filter(|target| is_valid_target(ctx, target));
    match current {
        Some(target) => Some(target.id),
        None => select_target(ctx),
    }
}

/// Two-phase selection. Ties in phase 2 go to the earlier candidate in
/// roster order.
pub fn select_target(ctx: &AiContext<'_>) -> Option<EntityId> {
    let from_aggro = ctx
        .me
        .aggro
        .iter()
        .filter_map(|entry| ctx.roster.get(entry.source))
        .find(|candidate| is_valid_target(ctx, candidate));
    if let Some(target) = from_aggro {
        tracing::trace!(npc = %ctx.me.id, target = %target.id, "target from aggro list");
        return Some(target.id);
    }

    let mut best: Option<(EntityId, i32)> = None;
    for candidate in ctx.roster.iter().filter(|c| is_valid_target(ctx, c)) {
        let score = score_candidate(ctx, candidate);
        tracing::trace!(
            npc = %ctx.me.id,
            candidate = %candidate.id,
            value = score.value(),
            threat = score.threat,
            proximity = score.proximity,
            guard = score.guard,
            "target scored"
        );
        if best.is_none_or(|(_, value)| score.value() > value) {
            best = Some((candidate.id, score.value()));
        }
    }
    best.map(|(id, _)| id)
}

/// Breakdown of a fallback target score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TargetScore {
    /// `threat × weight` for aggro-known candidates.
    pub threat: i32,
    /// Negative distance in tenths of a tile for unknown candidates.
    pub proximity: i32,
    /// Companion bonus for candidates menacing the player's side.
    pub guard: i32,
}

impl TargetScore {
    pub const fn value(&self) -> i32 {
        self.threat + self.proximity + self.guard
    }
}

pub fn score_candidate(ctx: &AiContext<'_>, candidate: &Combatant) -> TargetScore {
    let me = ctx.me;
    let config = ctx.config;
    let mut score = TargetScore::default();

    match me.aggro.threat_of(candidate.id) {
        Some(threat) => {
            score.threat = i32::try_from(threat)
                .unwrap_or(i32::MAX)
                .saturating_mul(config.threat_weight);
        }
        None => score.proximity = -me.position.distance_tenths(candidate.position),
    }

    if me.is_companion() {
        let menaces_ally = ctx.roster.iter().any(|ally| {
            ally.id != me.id
                && !me.is_hostile_to(ally)
                && (ally.is_player() || ally.is_companion())
                && candidate.position.manhattan(ally.position) <= config.companion_guard_radius
        });
        if menaces_ally {
            score.guard = config.companion_guard_bonus * me.profile.guard_weight_percent() / 100;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::engine::{InitiativeEntry, InitiativeTracker};
    use crate::state::{Controller, Position, Roster, TeamId};
    use crate::testing::{TestOracles, TestSight};

    fn npc(id: u32, team: u16, x: i32) -> Combatant {
        Combatant::new(
            EntityId(id),
            format!("npc{id}"),
            TeamId(team),
            Controller::Npc,
            Position::flat(x, 0),
        )
    }

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

    #[test]
    fn aggro_entry_beats_closer_stranger() {
        let mut me = npc(1, 1, 0);
        me.aggro.add(EntityId(3), 5);
        let roster: Roster = [me, npc(2, 2, 1), npc(3, 2, 9)].into_iter().collect();
        let tracker = tracker_for(&roster);
        let config = CombatConfig::default();
        let oracles = TestOracles::default();
        let me = roster.get(EntityId(1)).unwrap();
        let ctx = AiContext::new(me, &roster, &tracker, &config, oracles.env());

        assert_eq!(select_target(&ctx), Some(EntityId(3)));
    }

    #[test]
    fn unseen_aggro_entry_falls_back_to_nearest() {
        let mut me = npc(1, 1, 0);
        me.aggro.add(EntityId(3), 50);
        let roster: Roster = [me, npc(2, 2, 4), npc(3, 2, 2)].into_iter().collect();
        let tracker = tracker_for(&roster);
        let config = CombatConfig::default();
        let oracles = TestOracles {
            sight: TestSight::blocking([Position::flat(2, 0)]),
            ..TestOracles::default()
        };
        let me = roster.get(EntityId(1)).unwrap();
        let ctx = AiContext::new(me, &roster, &tracker, &config, oracles.env());

        assert_eq!(select_target(&ctx), Some(EntityId(2)));
    }

    #[test]
    fn equal_scores_keep_scan_order() {
        let roster: Roster = [npc(1, 1, 0), npc(2, 2, 3), npc(3, 2, -3)]
            .into_iter()
            .collect();
        let tracker = tracker_for(&roster);
        let config = CombatConfig::default();
        let oracles = TestOracles::default();
        let me = roster.get(EntityId(1)).unwrap();
        let ctx = AiContext::new(me, &roster, &tracker, &config, oracles.env());

        assert_eq!(select_target(&ctx), Some(EntityId(2)));
    }

    #[test]
    fn valid_current_target_is_kept() {
        let mut me = npc(1, 1, 0);
        me.memory.target = Some(EntityId(3));
        let roster: Roster = [me, npc(2, 2, 1), npc(3, 2, 8)].into_iter().collect();
        let tracker = tracker_for(&roster);
        let config = CombatConfig::default();
        let oracles = TestOracles::default();
        let me = roster.get(EntityId(1)).unwrap();
        let ctx = AiContext::new(me, &roster, &tracker, &config, oracles.env());

        assert_eq!(acquire_target(&ctx), Some(EntityId(3)));
        assert_eq!(acquire_target(&ctx), acquire_target(&ctx));
    }

    #[test]
    fn companion_prefers_foe_next_to_player() {
        let player = Combatant::player("hero", Position::flat(10, 0));
        let companion = Combatant::new(
            EntityId(1),
            "dog",
            TeamId::PLAYER,
            Controller::Companion,
            Position::flat(8, 0),
        );
        // Raider 7 is closer to the companion, raider 8 stands next to the player.
        let roster: Roster = [player, companion, npc(7, 2, 6), npc(8, 2, 11)]
            .into_iter()
            .collect();
        let tracker = tracker_for(&roster);
        let config = CombatConfig::default();
        let oracles = TestOracles::default();
        let me = roster.get(EntityId(1)).unwrap();
        let ctx = AiContext::new(me, &roster, &tracker, &config, oracles.env());

        let near = score_candidate(&ctx, roster.get(EntityId(7)).unwrap());
        let guarding = score_candidate(&ctx, roster.get(EntityId(8)).unwrap());
        assert_eq!(near.guard, 0);
        assert_eq!(guarding.guard, config.companion_guard_bonus);
        assert_eq!(select_target(&ctx), Some(EntityId(8)));
    }

    #[test]
    fn no_hostiles_means_no_target() {
        let roster: Roster = [npc(1, 1, 0), npc(2, 1, 1)].into_iter().collect();
        let tracker = tracker_for(&roster);
        let config = CombatConfig::default();
        let oracles = TestOracles::default();
        let me = roster.get(EntityId(1)).unwrap();
        let ctx = AiContext::new(me, &roster, &tracker, &config, oracles.env());

        assert_eq!(select_target(&ctx), None);
    }
}
