//! Behaviour when there is nothing to fight.

use super::AiContext;
use crate::env::Dice;
use crate::state::{BehaviorProfile, Controller, Position, StandingOrder};

/// Non-combat intent, each carrying where it leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExploreChoice {
    /// Catch up with the player.
    Follow(Position),
    /// Walk to the nearest loot tile.
    Scavenge(Position),
    /// Random unvisited neighbour.
    Wander(Position),
    /// Return to (or stay at) an ordered post.
    Hold(Position),
    Idle,
}

impl ExploreChoice {
    pub fn destination(&self) -> Option<Position> {
        match *self {
            ExploreChoice::Follow(at)
            | ExploreChoice::Scavenge(at)
            | ExploreChoice::Wander(at)
            | ExploreChoice::Hold(at) => Some(at),
            ExploreChoice::Idle => None,
        }
    }
}

/// Picks the non-combat intent in priority order: orders that pin the NPC,
/// following the player, scavenging, then wandering.
pub fn explore_choice(ctx: &AiContext<'_>, dice: &mut Dice<'_>) -> ExploreChoice {
    let me = ctx.me;
    let config = ctx.config;

    match me.orders {
        StandingOrder::WaitHere { at } => return ExploreChoice::Hold(at),
        StandingOrder::DefendPoint { point, .. } => return ExploreChoice::Hold(point),
        _ => {}
    }

    let follows = me.is_companion() || me.orders == StandingOrder::FollowClose;
    if follows {
        if let Some(player) = ctx.player() {
            if me.position.manhattan(player.position) > config.follow_distance {
                return ExploreChoice::Follow(player.position);
            }
        }
    }

    let scavenge_area = match me.orders {
        StandingOrder::ScavengeArea { center, radius } => Some((center, radius)),
        _ if me.profile == BehaviorProfile::Scavenger => {
            Some((me.position, config.scavenge_radius))
        }
        _ => None,
    };
    if let Some((center, radius)) = scavenge_area {
        if let Some(loot) = nearest_loot(ctx, center, radius) {
            return ExploreChoice::Scavenge(loot);
        }
    }

    if me.controller == Controller::Npc {
        if let Some(step) = wander_step(ctx, dice) {
            return ExploreChoice::Wander(step);
        }
    }
    ExploreChoice::Idle
}

/// Nearest loot tile to the NPC inside the square scan area around
/// `center`. Scan order is row-major, so ties resolve deterministically.
fn nearest_loot(ctx: &AiContext<'_>, center: Position, radius: u32) -> Option<Position> {
    let tiles = ctx.env.tiles().ok()?;
    let reach = i32::try_from(radius).unwrap_or(i32::MAX);
    let me = ctx.me.position;

    let mut best: Option<(Position, u32)> = None;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let tile = Position::new(center.x + dx, center.y + dy, center.z);
            if tile.manhattan(center) > radius || !tiles.has_loot(tile) {
                continue;
            }
            let distance = me.manhattan(tile);
            if best.is_none_or(|(_, closest)| distance < closest) {
                best = Some((tile, distance));
            }
        }
    }
    best.map(|(tile, _)| tile)
}

/// Random passable neighbour that is neither occupied nor recently visited.
fn wander_step(ctx: &AiContext<'_>, dice: &mut Dice<'_>) -> Option<Position> {
    let pathing = ctx.env.pathing().ok()?;
    let me = ctx.me;
    let options: Vec<Position> = pathing
        .neighbours(me.position)
        .into_iter()
        .filter(|tile| !me.memory.recently_visited(*tile))
        .filter(|tile| ctx.roster.occupant_at(*tile).is_none())
        .collect();
    if options.is_empty() {
        return None;
    }
    let pick = dice.roll(options.len() as u32) as usize - 1;
    options.get(pick).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::engine::InitiativeTracker;
    use crate::env::RollCursor;
    use crate::state::{Combatant, EntityId, Roster, TeamId};
    use crate::testing::{ScriptedRng, TestOracles, TestPathing, TestTiles, npc_at};

    #[test]
    fn companion_follows_distant_player() {
        let roster: Roster = [
            Combatant::player("hero", Position::flat(0, 0)),
            Combatant::new(
                EntityId(1),
                "dog",
                TeamId::PLAYER,
                Controller::Companion,
                Position::flat(6, 0),
            ),
        ]
        .into_iter()
        .collect();
        let tracker = InitiativeTracker::default();
        let config = CombatConfig::default();
        let oracles = TestOracles::default();
        let ctx = AiContext::new(
            roster.get(EntityId(1)).unwrap(),
            &roster,
            &tracker,
            &config,
            oracles.env(),
        );
        let rng = ScriptedRng::default();
        let mut cursor = RollCursor::new(0);
        let mut dice = Dice::new(&rng, &mut cursor);

        assert_eq!(
            explore_choice(&ctx, &mut dice),
            ExploreChoice::Follow(Position::flat(0, 0))
        );
    }

    #[test]
    fn scavenger_heads_for_nearest_loot() {
        let roster: Roster = [npc_at(EntityId(3), Position::flat(0, 0))
            .with_profile(BehaviorProfile::Scavenger)]
        .into_iter()
        .collect();
        let tracker = InitiativeTracker::default();
        let config = CombatConfig::default();
        let oracles = TestOracles {
            tiles: TestTiles::default()
                .with_loot(Position::flat(4, 0))
                .with_loot(Position::flat(0, 2)),
            ..TestOracles::default()
        };
        let ctx = AiContext::new(
            roster.get(EntityId(3)).unwrap(),
            &roster,
            &tracker,
            &config,
            oracles.env(),
        );
        let rng = ScriptedRng::default();
        let mut cursor = RollCursor::new(0);
        let mut dice = Dice::new(&rng, &mut cursor);

        assert_eq!(
            explore_choice(&ctx, &mut dice),
            ExploreChoice::Scavenge(Position::flat(0, 2))
        );
    }

    #[test]
    fn wander_skips_recent_tiles() {
        let mut npc = npc_at(EntityId(3), Position::flat(0, 0));
        npc.memory.visit(Position::flat(1, 0));
        let roster: Roster = [npc].into_iter().collect();
        let tracker = InitiativeTracker::default();
        let config = CombatConfig::default();
        let oracles = TestOracles {
            pathing: TestPathing::open(),
            ..TestOracles::default()
        };
        let ctx = AiContext::new(
            roster.get(EntityId(3)).unwrap(),
            &roster,
            &tracker,
            &config,
            oracles.env(),
        );
        let rng = ScriptedRng::new([1, 1, 1, 1]);
        let mut cursor = RollCursor::new(0);

        for _ in 0..4 {
            let mut dice = Dice::new(&rng, &mut cursor);
            let choice = explore_choice(&ctx, &mut dice);
            assert!(matches!(choice, ExploreChoice::Wander(_)));
            assert_ne!(choice.destination(), Some(Position::flat(1, 0)));
        }
    }
}
