//! Standing orders: what they allow and where they pull the companion.

use super::AiContext;
use crate::state::{Position, StandingOrder};

/// Whether orders let the NPC attack something at `target`.
pub fn engage_allowed(ctx: &AiContext<'_>, target: Position) -> bool {
    match ctx.me.orders {
        StandingOrder::DefendPoint { point, radius } => target.manhattan(point) <= radius,
        _ => true,
    }
}

/// Whether orders let the NPC walk toward `target`.
pub fn chase_allowed(ctx: &AiContext<'_>, target: Position) -> bool {
    let config = ctx.config;
    match ctx.me.orders {
        StandingOrder::WaitHere { .. } => false,
        StandingOrder::DefendPoint { point, radius } => target.manhattan(point) <= radius,
        StandingOrder::FollowClose => ctx.player().is_none_or(|player| {
            target.manhattan(player.position) <= config.follow_distance.saturating_mul(2)
        }),
        StandingOrder::Engage | StandingOrder::ScavengeArea { .. } => true,
    }
}

/// Position the NPC must return to before anything else, if any.
pub fn regroup(ctx: &AiContext<'_>) -> Option<Position> {
    let me = ctx.me;
    match me.orders {
        StandingOrder::FollowClose => ctx
            .player()
            .map(|player| player.position)
            .filter(|anchor| me.position.manhattan(*anchor) > ctx.config.follow_distance),
        StandingOrder::DefendPoint { point, radius } => {
            (me.position.manhattan(point) > radius).then_some(point)
        }
        _ => None,
    }
}

/// Orders that pin the NPC to its tile.
pub fn holds_position(ctx: &AiContext<'_>) -> bool {
    matches!(ctx.me.orders, StandingOrder::WaitHere { .. })
}
