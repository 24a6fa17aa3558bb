//! Risk-gated tactical drops.

use crate::combat::{Modifier, ModifierSource, RollMode, RollResult};
use crate::env::{Dice, DropOption};
use crate::state::{Combatant, Position, Stat};

/// Outcome of the willpower check before a voluntary drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallCheck {
    pub accepted: bool,
    /// `None` when no roll was needed.
    pub roll: Option<RollResult>,
    pub difficulty: i32,
}

/// `clamp(10 + (h - 1) * 2 - floor(10 * leg_fraction), 5, 25)`.
pub fn fall_difficulty(fall_height: u32, leg_fraction: f32) -> i32 {
    let height = i32::try_from(fall_height).unwrap_or(i32::MAX);
    let legs = (10.0 * leg_fraction.clamp(0.0, 1.0)).floor() as i32;
    10_i32
        .saturating_add(height.saturating_sub(1).saturating_mul(2))
        .saturating_sub(legs)
        .clamp(5, 25)
}

/// Drops of one level or less are always taken. Higher ones need
/// `1d20 + Willpower >= difficulty`.
pub fn should_take_fall(npc: &Combatant, fall_height: u32, dice: &mut Dice<'_>) -> FallCheck {
    let difficulty = fall_difficulty(fall_height, npc.body.avg_leg_health_fraction());
    if fall_height <= 1 {
        return FallCheck {
            accepted: true,
            roll: None,
            difficulty,
        };
    }

    let willpower = npc.stat_modifier(Stat::Willpower);
    let modifiers = if willpower != 0 {
        vec![Modifier::new(ModifierSource::Willpower, willpower)]
    } else {
        Vec::new()
    };
    let roll = RollResult::new(dice.d20(), RollMode::Normal, modifiers, false);
    let accepted = roll.total >= difficulty;
    tracing::debug!(
        npc = %npc.id,
        fall_height,
        difficulty,
        total = roll.total,
        accepted,
        "fall risk check"
    );
    FallCheck {
        accepted,
        roll: Some(roll),
        difficulty,
    }
}

/// How much better the landing is than staying put.
///
/// Closing the level gap to the target counts most, then the distance
/// gained; every level fallen costs.
pub fn score_drop(from: Position, option: &DropOption, target: Position) -> i32 {
    let gap_closed = from.z_gap(target) as i32 - option.landing.z_gap(target) as i32;
    let distance_gained =
        from.distance_tenths(target) - option.landing.distance_tenths(target);
    10 * gap_closed + distance_gained / 10 - 4 * option.fall_height as i32
}

/// Best drop that beats staying (score > 0). Ties keep the first option.
pub fn best_drop(from: Position, target: Position, options: &[DropOption]) -> Option<DropOption> {
    let mut best: Option<(DropOption, i32)> = None;
    for option in options {
        let score = score_drop(from, option, target);
        if score > 0 && best.is_none_or(|(_, value)| score > value) {
            best = Some((*option, score));
        }
    }
    best.map(|(option, _)| option)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::RollCursor;
    use crate::state::{BodyPart, EntityId, Stats};
    use crate::testing::{ScriptedRng, npc_at};
    use proptest::prelude::*;

    fn with_legs_at_half(mut npc: Combatant) -> Combatant {
        for leg in [BodyPart::LeftLeg, BodyPart::RightLeg] {
            let part = npc.body.part_mut(leg);
            part.current = part.max / 2;
        }
        npc
    }

    #[test]
    fn three_level_drop_on_half_legs() {
        let npc = with_legs_at_half(
            npc_at(EntityId(4), Position::new(0, 0, 3)).with_stats(Stats::new(10, 10, 10, 12, 10)),
        );
        assert_eq!(fall_difficulty(3, npc.body.avg_leg_health_fraction()), 9);

        let rng = ScriptedRng::new([8]);
        let mut cursor = RollCursor::new(1);
        let mut dice = Dice::new(&rng, &mut cursor);
        let check = should_take_fall(&npc, 3, &mut dice);

        assert!(check.accepted);
        assert_eq!(check.roll.map(|r| r.total), Some(9));
    }

    #[test]
    fn difficulty_is_clamped() {
        assert_eq!(fall_difficulty(2, 1.0), 5);
        assert_eq!(fall_difficulty(40, 0.0), 25);
    }

    #[test]
    fn staying_wins_ties() {
        let from = Position::new(0, 0, 1);
        let target = Position::new(0, 0, 1);
        let sideways = DropOption {
            landing: Position::new(1, 0, 0),
            fall_height: 1,
        };
        assert!(score_drop(from, &sideways, target) <= 0);
        assert_eq!(best_drop(from, target, &[sideways]), None);
    }

    #[test]
    fn drop_toward_lower_target_is_taken() {
        let from = Position::new(0, 0, 2);
        let target = Position::new(4, 0, 0);
        let ledge = DropOption {
            landing: Position::new(1, 0, 0),
            fall_height: 2,
        };
        // 10 * 2 + (45 - 30) / 10 - 8 = 13
        assert_eq!(score_drop(from, &ledge, target), 13);
        assert_eq!(best_drop(from, target, &[ledge]), Some(ledge));
    }

    proptest! {
        #[test]
        fn short_drops_always_accepted(height in 0u32..=1, face in 1u32..=20, will in 3i32..=18) {
            let npc = npc_at(EntityId(2), Position::ORIGIN)
                .with_stats(Stats::new(10, 10, 10, will, 10));
            let rng = ScriptedRng::new([face]);
            let mut cursor = RollCursor::new(7);
            let mut dice = Dice::new(&rng, &mut cursor);
            let check = should_take_fall(&npc, height, &mut dice);
            prop_assert!(check.accepted);
            prop_assert!(check.roll.is_none());
        }
    }
}
