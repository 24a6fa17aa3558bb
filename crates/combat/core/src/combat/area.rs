//! Blast occupancy and per-combatant exposure for explosives.

use super::roll::{Modifier, ModifierSource, RollMode, RollResult};
use crate::action::Delivery;
use crate::env::Dice;
use crate::state::{Combatant, EntityId, Position, Roster, Stat};

/// Feet per tile when converting blast radii.
pub const FEET_PER_TILE: u32 = 5;

/// `ceil(feet / 5)`.
pub const fn burst_radius_tiles(feet: u32) -> u32 {
    feet.div_ceil(FEET_PER_TILE)
}

/// Living combatants within Manhattan distance `radius` of `impact`, in
/// roster order.
pub fn affected(roster: &Roster, impact: Position, radius: u32) -> Vec<EntityId> {
    roster
        .iter()
        .filter(|c| c.position.manhattan(impact) <= radius)
        .map(|c| c.id)
        .collect()
}

/// How one affected combatant is exposed to the blast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Exposure {
    /// The primary target, struck directly: damage with no further roll.
    Direct,
    /// Thrown blast: may dodge against the throw.
    Dodgeable,
    /// Launched blast: takes damage, no dodge.
    Collateral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlastExposure {
    pub target: EntityId,
    pub exposure: Exposure,
}

/// Classifies every affected combatant.
///
/// `primary_struck` is the outcome of the throw or shot against the declared
/// primary target; a primary that was missed is exposed like everyone else.
pub fn plan_blast(
    affected: &[EntityId],
    primary: Option<EntityId>,
    primary_struck: bool,
    delivery: Delivery,
) -> Vec<BlastExposure> {
    affected
        .iter()
        .map(|&target| {
            let exposure = if Some(target) == primary && primary_struck {
                Exposure::Direct
            } else {
                match delivery {
                    Delivery::Thrown => Exposure::Dodgeable,
                    Delivery::Launched => Exposure::Collateral,
                }
            };
            BlastExposure { target, exposure }
        })
        .collect()
}

/// `d20 + Dexterity` blast dodge. No criticals.
pub fn roll_blast_dodge(dodger: &Combatant, dice: &mut Dice<'_>) -> RollResult {
    let dex = dodger.stat_modifier(Stat::Dexterity);
    let modifiers = if dex != 0 {
        vec![Modifier::new(ModifierSource::Dexterity, dex)]
    } else {
        Vec::new()
    };
    RollResult::new(dice.d20(), RollMode::Normal, modifiers, false)
}

/// A dodge succeeds when it matches or beats the throw.
pub fn dodge_succeeds(dodge: &RollResult, throw: &RollResult) -> bool {
    dodge.total >= throw.total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Controller, TeamId};

    fn at(id: u32, x: i32, y: i32) -> Combatant {
        Combatant::new(
            EntityId(id),
            format!("c{id}"),
            TeamId(1),
            Controller::Npc,
            Position::flat(x, y),
        )
    }

    #[test]
    fn radius_rounds_feet_up() {
        assert_eq!(burst_radius_tiles(10), 2);
        assert_eq!(burst_radius_tiles(11), 3);
        assert_eq!(burst_radius_tiles(0), 0);
    }

    #[test]
    fn ten_foot_grenade_reaches_two_tiles_manhattan() {
        let roster: Roster = [at(1, 5, 5), at(2, 6, 5), at(3, 5, 8)].into_iter().collect();
        let hit = affected(&roster, Position::flat(5, 5), burst_radius_tiles(10));
        assert_eq!(hit, vec![EntityId(1), EntityId(2)]);
    }

    #[test]
    fn missed_primary_is_exposed_like_bystanders() {
        let affected = [EntityId(1), EntityId(2)];

        let thrown = plan_blast(&affected, Some(EntityId(1)), true, Delivery::Thrown);
        assert_eq!(thrown[0].exposure, Exposure::Direct);
        assert_eq!(thrown[1].exposure, Exposure::Dodgeable);

        let missed = plan_blast(&affected, Some(EntityId(1)), false, Delivery::Thrown);
        assert_eq!(missed[0].exposure, Exposure::Dodgeable);

        let launched = plan_blast(&affected, Some(EntityId(1)), false, Delivery::Launched);
        assert!(launched.iter().all(|b| b.exposure == Exposure::Collateral));
    }
}
