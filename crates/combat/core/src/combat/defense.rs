//! Defense declarations and rolls.

use strum::{Display, EnumIter};

use super::roll::{Modifier, ModifierSource, RollMode, RollResult};
use crate::action::{AttackKind, Rejection};
use crate::env::Dice;
use crate::state::{Combatant, Skill, Stat};

pub const MOVEMENT_BONUS: i32 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DefenseKind {
    /// Passive: cover and movement only. No criticals.
    #[default]
    None,
    Dodge,
    BlockUnarmed,
    /// Needs a melee weapon in hand.
    BlockArmed,
}

/// Checks a requested defense against the incoming attack.
///
/// Active defenses against non-thrown ranged attacks are coerced to
/// [`DefenseKind::None`]; an armed block without a melee weapon is rejected.
pub fn legalize(
    requested: DefenseKind,
    attack: &AttackKind,
    holds_melee_weapon: bool,
) -> Result<DefenseKind, Rejection> {
    if !attack.allows_active_defense() {
        if requested != DefenseKind::None {
            tracing::debug!(?requested, "active defense impossible; using none");
        }
        return Ok(DefenseKind::None);
    }
    if requested == DefenseKind::BlockArmed && !holds_melee_weapon {
        return Err(Rejection::IllegalDefense);
    }
    Ok(requested)
}

/// Defender-side inputs of a defense roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefenseInputs {
    pub kind: DefenseKind,
    pub dexterity: i32,
    pub constitution: i32,
    pub unarmed: i32,
    pub melee_weapons: i32,
    pub cover: i32,
    pub moved: bool,
}

impl DefenseInputs {
    pub fn for_defender(defender: &Combatant, kind: DefenseKind, cover: i32) -> Self {
        Self {
            kind,
            dexterity: defender.stat_modifier(Stat::Dexterity),
            constitution: defender.stat_modifier(Stat::Constitution),
            unarmed: defender.skill_modifier(Skill::Unarmed),
            melee_weapons: defender.skill_modifier(Skill::MeleeWeapons),
            cover,
            moved: defender.moved_this_turn,
        }
    }

    pub fn modifiers(&self) -> Vec<Modifier> {
        let ability = match self.kind {
            DefenseKind::None => vec![],
            DefenseKind::Dodge => vec![
                (ModifierSource::Dexterity, self.dexterity),
                (ModifierSource::Skill, self.unarmed),
            ],
            DefenseKind::BlockUnarmed => vec![
                (ModifierSource::Constitution, self.constitution),
                (ModifierSource::Skill, self.unarmed),
            ],
            DefenseKind::BlockArmed => vec![(ModifierSource::Skill, self.melee_weapons)],
        };
        ability
            .into_iter()
            .chain([
                (ModifierSource::Cover, self.cover),
                (
                    ModifierSource::Movement,
                    if self.moved { MOVEMENT_BONUS } else { 0 },
                ),
            ])
            .filter(|(_, value)| *value != 0)
            .map(|(source, value)| Modifier::new(source, value))
            .collect()
    }

    fn modifier_sum(&self) -> i32 {
        self.modifiers().iter().map(|m| m.value).sum()
    }
}

pub fn roll_defense(inputs: &DefenseInputs, dice: &mut Dice<'_>) -> RollResult {
    let roll = RollResult::new(
        dice.d20(),
        RollMode::Normal,
        inputs.modifiers(),
        inputs.kind != DefenseKind::None,
    );
    tracing::debug!(
        kind = %inputs.kind,
        natural = roll.natural,
        total = roll.total,
        "defense roll"
    );
    roll
}

/// Defense an AI defender picks: the legal option with the best modifiers.
/// Ties keep declaration order (dodge before blocks).
pub fn best_defense(
    defender: &Combatant,
    attack: &AttackKind,
    holds_melee_weapon: bool,
    cover: i32,
) -> DefenseKind {
    if !attack.allows_active_defense() {
        return DefenseKind::None;
    }
    let mut best = DefenseKind::Dodge;
    let mut best_sum = DefenseInputs::for_defender(defender, best, cover).modifier_sum();
    for kind in [DefenseKind::BlockUnarmed, DefenseKind::BlockArmed] {
        if legalize(kind, attack, holds_melee_weapon).is_err() {
            continue;
        }
        let sum = DefenseInputs::for_defender(defender, kind, cover).modifier_sum();
        if sum > best_sum {
            best = kind;
            best_sum = sum;
        }
    }
    best
}
