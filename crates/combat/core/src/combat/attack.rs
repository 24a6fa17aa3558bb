//! Attack roll computation.
//!
//! ```text
//! attack = d20 (lower of two for off-hand)
//!        + skill + body part + range + weapon class
//!        + fire mode + movement + lighting
//! ```

use super::roll::{Modifier, ModifierSource, RollMode, RollResult};
use crate::action::{AttackKind, FireMode, Hand, SkillSource};
use crate::env::Dice;
use crate::state::{BodyPart, Combatant};

/// Squared-tile thresholds of the range bands.
const POINT_BLANK_SQ: i64 = 1;
const CLOSE_SQ: i64 = 3 * 3;
const MEDIUM_SQ: i64 = 6 * 6;
const LONG_SQ: i64 = 20 * 20;
const EXTREME_SQ: i64 = 60 * 60;

pub const MOVEMENT_PENALTY: i32 = -2;
pub const DARKNESS_PENALTY: i32 = -2;

/// Range band modifier by Euclidean distance.
///
/// `point_blank_allowed` is false when the weapon needs an active grapple for
/// its point-blank bonus and none is held.
pub fn range_modifier(distance_squared: i64, point_blank_allowed: bool) -> i32 {
    match distance_squared {
        d if d <= POINT_BLANK_SQ => {
            if point_blank_allowed {
                15
            } else {
                0
            }
        }
        d if d <= CLOSE_SQ => 5,
        d if d <= MEDIUM_SQ => 0,
        d if d <= LONG_SQ => -5,
        d if d <= EXTREME_SQ => -10,
        _ => -15,
    }
}

/// Weapon-class adjustment, only beyond the 6-tile band.
pub fn weapon_class_modifier(kind: &AttackKind, distance_squared: i64) -> i32 {
    match kind {
        AttackKind::Ranged { class, .. } if distance_squared > MEDIUM_SQ => {
            class.long_range_adjustment()
        }
        _ => 0,
    }
}

/// Everything that feeds one attack roll, gathered by the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackInputs {
    pub kind: AttackKind,
    pub skill_modifier: i32,
    pub body_part: BodyPart,
    pub distance_squared: i64,
    pub grappling: bool,
    pub fire_mode: FireMode,
    pub hand: Hand,
    pub moved: bool,
    /// Target tile is unlit under dark ambient light.
    pub target_in_darkness: bool,
}

impl AttackInputs {
    /// Collects the attacker-side inputs. Distance and lighting are filled by
    /// the caller.
    pub fn for_attacker(
        attacker: &Combatant,
        kind: AttackKind,
        body_part: BodyPart,
        fire_mode: FireMode,
        hand: Hand,
    ) -> Self {
        Self {
            kind,
            skill_modifier: skill_modifier(attacker, &kind),
            body_part,
            distance_squared: 0,
            grappling: attacker.grappling.is_some(),
            fire_mode,
            hand,
            moved: attacker.moved_this_turn,
            target_in_darkness: false,
        }
    }

    pub fn at_distance_squared(mut self, distance_squared: i64) -> Self {
        self.distance_squared = distance_squared;
        self
    }

    pub fn in_darkness(mut self, dark: bool) -> Self {
        self.target_in_darkness = dark;
        self
    }

    /// Criticals belong to plain single main-hand attacks only.
    pub fn crits_allowed(&self) -> bool {
        self.hand == Hand::Main && self.fire_mode == FireMode::Single
    }
}

/// Skill (or Strength, for thrown weapons) bonus of `attacker` for `kind`.
pub fn skill_modifier(attacker: &Combatant, kind: &AttackKind) -> i32 {
    match kind.skill_source() {
        SkillSource::Skill(skill) => attacker.skill_modifier(skill),
        SkillSource::Stat(stat) => attacker.stat_modifier(stat),
    }
}

/// Itemised modifiers for an attack. Zero entries are kept out.
pub fn attack_modifiers(inputs: &AttackInputs) -> Vec<Modifier> {
    let skill_source = match inputs.kind.skill_source() {
        SkillSource::Skill(_) => ModifierSource::Skill,
        SkillSource::Stat(_) => ModifierSource::Strength,
    };

    let (range, class) = if inputs.kind.is_close_combat() {
        (0, 0)
    } else {
        let point_blank_allowed = match inputs.kind {
            AttackKind::Ranged {
                point_blank_needs_grapple: true,
                ..
            } => inputs.grappling,
            _ => true,
        };
        (
            range_modifier(inputs.distance_squared, point_blank_allowed),
            weapon_class_modifier(&inputs.kind, inputs.distance_squared),
        )
    };

    [
        (skill_source, inputs.skill_modifier),
        (ModifierSource::BodyPart, inputs.body_part.aim_modifier()),
        (ModifierSource::Range, range),
        (ModifierSource::WeaponClass, class),
        (ModifierSource::FireMode, inputs.fire_mode.modifier()),
        (
            ModifierSource::Movement,
            if inputs.moved { MOVEMENT_PENALTY } else { 0 },
        ),
        (
            ModifierSource::Lighting,
            if inputs.target_in_darkness {
                DARKNESS_PENALTY
            } else {
                0
            },
        ),
    ]
    .into_iter()
    .filter(|(_, value)| *value != 0)
    .map(|(source, value)| Modifier::new(source, value))
    .collect()
}

/// Rolls one attack.
///
/// Only main-hand single-fire attacks can crit (see
/// [`AttackInputs::crits_allowed`]). Off-hand attacks roll two dice and keep
/// the lower.
pub fn roll_attack(inputs: &AttackInputs, dice: &mut Dice<'_>) -> RollResult {
    let (natural, mode) = match inputs.hand {
        Hand::Main => (dice.d20(), RollMode::Normal),
        Hand::Off => {
            let a = dice.d20();
            let b = dice.d20();
            (a.min(b), RollMode::Disadvantage { discarded: a.max(b) })
        }
    };
    let roll = RollResult::new(
        natural,
        mode,
        attack_modifiers(inputs),
        inputs.crits_allowed(),
    );
    tracing::debug!(
        natural = roll.natural,
        total = roll.total,
        critical = ?roll.critical,
        kind = ?inputs.kind,
        "attack roll"
    );
    roll
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::RangedClass;
    use crate::env::{RollCursor, WeaponId};
    use crate::testing::ScriptedRng;

    fn ranged(class: RangedClass) -> AttackKind {
        AttackKind::Ranged {
            weapon: WeaponId(1),
            class,
            point_blank_needs_grapple: false,
        }
    }

    fn inputs(kind: AttackKind) -> AttackInputs {
        AttackInputs {
            kind,
            skill_modifier: 0,
            body_part: BodyPart::Torso,
            distance_squared: 16,
            grappling: false,
            fire_mode: FireMode::Single,
            hand: Hand::Main,
            moved: false,
            target_in_darkness: false,
        }
    }

    #[test]
    fn range_bands_follow_euclidean_distance() {
        assert_eq!(range_modifier(1, true), 15);
        assert_eq!(range_modifier(1, false), 0);
        assert_eq!(range_modifier(2, true), 5);
        assert_eq!(range_modifier(9, true), 5);
        assert_eq!(range_modifier(36, true), 0);
        assert_eq!(range_modifier(37, true), -5);
        assert_eq!(range_modifier(400, true), -5);
        assert_eq!(range_modifier(3600, true), -10);
        assert_eq!(range_modifier(3601, true), -15);
    }

    #[test]
    fn class_adjustment_applies_beyond_six_tiles() {
        assert_eq!(weapon_class_modifier(&ranged(RangedClass::Sniper), 36), 0);
        assert_eq!(weapon_class_modifier(&ranged(RangedClass::Sniper), 100), 5);
        assert_eq!(weapon_class_modifier(&ranged(RangedClass::Bow), 100), -3);
        assert_eq!(weapon_class_modifier(&ranged(RangedClass::Shotgun), 100), -2);
        assert_eq!(weapon_class_modifier(&ranged(RangedClass::Rifle), 100), 2);
    }

    #[test]
    fn skill_three_torso_medium_range_natural_ten_totals_thirteen() {
        let rng = ScriptedRng::new([10]);
        let mut cursor = RollCursor::new(0);
        let mut dice = Dice::new(&rng, &mut cursor);
        let mut attack = inputs(ranged(RangedClass::Pistol));
        attack.skill_modifier = 3;
        attack.distance_squared = 25;

        let roll = roll_attack(&attack, &mut dice);
        assert_eq!(roll.natural, 10);
        assert_eq!(roll.total, 13);
        assert_eq!(roll.total, roll.recomputed_total());
    }

    #[test]
    fn point_blank_bonus_needs_grapple_when_tagged() {
        let kind = AttackKind::Ranged {
            weapon: WeaponId(1),
            class: RangedClass::Pistol,
            point_blank_needs_grapple: true,
        };
        let mut attack = inputs(kind).at_distance_squared(1);
        assert_eq!(
            RollResult::new(10, RollMode::Normal, attack_modifiers(&attack), true).total,
            10
        );
        attack.grappling = true;
        assert_eq!(
            RollResult::new(10, RollMode::Normal, attack_modifiers(&attack), true).total,
            25
        );
    }

    #[test]
    fn penalties_stack() {
        let mut attack = inputs(ranged(RangedClass::Pistol)).at_distance_squared(25);
        attack.body_part = BodyPart::Head;
        attack.fire_mode = FireMode::Automatic;
        attack.moved = true;
        attack.target_in_darkness = true;
        let modifiers = attack_modifiers(&attack);
        let sum: i32 = modifiers.iter().map(|m| m.value).sum();
        assert_eq!(sum, -4 - 8 - 2 - 2);
        assert!(!attack.crits_allowed());
    }

    #[test]
    fn close_combat_ignores_range_bands() {
        let attack = inputs(AttackKind::Unarmed).at_distance_squared(1);
        assert!(attack_modifiers(&attack).is_empty());
    }

    #[test]
    fn off_hand_keeps_lower_die_and_never_crits() {
        let rng = ScriptedRng::new([20, 1]);
        let mut cursor = RollCursor::new(0);
        let mut dice = Dice::new(&rng, &mut cursor);
        let mut attack = inputs(AttackKind::Unarmed);
        attack.hand = Hand::Off;

        let roll = roll_attack(&attack, &mut dice);
        assert_eq!(roll.natural, 1);
        assert_eq!(roll.mode, RollMode::Disadvantage { discarded: 20 });
        assert!(!roll.is_critical_failure());
    }
}
