//! Damage rolls, armor mitigation and body-part wound tracking.

use strum::Display;

use crate::env::{Dice, DiceExpr};
use crate::state::{Body, BodyPart};

// ============================================================================
// Damage Type
// ============================================================================

/// Damage type remembered by a part entering crisis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DamageType {
    /// Fists, blades and clubs.
    #[default]
    Physical,
    /// Bullets, arrows and bolts.
    Piercing,
    /// Explosions.
    Blast,
    /// Incendiaries.
    Fire,
    /// Landing after a drop.
    Fall,
}

// ============================================================================
// Damage Rolls
// ============================================================================

/// Rolls unarmed damage.
///
/// # Formula
///
/// ```text
/// unarmed_mod <= 0  =>  1d2 - 1   (0 or 1)
/// unarmed_mod  > 0  =>  1d<unarmed_mod>
/// ```
pub fn roll_unarmed_damage(unarmed_modifier: i32, dice: &mut Dice<'_>) -> u32 {
    if unarmed_modifier <= 0 {
        dice.roll(2).saturating_sub(1)
    } else {
        dice.roll(unarmed_modifier as u32)
    }
}

/// Rolls a weapon's damage dice once. Each projectile calls this separately.
pub fn roll_weapon_damage(damage: &DiceExpr, dice: &mut Dice<'_>) -> u32 {
    damage.roll(dice)
}

/// `effective = max(0, raw - armor)`.
pub fn mitigate(raw: u32, armor: u32) -> u32 {
    raw.saturating_sub(armor)
}

/// Falling damage: `(fall_height - 1)d6`, nothing for one level or less.
pub fn roll_fall_damage(fall_height: u32, dice: &mut Dice<'_>) -> u32 {
    dice.sum(fall_height.saturating_sub(1), 6)
}

// ============================================================================
// Wounds
// ============================================================================

/// Why a combatant died.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeathCause {
    /// A part already in crisis took another damaging hit.
    CrisisRetrigger(BodyPart),
    /// Head or torso was destroyed outright.
    VitalPartDestroyed(BodyPart),
    /// A vital part was still at zero when its crisis timer ran out.
    CrisisExpired(BodyPart),
}

/// Result of applying one hit to one body part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WoundOutcome {
    /// Armor absorbed everything.
    Absorbed,
    Wounded { remaining: u32 },
    /// The part reached zero for the first time.
    EnteredCrisis,
    /// A limb was force-destroyed.
    LimbDestroyed,
    Killed(DeathCause),
}

/// Parameters of a single hit on a body part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub part: BodyPart,
    /// Damage after armor.
    pub effective: u32,
    pub damage_type: DamageType,
    /// Set for impact explosives: the part is destroyed regardless of HP.
    pub force_destroy: bool,
}

/// Applies a mitigated hit to `body`.
///
/// # Rules
///
/// - A damaging hit on a part already in crisis is fatal, whichever part it is.
/// - The first time a part reaches 0 it enters crisis for `crisis_turns` of the
///   owner's turns and remembers the damage type.
/// - Force-destroy zeroes the part and marks it destroyed; a destroyed vital
///   part is fatal.
///
/// HP is clamped at 0 in every branch.
pub fn apply_wound(body: &mut Body, hit: Hit, crisis_turns: u8) -> WoundOutcome {
    let health = body.part_mut(hit.part);

    if hit.effective == 0 && !hit.force_destroy {
        return WoundOutcome::Absorbed;
    }

    if health.in_crisis && hit.effective > 0 {
        health.current = 0;
        return WoundOutcome::Killed(DeathCause::CrisisRetrigger(hit.part));
    }

    health.current = health.current.saturating_sub(hit.effective);

    if hit.force_destroy {
        health.current = 0;
        health.is_destroyed = true;
        if hit.part.is_vital() {
            return WoundOutcome::Killed(DeathCause::VitalPartDestroyed(hit.part));
        }
        health.in_crisis = false;
        health.crisis_timer = 0;
        return WoundOutcome::LimbDestroyed;
    }

    if health.current == 0 {
        if health.is_destroyed {
            return WoundOutcome::Wounded { remaining: 0 };
        }
        health.in_crisis = true;
        health.crisis_timer = crisis_turns;
        health.crisis_damage_type = Some(hit.damage_type);
        return WoundOutcome::EnteredCrisis;
    }

    WoundOutcome::Wounded {
        remaining: health.current,
    }
}

/// What happened to a part whose crisis timer ran out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrisisResolution {
    /// A limb stopped bleeding and is now permanently destroyed.
    Stabilized(BodyPart),
    Died(DeathCause),
}

/// Ticks every crisis timer by one owner turn.
///
/// Vital parts still at 0 on expiry are fatal; limbs stabilize as destroyed.
pub fn tick_crises(body: &mut Body) -> Vec<CrisisResolution> {
    let mut resolved = Vec::new();
    for part in BodyPart::ALL {
        let health = body.part_mut(part);
        if !health.in_crisis {
            continue;
        }
        health.crisis_timer = health.crisis_timer.saturating_sub(1);
        if health.crisis_timer > 0 {
            continue;
        }
        if part.is_vital() && health.current == 0 {
            resolved.push(CrisisResolution::Died(DeathCause::CrisisExpired(part)));
            // Nothing after a death matters.
            break;
        }
        health.in_crisis = false;
        health.crisis_damage_type = None;
        if health.current == 0 {
            health.is_destroyed = true;
        }
        resolved.push(CrisisResolution::Stabilized(part));
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::RollCursor;
    use crate::testing::ScriptedRng;
    use proptest::prelude::*;

    fn hit(part: BodyPart, effective: u32) -> Hit {
        Hit {
            part,
            effective,
            damage_type: DamageType::Physical,
            force_destroy: false,
        }
    }

    #[test]
    fn armor_never_drives_damage_negative() {
        assert_eq!(mitigate(3, 5), 0);
        assert_eq!(mitigate(7, 2), 5);
    }

    #[test]
    fn untrained_unarmed_damage_is_zero_or_one() {
        let rng = ScriptedRng::new([1, 2]);
        let mut cursor = RollCursor::new(0);
        let mut dice = Dice::new(&rng, &mut cursor);
        assert_eq!(roll_unarmed_damage(0, &mut dice), 0);
        assert_eq!(roll_unarmed_damage(-2, &mut dice), 1);
    }

    #[test]
    fn trained_unarmed_damage_uses_modifier_as_die() {
        let rng = ScriptedRng::new([3]);
        let mut cursor = RollCursor::new(0);
        let mut dice = Dice::new(&rng, &mut cursor);
        assert_eq!(roll_unarmed_damage(4, &mut dice), 3);
    }

    #[test]
    fn torso_at_zero_enters_crisis_then_dies_on_next_hit() {
        let mut body = Body::default();
        body.part_mut(BodyPart::Torso).current = 5;

        let first = apply_wound(&mut body, hit(BodyPart::Torso, 5), 3);
        assert_eq!(first, WoundOutcome::EnteredCrisis);
        let torso = body.part(BodyPart::Torso);
        assert!(torso.in_crisis);
        assert_eq!(torso.crisis_timer, 3);
        assert_eq!(torso.crisis_damage_type, Some(DamageType::Physical));

        let second = apply_wound(&mut body, hit(BodyPart::Torso, 1), 3);
        assert_eq!(
            second,
            WoundOutcome::Killed(DeathCause::CrisisRetrigger(BodyPart::Torso))
        );
    }

    #[test]
    fn absorbed_hit_does_not_retrigger_crisis() {
        let mut body = Body::default();
        body.part_mut(BodyPart::LeftArm).current = 1;
        apply_wound(&mut body, hit(BodyPart::LeftArm, 4), 3);

        assert_eq!(
            apply_wound(&mut body, hit(BodyPart::LeftArm, 0), 3),
            WoundOutcome::Absorbed
        );
        assert_eq!(body.part(BodyPart::LeftArm).current, 0);
    }

    #[test]
    fn force_destroy_kills_through_vital_parts_only() {
        let mut body = Body::default();
        let limb = apply_wound(
            &mut body,
            Hit {
                force_destroy: true,
                ..hit(BodyPart::RightLeg, 0)
            },
            3,
        );
        assert_eq!(limb, WoundOutcome::LimbDestroyed);
        assert!(body.part(BodyPart::RightLeg).is_destroyed);

        let head = apply_wound(
            &mut body,
            Hit {
                force_destroy: true,
                ..hit(BodyPart::Head, 1)
            },
            3,
        );
        assert_eq!(
            head,
            WoundOutcome::Killed(DeathCause::VitalPartDestroyed(BodyPart::Head))
        );
    }

    #[test]
    fn crisis_expiry_kills_vital_and_stabilizes_limbs() {
        let mut body = Body::default();
        apply_wound(&mut body, hit(BodyPart::LeftLeg, 20), 2);
        assert_eq!(tick_crises(&mut body), vec![]);
        assert_eq!(
            tick_crises(&mut body),
            vec![CrisisResolution::Stabilized(BodyPart::LeftLeg)]
        );
        let leg = body.part(BodyPart::LeftLeg);
        assert!(leg.is_destroyed);
        assert!(!leg.in_crisis);

        apply_wound(&mut body, hit(BodyPart::Head, 20), 1);
        assert_eq!(
            tick_crises(&mut body),
            vec![CrisisResolution::Died(DeathCause::CrisisExpired(
                BodyPart::Head
            ))]
        );
    }

    #[test]
    fn fall_of_one_level_is_free() {
        let rng = ScriptedRng::new([6, 6]);
        let mut cursor = RollCursor::new(0);
        let mut dice = Dice::new(&rng, &mut cursor);
        assert_eq!(roll_fall_damage(1, &mut dice), 0);
        assert_eq!(roll_fall_damage(3, &mut dice), 12);
    }

    proptest! {
        #[test]
        fn part_health_stays_within_bounds(
            wounds in proptest::collection::vec(
                (0usize..BodyPart::COUNT, 0u32..40, 0u32..6, prop::bool::weighted(0.1), any::<bool>()),
                1..60,
            )
        ) {
            let mut body = Body::default();
            for (index, raw, armor, force_destroy, tick) in wounds {
                let hit = Hit {
                    part: BodyPart::ALL[index],
                    effective: mitigate(raw, armor),
                    damage_type: DamageType::Physical,
                    force_destroy,
                };
                apply_wound(&mut body, hit, 3);
                prop_assert!(body.within_bounds());
                if tick {
                    tick_crises(&mut body);
                    prop_assert!(body.within_bounds());
                }
            }
        }
    }
}
