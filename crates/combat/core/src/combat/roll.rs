//! Immutable roll records.

use strum::Display;

/// Where a modifier came from. Kept on every roll so totals can be audited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ModifierSource {
    Skill,
    Strength,
    Dexterity,
    Constitution,
    Willpower,
    BodyPart,
    Range,
    WeaponClass,
    FireMode,
    Movement,
    Lighting,
    Cover,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub source: ModifierSource,
    pub value: i32,
}

impl Modifier {
    pub const fn new(source: ModifierSource, value: i32) -> Self {
        Self { source, value }
    }
}

/// Critical flag of a d20 roll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Critical {
    #[default]
    None,
    /// Natural 20.
    Success,
    /// Natural 1.
    Failure,
}

/// How the natural d20 was obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollMode {
    #[default]
    Normal,
    /// Lower of two dice; `discarded` is the higher one.
    Disadvantage { discarded: u32 },
}

/// One attack or defense roll.
///
/// `total` always equals `natural + sum(modifiers)`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollResult {
    pub natural: u32,
    pub mode: RollMode,
    pub modifiers: Vec<Modifier>,
    pub total: i32,
    pub critical: Critical,
}

impl RollResult {
    /// Builds a roll. Critical flags are only set when `crits_allowed`.
    pub fn new(natural: u32, mode: RollMode, modifiers: Vec<Modifier>, crits_allowed: bool) -> Self {
        let total = natural as i32 + modifiers.iter().map(|m| m.value).sum::<i32>();
        let critical = match natural {
            20 if crits_allowed => Critical::Success,
            1 if crits_allowed => Critical::Failure,
            _ => Critical::None,
        };
        Self {
            natural,
            mode,
            modifiers,
            total,
            critical,
        }
    }

    /// Sum of all modifiers from `source`.
    pub fn modifier(&self, source: ModifierSource) -> i32 {
        self.modifiers
            .iter()
            .filter(|m| m.source == source)
            .map(|m| m.value)
            .sum()
    }

    /// Recomputes the total from the recorded components.
    pub fn recomputed_total(&self) -> i32 {
        self.natural as i32 + self.modifiers.iter().map(|m| m.value).sum::<i32>()
    }

    pub fn is_critical_success(&self) -> bool {
        self.critical == Critical::Success
    }

    pub fn is_critical_failure(&self) -> bool {
        self.critical == Critical::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn crits_only_when_allowed() {
        let plain = RollResult::new(20, RollMode::Normal, vec![], true);
        let burst = RollResult::new(20, RollMode::Normal, vec![], false);
        assert!(plain.is_critical_success());
        assert_eq!(burst.critical, Critical::None);
        assert!(RollResult::new(1, RollMode::Normal, vec![], true).is_critical_failure());
    }

    proptest! {
        #[test]
        fn total_equals_sum_of_components(
            natural in 1u32..=20,
            values in proptest::collection::vec(-20i32..=20, 0..8),
        ) {
            let modifiers = values
                .iter()
                .map(|&v| Modifier::new(ModifierSource::Skill, v))
                .collect();
            let roll = RollResult::new(natural, RollMode::Normal, modifiers, true);
            prop_assert_eq!(roll.total, roll.recomputed_total());
            prop_assert_eq!(roll.total, natural as i32 + values.iter().sum::<i32>());
        }
    }
}
