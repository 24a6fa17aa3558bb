//! Per-body-part wound tracking.

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::combat::DamageType;

/// The six hit locations. One uniform key set for every part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BodyPart {
    Head,
    Torso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl BodyPart {
    pub const COUNT: usize = 6;

    pub const ALL: [BodyPart; Self::COUNT] = [
        BodyPart::Head,
        BodyPart::Torso,
        BodyPart::LeftArm,
        BodyPart::RightArm,
        BodyPart::LeftLeg,
        BodyPart::RightLeg,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Head and torso. Losing either is eventually fatal.
    pub const fn is_vital(self) -> bool {
        matches!(self, BodyPart::Head | BodyPart::Torso)
    }

    pub const fn is_limb(self) -> bool {
        !self.is_vital()
    }

    pub const fn is_leg(self) -> bool {
        matches!(self, BodyPart::LeftLeg | BodyPart::RightLeg)
    }

    /// Attack roll modifier for aiming at this part.
    pub const fn aim_modifier(self) -> i32 {
        match self {
            BodyPart::Head => -4,
            BodyPart::Torso => 0,
            _ => -1,
        }
    }
}

/// Health of a single body part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartHealth {
    pub current: u32,
    pub max: u32,
    pub in_crisis: bool,
    /// Turns of the owner left before the crisis resolves.
    pub crisis_timer: u8,
    pub crisis_damage_type: Option<DamageType>,
    pub is_destroyed: bool,
}

impl PartHealth {
    pub const fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            in_crisis: false,
            crisis_timer: 0,
            crisis_damage_type: None,
            is_destroyed: false,
        }
    }

    /// Current/max ratio, 0 when the part has no capacity.
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }
}

/// Body of a combatant: one [`PartHealth`] per [`BodyPart`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    parts: [PartHealth; BodyPart::COUNT],
}

impl Body {
    pub const DEFAULT_HEAD: u32 = 6;
    pub const DEFAULT_TORSO: u32 = 12;
    pub const DEFAULT_ARM: u32 = 7;
    pub const DEFAULT_LEG: u32 = 8;

    /// Builds a body from per-part maxima in [`BodyPart`] declaration order.
    pub fn from_maxima(maxima: [u32; BodyPart::COUNT]) -> Self {
        Self {
            parts: maxima.map(PartHealth::new),
        }
    }

    pub fn part(&self, part: BodyPart) -> &PartHealth {
        &self.parts[part.index()]
    }

    pub fn part_mut(&mut self, part: BodyPart) -> &mut PartHealth {
        &mut self.parts[part.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyPart, &PartHealth)> {
        BodyPart::iter().map(move |part| (part, self.part(part)))
    }

    /// Mean of the two legs' current/max ratios.
    pub fn avg_leg_health_fraction(&self) -> f32 {
        (self.part(BodyPart::LeftLeg).fraction() + self.part(BodyPart::RightLeg).fraction()) / 2.0
    }

    pub fn destroyed_legs(&self) -> u32 {
        self.iter()
            .filter(|(part, health)| part.is_leg() && health.is_destroyed)
            .count() as u32
    }

    /// A vital part in crisis leaves the combatant unable to act.
    pub fn is_incapacitated(&self) -> bool {
        self.iter()
            .any(|(part, health)| part.is_vital() && health.in_crisis)
    }

    /// Returns true if every part honours `0 <= current <= max`.
    pub fn within_bounds(&self) -> bool {
        self.parts.iter().all(|part| part.current <= part.max)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::from_maxima([
            Self::DEFAULT_HEAD,
            Self::DEFAULT_TORSO,
            Self::DEFAULT_ARM,
            Self::DEFAULT_ARM,
            Self::DEFAULT_LEG,
            Self::DEFAULT_LEG,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leg_fraction_averages_both_legs() {
        let mut body = Body::default();
        body.part_mut(BodyPart::LeftLeg).current = 4;
        body.part_mut(BodyPart::RightLeg).current = 4;

        assert!((body.avg_leg_health_fraction() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_leg_capacity_counts_as_zero() {
        let body = Body::from_maxima([6, 12, 7, 7, 0, 0]);
        assert_eq!(body.avg_leg_health_fraction(), 0.0);
    }

    #[test]
    fn part_keys_render_uniformly() {
        assert_eq!(BodyPart::LeftArm.to_string(), "left_arm");
        assert_eq!(BodyPart::Head.to_string(), "head");
    }
}
