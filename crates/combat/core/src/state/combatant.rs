//! Combatant record and its sub-components.
//!
//! A [`Combatant`] outlives encounters; it is owned by the [`super::Roster`]
//! (the world registry) and only borrowed by the engine.

use strum::{Display, EnumIter};

use super::{AggroList, AiMemory, Body, BodyPart, EntityId, Position, TeamId};
use crate::action::Hand;
use crate::config::CombatConfig;
use crate::env::WeaponId;

/// Core attributes. Scores use the 3–20 scale; see [`Stats::modifier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Stat {
    Strength,
    Dexterity,
    Constitution,
    Willpower,
    Perception,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub willpower: i32,
    pub perception: i32,
}

impl Stats {
    pub const fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        willpower: i32,
        perception: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            willpower,
            perception,
        }
    }

    pub fn score(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Dexterity => self.dexterity,
            Stat::Constitution => self.constitution,
            Stat::Willpower => self.willpower,
            Stat::Perception => self.perception,
        }
    }

    /// `floor((score - 10) / 2)`: 10–11 → 0, 12–13 → +1, 8–9 → −1.
    pub fn modifier(&self, stat: Stat) -> i32 {
        (self.score(stat) - 10).div_euclid(2)
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10)
    }
}

/// Trained skills. Values are stored directly as roll modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Skill {
    Unarmed,
    MeleeWeapons,
    Guns,
    Explosives,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skills {
    pub unarmed: i32,
    pub melee_weapons: i32,
    pub guns: i32,
    pub explosives: i32,
}

impl Skills {
    pub fn modifier(&self, skill: Skill) -> i32 {
        match skill {
            Skill::Unarmed => self.unarmed,
            Skill::MeleeWeapons => self.melee_weapons,
            Skill::Guns => self.guns,
            Skill::Explosives => self.explosives,
        }
    }
}

/// Flat armor per body part, subtracted from raw damage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Armor {
    values: [u32; BodyPart::COUNT],
}

impl Armor {
    pub fn uniform(value: u32) -> Self {
        Self {
            values: [value; BodyPart::COUNT],
        }
    }

    pub fn with_part(mut self, part: BodyPart, value: u32) -> Self {
        self.values[part.index()] = value;
        self
    }

    pub fn for_part(&self, part: BodyPart) -> u32 {
        self.values[part.index()]
    }
}

/// A held weapon and its ammunition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponSlot {
    pub weapon: WeaponId,
    /// Rounds in the magazine. Ignored for weapons without a magazine.
    pub loaded: u32,
    pub reserve: u32,
}

impl WeaponSlot {
    pub const fn new(weapon: WeaponId) -> Self {
        Self {
            weapon,
            loaded: 0,
            reserve: 0,
        }
    }

    pub const fn with_ammo(weapon: WeaponId, loaded: u32, reserve: u32) -> Self {
        Self {
            weapon,
            loaded,
            reserve,
        }
    }
}

/// Weapons in hand. An empty main hand means unarmed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loadout {
    pub main_hand: Option<WeaponSlot>,
    pub off_hand: Option<WeaponSlot>,
}

impl Loadout {
    pub fn slot(&self, hand: Hand) -> Option<&WeaponSlot> {
        match hand {
            Hand::Main => self.main_hand.as_ref(),
            Hand::Off => self.off_hand.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, hand: Hand) -> Option<&mut WeaponSlot> {
        match hand {
            Hand::Main => self.main_hand.as_mut(),
            Hand::Off => self.off_hand.as_mut(),
        }
    }

    /// Held weapons, main hand first.
    pub fn held(&self) -> impl Iterator<Item = &WeaponSlot> {
        self.main_hand.iter().chain(self.off_hand.iter())
    }
}

/// Per-turn action economy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Points {
    pub action: u32,
    pub movement: u32,
    pub max_action: u32,
    pub max_movement: u32,
}

impl Points {
    pub const fn new(max_action: u32, max_movement: u32) -> Self {
        Self {
            action: max_action,
            movement: max_movement,
            max_action,
            max_movement,
        }
    }

    /// Refills both pools. Each destroyed leg halves the movement pool.
    pub fn reset(&mut self, destroyed_legs: u32) {
        self.action = self.max_action;
        self.movement = self.max_movement >> destroyed_legs.min(31);
    }

    pub fn exhausted(&self) -> bool {
        self.action == 0 && self.movement == 0
    }

    pub fn clear(&mut self) {
        self.action = 0;
        self.movement = 0;
    }
}

impl Default for Points {
    fn default() -> Self {
        Self::new(
            CombatConfig::DEFAULT_ACTION_POINTS,
            CombatConfig::DEFAULT_MOVEMENT_POINTS,
        )
    }
}

/// Who decides this combatant's actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Controller {
    Player,
    Npc,
    /// AI-driven ally of the player that honours standing orders.
    Companion,
}

/// Standing orders issued to companions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StandingOrder {
    /// No restriction: chase and attack.
    #[default]
    Engage,
    /// Stay within follow distance of the player.
    FollowClose,
    /// Never move; attack only what can be hit from here.
    WaitHere { at: Position },
    /// Engage only targets near the point and return to it.
    DefendPoint { point: Position, radius: u32 },
    /// Loot around a centre when not fighting.
    ScavengeArea { center: Position, radius: u32 },
}

/// Personality used to weight protective target scoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BehaviorProfile {
    Aggressive,
    #[default]
    Balanced,
    Protective,
    Scavenger,
}

impl BehaviorProfile {
    /// Percentage applied to the companion guard bonus.
    pub const fn guard_weight_percent(self) -> i32 {
        match self {
            BehaviorProfile::Aggressive => 50,
            BehaviorProfile::Balanced => 100,
            BehaviorProfile::Protective => 200,
            BehaviorProfile::Scavenger => 75,
        }
    }
}

/// A participant in tactical combat.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: EntityId,
    pub name: String,
    pub team: TeamId,
    pub controller: Controller,
    pub position: Position,

    pub body: Body,
    pub stats: Stats,
    pub skills: Skills,
    pub armor: Armor,
    pub loadout: Loadout,

    pub points: Points,
    pub moved_this_turn: bool,

    pub aggro: AggroList,
    pub memory: AiMemory,
    pub orders: StandingOrder,
    pub profile: BehaviorProfile,

    // === Encounter-transient, cleared by end_encounter ===
    pub grappling: Option<EntityId>,
    pub grappled_by: Option<EntityId>,
    pub cached_cover: Option<i32>,
}

impl Combatant {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        team: TeamId,
        controller: Controller,
        position: Position,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            controller,
            position,
            body: Body::default(),
            stats: Stats::default(),
            skills: Skills::default(),
            armor: Armor::default(),
            loadout: Loadout::default(),
            points: Points::default(),
            moved_this_turn: false,
            aggro: AggroList::new(),
            memory: AiMemory::default(),
            orders: StandingOrder::default(),
            profile: BehaviorProfile::default(),
            grappling: None,
            grappled_by: None,
            cached_cover: None,
        }
    }

    pub fn player(name: impl Into<String>, position: Position) -> Self {
        Self::new(
            EntityId::PLAYER,
            name,
            TeamId::PLAYER,
            Controller::Player,
            position,
        )
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_skills(mut self, skills: Skills) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn with_armor(mut self, armor: Armor) -> Self {
        self.armor = armor;
        self
    }

    pub fn with_main_hand(mut self, slot: WeaponSlot) -> Self {
        self.loadout.main_hand = Some(slot);
        self
    }

    pub fn with_off_hand(mut self, slot: WeaponSlot) -> Self {
        self.loadout.off_hand = Some(slot);
        self
    }

    pub fn with_points(mut self, points: Points) -> Self {
        self.points = points;
        self
    }

    pub fn with_orders(mut self, orders: StandingOrder) -> Self {
        self.orders = orders;
        self
    }

    pub fn with_profile(mut self, profile: BehaviorProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn is_player(&self) -> bool {
        matches!(self.controller, Controller::Player)
    }

    pub fn is_companion(&self) -> bool {
        matches!(self.controller, Controller::Companion)
    }

    pub fn is_hostile_to(&self, other: &Combatant) -> bool {
        self.team != other.team
    }

    pub fn stat_modifier(&self, stat: Stat) -> i32 {
        self.stats.modifier(stat)
    }

    pub fn skill_modifier(&self, skill: Skill) -> i32 {
        self.skills.modifier(skill)
    }

    /// Resets the turn economy at the start of this combatant's own turn.
    pub fn begin_turn(&mut self) {
        let destroyed_legs = self.body.destroyed_legs();
        self.points.reset(destroyed_legs);
        self.moved_this_turn = false;
    }

    /// Clears encounter-scoped flags.
    pub fn clear_encounter_state(&mut self) {
        self.grappling = None;
        self.grappled_by = None;
        self.cached_cover = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_modifier_floors_toward_negative() {
        let stats = Stats::new(9, 14, 10, 11, 3);
        assert_eq!(stats.modifier(Stat::Strength), -1);
        assert_eq!(stats.modifier(Stat::Dexterity), 2);
        assert_eq!(stats.modifier(Stat::Constitution), 0);
        assert_eq!(stats.modifier(Stat::Willpower), 0);
        assert_eq!(stats.modifier(Stat::Perception), -4);
    }

    #[test]
    fn destroyed_legs_halve_movement() {
        let mut npc = Combatant::new(
            EntityId(3),
            "raider",
            TeamId(1),
            Controller::Npc,
            Position::ORIGIN,
        )
        .with_points(Points::new(2, 8));
        npc.body.part_mut(BodyPart::LeftLeg).is_destroyed = true;
        npc.points.clear();

        npc.begin_turn();

        assert_eq!(npc.points.action, 2);
        assert_eq!(npc.points.movement, 4);
    }
}
