//! Asynchronous abstraction for sourcing the player's declarations.
//!
//! The host loop asks a [`PlayerController`] whenever the engine parks for
//! player input, so the same runner drives human input, scripted fixtures or
//! a simple auto-pilot.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use combat_core::{
    AttackDeclaration, AttackKind, CombatState, Combatant, DefenseKind, EntityId, Hand,
    PlayerCommand, WeaponOracle,
};

use super::errors::{ControllerKind, Result, RuntimeError};

/// Source of player commands and defense declarations.
///
/// Returning an error never ends the encounter: the runner forfeits the
/// player's turn (or defends passively) and carries on.
#[async_trait]
pub trait PlayerController: Send + Sync {
    async fn next_command(&self, actor: EntityId, state: &CombatState) -> Result<PlayerCommand>;

    async fn choose_defense(
        &self,
        defender: EntityId,
        attacker: EntityId,
        attack: AttackKind,
        state: &CombatState,
    ) -> Result<DefenseKind>;
}

/// Plays back queued declarations; ends the turn and defends passively once
/// the queues run dry.
#[derive(Debug, Default)]
pub struct ScriptedPlayer {
    commands: Mutex<VecDeque<PlayerCommand>>,
    defenses: Mutex<VecDeque<DefenseKind>>,
}

impl ScriptedPlayer {
    pub fn new(
        commands: impl IntoIterator<Item = PlayerCommand>,
        defenses: impl IntoIterator<Item = DefenseKind>,
    ) -> Self {
        Self {
            commands: Mutex::new(commands.into_iter().collect()),
            defenses: Mutex::new(defenses.into_iter().collect()),
        }
    }
}

#[async_trait]
impl PlayerController for ScriptedPlayer {
    async fn next_command(&self, _actor: EntityId, _state: &CombatState) -> Result<PlayerCommand> {
        let mut commands = self
            .commands
            .lock()
            .map_err(|_| RuntimeError::controller(ControllerKind::Command, "script lock poisoned"))?;
        Ok(commands.pop_front().unwrap_or(PlayerCommand::EndTurn))
    }

    async fn choose_defense(
        &self,
        _defender: EntityId,
        _attacker: EntityId,
        _attack: AttackKind,
        _state: &CombatState,
    ) -> Result<DefenseKind> {
        let mut defenses = self
            .defenses
            .lock()
            .map_err(|_| RuntimeError::controller(ControllerKind::Defense, "script lock poisoned"))?;
        Ok(defenses.pop_front().unwrap_or_default())
    }
}

/// Attacks the nearest hostile it can reach, reloads when dry and otherwise
/// walks toward it.
pub struct AutoPlayer {
    weapons: Arc<dyn WeaponOracle>,
}

impl AutoPlayer {
    pub fn new(weapons: Arc<dyn WeaponOracle>) -> Self {
        Self { weapons }
    }

    fn main_attack(&self, player: &Combatant) -> AttackKind {
        let weapon = player
            .loadout
            .main_hand
            .and_then(|slot| self.weapons.weapon(slot.weapon));
        AttackKind::classify(weapon.as_ref())
    }

    fn tracks_ammo(&self, player: &Combatant) -> bool {
        player
            .loadout
            .main_hand
            .and_then(|slot| self.weapons.weapon(slot.weapon))
            .is_some_and(|weapon| weapon.magazine.is_some())
    }
}

fn nearest_hostile<'s>(state: &'s CombatState, player: &Combatant) -> Option<&'s Combatant> {
    state
        .roster
        .iter()
        .filter(|other| other.is_hostile_to(player))
        .filter(|other| state.encounter.tracker.contains(other.id))
        .min_by_key(|other| (player.position.distance_squared(other.position), other.id))
}

#[async_trait]
impl PlayerController for AutoPlayer {
    async fn next_command(&self, actor: EntityId, state: &CombatState) -> Result<PlayerCommand> {
        let player = state.roster.get(actor).ok_or_else(|| {
            RuntimeError::controller(ControllerKind::Command, format!("{actor} not in roster"))
        })?;
        let Some(target) = nearest_hostile(state, player) else {
            return Ok(PlayerCommand::EndTurn);
        };

        if player.points.action > 0 {
            let attack = self.main_attack(player);
            let in_reach = player
                .position
                .within(target.position, state.config.melee_reach);
            let slot = player.loadout.main_hand;
            if attack.is_close_combat() {
                if in_reach {
                    return Ok(PlayerCommand::Attack(AttackDeclaration::at(target.id)));
                }
            } else if !self.tracks_ammo(player) || slot.is_some_and(|s| s.loaded > 0) {
                return Ok(PlayerCommand::Attack(AttackDeclaration::at(target.id)));
            } else if slot.is_some_and(|s| s.reserve > 0) {
                return Ok(PlayerCommand::Reload { hand: Hand::Main });
            }
        }

        let adjacent = player
            .position
            .within(target.position, state.config.melee_reach);
        if player.points.movement > 0 && !adjacent {
            return Ok(PlayerCommand::Move {
                toward: target.position,
            });
        }
        Ok(PlayerCommand::EndTurn)
    }

    async fn choose_defense(
        &self,
        defender: EntityId,
        _attacker: EntityId,
        attack: AttackKind,
        state: &CombatState,
    ) -> Result<DefenseKind> {
        let armed = state
            .roster
            .get(defender)
            .is_some_and(|player| matches!(self.main_attack(player), AttackKind::Melee { .. }));
        Ok(if armed && attack.is_close_combat() {
            DefenseKind::BlockArmed
        } else {
            DefenseKind::Dodge
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::WeaponCatalog;
    use combat_core::{Controller, Position, Roster, TeamId, WeaponId, WeaponSlot};

    const KNIFE: WeaponId = WeaponId(2);
    const PISTOL: WeaponId = WeaponId(1);

    fn state_with(player: Combatant, raider_at: Position) -> CombatState {
        let raider = Combatant::new(EntityId(7), "raider", TeamId(2), Controller::Npc, raider_at);
        let roster: Roster = [player, raider].into_iter().collect();
        let mut state = CombatState::new(roster, 1);
        state.encounter.tracker = combat_core::InitiativeTracker::from_entries(vec![
            combat_core::InitiativeEntry {
                entity: EntityId::PLAYER,
                roll: 12,
                is_player: true,
            },
            combat_core::InitiativeEntry {
                entity: EntityId(7),
                roll: 8,
                is_player: false,
            },
        ]);
        state
    }

    fn auto() -> AutoPlayer {
        AutoPlayer::new(Arc::new(WeaponCatalog::standard()))
    }

    #[tokio::test]
    async fn scripted_player_falls_back_to_ending_the_turn() {
        let player = ScriptedPlayer::new([PlayerCommand::Reload { hand: Hand::Main }], []);
        let state = CombatState::new(Roster::new(), 0);

        let first = player.next_command(EntityId::PLAYER, &state).await.unwrap();
        let second = player.next_command(EntityId::PLAYER, &state).await.unwrap();
        let defense = player
            .choose_defense(EntityId::PLAYER, EntityId(7), AttackKind::Unarmed, &state)
            .await
            .unwrap();

        assert_eq!(first, PlayerCommand::Reload { hand: Hand::Main });
        assert_eq!(second, PlayerCommand::EndTurn);
        assert_eq!(defense, DefenseKind::None);
    }

    #[tokio::test]
    async fn auto_player_closes_in_with_a_knife() {
        let player = Combatant::player("hero", Position::flat(0, 0))
            .with_main_hand(WeaponSlot::new(KNIFE));
        let state = state_with(player, Position::flat(4, 0));

        let command = auto().next_command(EntityId::PLAYER, &state).await.unwrap();
        assert_eq!(
            command,
            PlayerCommand::Move {
                toward: Position::flat(4, 0)
            }
        );
    }

    #[tokio::test]
    async fn auto_player_reloads_an_empty_pistol() {
        let player = Combatant::player("hero", Position::flat(0, 0))
            .with_main_hand(WeaponSlot::with_ammo(PISTOL, 0, 6));
        let state = state_with(player, Position::flat(4, 0));

        let command = auto().next_command(EntityId::PLAYER, &state).await.unwrap();
        assert_eq!(command, PlayerCommand::Reload { hand: Hand::Main });
    }

    #[tokio::test]
    async fn auto_player_blocks_melee_with_a_blade() {
        let player = Combatant::player("hero", Position::flat(0, 0))
            .with_main_hand(WeaponSlot::new(KNIFE));
        let state = state_with(player, Position::flat(1, 0));

        let defense = auto()
            .choose_defense(EntityId::PLAYER, EntityId(7), AttackKind::Unarmed, &state)
            .await
            .unwrap();
        assert_eq!(defense, DefenseKind::BlockArmed);
    }
}
