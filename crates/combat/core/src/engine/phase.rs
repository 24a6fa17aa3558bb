use strum::Display;

/// Phases of the combat state machine.
///
/// ```text
/// Idle -> NextTurn -> PlayerAttackDeclare | AttackerDeclare
/// AttackerDeclare -> DefenderDeclare | PlayerDefenseDeclare | ResolveRolls | Reload | Grapple
/// DefenderDeclare -> ResolveRolls -> ApplyDamage -> (continue turn) | NextTurn
/// any active phase -> Ended
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CombatPhase {
    /// No encounter.
    #[default]
    Idle,
    /// Parked until the player declares a command.
    PlayerAttackDeclare,
    /// Parked until the player declares a defense.
    PlayerDefenseDeclare,
    AttackerDeclare,
    DefenderDeclare,
    ResolveRolls,
    ApplyDamage,
    Reload,
    Grapple,
    /// Between turns; `advance_turn` picks the next actor.
    NextTurn,
    Ended,
}

impl CombatPhase {
    /// Phases in which the host has to supply player input.
    pub const fn awaits_player(self) -> bool {
        matches!(
            self,
            CombatPhase::PlayerAttackDeclare | CombatPhase::PlayerDefenseDeclare
        )
    }

    pub const fn is_active(self) -> bool {
        !matches!(self, CombatPhase::Idle | CombatPhase::Ended)
    }

    /// Phases from which the acting combatant may declare its next step.
    const fn continues_turn(self) -> bool {
        matches!(
            self,
            CombatPhase::ApplyDamage
                | CombatPhase::Reload
                | CombatPhase::Grapple
                | CombatPhase::AttackerDeclare
                | CombatPhase::PlayerAttackDeclare
        )
    }

    pub fn can_transition_to(self, next: CombatPhase) -> bool {
        use CombatPhase::*;

        if self == next {
            return true;
        }
        match (self, next) {
            (Idle | Ended, NextTurn) => true,
            (Idle, Ended) => false,
            (_, Ended) => true,
            (NextTurn, PlayerAttackDeclare | AttackerDeclare) => true,
            (PlayerAttackDeclare, AttackerDeclare | Reload | Grapple) => true,
            (
                AttackerDeclare,
                DefenderDeclare | PlayerDefenseDeclare | ResolveRolls | Reload | Grapple,
            ) => true,
            (PlayerDefenseDeclare, DefenderDeclare) => true,
            (DefenderDeclare, ResolveRolls) => true,
            (ResolveRolls, ApplyDamage) => true,
            (from, PlayerAttackDeclare | AttackerDeclare | NextTurn) => from.continues_turn(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CombatPhase::*;

    #[test]
    fn attack_pipeline_is_strictly_sequential() {
        let path = [
            NextTurn,
            AttackerDeclare,
            DefenderDeclare,
            ResolveRolls,
            ApplyDamage,
            NextTurn,
        ];
        assert!(path.windows(2).all(|w| w[0].can_transition_to(w[1])));
        assert!(!AttackerDeclare.can_transition_to(ApplyDamage));
        assert!(!DefenderDeclare.can_transition_to(NextTurn));
    }

    #[test]
    fn sub_actions_bypass_rolls() {
        assert!(AttackerDeclare.can_transition_to(Reload));
        assert!(Reload.can_transition_to(NextTurn));
        assert!(!Reload.can_transition_to(ResolveRolls));
        assert!(Grapple.can_transition_to(PlayerAttackDeclare));
    }

    #[test]
    fn any_active_phase_can_end() {
        assert!(ResolveRolls.can_transition_to(Ended));
        assert!(!Idle.can_transition_to(Ended));
        assert!(Ended.can_transition_to(NextTurn));
    }
}
