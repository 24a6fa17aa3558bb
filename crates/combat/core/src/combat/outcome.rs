//! Hit/miss decision.

use super::roll::RollResult;

/// Which rule settled the exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecidedBy {
    AttackerCritical,
    AttackerFumble,
    DefenderFumble,
    DefenderCritical,
    Totals,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Verdict {
    pub hit: bool,
    pub decided_by: DecidedBy,
}

/// Applies the precedence rules in order:
/// attacker crit-hit, attacker crit-miss, defender crit-failure,
/// defender crit-success, then `attack > defense` (ties miss).
pub fn decide(attack: &RollResult, defense: &RollResult) -> Verdict {
    let (hit, decided_by) = if attack.is_critical_success() {
        (true, DecidedBy::AttackerCritical)
    } else if attack.is_critical_failure() {
        (false, DecidedBy::AttackerFumble)
    } else if defense.is_critical_failure() {
        (true, DecidedBy::DefenderFumble)
    } else if defense.is_critical_success() {
        (false, DecidedBy::DefenderCritical)
    } else {
        (attack.total > defense.total, DecidedBy::Totals)
    };
    Verdict { hit, decided_by }
}
