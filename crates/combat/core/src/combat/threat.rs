//! Threat accumulation.
//!
//! This is the only module that mutates [`crate::state::AggroList`]s. Every
//! mutation leaves the touched list sorted by descending threat.

use crate::state::{EntityId, Roster};

/// Spreads `amount` threat against `attacker` to every teammate of `damaged`.
///
/// No-op when `amount` is zero or either party is absent from the roster.
/// Returns the teammates whose lists changed.
pub fn share_aggro(
    roster: &mut Roster,
    damaged: EntityId,
    attacker: EntityId,
    amount: u32,
) -> Vec<EntityId> {
    if amount == 0 || !roster.contains(attacker) {
        return Vec::new();
    }
    let Some(team) = roster.get(damaged).map(|c| c.team) else {
        return Vec::new();
    };

    let recipients: Vec<EntityId> = roster
        .teammates(team, &[damaged, attacker])
        .map(|c| c.id)
        .collect();
    for id in &recipients {
        if let Some(mate) = roster.get_mut(*id) {
            mate.aggro.add(attacker, amount);
        }
    }
    if !recipients.is_empty() {
        tracing::debug!(%damaged, %attacker, amount, shared_with = recipients.len(), "aggro shared");
    }
    recipients
}

/// Records a damaging hit: the victim remembers the attacker and the threat
/// is shared with the victim's team.
pub fn record_hit(
    roster: &mut Roster,
    victim: EntityId,
    attacker: EntityId,
    amount: u32,
) -> Vec<EntityId> {
    if amount == 0 || !roster.contains(attacker) {
        return Vec::new();
    }
    if let Some(target) = roster.get_mut(victim) {
        target.aggro.add(attacker, amount);
    }
    share_aggro(roster, victim, attacker, amount)
}

/// Drops every entry that points at `dead`.
pub fn forget(roster: &mut Roster, dead: EntityId) {
    for combatant in roster.iter_mut() {
        if combatant.aggro.forget(dead) && combatant.memory.target == Some(dead) {
            combatant.memory.forget_target();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Combatant, Controller, Position, TeamId};
    use proptest::prelude::*;

    fn npc(id: u32, team: u16) -> Combatant {
        Combatant::new(
            EntityId(id),
            format!("n{id}"),
            TeamId(team),
            Controller::Npc,
            Position::flat(id as i32, 0),
        )
    }

    fn roster() -> Roster {
        // N = 1, M = 2 on team 1; attacker A = 9 on team 0.
        [npc(1, 1), npc(2, 1), npc(9, 0)].into_iter().collect()
    }

    #[test]
    fn teammate_accumulates_threat_against_attacker() {
        let mut roster = roster();
        let shared = share_aggro(&mut roster, EntityId(1), EntityId(9), 8);
        assert_eq!(shared, vec![EntityId(2)]);
        assert_eq!(
            roster.get(EntityId(2)).and_then(|m| m.aggro.threat_of(EntityId(9))),
            Some(8)
        );

        share_aggro(&mut roster, EntityId(1), EntityId(9), 4);
        let mate = roster.get(EntityId(2)).map(|m| m.aggro.clone());
        assert_eq!(mate.as_ref().map(|a| a.len()), Some(1));
        assert_eq!(mate.and_then(|a| a.threat_of(EntityId(9))), Some(12));
    }

    #[test]
    fn zero_or_absent_is_a_no_op() {
        let mut roster = roster();
        assert!(share_aggro(&mut roster, EntityId(1), EntityId(9), 0).is_empty());
        assert!(share_aggro(&mut roster, EntityId(1), EntityId(42), 5).is_empty());
        assert!(share_aggro(&mut roster, EntityId(42), EntityId(9), 5).is_empty());
        assert!(roster.iter().all(|c| c.aggro.is_empty()));
    }

    #[test]
    fn hit_is_remembered_by_victim_too() {
        let mut roster = roster();
        record_hit(&mut roster, EntityId(1), EntityId(9), 3);
        assert_eq!(
            roster.get(EntityId(1)).and_then(|n| n.aggro.threat_of(EntityId(9))),
            Some(3)
        );
        forget(&mut roster, EntityId(9));
        assert!(roster.iter().all(|c| c.aggro.is_empty()));
    }

    proptest! {
        #[test]
        fn lists_stay_sorted_after_every_mutation(
            hits in proptest::collection::vec((0u32..4, 0u32..20), 1..40)
        ) {
            let mut roster: Roster = (0..4)
                .map(|id| npc(id, 1))
                .chain((10..14).map(|id| npc(id, 0)))
                .collect();
            for (victim, amount) in hits {
                let attacker = EntityId(10 + victim);
                record_hit(&mut roster, EntityId(victim), attacker, amount);
                prop_assert!(roster.iter().all(|c| c.aggro.is_sorted()));
            }
        }
    }
}
