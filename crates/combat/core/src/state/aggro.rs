use super::EntityId;

/// One threat source remembered by a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggroEntry {
    pub source: EntityId,
    pub threat: u32,
}

/// Threat list kept sorted by descending threat.
///
/// Only [`crate::combat::threat`] mutates it; everything else reads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggroList {
    entries: Vec<AggroEntry>,
}

impl AggroList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggroEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn threat_of(&self, source: EntityId) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.source == source)
            .map(|entry| entry.threat)
    }

    pub fn top(&self) -> Option<&AggroEntry> {
        self.entries.first()
    }

    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].threat >= w[1].threat)
    }

    /// Adds `amount` to the entry for `source`, appending it if absent, then
    /// re-sorts. The sort is stable so equal threats keep insertion order.
    pub(crate) fn add(&mut self, source: EntityId, amount: u32) {
        match self.entries.iter_mut().find(|entry| entry.source == source) {
            Some(entry) => entry.threat = entry.threat.saturating_add(amount),
            None => self.entries.push(AggroEntry {
                source,
                threat: amount,
            }),
        }
        self.entries.sort_by(|a, b| b.threat.cmp(&a.threat));
    }

    pub(crate) fn forget(&mut self, source: EntityId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.source != source);
        before != self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates_and_resorts() {
        let mut list = AggroList::new();
        list.add(EntityId(1), 5);
        list.add(EntityId(2), 3);
        list.add(EntityId(2), 4);

        let order: Vec<_> = list.iter().map(|e| (e.source, e.threat)).collect();
        assert_eq!(order, vec![(EntityId(2), 7), (EntityId(1), 5)]);
        assert!(list.is_sorted());
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut list = AggroList::new();
        list.add(EntityId(3), 2);
        list.add(EntityId(1), 2);

        assert_eq!(list.top().map(|e| e.source), Some(EntityId(3)));
    }
}
