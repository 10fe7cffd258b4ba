//! Pending Set
//!
//! Tracks the ids currently awaiting server confirmation. The UI consults it
//! to mark an item as "not yet real" - interaction is disabled and a pending
//! affordance shown until the id resolves or rolls back.
//!
//! The set is an explicit field owned by the optimistic store (add on
//! propose, remove on resolve), never module-level shared state.

use std::collections::HashSet;
use uuid::Uuid;

/// Ids awaiting server confirmation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSet {
    ids: HashSet<Uuid>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an id as awaiting confirmation
    pub fn mark(&mut self, id: Uuid) {
        self.ids.insert(id);
    }

    /// Clear an id after resolve-success or resolve-failure
    ///
    /// Returns whether the id was actually pending.
    pub fn resolve(&mut self, id: Uuid) -> bool {
        self.ids.remove(&id)
    }

    /// Whether an id is still awaiting confirmation
    pub fn is_pending(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_resolve() {
        let mut pending = PendingSet::new();
        let id = Uuid::new_v4();
        assert!(!pending.is_pending(id));

        pending.mark(id);
        assert!(pending.is_pending(id));
        assert_eq!(pending.len(), 1);

        assert!(pending.resolve(id));
        assert!(!pending.is_pending(id));
        assert!(pending.is_empty());

        // Resolving twice is harmless.
        assert!(!pending.resolve(id));
    }
}
