//! Optimistic Local Store
//!
//! Mutates the in-memory order synchronously on user action, before the
//! server confirms anything. Every mutating operation follows the same state
//! machine:
//!
//! 1. **Propose**: take an immutable snapshot of the prior state, then mutate
//!    the local order (a provisional entry for create, locally recomputed
//!    keys for move/reorder) and mark the subject id pending.
//! 2. **Commit attempt**: the caller issues the remote call; the local UI is
//!    already consistent with the proposed state.
//! 3. **Resolve-success**: swap the provisional entry for the canonical item
//!    at the list position it *currently* occupies (no re-sort, no visible
//!    jump), or adopt the canonical rank for move/reorder; clear pending.
//! 4. **Resolve-failure**: restore the pre-mutation snapshot in full and
//!    surface a recoverable [`RolledBack`] notice; clear pending.
//!
//! Only one outstanding request per subject is assumed. A second propose on a
//! subject still in flight overwrites the expected outcome but keeps the
//! snapshot taken before the first in-flight request, so a failure rolls the
//! whole overlapping sequence back.
//!
//! The store is generic over [`Positioned`] so columns and cards share the
//! same machinery; [`super::board::BoardStore`] composes one store per kind.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::client::pending::PendingSet;
use crate::shared::event::RankedId;
use crate::shared::item::Positioned;
use crate::shared::policy;
use crate::shared::rank::{RankError, RankKey};

/// Errors from propose operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// The container is not loaded locally
    #[error("container {0} is not loaded locally")]
    UnknownContainer(Uuid),

    /// The item is not present locally
    #[error("item {0} is not present locally")]
    UnknownItem(Uuid),

    /// A provisional key could not be derived (e.g. equal neighbor keys left
    /// behind by a concurrent-write tie)
    #[error(transparent)]
    Rank(#[from] RankError),
}

/// Recoverable notice surfaced to the user after a rollback
#[derive(Debug, Clone, PartialEq)]
pub struct RolledBack {
    /// The id whose in-flight operation failed
    pub subject_id: Uuid,
    /// Human-readable reason, suitable for a notification
    pub reason: String,
}

impl std::fmt::Display for RolledBack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "change to {} was undone: {}", self.subject_id, self.reason)
    }
}

/// Outcome of merging a remote `ItemCreated` event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The canonical id already existed locally; duplicate delivery, no-op
    AlreadyPresent,
    /// A provisional entry matched the correlation token and was replaced in
    /// place; carries the provisional id that was swapped out
    ReplacedProvisional(Uuid),
    /// The item was inserted and the container re-sorted by rank
    Inserted,
}

/// The ordered lists of one item kind, keyed by container id
///
/// Each list is kept ascending by `(rank, id)` - the id tie-break keeps the
/// order stable when concurrent writers land equal rank keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSet<P> {
    lists: HashMap<Uuid, Vec<P>>,
}

impl<P: Positioned + Clone> ListSet<P> {
    pub fn new() -> Self {
        Self {
            lists: HashMap::new(),
        }
    }

    /// Register a container, creating an empty list if absent
    pub fn ensure_container(&mut self, container_id: Uuid) {
        self.lists.entry(container_id).or_default();
    }

    /// Drop a container and its items (e.g. a deleted column)
    pub fn remove_container(&mut self, container_id: Uuid) -> Option<Vec<P>> {
        self.lists.remove(&container_id)
    }

    /// Move a container's list under a new id, rewriting the items' owner
    ///
    /// Used when a provisional container id is swapped for the canonical one.
    pub fn rename_container(&mut self, old_id: Uuid, new_id: Uuid) {
        if let Some(mut list) = self.lists.remove(&old_id) {
            for item in &mut list {
                item.set_container_id(new_id);
            }
            self.lists.insert(new_id, list);
        }
    }

    pub fn contains_container(&self, container_id: Uuid) -> bool {
        self.lists.contains_key(&container_id)
    }

    /// Items of one container in display order
    pub fn items(&self, container_id: Uuid) -> Option<&[P]> {
        self.lists.get(&container_id).map(|list| list.as_slice())
    }

    /// Find an item's container and index
    pub fn locate(&self, item_id: Uuid) -> Option<(Uuid, usize)> {
        for (container_id, list) in &self.lists {
            if let Some(index) = list.iter().position(|item| item.id() == item_id) {
                return Some((*container_id, index));
            }
        }
        None
    }

    pub fn contains_item(&self, item_id: Uuid) -> bool {
        self.locate(item_id).is_some()
    }

    pub fn get(&self, item_id: Uuid) -> Option<&P> {
        let (container_id, index) = self.locate(item_id)?;
        self.lists.get(&container_id)?.get(index)
    }

    fn get_mut(&mut self, item_id: Uuid) -> Option<&mut P> {
        let (container_id, index) = self.locate(item_id)?;
        self.lists.get_mut(&container_id)?.get_mut(index)
    }

    /// Insert an item into its container, keeping the list sorted
    pub fn insert_sorted(&mut self, item: P) {
        let list = self.lists.entry(item.container_id()).or_default();
        list.push(item);
        sort_by_rank(list);
    }

    /// Remove an item from whichever container currently holds it
    pub fn remove_item(&mut self, item_id: Uuid) -> Option<P> {
        let (container_id, index) = self.locate(item_id)?;
        Some(self.lists.get_mut(&container_id)?.remove(index))
    }

    /// Replace the element at a fixed position, without re-sorting
    fn replace_at(&mut self, container_id: Uuid, index: usize, item: P) {
        if let Some(slot) = self
            .lists
            .get_mut(&container_id)
            .and_then(|list| list.get_mut(index))
        {
            *slot = item;
        }
    }

    fn resort(&mut self, container_id: Uuid) {
        if let Some(list) = self.lists.get_mut(&container_id) {
            sort_by_rank(list);
        }
    }
}

impl<P: Positioned + Clone> Default for ListSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_by_rank<P: Positioned>(list: &mut [P]) {
    list.sort_by(|a, b| a.rank().cmp(b.rank()).then_with(|| a.id().cmp(&b.id())));
}

/// An operation awaiting its server response
#[derive(Debug, Clone)]
struct InFlight<P> {
    /// Full copy of the list set taken before the operation mutated anything
    snapshot: ListSet<P>,
}

/// Optimistic store for one item kind (see the module docs)
#[derive(Debug, Clone)]
pub struct OptimisticStore<P: Positioned + Clone> {
    lists: ListSet<P>,
    pending: PendingSet,
    in_flight: HashMap<Uuid, InFlight<P>>,
}

impl<P: Positioned + Clone> OptimisticStore<P> {
    pub fn new() -> Self {
        Self {
            lists: ListSet::new(),
            pending: PendingSet::new(),
            in_flight: HashMap::new(),
        }
    }

    /// The current lists, for rendering and for snapshot comparison in tests
    pub fn lists(&self) -> &ListSet<P> {
        &self.lists
    }

    pub fn pending(&self) -> &PendingSet {
        &self.pending
    }

    pub fn is_pending(&self, id: Uuid) -> bool {
        self.pending.is_pending(id)
    }

    /// Register an (empty) container
    pub fn ensure_container(&mut self, container_id: Uuid) {
        self.lists.ensure_container(container_id);
    }

    /// Replace a container's content from a server snapshot (hydration)
    pub fn load_container(&mut self, container_id: Uuid, items: Vec<P>) {
        self.lists.remove_container(container_id);
        self.lists.ensure_container(container_id);
        for item in items {
            self.lists.insert_sorted(item);
        }
    }

    /// Best-guess key for appending to a container's tail
    pub fn append_rank(&self, container_id: Uuid) -> RankKey {
        let last = self
            .lists
            .items(container_id)
            .and_then(|items| items.last())
            .map(|item| item.rank());
        policy::append_key(last)
    }

    /// Take the rollback snapshot for `subject_id` unless one is already held
    ///
    /// An existing snapshot means an earlier request on the same subject is
    /// still in flight: the new operation overwrites its expected outcome but
    /// a failure must restore the state preceding the whole sequence.
    fn begin(&mut self, subject_id: Uuid) {
        if !self.in_flight.contains_key(&subject_id) {
            self.in_flight.insert(
                subject_id,
                InFlight {
                    snapshot: self.lists.clone(),
                },
            );
        }
    }

    /// Propose: insert a provisional entry at its container's tail
    ///
    /// The caller builds the entry with a freshly generated temporary id and
    /// a rank from [`Self::append_rank`]; that id is returned and doubles as
    /// the correlation token for the remote create request.
    pub fn propose_create(&mut self, item: P) -> Uuid {
        let temp_id = item.id();
        self.begin(temp_id);
        self.lists.insert_sorted(item);
        self.pending.mark(temp_id);
        temp_id
    }

    /// Propose: move an item to `target_index` within `to_container`
    ///
    /// Computes a best-guess key against the local destination order; the
    /// server recomputes the canonical key against its own current order.
    pub fn propose_move(
        &mut self,
        item_id: Uuid,
        to_container: Uuid,
        target_index: usize,
    ) -> Result<RankKey, StoreError> {
        if !self.lists.contains_item(item_id) {
            return Err(StoreError::UnknownItem(item_id));
        }
        // Derive the key before mutating so an error leaves no side effects.
        let keys: Vec<RankKey> = self
            .lists
            .items(to_container)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.id() != item_id)
                    .map(|item| item.rank().clone())
                    .collect()
            })
            .unwrap_or_default();
        let rank = policy::insert_key(&keys, target_index)?;

        self.begin(item_id);
        if let Some(mut item) = self.lists.remove_item(item_id) {
            item.set_container_id(to_container);
            item.set_rank(rank.clone());
            self.lists.insert_sorted(item);
        }
        self.pending.mark(item_id);
        Ok(rank)
    }

    /// Propose: rewrite a container's full order
    ///
    /// Ids not present in the container are ignored; items not named keep
    /// their keys. The container id is the pending subject.
    pub fn propose_reorder(
        &mut self,
        container_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<(), StoreError> {
        if !self.lists.contains_container(container_id) {
            return Err(StoreError::UnknownContainer(container_id));
        }
        self.begin(container_id);
        self.assign_order(container_id, ordered_ids);
        self.pending.mark(container_id);
        Ok(())
    }

    fn assign_order(&mut self, container_id: Uuid, ordered_ids: &[Uuid]) {
        let present: Vec<Uuid> = ordered_ids
            .iter()
            .copied()
            .filter(|id| {
                self.lists
                    .items(container_id)
                    .is_some_and(|items| items.iter().any(|item| item.id() == *id))
            })
            .collect();
        let keys = policy::reorder_keys(present.len());
        for (id, key) in present.into_iter().zip(keys) {
            if let Some(item) = self.lists.get_mut(id) {
                item.set_rank(key);
            }
        }
        self.lists.resort(container_id);
    }

    /// Resolve-success for a create: swap provisional for canonical in place
    ///
    /// The canonical item lands at the list position the provisional entry
    /// *currently* occupies (a broadcast merge or another local edit may have
    /// moved it since the propose), so nothing jumps visibly.
    pub fn resolve_create_success(&mut self, temp_id: Uuid, canonical: P) {
        self.pending.resolve(temp_id);
        self.in_flight.remove(&temp_id);
        match self.lists.locate(temp_id) {
            Some((container_id, index)) => {
                let mut canonical = canonical;
                canonical.set_container_id(container_id);
                self.lists.replace_at(container_id, index, canonical);
            }
            None => {
                // Container torn down or entry already replaced by a
                // correlated broadcast; the response no longer applies.
                tracing::warn!(%temp_id, "create response for absent provisional entry, dropping");
            }
        }
    }

    /// Resolve-success for a move: adopt the canonical key and re-sort
    ///
    /// A broadcast merge interleaved between propose and resolve may have
    /// shifted neighbours, so the adopted key can land the item at a
    /// different position than the provisional one.
    pub fn resolve_move_success(&mut self, item_id: Uuid, canonical_rank: RankKey) {
        self.pending.resolve(item_id);
        self.in_flight.remove(&item_id);
        match self.lists.locate(item_id) {
            Some((container_id, _)) => {
                if let Some(item) = self.lists.get_mut(item_id) {
                    item.set_rank(canonical_rank);
                }
                self.lists.resort(container_id);
            }
            None => {
                tracing::warn!(%item_id, "move response for absent item, dropping");
            }
        }
    }

    /// Resolve-success for a reorder: adopt the canonical keys by id and
    /// re-sort
    pub fn resolve_reorder_success(&mut self, container_id: Uuid, ordered: &[RankedId]) {
        self.pending.resolve(container_id);
        self.in_flight.remove(&container_id);
        if !self.lists.contains_container(container_id) {
            tracing::warn!(%container_id, "reorder response for absent container, dropping");
            return;
        }
        for entry in ordered {
            if let Some(item) = self.lists.get_mut(entry.item_id) {
                item.set_rank(entry.rank.clone());
            }
        }
        self.lists.resort(container_id);
    }

    /// Resolve-failure: restore the pre-mutation snapshot in full
    ///
    /// No partial-state repairs are attempted. Returns a recoverable notice
    /// for the UI, or `None` when nothing was in flight for the subject.
    pub fn resolve_failure(&mut self, subject_id: Uuid, reason: &str) -> Option<RolledBack> {
        self.pending.resolve(subject_id);
        match self.in_flight.remove(&subject_id) {
            Some(in_flight) => {
                self.lists = in_flight.snapshot;
                tracing::warn!(%subject_id, reason, "rolled back optimistic mutation");
                Some(RolledBack {
                    subject_id,
                    reason: reason.to_string(),
                })
            }
            None => {
                tracing::warn!(%subject_id, "failure response without in-flight operation");
                None
            }
        }
    }

    // ---- Remote-event merge entry points (used by the reconciler) ----
    //
    // All of these are idempotent: applying the same event twice leaves the
    // state byte-identical to applying it once.

    /// Merge a remote create
    pub fn apply_remote_created(&mut self, item: P, correlation_token: Option<Uuid>) -> Applied {
        if self.lists.contains_item(item.id()) {
            return Applied::AlreadyPresent;
        }
        if let Some(token) = correlation_token {
            if self.pending.is_pending(token) {
                if let Some((container_id, index)) = self.lists.locate(token) {
                    self.pending.resolve(token);
                    self.in_flight.remove(&token);
                    let mut item = item;
                    item.set_container_id(container_id);
                    self.lists.replace_at(container_id, index, item);
                    return Applied::ReplacedProvisional(token);
                }
            }
        }
        self.lists.insert_sorted(item);
        Applied::Inserted
    }

    /// Merge a remote move; placement follows the event's rank key, never the
    /// index hint
    ///
    /// Returns `false` when the item is unknown locally - the event carries
    /// no payload, so it cannot be materialized and must be dropped.
    pub fn apply_remote_moved(
        &mut self,
        item_id: Uuid,
        to_container: Uuid,
        new_rank: RankKey,
    ) -> bool {
        match self.lists.remove_item(item_id) {
            Some(mut item) => {
                item.set_container_id(to_container);
                item.set_rank(new_rank);
                self.lists.insert_sorted(item);
                true
            }
            None => false,
        }
    }

    /// Merge a remote full reorder by id: local non-order fields are kept,
    /// only the rank keys are overwritten
    ///
    /// Returns `false` when the container is unknown locally.
    pub fn apply_remote_reordered(&mut self, container_id: Uuid, ordered: &[RankedId]) -> bool {
        if !self.lists.contains_container(container_id) {
            return false;
        }
        for entry in ordered {
            if let Some(item) = self.lists.get_mut(entry.item_id) {
                item.set_rank(entry.rank.clone());
            }
        }
        self.lists.resort(container_id);
        true
    }

    /// Rename a container (provisional id -> canonical id)
    pub fn rename_container(&mut self, old_id: Uuid, new_id: Uuid) {
        self.lists.rename_container(old_id, new_id);
    }
}

impl<P: Positioned + Clone> Default for OptimisticStore<P> {
    fn default() -> Self {
        Self::new()
    }
}
