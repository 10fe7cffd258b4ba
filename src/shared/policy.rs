//! Key-assignment policies
//!
//! Pure helpers that turn a position request (append, insert at index, full
//! reorder) into rank keys. Both sides use them: the ordering service applies
//! them against the freshly-read database order, the optimistic store applies
//! them against the local order to produce best-guess provisional keys.

use crate::shared::rank::{RankError, RankKey};

/// Key for appending after the current last item
///
/// `next(last)` when the container has items, `min()` when it is empty.
pub fn append_key(last: Option<&RankKey>) -> RankKey {
    match last {
        Some(last) => last.next(),
        None => RankKey::min(),
    }
}

/// Key for inserting at `target_index` within the given ascending key list
///
/// The index is clamped to `0..=keys.len()`: before all items the result is
/// `prev(first)`, after all items `next(last)`, otherwise strictly between
/// the neighbors at `target_index - 1` and `target_index`. Negative indices
/// are rejected at the protocol boundary before this is reached.
pub fn insert_key(keys: &[RankKey], target_index: usize) -> Result<RankKey, RankError> {
    if keys.is_empty() {
        return Ok(RankKey::min());
    }
    let index = target_index.min(keys.len());
    if index == 0 {
        Ok(keys[0].prev())
    } else if index == keys.len() {
        Ok(keys[keys.len() - 1].next())
    } else {
        RankKey::between(&keys[index - 1], &keys[index])
    }
}

/// Strictly increasing key sequence for a full reorder of `len` items
///
/// `min()`, then successive `next()` applications.
pub fn reorder_keys(len: usize) -> Vec<RankKey> {
    let mut keys = Vec::with_capacity(len);
    let mut current = RankKey::min();
    for _ in 0..len {
        let following = current.next();
        keys.push(current);
        current = following;
    }
    keys
}
