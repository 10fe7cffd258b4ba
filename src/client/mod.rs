//! Client-side synchronization layer
//!
//! Everything a board UI needs between the widget tree and the wire:
//!
//! - [`store`]: the generic optimistic store (propose, resolve, rollback)
//! - [`board`]: per-board composition of column and card stores
//! - [`reconcile`]: merging broadcast events, with self-echo suppression
//! - [`pending`]: the set of ids with unconfirmed local changes
//! - [`api`]: typed HTTP calls and the SSE event subscription
//!
//! The store and reconciler are pure in-memory state machines with no I/O,
//! so they compile for any target; only [`api`] touches the network.

pub mod api;
pub mod board;
pub mod pending;
pub mod reconcile;
pub mod store;

pub use api::{ClientError, OrderingApi};
pub use board::BoardStore;
pub use pending::PendingSet;
pub use reconcile::Reconciler;
pub use store::{Applied, OptimisticStore, RolledBack, StoreError};
