//! Board Event System
//!
//! Typed events published by the ordering service after every successful
//! mutation and fanned out to all sessions subscribed to the affected board.
//!
//! Delivery is at-least-once: consumers must tolerate duplicates and, under
//! pathological network conditions, out-of-order delivery of events for the
//! same container. Every payload is therefore self-contained - it carries the
//! acting user id, the affected item ids, and either the explicit new order
//! or the explicit new rank key, never a relative delta like "shift by one".
//!
//! One enum variant per event kind keeps the client's reconciliation dispatch
//! exhaustive and statically checked.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::item::{Card, Column, Positioned};
use crate::shared::rank::RankKey;

/// Which ordered list an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemScope {
    /// Columns of a board
    Column,
    /// Cards of a column
    Card,
}

/// The created item carried inside an [`BoardEvent::ItemCreated`] payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventItem {
    Column(Column),
    Card(Card),
}

impl EventItem {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Column(column) => column.id(),
            Self::Card(card) => card.id(),
        }
    }

    pub fn scope(&self) -> ItemScope {
        match self {
            Self::Column(_) => ItemScope::Column,
            Self::Card(_) => ItemScope::Card,
        }
    }
}

/// An authoritative `(item id, rank key)` pair from a full reorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedId {
    pub item_id: Uuid,
    pub rank: RankKey,
}

/// A position-change event for one board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardEvent {
    /// An item was created at the tail of a container
    ItemCreated {
        /// Board the event is routed to
        board_id: Uuid,
        /// Owning container of the new item
        container_id: Uuid,
        /// The canonical item including its assigned rank key
        item: EventItem,
        /// User whose request produced this event
        acting_user_id: Uuid,
        /// Client-supplied token matching the originator's provisional entry
        correlation_token: Option<Uuid>,
    },

    /// An item moved within or across containers
    ItemMoved {
        board_id: Uuid,
        scope: ItemScope,
        item_id: Uuid,
        from_container_id: Uuid,
        to_container_id: Uuid,
        /// The index the client asked for; a hint only - placement follows
        /// `new_rank`
        new_index_hint: usize,
        /// Canonical key assigned by the server
        new_rank: RankKey,
        acting_user_id: Uuid,
    },

    /// A container's full order was rewritten
    ListReordered {
        board_id: Uuid,
        scope: ItemScope,
        container_id: Uuid,
        /// Authoritative order with the newly assigned keys
        ordered: Vec<RankedId>,
        acting_user_id: Uuid,
    },
}

impl BoardEvent {
    /// Board this event is routed to
    pub fn board_id(&self) -> Uuid {
        match self {
            Self::ItemCreated { board_id, .. }
            | Self::ItemMoved { board_id, .. }
            | Self::ListReordered { board_id, .. } => *board_id,
        }
    }

    /// User whose request produced this event; used for self-echo suppression
    pub fn acting_user_id(&self) -> Uuid {
        match self {
            Self::ItemCreated { acting_user_id, .. }
            | Self::ItemMoved { acting_user_id, .. }
            | Self::ListReordered { acting_user_id, .. } => *acting_user_id,
        }
    }
}
