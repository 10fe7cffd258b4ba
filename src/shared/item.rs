//! Positioned items
//!
//! A board owns an ordered list of columns; a column owns an ordered list of
//! cards. Both kinds share the same ordering behavior through the
//! [`Positioned`] trait: a stable id, a rank key, and a reference to the
//! owning container. Display order within a container is the ascending sort
//! by rank key, with ties broken by id (concurrent writers may legally land
//! equal keys; see the ordering service documentation).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::rank::RankKey;

/// Behavior shared by every ordered item
///
/// The optimistic store and the reconciler are generic over this trait so
/// columns and cards share one implementation instead of duplicating the
/// ordering machinery per kind.
pub trait Positioned {
    /// Stable identity
    fn id(&self) -> Uuid;
    /// Current rank key
    fn rank(&self) -> &RankKey;
    /// Reassign the rank key (move / reorder)
    fn set_rank(&mut self, rank: RankKey);
    /// Owning container id
    fn container_id(&self) -> Uuid;
    /// Reassign the owning container (cross-container move)
    fn set_container_id(&mut self, container_id: Uuid);
}

/// A board: the container of columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A column within a board, ordered by its rank key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub rank: RankKey,
    pub created_at: DateTime<Utc>,
}

impl Column {
    pub fn new(board_id: Uuid, title: impl Into<String>, rank: RankKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            board_id,
            title: title.into(),
            rank,
            created_at: Utc::now(),
        }
    }
}

impl Positioned for Column {
    fn id(&self) -> Uuid {
        self.id
    }

    fn rank(&self) -> &RankKey {
        &self.rank
    }

    fn set_rank(&mut self, rank: RankKey) {
        self.rank = rank;
    }

    fn container_id(&self) -> Uuid {
        self.board_id
    }

    fn set_container_id(&mut self, container_id: Uuid) {
        self.board_id = container_id;
    }
}

/// A card within a column, ordered by its rank key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub rank: RankKey,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn new(
        column_id: Uuid,
        title: impl Into<String>,
        description: Option<String>,
        rank: RankKey,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            column_id,
            title: title.into(),
            description,
            rank,
            created_at: Utc::now(),
        }
    }
}

impl Positioned for Card {
    fn id(&self) -> Uuid {
        self.id
    }

    fn rank(&self) -> &RankKey {
        &self.rank
    }

    fn set_rank(&mut self, rank: RankKey) {
        self.rank = rank;
    }

    fn container_id(&self) -> Uuid {
        self.column_id
    }

    fn set_container_id(&mut self, container_id: Uuid) {
        self.column_id = container_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_positioned_impl() {
        let column_id = Uuid::new_v4();
        let mut card = Card::new(column_id, "Write docs", None, RankKey::min());
        assert_eq!(card.container_id(), column_id);

        let other_column = Uuid::new_v4();
        card.set_container_id(other_column);
        card.set_rank(RankKey::min().next());
        assert_eq!(card.container_id(), other_column);
        assert_eq!(card.rank(), &RankKey::min().next());
    }

    #[test]
    fn test_column_serde_round_trip() {
        let column = Column::new(Uuid::new_v4(), "Backlog", RankKey::min());
        let json = serde_json::to_string(&column).unwrap();
        let back: Column = serde_json::from_str(&json).unwrap();
        assert_eq!(back, column);
    }
}
