//! Per-board client state
//!
//! Composes one [`OptimisticStore`] for columns (ordered within the board)
//! and one for cards (ordered within their column), and turns user intents
//! into the request DTOs the ordering endpoints accept. The resolve and merge
//! entry points are thin passthroughs; the only cross-store concern handled
//! here is swapping a provisional column id for the canonical one inside the
//! card store.

use uuid::Uuid;

use crate::client::store::{OptimisticStore, RolledBack, StoreError};
use crate::shared::event::RankedId;
use crate::shared::item::{Card, Column};
use crate::shared::protocol::{
    BoardSnapshot, CreateCardRequest, CreateColumnRequest, MoveCardRequest, MoveColumnRequest,
    ReorderRequest,
};
use crate::shared::rank::RankKey;

/// Client-side state of one board
#[derive(Debug, Clone)]
pub struct BoardStore {
    pub board_id: Uuid,
    /// The local actor, compared against broadcast `acting_user_id` to
    /// suppress self-echoes
    pub local_user_id: Uuid,
    pub columns: OptimisticStore<Column>,
    pub cards: OptimisticStore<Card>,
}

impl BoardStore {
    pub fn new(board_id: Uuid, local_user_id: Uuid) -> Self {
        let mut columns = OptimisticStore::new();
        columns.ensure_container(board_id);
        Self {
            board_id,
            local_user_id,
            columns,
            cards: OptimisticStore::new(),
        }
    }

    /// Hydrate from a full server snapshot, replacing prior state
    pub fn load_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.board_id = snapshot.board.id;
        self.columns = OptimisticStore::new();
        self.cards = OptimisticStore::new();
        self.columns.ensure_container(self.board_id);
        for column in &snapshot.columns {
            self.cards.ensure_container(column.id);
        }
        self.columns.load_container(self.board_id, snapshot.columns);
        let mut by_column: std::collections::HashMap<Uuid, Vec<Card>> =
            std::collections::HashMap::new();
        for card in snapshot.cards {
            by_column.entry(card.column_id).or_default().push(card);
        }
        for (column_id, cards) in by_column {
            self.cards.load_container(column_id, cards);
        }
    }

    // ---- Propose: column operations ----

    /// Insert a provisional column at the board's tail; returns the temporary
    /// id (also the request's correlation token) and the request body
    pub fn propose_create_column(&mut self, title: &str) -> (Uuid, CreateColumnRequest) {
        let rank = self.columns.append_rank(self.board_id);
        let column = Column::new(self.board_id, title, rank);
        let temp_id = self.columns.propose_create(column);
        self.cards.ensure_container(temp_id);
        let request = CreateColumnRequest {
            title: title.to_string(),
            correlation_token: Some(temp_id),
        };
        (temp_id, request)
    }

    pub fn propose_move_column(
        &mut self,
        column_id: Uuid,
        target_index: usize,
    ) -> Result<MoveColumnRequest, StoreError> {
        self.columns
            .propose_move(column_id, self.board_id, target_index)?;
        Ok(MoveColumnRequest {
            board_id: self.board_id,
            target_index: target_index as i64,
        })
    }

    pub fn propose_reorder_columns(
        &mut self,
        ordered_ids: &[Uuid],
    ) -> Result<ReorderRequest, StoreError> {
        self.columns.propose_reorder(self.board_id, ordered_ids)?;
        Ok(ReorderRequest {
            ordered_item_ids: ordered_ids.to_vec(),
        })
    }

    // ---- Propose: card operations ----

    pub fn propose_create_card(
        &mut self,
        column_id: Uuid,
        title: &str,
        description: Option<String>,
    ) -> Result<(Uuid, CreateCardRequest), StoreError> {
        if !self.cards.lists().contains_container(column_id) {
            return Err(StoreError::UnknownContainer(column_id));
        }
        let rank = self.cards.append_rank(column_id);
        let card = Card::new(column_id, title, description.clone(), rank);
        let temp_id = self.cards.propose_create(card);
        let request = CreateCardRequest {
            title: title.to_string(),
            description,
            correlation_token: Some(temp_id),
        };
        Ok((temp_id, request))
    }

    pub fn propose_move_card(
        &mut self,
        card_id: Uuid,
        to_column: Uuid,
        target_index: usize,
    ) -> Result<MoveCardRequest, StoreError> {
        let (from_column, _) = self
            .cards
            .lists()
            .locate(card_id)
            .ok_or(StoreError::UnknownItem(card_id))?;
        self.cards.propose_move(card_id, to_column, target_index)?;
        Ok(MoveCardRequest {
            from_column_id: from_column,
            to_column_id: to_column,
            target_index: target_index as i64,
        })
    }

    pub fn propose_reorder_cards(
        &mut self,
        column_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<ReorderRequest, StoreError> {
        self.cards.propose_reorder(column_id, ordered_ids)?;
        Ok(ReorderRequest {
            ordered_item_ids: ordered_ids.to_vec(),
        })
    }

    // ---- Resolve ----

    /// Success response for a column create: swap in the canonical column and
    /// re-key the card list that was held under the provisional id
    pub fn resolve_create_column_success(&mut self, temp_id: Uuid, canonical: Column) {
        let canonical_id = canonical.id;
        self.columns.resolve_create_success(temp_id, canonical);
        if temp_id != canonical_id {
            self.cards.rename_container(temp_id, canonical_id);
        }
    }

    pub fn resolve_create_card_success(&mut self, temp_id: Uuid, canonical: Card) {
        self.cards.resolve_create_success(temp_id, canonical);
    }

    pub fn resolve_move_column_success(&mut self, column_id: Uuid, rank: RankKey) {
        self.columns.resolve_move_success(column_id, rank);
    }

    pub fn resolve_move_card_success(&mut self, card_id: Uuid, rank: RankKey) {
        self.cards.resolve_move_success(card_id, rank);
    }

    pub fn resolve_reorder_columns_success(&mut self, ordered: &[RankedId]) {
        self.columns.resolve_reorder_success(self.board_id, ordered);
    }

    pub fn resolve_reorder_cards_success(&mut self, column_id: Uuid, ordered: &[RankedId]) {
        self.cards.resolve_reorder_success(column_id, ordered);
    }

    pub fn resolve_column_failure(&mut self, subject_id: Uuid, reason: &str) -> Option<RolledBack> {
        self.columns.resolve_failure(subject_id, reason)
    }

    pub fn resolve_card_failure(&mut self, subject_id: Uuid, reason: &str) -> Option<RolledBack> {
        self.cards.resolve_failure(subject_id, reason)
    }

    /// Whether an id has an unconfirmed local change (for UI affordances)
    pub fn is_pending(&self, id: Uuid) -> bool {
        self.columns.is_pending(id) || self.cards.is_pending(id)
    }
}
