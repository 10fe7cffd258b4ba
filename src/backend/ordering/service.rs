//! Server-authoritative ordering operations
//!
//! Each operation runs inside one transaction: read the affected list in its
//! current order, derive the rank key (or keys) from that order, write, and
//! commit. Client-supplied indices are hints resolved against the server's
//! view, never against the stale order the client saw, so a hint that has
//! drifted degrades to a nearby position instead of an error. Indices beyond
//! the end of a list clamp to the end; negative indices are rejected before
//! the transaction opens.
//!
//! Exactly one change event is published per committed operation, after the
//! commit, so subscribers never observe a change that later rolled back.
//! When two users race moves of the same item, the transactions serialize
//! and the later commit wins; both events are broadcast in commit order, so
//! every replica converges on the later write.

use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::ordering::db;
use crate::backend::realtime::broadcast::BoardBroadcastState;
use crate::shared::event::{BoardEvent, EventItem, ItemScope, RankedId};
use crate::shared::item::{Board, Card, Column, Positioned};
use crate::shared::policy;
use crate::shared::protocol::{
    BoardSnapshot, CreateCardRequest, CreateColumnRequest, MoveCardRequest, MoveColumnRequest,
    ReorderRequest,
};
use crate::shared::rank::RankKey;
use crate::shared::SharedError;

/// The ordering service: transactional mutations plus the broadcast hook
#[derive(Clone, Debug)]
pub struct OrderingService {
    pool: PgPool,
    broadcast: BoardBroadcastState,
}

impl OrderingService {
    pub fn new(pool: PgPool, broadcast: BoardBroadcastState) -> Self {
        Self { pool, broadcast }
    }

    /// Reject negative hints, clamp the rest later against the actual list
    fn resolve_hint(index: i64) -> Result<usize, BackendError> {
        usize::try_from(index).map_err(|_| BackendError::InvalidPosition { index })
    }

    pub async fn create_board(&self, name: &str) -> Result<Board, BackendError> {
        let board = Board::new(name);
        let mut tx = self.pool.begin().await?;
        db::insert_board(&mut tx, &board).await?;
        tx.commit().await?;
        tracing::info!(board_id = %board.id, "board created");
        Ok(board)
    }

    /// Full state of a board, columns and cards in display order
    pub async fn board_snapshot(&self, board_id: Uuid) -> Result<BoardSnapshot, BackendError> {
        let mut tx = self.pool.begin().await?;
        let board = db::fetch_board(&mut tx, board_id)
            .await?
            .ok_or_else(|| BackendError::not_found("board", board_id))?;
        let columns = db::fetch_columns_ordered(&mut tx, board_id).await?;
        let cards = db::fetch_board_cards(&mut tx, board_id).await?;
        tx.commit().await?;
        Ok(BoardSnapshot {
            board,
            columns,
            cards,
        })
    }

    /// Create a column at the end of its board's column list
    pub async fn create_column_at_end(
        &self,
        board_id: Uuid,
        request: CreateColumnRequest,
        acting_user_id: Uuid,
    ) -> Result<Column, BackendError> {
        let mut tx = self.pool.begin().await?;
        if !db::board_exists(&mut tx, board_id).await? {
            return Err(BackendError::not_found("board", board_id));
        }
        let columns = db::fetch_columns_ordered(&mut tx, board_id).await?;
        let rank = policy::append_key(columns.last().map(|c| &c.rank));
        let column = Column::new(board_id, request.title, rank);
        db::insert_column(&mut tx, &column).await?;
        tx.commit().await?;

        self.broadcast.publish(BoardEvent::ItemCreated {
            board_id,
            container_id: board_id,
            item: EventItem::Column(column.clone()),
            acting_user_id,
            correlation_token: request.correlation_token,
        });
        tracing::info!(column_id = %column.id, %board_id, rank = %column.rank, "column created");
        Ok(column)
    }

    /// Create a card at the end of its column's card list
    pub async fn create_card_at_end(
        &self,
        column_id: Uuid,
        request: CreateCardRequest,
        acting_user_id: Uuid,
    ) -> Result<Card, BackendError> {
        let mut tx = self.pool.begin().await?;
        let column = db::fetch_column(&mut tx, column_id)
            .await?
            .ok_or_else(|| BackendError::not_found("column", column_id))?;
        let cards = db::fetch_cards_ordered(&mut tx, column_id).await?;
        let rank = policy::append_key(cards.last().map(|c| &c.rank));
        let card = Card::new(column_id, request.title, request.description, rank);
        db::insert_card(&mut tx, &card).await?;
        tx.commit().await?;

        self.broadcast.publish(BoardEvent::ItemCreated {
            board_id: column.board_id,
            container_id: column_id,
            item: EventItem::Card(card.clone()),
            acting_user_id,
            correlation_token: request.correlation_token,
        });
        tracing::info!(card_id = %card.id, %column_id, rank = %card.rank, "card created");
        Ok(card)
    }

    /// Move a column within its board
    pub async fn move_column(
        &self,
        column_id: Uuid,
        request: MoveColumnRequest,
        acting_user_id: Uuid,
    ) -> Result<Column, BackendError> {
        let target_index = Self::resolve_hint(request.target_index)?;

        let mut tx = self.pool.begin().await?;
        let mut column = db::fetch_column(&mut tx, column_id)
            .await?
            .ok_or_else(|| BackendError::not_found("column", column_id))?;
        if column.board_id != request.board_id {
            return Err(BackendError::not_found("column", column_id));
        }

        // The moving column must not be its own neighbor when deriving the
        // key, so it is excluded from the order the hint resolves against.
        let keys: Vec<RankKey> = db::fetch_columns_ordered(&mut tx, column.board_id)
            .await?
            .into_iter()
            .filter(|c| c.id != column_id)
            .map(|c| c.rank)
            .collect();
        let from_container_id = column.board_id;
        let rank = policy::insert_key(&keys, target_index).map_err(SharedError::from)?;
        db::update_column_rank(&mut tx, column_id, &rank).await?;
        tx.commit().await?;

        column.set_rank(rank.clone());
        self.broadcast.publish(BoardEvent::ItemMoved {
            board_id: column.board_id,
            scope: ItemScope::Column,
            item_id: column_id,
            from_container_id,
            to_container_id: column.board_id,
            new_index_hint: target_index.min(keys.len()),
            new_rank: rank,
            acting_user_id,
        });
        tracing::info!(%column_id, target_index, rank = %column.rank, "column moved");
        Ok(column)
    }

    /// Move a card within a column or across columns
    pub async fn move_card(
        &self,
        card_id: Uuid,
        request: MoveCardRequest,
        acting_user_id: Uuid,
    ) -> Result<Card, BackendError> {
        let target_index = Self::resolve_hint(request.target_index)?;

        let mut tx = self.pool.begin().await?;
        let mut card = db::fetch_card(&mut tx, card_id)
            .await?
            .ok_or_else(|| BackendError::not_found("card", card_id))?;
        let destination = db::fetch_column(&mut tx, request.to_column_id)
            .await?
            .ok_or_else(|| BackendError::not_found("column", request.to_column_id))?;

        // The card's current column is authoritative; the request's
        // from_column_id is informational and may be stale.
        let from_container_id = card.column_id;
        let keys: Vec<RankKey> = db::fetch_cards_ordered(&mut tx, destination.id)
            .await?
            .into_iter()
            .filter(|c| c.id != card_id)
            .map(|c| c.rank)
            .collect();
        let rank = policy::insert_key(&keys, target_index).map_err(SharedError::from)?;
        db::update_card_position(&mut tx, card_id, destination.id, &rank).await?;
        tx.commit().await?;

        card.set_container_id(destination.id);
        card.set_rank(rank.clone());
        self.broadcast.publish(BoardEvent::ItemMoved {
            board_id: destination.board_id,
            scope: ItemScope::Card,
            item_id: card_id,
            from_container_id,
            to_container_id: destination.id,
            new_index_hint: target_index.min(keys.len()),
            new_rank: rank,
            acting_user_id,
        });
        tracing::info!(%card_id, to_column = %destination.id, target_index, "card moved");
        Ok(card)
    }

    /// Rewrite a board's full column order
    ///
    /// The submitted sequence is taken as the complete intended order. Ids
    /// that are not columns anywhere are ignored; ids that are columns of a
    /// different board are a validation error. Columns of this board left
    /// out of the sequence keep their keys. When two users submit reorders
    /// concurrently, the later commit wins wholesale.
    pub async fn reorder_columns(
        &self,
        board_id: Uuid,
        request: ReorderRequest,
        acting_user_id: Uuid,
    ) -> Result<Vec<RankedId>, BackendError> {
        let mut tx = self.pool.begin().await?;
        if !db::board_exists(&mut tx, board_id).await? {
            return Err(BackendError::not_found("board", board_id));
        }
        let columns = db::fetch_columns_ordered(&mut tx, board_id).await?;
        let members: Vec<Uuid> = columns.iter().map(|c| c.id).collect();
        let targets = filter_reorder_ids(
            &request.ordered_item_ids,
            &members,
            &db::known_column_ids(&mut tx, &request.ordered_item_ids).await?,
        )?;

        let ordered: Vec<RankedId> = targets
            .iter()
            .zip(policy::reorder_keys(targets.len()))
            .map(|(id, rank)| RankedId { item_id: *id, rank })
            .collect();
        for entry in &ordered {
            db::update_column_rank(&mut tx, entry.item_id, &entry.rank).await?;
        }
        tx.commit().await?;

        self.broadcast.publish(BoardEvent::ListReordered {
            board_id,
            scope: ItemScope::Column,
            container_id: board_id,
            ordered: ordered.clone(),
            acting_user_id,
        });
        tracing::info!(%board_id, count = ordered.len(), "columns reordered");
        Ok(ordered)
    }

    /// Rewrite a column's full card order; same semantics as
    /// [`Self::reorder_columns`]
    pub async fn reorder_cards(
        &self,
        column_id: Uuid,
        request: ReorderRequest,
        acting_user_id: Uuid,
    ) -> Result<Vec<RankedId>, BackendError> {
        let mut tx = self.pool.begin().await?;
        let column = db::fetch_column(&mut tx, column_id)
            .await?
            .ok_or_else(|| BackendError::not_found("column", column_id))?;
        let cards = db::fetch_cards_ordered(&mut tx, column_id).await?;
        let members: Vec<Uuid> = cards.iter().map(|c| c.id).collect();
        let targets = filter_reorder_ids(
            &request.ordered_item_ids,
            &members,
            &db::known_card_ids(&mut tx, &request.ordered_item_ids).await?,
        )?;

        let ordered: Vec<RankedId> = targets
            .iter()
            .zip(policy::reorder_keys(targets.len()))
            .map(|(id, rank)| RankedId { item_id: *id, rank })
            .collect();
        for entry in &ordered {
            db::update_card_rank(&mut tx, entry.item_id, &entry.rank).await?;
        }
        tx.commit().await?;

        self.broadcast.publish(BoardEvent::ListReordered {
            board_id: column.board_id,
            scope: ItemScope::Card,
            container_id: column_id,
            ordered: ordered.clone(),
            acting_user_id,
        });
        tracing::info!(%column_id, count = ordered.len(), "cards reordered");
        Ok(ordered)
    }
}

/// Resolve a submitted reorder sequence against the container's members
///
/// Keeps the submitted relative order of ids that belong to the container,
/// drops ids that exist nowhere (already deleted), and rejects ids that
/// exist but belong elsewhere.
fn filter_reorder_ids(
    submitted: &[Uuid],
    members: &[Uuid],
    known: &[Uuid],
) -> Result<Vec<Uuid>, BackendError> {
    let mut targets = Vec::with_capacity(submitted.len());
    for id in submitted {
        if members.contains(id) {
            if !targets.contains(id) {
                targets.push(*id);
            }
        } else if known.contains(id) {
            return Err(SharedError::validation(
                "ordered_item_ids",
                format!("item {} belongs to a different container", id),
            )
            .into());
        } else {
            tracing::debug!(item_id = %id, "reorder names an unknown item, ignoring");
        }
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_filter_keeps_submitted_order_of_members() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let members = vec![a, b, c];
        let submitted = vec![c, a, b];
        let targets = filter_reorder_ids(&submitted, &members, &members).unwrap();
        assert_eq!(targets, vec![c, a, b]);
    }

    #[test]
    fn test_filter_ignores_ids_that_exist_nowhere() {
        let a = Uuid::new_v4();
        let ghost = Uuid::new_v4();
        let members = vec![a];
        let targets = filter_reorder_ids(&[ghost, a], &members, &members).unwrap();
        assert_eq!(targets, vec![a]);
    }

    #[test]
    fn test_filter_rejects_foreign_members() {
        let a = Uuid::new_v4();
        let foreign = Uuid::new_v4();
        let members = vec![a];
        let known = vec![a, foreign];
        let result = filter_reorder_ids(&[foreign, a], &members, &known);
        assert_matches!(result, Err(BackendError::Shared(_)));
    }

    #[test]
    fn test_filter_deduplicates_repeated_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let members = vec![a, b];
        let targets = filter_reorder_ids(&[b, a, b], &members, &members).unwrap();
        assert_eq!(targets, vec![b, a]);
    }

    #[test]
    fn test_negative_hint_is_rejected() {
        assert_matches!(
            OrderingService::resolve_hint(-1),
            Err(BackendError::InvalidPosition { index: -1 })
        );
        assert_eq!(OrderingService::resolve_hint(0).unwrap(), 0);
    }
}
