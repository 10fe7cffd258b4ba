//! Reconciliation of broadcast events into the local board state
//!
//! Events arrive at-least-once and may race local optimistic mutations, so
//! every merge path is idempotent: a duplicate delivery leaves the state
//! unchanged. Events produced by this client's own requests are suppressed
//! up front via `acting_user_id` - the response-path resolve already applied
//! them, and applying the echo would double-handle correlation tokens.

use crate::client::board::BoardStore;
use crate::client::store::Applied;
use crate::shared::event::{BoardEvent, EventItem, ItemScope};

/// Applies remote [`BoardEvent`]s to a [`BoardStore`]
#[derive(Debug, Clone, Copy)]
pub struct Reconciler;

impl Reconciler {
    /// Merge one broadcast event; unknown references are dropped with a log
    /// line, never an error, since a later snapshot fetch repairs any gap
    pub fn apply(store: &mut BoardStore, event: BoardEvent) {
        if event.acting_user_id() == store.local_user_id {
            tracing::debug!(event = ?event, "suppressing self-echo");
            return;
        }
        if event.board_id() != store.board_id {
            tracing::warn!(
                event_board = %event.board_id(),
                local_board = %store.board_id,
                "event for a different board, dropping"
            );
            return;
        }

        match event {
            BoardEvent::ItemCreated {
                item,
                correlation_token,
                ..
            } => match item {
                EventItem::Column(column) => {
                    let column_id = column.id;
                    match store.columns.apply_remote_created(column, correlation_token) {
                        Applied::ReplacedProvisional(temp_id) => {
                            store.cards.rename_container(temp_id, column_id);
                        }
                        Applied::Inserted => {
                            store.cards.ensure_container(column_id);
                        }
                        Applied::AlreadyPresent => {}
                    }
                }
                EventItem::Card(card) => {
                    store.cards.ensure_container(card.column_id);
                    store.cards.apply_remote_created(card, correlation_token);
                }
            },

            BoardEvent::ItemMoved {
                scope,
                item_id,
                to_container_id,
                new_rank,
                ..
            } => {
                let applied = match scope {
                    ItemScope::Column => {
                        store
                            .columns
                            .apply_remote_moved(item_id, to_container_id, new_rank)
                    }
                    ItemScope::Card => {
                        store.cards.ensure_container(to_container_id);
                        store
                            .cards
                            .apply_remote_moved(item_id, to_container_id, new_rank)
                    }
                };
                if !applied {
                    // A move event carries no item payload; nothing to
                    // materialize from.
                    tracing::warn!(%item_id, ?scope, "move event for unknown item, dropping");
                }
            }

            BoardEvent::ListReordered {
                scope,
                container_id,
                ordered,
                ..
            } => {
                let applied = match scope {
                    ItemScope::Column => {
                        store.columns.apply_remote_reordered(container_id, &ordered)
                    }
                    ItemScope::Card => store.cards.apply_remote_reordered(container_id, &ordered),
                };
                if !applied {
                    tracing::warn!(
                        %container_id,
                        ?scope,
                        "reorder event for unknown container, dropping"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::event::RankedId;
    use crate::shared::item::{Board, Card, Column};
    use crate::shared::protocol::BoardSnapshot;
    use crate::shared::rank::RankKey;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn store_with_one_column() -> (BoardStore, Uuid) {
        let board = Board::new("b");
        let board_id = board.id;
        let column = Column::new(board_id, "todo", RankKey::min());
        let column_id = column.id;
        let mut store = BoardStore::new(board_id, Uuid::new_v4());
        store.load_snapshot(BoardSnapshot {
            board,
            columns: vec![column],
            cards: Vec::new(),
        });
        (store, column_id)
    }

    fn created_event(store: &BoardStore, card: Card, actor: Uuid) -> BoardEvent {
        BoardEvent::ItemCreated {
            board_id: store.board_id,
            container_id: card.column_id,
            item: EventItem::Card(card),
            acting_user_id: actor,
            correlation_token: None,
        }
    }

    #[test]
    fn test_self_echo_is_suppressed() {
        let (mut store, column_id) = store_with_one_column();
        let card = Card::new(column_id, "mine", None, RankKey::min());

        let before = store.cards.lists().clone();
        let event = created_event(&store, card, store.local_user_id);
        Reconciler::apply(&mut store, event);
        assert_eq!(store.cards.lists(), &before);
    }

    #[test]
    fn test_foreign_create_is_inserted_once() {
        let (mut store, column_id) = store_with_one_column();
        let other_user = Uuid::new_v4();
        let card = Card::new(column_id, "theirs", None, RankKey::min());
        let event = created_event(&store, card, other_user);

        Reconciler::apply(&mut store, event.clone());
        let after_first = store.cards.lists().clone();
        assert_eq!(store.cards.lists().items(column_id).unwrap().len(), 1);

        // Duplicate delivery (at-least-once) must be a no-op.
        Reconciler::apply(&mut store, event);
        assert_eq!(store.cards.lists(), &after_first);
    }

    #[test]
    fn test_event_for_other_board_is_dropped() {
        let (mut store, column_id) = store_with_one_column();
        let other_user = Uuid::new_v4();
        let card = Card::new(column_id, "stray", None, RankKey::min());

        let event = BoardEvent::ItemCreated {
            board_id: Uuid::new_v4(),
            container_id: column_id,
            item: EventItem::Card(card),
            acting_user_id: other_user,
            correlation_token: None,
        };
        Reconciler::apply(&mut store, event);
        assert!(store.cards.lists().items(column_id).unwrap().is_empty());
    }

    #[test]
    fn test_move_event_places_by_rank() {
        let (mut store, column_id) = store_with_one_column();
        let other_user = Uuid::new_v4();

        let first = Card::new(column_id, "first", None, RankKey::min());
        let second = Card::new(column_id, "second", None, RankKey::min().next());
        let second_id = second.id;
        let first_event = created_event(&store, first, other_user);
        Reconciler::apply(&mut store, first_event);
        let second_event = created_event(&store, second, other_user);
        Reconciler::apply(&mut store, second_event);

        let event = BoardEvent::ItemMoved {
            board_id: store.board_id,
            scope: ItemScope::Card,
            item_id: second_id,
            from_container_id: column_id,
            to_container_id: column_id,
            new_index_hint: 0,
            new_rank: RankKey::min().prev(),
            acting_user_id: other_user,
        };
        Reconciler::apply(&mut store, event);

        let items = store.cards.lists().items(column_id).unwrap();
        assert_eq!(items[0].id, second_id);
    }

    #[test]
    fn test_reorder_event_applied_twice_is_stable() {
        let (mut store, column_id) = store_with_one_column();
        let other_user = Uuid::new_v4();

        let a = Card::new(column_id, "a", None, RankKey::min());
        let b = Card::new(column_id, "b", None, RankKey::min().next());
        let (a_id, b_id) = (a.id, b.id);
        let a_event = created_event(&store, a, other_user);
        Reconciler::apply(&mut store, a_event);
        let b_event = created_event(&store, b, other_user);
        Reconciler::apply(&mut store, b_event);

        let event = BoardEvent::ListReordered {
            board_id: store.board_id,
            scope: ItemScope::Card,
            container_id: column_id,
            ordered: vec![
                RankedId {
                    item_id: b_id,
                    rank: RankKey::min(),
                },
                RankedId {
                    item_id: a_id,
                    rank: RankKey::min().next(),
                },
            ],
            acting_user_id: other_user,
        };

        Reconciler::apply(&mut store, event.clone());
        let after_first = store.cards.lists().clone();
        let ids: Vec<Uuid> = store
            .cards
            .lists()
            .items(column_id)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![b_id, a_id]);

        Reconciler::apply(&mut store, event);
        assert_eq!(store.cards.lists(), &after_first);
    }
}
