//! End-to-end scenarios for the optimistic store and the reconciler
//!
//! These tests drive a [`BoardStore`] the way a UI would: propose a change,
//! interleave broadcast events from other users, then resolve the local
//! request, and assert the resulting order.

use flowdeck::client::{BoardStore, Reconciler};
use flowdeck::shared::event::{BoardEvent, EventItem, ItemScope, RankedId};
use flowdeck::shared::item::{Board, Card, Column};
use flowdeck::shared::policy;
use flowdeck::shared::protocol::BoardSnapshot;
use flowdeck::shared::rank::RankKey;
use pretty_assertions::assert_eq;
use uuid::Uuid;

struct Fixture {
    store: BoardStore,
    board_id: Uuid,
    columns: Vec<Uuid>,
    cards: Vec<Uuid>,
}

/// A board with two columns; the first column holds three cards
fn fixture() -> Fixture {
    let board = Board::new("sprint");
    let board_id = board.id;
    let col_a = Column::new(board_id, "todo", RankKey::min());
    let col_b = Column::new(board_id, "done", RankKey::min().next());
    let columns = vec![col_a.id, col_b.id];

    let mut rank = RankKey::min();
    let mut cards = Vec::new();
    let mut card_ids = Vec::new();
    for title in ["alpha", "beta", "gamma"] {
        let card = Card::new(col_a.id, title, None, rank.clone());
        card_ids.push(card.id);
        cards.push(card);
        rank = rank.next();
    }

    let mut store = BoardStore::new(board_id, Uuid::new_v4());
    store.load_snapshot(BoardSnapshot {
        board,
        columns: vec![col_a, col_b],
        cards,
    });
    Fixture {
        store,
        board_id,
        columns,
        cards: card_ids,
    }
}

fn card_order(store: &BoardStore, column_id: Uuid) -> Vec<Uuid> {
    store
        .cards
        .lists()
        .items(column_id)
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect()
}

#[test]
fn test_failed_move_restores_the_exact_prior_state() {
    let mut f = fixture();
    let before_cards = f.store.cards.lists().clone();
    let before_columns = f.store.columns.lists().clone();

    f.store
        .propose_move_card(f.cards[2], f.columns[1], 0)
        .unwrap();
    assert_ne!(f.store.cards.lists(), &before_cards);

    let notice = f
        .store
        .resolve_card_failure(f.cards[2], "server rejected the move")
        .unwrap();
    assert_eq!(notice.subject_id, f.cards[2]);
    assert_eq!(f.store.cards.lists(), &before_cards);
    assert_eq!(f.store.columns.lists(), &before_columns);
    assert!(!f.store.is_pending(f.cards[2]));
}

#[test]
fn test_reorder_reads_back_in_submitted_order() {
    let mut f = fixture();
    let [a, b, c] = [f.cards[0], f.cards[1], f.cards[2]];

    // [alpha, beta, gamma] -> [gamma, alpha, beta]
    f.store
        .propose_reorder_cards(f.columns[0], &[c, a, b])
        .unwrap();
    assert_eq!(card_order(&f.store, f.columns[0]), vec![c, a, b]);

    // The server confirms with its canonical keys; order is unchanged.
    let keys = policy::reorder_keys(3);
    let ordered: Vec<RankedId> = [c, a, b]
        .iter()
        .zip(keys)
        .map(|(id, rank)| RankedId {
            item_id: *id,
            rank,
        })
        .collect();
    f.store.resolve_reorder_cards_success(f.columns[0], &ordered);
    assert_eq!(card_order(&f.store, f.columns[0]), vec![c, a, b]);
    assert!(!f.store.is_pending(f.columns[0]));
}

#[test]
fn test_cross_column_move_to_head_sorts_before_existing() {
    let mut f = fixture();
    let occupant = Card::new(f.columns[1], "resident", None, RankKey::min());
    let occupant_id = occupant.id;
    Reconciler::apply(
        &mut f.store,
        BoardEvent::ItemCreated {
            board_id: f.board_id,
            container_id: f.columns[1],
            item: EventItem::Card(occupant),
            acting_user_id: Uuid::new_v4(),
            correlation_token: None,
        },
    );

    f.store
        .propose_move_card(f.cards[0], f.columns[1], 0)
        .unwrap();

    let order = card_order(&f.store, f.columns[1]);
    assert_eq!(order, vec![f.cards[0], occupant_id]);
    let items = f.store.cards.lists().items(f.columns[1]).unwrap();
    assert!(items[0].rank < items[1].rank);
}

#[test]
fn test_duplicate_reorder_event_is_idempotent() {
    let mut f = fixture();
    let other_user = Uuid::new_v4();
    let keys = policy::reorder_keys(3);
    let ordered: Vec<RankedId> = [f.cards[1], f.cards[2], f.cards[0]]
        .iter()
        .zip(keys)
        .map(|(id, rank)| RankedId {
            item_id: *id,
            rank,
        })
        .collect();
    let event = BoardEvent::ListReordered {
        board_id: f.board_id,
        scope: ItemScope::Card,
        container_id: f.columns[0],
        ordered,
        acting_user_id: other_user,
    };

    Reconciler::apply(&mut f.store, event.clone());
    let after_first = f.store.cards.lists().clone();
    assert_eq!(
        card_order(&f.store, f.columns[0]),
        vec![f.cards[1], f.cards[2], f.cards[0]]
    );

    Reconciler::apply(&mut f.store, event);
    assert_eq!(f.store.cards.lists(), &after_first);
}

#[test]
fn test_own_create_echo_does_not_duplicate_the_card() {
    let mut f = fixture();
    let (temp_id, request) = f
        .store
        .propose_create_card(f.columns[0], "delta", None)
        .unwrap();

    // The broadcast echo of our own request arrives before the HTTP
    // response. It is suppressed by acting_user_id.
    let canonical = Card::new(f.columns[0], "delta", None, RankKey::new("x").unwrap());
    let canonical_id = canonical.id;
    let local_user_id = f.store.local_user_id;
    Reconciler::apply(
        &mut f.store,
        BoardEvent::ItemCreated {
            board_id: f.board_id,
            container_id: f.columns[0],
            item: EventItem::Card(canonical.clone()),
            acting_user_id: local_user_id,
            correlation_token: request.correlation_token,
        },
    );
    assert_eq!(f.store.cards.lists().items(f.columns[0]).unwrap().len(), 4);
    assert!(f.store.is_pending(temp_id));

    // The response path then swaps provisional for canonical, once.
    f.store.resolve_create_card_success(temp_id, canonical);
    let order = card_order(&f.store, f.columns[0]);
    assert_eq!(order.len(), 4);
    assert!(order.contains(&canonical_id));
    assert!(!order.contains(&temp_id));
    assert!(!f.store.is_pending(temp_id));
}

#[test]
fn test_foreign_create_with_token_replaces_provisional() {
    let mut f = fixture();
    let (temp_id, request) = f
        .store
        .propose_create_card(f.columns[0], "delta", None)
        .unwrap();
    let temp_index = card_order(&f.store, f.columns[0])
        .iter()
        .position(|id| *id == temp_id)
        .unwrap();

    // Same scenario as above but the event is attributed to a collaborating
    // session of a different user id: the correlation token still matches,
    // so the provisional entry is replaced in place instead of duplicated.
    let canonical = Card::new(f.columns[0], "delta", None, RankKey::new("x").unwrap());
    let canonical_id = canonical.id;
    Reconciler::apply(
        &mut f.store,
        BoardEvent::ItemCreated {
            board_id: f.board_id,
            container_id: f.columns[0],
            item: EventItem::Card(canonical),
            acting_user_id: Uuid::new_v4(),
            correlation_token: request.correlation_token,
        },
    );

    let order = card_order(&f.store, f.columns[0]);
    assert_eq!(order.len(), 4);
    assert_eq!(order[temp_index], canonical_id, "replaced at the same position");
    assert!(!f.store.is_pending(temp_id));
}

#[test]
fn test_move_event_for_unknown_card_is_dropped() {
    let mut f = fixture();
    let before = f.store.cards.lists().clone();

    Reconciler::apply(
        &mut f.store,
        BoardEvent::ItemMoved {
            board_id: f.board_id,
            scope: ItemScope::Card,
            item_id: Uuid::new_v4(),
            from_container_id: f.columns[0],
            to_container_id: f.columns[1],
            new_index_hint: 0,
            new_rank: RankKey::min(),
            acting_user_id: Uuid::new_v4(),
        },
    );
    assert_eq!(f.store.cards.lists(), &before);
}
