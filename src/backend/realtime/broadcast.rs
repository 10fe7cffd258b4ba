/**
 * Change Broadcasting
 *
 * This module manages per-board broadcast channels for real-time change
 * delivery. Every committed ordering mutation is published here exactly once,
 * after its transaction commits, and fans out to all subscribers of the
 * affected board.
 *
 * # Delivery Semantics
 *
 * Delivery is at-least-once per connected subscriber: `tokio::sync::broadcast`
 * duplicates each event to every receiver, and a reconnecting client may see
 * duplicates across connections. Clients are expected to merge idempotently.
 * A subscriber that falls behind the channel capacity misses the overwritten
 * events (logged as a lag on its stream); ordering between boards is not
 * defined, within a board events arrive in publish order.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::BoardEvent;

/// Buffered events per board channel before slow subscribers start lagging
const CHANNEL_CAPACITY: usize = 256;

/// Broadcast state for board change events
///
/// Manages per-board broadcast channels so subscribers of one board never see
/// another board's traffic. Cloning is cheap; all clones share the channel
/// map.
#[derive(Clone, Debug)]
pub struct BoardBroadcastState {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<BoardEvent>>>>,
}

impl BoardBroadcastState {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get or create the broadcast sender for a board
    pub fn sender_for(&self, board_id: Uuid) -> broadcast::Sender<BoardEvent> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(board_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Subscribe to a board's change events
    pub fn subscribe(&self, board_id: Uuid) -> broadcast::Receiver<BoardEvent> {
        self.sender_for(board_id).subscribe()
    }

    /// Publish a committed change to all subscribers of its board
    ///
    /// Returns the number of subscribers that received the event. Zero
    /// subscribers is normal (nobody is watching the board) and never an
    /// error for the publisher.
    pub fn publish(&self, event: BoardEvent) -> usize {
        let board_id = event.board_id();
        let sender = {
            let channels = self.channels.lock().unwrap();
            channels.get(&board_id).cloned()
        };
        match sender.map(|s| s.send(event)) {
            Some(Ok(subscriber_count)) => {
                tracing::debug!(%board_id, subscriber_count, "board event broadcast");
                subscriber_count
            }
            _ => {
                tracing::debug!(%board_id, "board event dropped, no subscribers");
                0
            }
        }
    }

    /// Clean up channels with no subscribers
    pub fn cleanup_inactive_channels(&self) {
        self.channels
            .lock()
            .unwrap()
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Get subscriber count for a board (for debugging)
    pub fn subscriber_count(&self, board_id: Uuid) -> usize {
        self.channels
            .lock()
            .unwrap()
            .get(&board_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for BoardBroadcastState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::event::RankedId;
    use crate::shared::{ItemScope, RankKey};

    fn reorder_event(board_id: Uuid) -> BoardEvent {
        BoardEvent::ListReordered {
            board_id,
            scope: ItemScope::Column,
            container_id: board_id,
            ordered: vec![RankedId {
                item_id: Uuid::new_v4(),
                rank: RankKey::min(),
            }],
            acting_user_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_board_subscribers() {
        let state = BoardBroadcastState::new();
        let board_id = Uuid::new_v4();
        let mut rx = state.subscribe(board_id);

        let count = state.publish(reorder_event(board_id));
        assert_eq!(count, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.board_id(), board_id);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_not_an_error() {
        let state = BoardBroadcastState::new();
        assert_eq!(state.publish(reorder_event(Uuid::new_v4())), 0);
    }

    #[tokio::test]
    async fn test_boards_are_isolated() {
        let state = BoardBroadcastState::new();
        let board_a = Uuid::new_v4();
        let board_b = Uuid::new_v4();
        let mut rx_b = state.subscribe(board_b);

        state.publish(reorder_event(board_a));

        assert!(matches!(
            rx_b.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_cleanup_drops_channels_without_receivers() {
        let state = BoardBroadcastState::new();
        let board_id = Uuid::new_v4();
        {
            let _rx = state.subscribe(board_id);
            assert_eq!(state.subscriber_count(board_id), 1);
        }
        state.cleanup_inactive_channels();
        assert_eq!(state.subscriber_count(board_id), 0);
    }
}
