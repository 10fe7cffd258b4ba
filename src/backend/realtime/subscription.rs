/**
 * Board Event Subscription Handler
 *
 * This module implements the Server-Sent Events (SSE) subscription handler
 * for the `/boards/{board_id}/events` endpoint. Each connection receives the
 * change stream of exactly one board.
 *
 * # Connection Management
 *
 * - Connections are kept alive using the SSE keep-alive mechanism
 * - A lagged receiver (slow consumer) skips the overwritten events with a
 *   warning and keeps streaming; a full re-fetch of the board snapshot is the
 *   client's recovery path
 *
 * # Example Response
 *
 * ```http
 * HTTP/1.1 200 OK
 * Content-Type: text/event-stream
 * Cache-Control: no-cache
 *
 * data: {"type":"item_created","board_id":"...","item":{...},...}
 *
 * data: {"type":"item_moved","board_id":"...","item_id":"...",...}
 * ```
 */

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use uuid::Uuid;

use crate::backend::realtime::broadcast::BoardBroadcastState;

/// Handle board event subscription (GET /boards/{board_id}/events)
pub async fn handle_board_subscription(
    State(broadcast): State<BoardBroadcastState>,
    Path(board_id): Path<Uuid>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>> {
    tracing::info!(%board_id, "board event subscription opened");

    let receiver = broadcast.subscribe(board_id);

    let stream = stream::unfold(receiver, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let sse_event = match Event::default().json_data(&event) {
                        Ok(sse_event) => sse_event,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to serialize board event");
                            continue;
                        }
                    };
                    return Some((Ok(sse_event), rx));
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(%board_id, skipped, "subscriber lagged, events skipped");
                    continue;
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    tracing::debug!(%board_id, "board channel closed, ending stream");
                    return None;
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
