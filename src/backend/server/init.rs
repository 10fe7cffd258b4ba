/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including state creation, database loading, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Create the per-board broadcast state
 * 2. Load the optional database (connection pool plus migrations)
 * 3. Create the router with all routes
 * 4. Start the periodic cleanup task for idle broadcast channels
 *
 * # Error Handling
 *
 * Initialization is resilient: a missing database disables the ordering
 * endpoints (503) but the server still starts and serves event streams.
 */

use axum::Router;

use crate::backend::realtime::broadcast::BoardBroadcastState;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing flowdeck backend server");

    let board_broadcast = BoardBroadcastState::new();

    let db_pool = load_database().await;

    let app_state = AppState::new(db_pool, board_broadcast);

    let app = create_router(app_state.clone());

    // Boards whose last subscriber disconnected keep an idle channel around;
    // sweep those periodically.
    let cleanup_state = app_state.board_broadcast.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            cleanup_state.cleanup_inactive_channels();
            tracing::debug!("Cleaned up inactive board broadcast channels");
        }
    });

    tracing::info!("Router configured with periodic cleanup task");

    app
}
