/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Event subscription route (SSE)
 * 2. API routes (boards, columns, cards)
 * 3. Static file serving
 * 4. Fallback handler (404)
 */

use axum::Router;
use tower_http::services::ServeDir;

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Route Details
///
/// ## Event Subscription
///
/// - `GET /boards/{board_id}/events` - SSE stream of one board's changes
///
/// ## API Routes
///
/// - `POST /api/boards` - Create a board
/// - `GET /api/boards/{board_id}` - Full board snapshot
/// - `POST /api/boards/{board_id}/columns` - Create a column at the end
/// - `POST /api/columns/{column_id}/cards` - Create a card at the end
/// - `POST /api/columns/{column_id}/move` - Move a column
/// - `POST /api/cards/{card_id}/move` - Move a card
/// - `PUT /api/boards/{board_id}/column-order` - Rewrite column order
/// - `PUT /api/columns/{column_id}/card-order` - Rewrite card order
///
/// ## Static Files
///
/// Static files are served from the public directory.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route(
        "/boards/{board_id}/events",
        axum::routing::get({
            use crate::backend::realtime::subscription::handle_board_subscription;
            handle_board_subscription
        }),
    );

    let router = configure_api_routes(router);

    let router = router.nest_service("/static", ServeDir::new("public"));

    let router = router.fallback(|| async { "404 Not Found" });

    router.with_state(app_state)
}
