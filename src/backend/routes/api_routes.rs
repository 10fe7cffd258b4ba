/**
 * API Route Handlers
 *
 * This module wires the ordering handlers onto their endpoints.
 *
 * # Routes
 *
 * ## Boards
 * - `POST /api/boards` - Create a board
 * - `GET /api/boards/{board_id}` - Full board snapshot
 * - `PUT /api/boards/{board_id}/column-order` - Rewrite column order
 *
 * ## Columns
 * - `POST /api/boards/{board_id}/columns` - Create a column at the end
 * - `POST /api/columns/{column_id}/move` - Move a column
 * - `PUT /api/columns/{column_id}/card-order` - Rewrite card order
 *
 * ## Cards
 * - `POST /api/columns/{column_id}/cards` - Create a card at the end
 * - `POST /api/cards/{card_id}/move` - Move a card
 *
 * # Acting User
 *
 * Mutating routes require the `x-acting-user` header; it stamps broadcast
 * events so clients can suppress their own echoes. Permission checks live
 * outside this subsystem.
 */

use axum::Router;

use crate::backend::ordering::handlers::{
    create_board, create_card, create_column, get_board, move_card, move_column, reorder_cards,
    reorder_columns,
};
use crate::backend::server::state::AppState;

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/boards", axum::routing::post(create_board))
        .route("/api/boards/{board_id}", axum::routing::get(get_board))
        .route(
            "/api/boards/{board_id}/columns",
            axum::routing::post(create_column),
        )
        .route(
            "/api/boards/{board_id}/column-order",
            axum::routing::put(reorder_columns),
        )
        .route(
            "/api/columns/{column_id}/cards",
            axum::routing::post(create_card),
        )
        .route(
            "/api/columns/{column_id}/move",
            axum::routing::post(move_column),
        )
        .route(
            "/api/columns/{column_id}/card-order",
            axum::routing::put(reorder_cards),
        )
        .route("/api/cards/{card_id}/move", axum::routing::post(move_card))
}
