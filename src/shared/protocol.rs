//! Request and response types for the ordering API
//!
//! Shared by the Axum handlers and the reqwest client so both sides agree on
//! the wire shapes. Target indices travel as `i64` so that a negative index
//! can be rejected explicitly at the boundary instead of wrapping.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::item::{Board, Card, Column};

/// Header naming the acting user on every mutating request
///
/// The server stamps its value into the broadcast events so clients can
/// suppress their own echoes.
pub const ACTING_USER_HEADER: &str = "x-acting-user";

/// `POST /api/boards`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoardRequest {
    pub name: String,
}

/// `POST /api/boards/{board_id}/columns`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateColumnRequest {
    pub title: String,
    /// The originator's provisional id, echoed back in the broadcast event so
    /// other sessions of the same user can match their provisional entry.
    pub correlation_token: Option<Uuid>,
}

/// `POST /api/columns/{column_id}/cards`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCardRequest {
    pub title: String,
    pub description: Option<String>,
    pub correlation_token: Option<Uuid>,
}

/// `POST /api/columns/{column_id}/move`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveColumnRequest {
    pub board_id: Uuid,
    pub target_index: i64,
}

/// `POST /api/cards/{card_id}/move`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveCardRequest {
    pub from_column_id: Uuid,
    pub to_column_id: Uuid,
    pub target_index: i64,
}

/// `PUT /api/boards/{board_id}/column-order` and
/// `PUT /api/columns/{column_id}/card-order`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub ordered_item_ids: Vec<Uuid>,
}

/// `GET /api/boards/{board_id}`: the full board for initial hydration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Board,
    /// Columns in display order
    pub columns: Vec<Column>,
    /// All cards of the board; each card carries its `column_id`, lists are
    /// already in display order per column
    pub cards: Vec<Card>,
}
