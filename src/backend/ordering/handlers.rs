//! Ordering HTTP Handlers
//!
//! This module contains the HTTP handlers for board, column and card
//! ordering operations. Handlers stay thin: extract the acting user, hand
//! the request to [`OrderingService`], return the DTO. Every mutation
//! requires an `x-acting-user` header naming the caller; it stamps the
//! broadcast events so clients can suppress their own echoes. Permission
//! checks live outside this subsystem.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::ordering::service::OrderingService;
use crate::backend::server::state::AppState;
use crate::shared::event::RankedId;
use crate::shared::item::{Board, Card, Column};
use crate::shared::protocol::{
    BoardSnapshot, CreateBoardRequest, CreateCardRequest, CreateColumnRequest, MoveCardRequest,
    MoveColumnRequest, ReorderRequest, ACTING_USER_HEADER,
};

/// Extract the acting user id from headers
fn extract_acting_user(headers: &HeaderMap) -> Result<Uuid, BackendError> {
    let raw = headers
        .get(ACTING_USER_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            crate::shared::SharedError::validation(
                ACTING_USER_HEADER,
                "header is required on mutating requests",
            )
        })?;
    Uuid::parse_str(raw).map_err(|_| {
        crate::shared::SharedError::validation(ACTING_USER_HEADER, "header is not a valid uuid")
            .into()
    })
}

fn ordering(state: &AppState) -> Result<OrderingService, BackendError> {
    state.ordering()
}

/// Create a board (POST /api/boards)
pub async fn create_board(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<Board>), BackendError> {
    extract_acting_user(&headers)?;
    let board = ordering(&state)?.create_board(&request.name).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

/// Fetch a board snapshot (GET /api/boards/{board_id})
pub async fn get_board(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
) -> Result<Json<BoardSnapshot>, BackendError> {
    let snapshot = ordering(&state)?.board_snapshot(board_id).await?;
    Ok(Json(snapshot))
}

/// Create a column at the end of a board (POST /api/boards/{board_id}/columns)
pub async fn create_column(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<CreateColumnRequest>,
) -> Result<(StatusCode, Json<Column>), BackendError> {
    let acting_user_id = extract_acting_user(&headers)?;
    let column = ordering(&state)?
        .create_column_at_end(board_id, request, acting_user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(column)))
}

/// Create a card at the end of a column (POST /api/columns/{column_id}/cards)
pub async fn create_card(
    State(state): State<AppState>,
    Path(column_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<Card>), BackendError> {
    let acting_user_id = extract_acting_user(&headers)?;
    let card = ordering(&state)?
        .create_card_at_end(column_id, request, acting_user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// Move a column within its board (POST /api/columns/{column_id}/move)
pub async fn move_column(
    State(state): State<AppState>,
    Path(column_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<MoveColumnRequest>,
) -> Result<Json<Column>, BackendError> {
    let acting_user_id = extract_acting_user(&headers)?;
    let column = ordering(&state)?
        .move_column(column_id, request, acting_user_id)
        .await?;
    Ok(Json(column))
}

/// Move a card within or across columns (POST /api/cards/{card_id}/move)
pub async fn move_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<MoveCardRequest>,
) -> Result<Json<Card>, BackendError> {
    let acting_user_id = extract_acting_user(&headers)?;
    let card = ordering(&state)?
        .move_card(card_id, request, acting_user_id)
        .await?;
    Ok(Json(card))
}

/// Rewrite a board's column order (PUT /api/boards/{board_id}/column-order)
pub async fn reorder_columns(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Vec<RankedId>>, BackendError> {
    let acting_user_id = extract_acting_user(&headers)?;
    let ordered = ordering(&state)?
        .reorder_columns(board_id, request, acting_user_id)
        .await?;
    Ok(Json(ordered))
}

/// Rewrite a column's card order (PUT /api/columns/{column_id}/card-order)
pub async fn reorder_cards(
    State(state): State<AppState>,
    Path(column_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Vec<RankedId>>, BackendError> {
    let acting_user_id = extract_acting_user(&headers)?;
    let ordered = ordering(&state)?
        .reorder_cards(column_id, request, acting_user_id)
        .await?;
    Ok(Json(ordered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_extract_acting_user() {
        let user_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(ACTING_USER_HEADER, user_id.to_string().parse().unwrap());
        assert_eq!(extract_acting_user(&headers).unwrap(), user_id);
    }

    #[test]
    fn test_missing_acting_user_is_rejected() {
        let headers = HeaderMap::new();
        assert_matches!(extract_acting_user(&headers), Err(BackendError::Shared(_)));
    }

    #[test]
    fn test_malformed_acting_user_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTING_USER_HEADER, "not-a-uuid".parse().unwrap());
        assert_matches!(extract_acting_user(&headers), Err(BackendError::Shared(_)));
    }
}
