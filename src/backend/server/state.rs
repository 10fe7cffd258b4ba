/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The optional PostgreSQL pool (ordering endpoints answer 503 without it)
 * - The per-board broadcast channels for change fan-out
 *
 * # Thread Safety
 *
 * All state is designed to be thread-safe: the pool is internally shared,
 * and `BoardBroadcastState` clones share one channel map behind a mutex.
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow Axum handlers to extract specific
 * parts of the state without needing the entire `AppState`.
 */

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::error::BackendError;
use crate::backend::ordering::service::OrderingService;
use crate::backend::realtime::broadcast::BoardBroadcastState;

/// Application state for the Axum server
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    ///
    /// This is `None` if the database is not configured (e.g., if the
    /// `DATABASE_URL` environment variable is not set). Ordering handlers
    /// answer 503 in that case.
    pub db_pool: Option<PgPool>,

    /// Per-board broadcast channels for change events
    pub board_broadcast: BoardBroadcastState,
}

impl AppState {
    pub fn new(db_pool: Option<PgPool>, board_broadcast: BoardBroadcastState) -> Self {
        Self {
            db_pool,
            board_broadcast,
        }
    }

    /// The ordering service, or `DatabaseUnavailable` when running without a
    /// database
    pub fn ordering(&self) -> Result<OrderingService, BackendError> {
        let pool = self
            .db_pool
            .clone()
            .ok_or(BackendError::DatabaseUnavailable)?;
        Ok(OrderingService::new(pool, self.board_broadcast.clone()))
    }
}

/// Implement FromRef for Option<PgPool>
///
/// This allows Axum handlers to extract the optional database pool
/// directly from `AppState`.
impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

/// Implement FromRef for BoardBroadcastState
///
/// This allows the subscription handler to extract the broadcast state
/// directly from `AppState`.
impl FromRef<AppState> for BoardBroadcastState {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.board_broadcast.clone()
    }
}
