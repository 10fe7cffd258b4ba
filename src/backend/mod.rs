//! Backend Module
//!
//! This module contains all server-side code: the transactional ordering
//! service, the HTTP API over it, and the real-time change broadcasting.
//!
//! # Architecture
//!
//! - **`ordering`** - database operations, the ordering service, HTTP
//!   handlers
//! - **`realtime`** - per-board broadcast channels and the SSE subscription
//!   handler
//! - **`routes`** - router and endpoint wiring
//! - **`server`** - application state, configuration, initialization
//! - **`error`** - backend error types and HTTP response conversion
//!
//! The whole module is gated behind the `ssr` feature so the shared types
//! and the client layer compile without the server dependency stack.

/// Ordering service, database access and HTTP handlers
pub mod ordering;

/// Real-time change broadcasting
pub mod realtime;

/// Route configuration
pub mod routes;

/// Server state, configuration and initialization
pub mod server;

/// Backend error types
pub mod error;

pub use error::BackendError;
pub use ordering::OrderingService;
pub use realtime::BoardBroadcastState;
pub use server::{create_app, AppState};
