//! Ordering Module
//!
//! The server-authoritative side of board ordering: every create, move and
//! reorder is resolved here against the database's current state inside one
//! transaction, and broadcast to subscribers after commit.
//!
//! # Architecture
//!
//! The ordering module is organized into focused submodules:
//!
//! - **`db`** - sqlx queries for boards, columns and cards
//! - **`service`** - transactional ordering operations and event publishing
//! - **`handlers`** - Axum HTTP handlers over the service
//!
//! # Authority Model
//!
//! Clients send positional hints (indices), never rank keys. The service
//! re-resolves each hint against the order it reads inside the transaction,
//! so a hint computed against a stale client view degrades to a nearby
//! position rather than corrupting the list.

/// Database operations
pub mod db;

/// Transactional ordering service
pub mod service;

/// HTTP handlers
pub mod handlers;

// Re-export commonly used types
pub use service::OrderingService;
