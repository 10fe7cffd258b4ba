//! Real-time Change Broadcasting Module
//!
//! This module fans committed ordering changes out to connected clients over
//! Server-Sent Events (SSE), one stream per board.
//!
//! # Architecture
//!
//! The realtime module is organized into focused submodules:
//!
//! - **`broadcast`** - Per-board broadcast channels and the publish helper
//! - **`subscription`** - Server-Sent Events subscription handler
//!
//! # Delivery
//!
//! Events are published exactly once per committed mutation, but a client
//! may receive an event more than once across reconnects: the guarantee is
//! at-least-once per connected subscriber, and clients merge idempotently.
//! SSE provides one-way communication from server to client, which matches
//! the server-authoritative model: clients never write through the stream.

/// Per-board broadcast channels
pub mod broadcast;

/// Server-Sent Events subscription handler
pub mod subscription;

// Re-export commonly used types and functions
pub use broadcast::BoardBroadcastState;
pub use subscription::handle_board_subscription;
