//! Flowdeck - Main Library
//!
//! Flowdeck is a collaborative board application (columns of ordered cards)
//! edited concurrently by multiple users, with changes visible to all viewers
//! in near real time. This crate implements the ordering and synchronization
//! core: fractional rank keys, a server-authoritative ordering service,
//! per-board change broadcasting, and the client-side optimistic store with
//! event reconciliation.
//!
//! # Module Structure
//!
//! The library is organized into three main modules:
//!
//! - **`shared`** - Types used by both client and server
//!   - Rank key algorithm and key-assignment policies
//!   - Positioned items (columns, cards), board events
//!   - Request/response types and shared errors
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server with the ordering endpoints
//!   - Ordering service with transactional sqlx persistence
//!   - Per-board broadcast channels and SSE event subscriptions
//!
//! - **`client`** - Client-side synchronization layer (all targets)
//!   - Optimistic local store with snapshot rollback
//!   - Pending set for unconfirmed provisional entries
//!   - Reconciliation of broadcast events into local order
//!   - HTTP client plus an SSE event stream
//!
//! # Feature Flags
//!
//! - **`ssr`** - Enables the backend modules (Axum server, sqlx persistence).
//!   Required for server builds; client-only consumers can omit it.
//!
//! # Synchronization Model
//!
//! Every ordered list is sorted by an opaque, lexicographically-ordered rank
//! key. The server is the only authority for canonical keys: clients send a
//! target index as a hint, the server re-reads the destination list inside
//! its own transaction and computes the key there. Clients mutate their local
//! order immediately (optimistically) and either confirm the mutation when
//! the server responds or roll back to the snapshot taken before it.
//! Broadcast delivery is at-least-once; reconciliation is idempotent and
//! ignores self-originated echoes.
//!
//! # Thread Safety
//!
//! - **Server**: state is shared via `Arc` and `tokio::sync::broadcast`;
//!   each mutating call runs in its own database transaction.
//! - **Client**: the store and reconciler are plain mutable state driven from
//!   a single thread; the only suspension points are the network boundary and
//!   event-channel receipt.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Client-side synchronization layer
pub mod client;
