//! Shared types used by both the client and the server
//!
//! Everything in here is pure data and pure logic: the rank key algorithm,
//! the key-assignment policies, the positioned item model, the broadcast
//! event shapes, the API request/response types, and the shared errors.

/// Rank key algorithm (fractional indexing)
pub mod rank;

/// Append / insert / reorder key-assignment policies
pub mod policy;

/// Boards, columns, cards and the `Positioned` trait
pub mod item;

/// Broadcast event shapes
pub mod event;

/// API request/response types
pub mod protocol;

/// Shared error types
pub mod error;

// Re-export commonly used types
pub use error::SharedError;
pub use event::{BoardEvent, EventItem, ItemScope, RankedId};
pub use item::{Board, Card, Column, Positioned};
pub use rank::{RankError, RankKey};
