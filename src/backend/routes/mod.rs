//! Routes Module
//!
//! This module contains all route configuration for the Axum server.
//!
//! # Architecture
//!
//! - **`router`** - Main router creation, static files and fallback
//! - **`api_routes`** - Ordering API endpoint configuration

/// Main router creation
pub mod router;

/// API route configuration
pub mod api_routes;

pub use router::create_router;
