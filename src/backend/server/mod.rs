//! Server Module
//!
//! This module contains all server-side code for initializing and configuring
//! the Axum HTTP server.
//!
//! # Architecture
//!
//! The server module is organized into focused submodules:
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Configuration loading and validation
//! - **`init`** - Server initialization and app creation
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: Loads the optional database pool and runs
//!    migrations
//! 2. **State Creation**: Creates the per-board broadcast state
//! 3. **Router Creation**: Configures all routes
//! 4. **Background Tasks**: Starts the idle-channel cleanup task

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use init::create_app;
pub use state::AppState;
