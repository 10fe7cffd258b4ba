//! Integration tests for the client synchronization layer

pub mod client_sync;
