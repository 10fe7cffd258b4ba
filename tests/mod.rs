//! Test suite for flowdeck
//!
//! This module organizes all tests

pub mod integration;
pub mod property;
