//! Property-based tests

pub mod rank_proptest;
