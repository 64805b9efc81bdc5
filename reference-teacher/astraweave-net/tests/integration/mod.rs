//! Integration tests module for astraweave-net

pub mod sync_tests;
