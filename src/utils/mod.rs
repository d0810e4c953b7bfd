//! Utility functions and helpers

pub mod helpers;

pub use helpers::{format_bytes, init_logging};
