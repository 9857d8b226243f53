//! Shared utilities.

pub mod quote;
