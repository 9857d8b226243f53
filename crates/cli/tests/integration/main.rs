//! CLI integration tests.

#[cfg(unix)]
mod git_tests;
