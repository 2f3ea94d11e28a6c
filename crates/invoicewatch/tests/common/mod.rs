//! Shared helpers for invoicewatch integration tests.
//!
//! - `TestHarness`: a temp-dir SQLite store plus a fixture-backed analyzer
//! - builders for configs and documents

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{FixtureAnalyzer, TestHarness};
