//! Adapters layer for slashing protection.
//!
//! - `db`: SQLite persistence behind a pooled, retrying transaction handle

pub mod db;

pub use db::{Database, DbConfig, RetryPolicy};
