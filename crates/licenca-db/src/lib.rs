//! Licenca persistence layer
//!
//! Store traits describe what the API needs from persistence; the `db`
//! module implements them on Postgres through sqlx, and `memory` (behind the
//! `test-helpers` feature) implements them over in-process maps.

pub mod db;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;

pub use db::*;
