//! SQLite backend for the NZGD Vs30 query toolkit.
//!
//! Opens the database read-only over a single synchronous
//! [`rusqlite::Connection`] and implements
//! [`InvestigationStore`](nzgd_core::store::InvestigationStore) on top of it.

mod encode;
mod store;

pub mod error;
pub mod schema;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
