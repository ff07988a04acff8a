//! Core types and trait definitions for the NZGD Vs30 query toolkit.
//!
//! This crate is deliberately free of database dependencies. It owns the
//! typed result rows, the derived-column arithmetic, the soil-layer
//! aggregation and the [`InvestigationStore`](store::InvestigationStore)
//! abstraction that storage backends implement.

pub mod correlation;
pub mod derived;
pub mod error;
pub mod measurement;
pub mod soil;
pub mod store;
pub mod table;
pub mod vs30;

pub use error::{Error, Result};
