//! Error types for `nzgd-core`.

use thiserror::Error;

use crate::correlation::CorrelationKind;

#[derive(Debug, Error)]
pub enum Error {
  /// A correlation or hammer-type name has no row in its lookup table.
  #[error("unknown {kind} name: {name:?}")]
  UnknownName { kind: CorrelationKind, name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
