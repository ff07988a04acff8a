//! Error type for `nzgd-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The database file is missing, unreadable or not a SQLite database.
  #[error("failed to open database {path:?}: {source}")]
  Open {
    path:   PathBuf,
    #[source]
    source: rusqlite::Error,
  },

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error(transparent)]
  Core(#[from] nzgd_core::Error),
}

impl Error {
  /// `true` when a correlation or hammer-type name was not found.
  pub fn is_unknown_name(&self) -> bool {
    matches!(self, Self::Core(nzgd_core::Error::UnknownName { .. }))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
