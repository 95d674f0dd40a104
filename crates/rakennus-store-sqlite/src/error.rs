//! Error type for `rakennus-store-sqlite`.
//!
//! Constraint violations are mapped to the domain kinds by
//! [`crate::classify`]; nothing else inspects SQLite result codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A uniqueness constraint rejected the write.
  #[error("duplicate {0}")]
  Duplicate(String),

  /// A foreign key pointed at a row that does not exist.
  #[error("missing dependency while writing {0}")]
  MissingDependency(String),

  /// The target row does not exist or is soft-deleted.
  #[error("{0} not found")]
  NotFound(String),

  /// An insert succeeded but reported no affected rows.
  #[error("inserting {0} affected no rows")]
  InsertFailed(String),

  #[error("{0} is not implemented")]
  NotImplemented(&'static str),

  #[error("sqlite error on {item}: {source}")]
  Sqlite {
    item:   String,
    #[source]
    source: rusqlite::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
