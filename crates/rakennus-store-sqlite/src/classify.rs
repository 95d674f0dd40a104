//! Translation of SQLite failures into the store's error kinds.
//!
//! The only place that reads SQLite result codes.

use rusqlite::ffi;

use crate::{Error, Result};

/// Map `err`, raised while writing or reading `item`, to an [`Error`].
pub fn classify(err: rusqlite::Error, item: &str) -> Error {
  let extended_code = match &err {
    rusqlite::Error::SqliteFailure(failure, _) => Some(failure.extended_code),
    _ => None,
  };

  match extended_code {
    Some(ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
      Error::Duplicate(item.to_owned())
    }
    Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
      Error::MissingDependency(item.to_owned())
    }
    _ if matches!(err, rusqlite::Error::QueryReturnedNoRows) => {
      Error::NotFound(item.to_owned())
    }
    _ => Error::Sqlite { item: item.to_owned(), source: err },
  }
}

/// `.classify(item)` on any rusqlite result.
pub trait Classify<T> {
  fn classify(self, item: &str) -> Result<T>;
}

impl<T> Classify<T> for rusqlite::Result<T> {
  fn classify(self, item: &str) -> Result<T> {
    self.map_err(|err| classify(err, item))
  }
}

#[cfg(test)]
mod tests {
  use rusqlite::Connection;

  use super::*;

  fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn
      .execute_batch(
        "PRAGMA foreign_keys = ON;
         CREATE TABLE parent (id INTEGER PRIMARY KEY, name TEXT UNIQUE);
         CREATE TABLE child (parent_id INTEGER NOT NULL REFERENCES parent(id));
         INSERT INTO parent (id, name) VALUES (1, 'a');",
      )
      .unwrap();
    conn
  }

  #[test]
  fn unique_violation_is_duplicate() {
    let err = conn()
      .execute("INSERT INTO parent (name) VALUES ('a')", [])
      .classify("parent a")
      .unwrap_err();
    assert!(matches!(err, Error::Duplicate(item) if item == "parent a"));
  }

  #[test]
  fn primary_key_violation_is_duplicate() {
    let err = conn()
      .execute("INSERT INTO parent (id, name) VALUES (1, 'b')", [])
      .classify("parent 1")
      .unwrap_err();
    assert!(matches!(err, Error::Duplicate(_)));
  }

  #[test]
  fn foreign_key_violation_is_missing_dependency() {
    let err = conn()
      .execute("INSERT INTO child (parent_id) VALUES (42)", [])
      .classify("child")
      .unwrap_err();
    assert!(matches!(err, Error::MissingDependency(_)));
  }

  #[test]
  fn no_rows_is_not_found() {
    let err = conn()
      .query_row("SELECT id FROM parent WHERE id = 9", [], |r| {
        r.get::<_, i64>(0)
      })
      .classify("parent 9")
      .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
  }

  #[test]
  fn other_failures_pass_through_with_context() {
    let err = conn()
      .execute("INSERT INTO nowhere VALUES (1)", [])
      .classify("nowhere")
      .unwrap_err();
    assert!(matches!(err, Error::Sqlite { ref item, .. } if item == "nowhere"));
  }
}
