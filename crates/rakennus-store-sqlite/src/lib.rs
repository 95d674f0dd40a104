//! SQLite backend for the Rakennus building store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each repository operation is one
//! closure on that thread, and each building write is one transaction.

mod building;
mod classify;
mod encode;
mod reference;
mod schema;
mod store;

pub mod error;
pub mod render;

pub use error::{Error, Result};
pub use store::SqliteStore;
