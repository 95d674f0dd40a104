//! Domain model for the Rakennus building store: buildings and their
//! reference data, query specifications, geodesy helpers and the
//! [`Repository`](repository::Repository) trait that backends implement.
//!
//! Nothing here touches a database; `rakennus-store-sqlite` does.

// Repository methods return `impl Future + Send`; implementors use `async fn`.
#![allow(async_fn_in_trait)]

pub mod building;
pub mod error;
pub mod geo;
pub mod reference;
pub mod repository;
pub mod spec;

pub use error::{Error, Result};
