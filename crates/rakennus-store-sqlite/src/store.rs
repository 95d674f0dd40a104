//! [`SqliteStore`] — connection setup for the SQLite implementation of
//! [`Repository`](rakennus_core::repository::Repository).

use std::path::Path;

use rakennus_core::{
  building::Building,
  geo,
  reference::{Actor, Neighbourhood, Upsert, UseType},
  repository::Repository,
  spec::BuildingSpec,
};
use rusqlite::functions::FunctionFlags;

use crate::{building, encode, reference, schema::SCHEMA, Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A building store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All clones
/// share one connection thread, so operations run one at a time.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init().await?;
    Ok(store)
  }

  async fn init(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("building store schema ready");
    Ok(())
  }
}

/// SQL functions the schema and rendered queries rely on. Both are
/// deterministic so they may appear in index expressions.
///
/// * `great_circle_m(lat1, lon1, lat2, lon2)`: haversine distance in metres,
///   NULL if any argument is NULL.
/// * `casefold(text)`: Unicode lower case, so `Ä` and `ä` compare equal
///   where SQLite's own `lower` only folds ASCII.
fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  let flags = FunctionFlags::SQLITE_UTF8
    | FunctionFlags::SQLITE_DETERMINISTIC
    | FunctionFlags::SQLITE_INNOCUOUS;

  conn.create_scalar_function("great_circle_m", 4, flags, |ctx| {
    let lat1: Option<f64> = ctx.get(0)?;
    let lon1: Option<f64> = ctx.get(1)?;
    let lat2: Option<f64> = ctx.get(2)?;
    let lon2: Option<f64> = ctx.get(3)?;
    Ok(match (lat1, lon1, lat2, lon2) {
      (Some(lat1), Some(lon1), Some(lat2), Some(lon2)) => {
        Some(geo::great_circle_m(lat1, lon1, lat2, lon2))
      }
      _ => None,
    })
  })?;

  conn.create_scalar_function("casefold", 1, flags, |ctx| {
    let text: Option<String> = ctx.get(0)?;
    Ok(text.map(|t| t.to_lowercase()))
  })
}

// ─── Repository impl ─────────────────────────────────────────────────────────

impl Repository for SqliteStore {
  type Error = Error;

  // ── Buildings ─────────────────────────────────────────────────────────────

  async fn query(&self, spec: &BuildingSpec) -> Result<Vec<Building>> {
    let spec = spec.clone();
    self
      .conn
      .call(move |conn| Ok(building::query(conn, &spec)))
      .await?
  }

  async fn add(&self, input: Building) -> Result<Building> {
    self
      .conn
      .call(move |conn| Ok(building::insert(conn, input)))
      .await?
  }

  async fn update(&self, input: Building) -> Result<Building> {
    self
      .conn
      .call(move |conn| Ok(building::update(conn, input)))
      .await?
  }

  async fn remove(&self, id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(building::remove(conn, id)))
      .await?
  }

  // ── Actors ────────────────────────────────────────────────────────────────

  async fn add_actor(&self, actor: Actor) -> Result<Upsert<Actor>> {
    self
      .conn
      .call(move |conn| Ok(reference::add_actor(conn, actor)))
      .await?
  }

  async fn actor_by_name(&self, name: &str) -> Result<Option<Actor>> {
    let name = name.to_owned();
    self
      .conn
      .call(move |conn| Ok(reference::actor_by_name(conn, &name)))
      .await?
  }

  async fn list_actors(&self) -> Result<Vec<Actor>> {
    self
      .conn
      .call(|conn| Ok(reference::list_actors(conn)))
      .await?
  }

  // ── Neighbourhoods ────────────────────────────────────────────────────────

  async fn add_neighbourhood(
    &self,
    neighbourhood: Neighbourhood,
  ) -> Result<Upsert<Neighbourhood>> {
    self
      .conn
      .call(move |conn| Ok(reference::add_neighbourhood(conn, neighbourhood)))
      .await?
  }

  async fn neighbourhood(
    &self,
    name:         &str,
    municipality: Option<&str>,
  ) -> Result<Option<Neighbourhood>> {
    let name = name.to_owned();
    let municipality = municipality.map(str::to_owned);
    self
      .conn
      .call(move |conn| {
        Ok(reference::find_neighbourhood(
          conn,
          &name,
          municipality.as_deref(),
        ))
      })
      .await?
  }

  async fn list_neighbourhoods(&self) -> Result<Vec<Neighbourhood>> {
    self
      .conn
      .call(|conn| Ok(reference::list_neighbourhoods(conn)))
      .await?
  }

  async fn update_neighbourhood(&self, _: Neighbourhood) -> Result<Neighbourhood> {
    Err(Error::NotImplemented("neighbourhood update"))
  }

  async fn remove_neighbourhood(&self, _: i64) -> Result<()> {
    Err(Error::NotImplemented("neighbourhood removal"))
  }

  // ── Use types ─────────────────────────────────────────────────────────────

  async fn add_use_type(&self, use_type: UseType) -> Result<Upsert<UseType>> {
    self
      .conn
      .call(move |conn| {
        Ok(reference::resolve_use_type(conn, use_type, encode::now()))
      })
      .await?
  }

  async fn list_use_types(&self) -> Result<Vec<UseType>> {
    self
      .conn
      .call(|conn| Ok(reference::list_use_types(conn)))
      .await?
  }
}
