//! Actors, neighbourhoods and use types: create-on-demand reference rows.

use chrono::{DateTime, Utc};
use rakennus_core::reference::{Actor, Neighbourhood, Upsert, UseType};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{
  Error, Result,
  classify::Classify as _,
  encode::{
    ACTOR_COLUMNS, NEIGHBOURHOOD_COLUMNS, Stamp, USE_TYPE_COLUMNS, actor_from_row,
    neighbourhood_from_row, now, use_type_from_row,
  },
};

// ─── Actors ──────────────────────────────────────────────────────────────────

/// Insert `actor`; if the name is taken, return the stored actor instead.
pub fn add_actor(conn: &Connection, actor: Actor) -> Result<Upsert<Actor>> {
  let item = format!("actor {:?}", actor.name);
  let now = now();

  let inserted = conn.execute(
    "INSERT INTO actors (name, title_fi, title_en, title_ru, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    params![actor.name, actor.title.fi, actor.title.en, actor.title.ru, Stamp(now)],
  );

  match inserted.classify(&item) {
    Ok(0) => Err(Error::InsertFailed(item)),
    Ok(_) => Ok(Upsert::Created(Actor {
      id: Some(conn.last_insert_rowid()),
      created_at: Some(now),
      updated_at: Some(now),
      deleted_at: None,
      ..actor
    })),
    Err(Error::Duplicate(_)) => actor_by_name(conn, &actor.name)?
      .map(Upsert::Existing)
      .ok_or(Error::NotFound(item)),
    Err(err) => Err(err),
  }
}

pub fn actor_by_name(conn: &Connection, name: &str) -> Result<Option<Actor>> {
  conn
    .query_row(
      &format!("SELECT {ACTOR_COLUMNS} FROM actors WHERE name = ?1"),
      [name],
      actor_from_row,
    )
    .optional()
    .classify(&format!("actor {name:?}"))
}

pub fn list_actors(conn: &Connection) -> Result<Vec<Actor>> {
  let mut stmt = conn
    .prepare(&format!(
      "SELECT {ACTOR_COLUMNS} FROM actors WHERE deleted_at IS NULL ORDER BY name"
    ))
    .classify("actors")?;
  let actors = stmt
    .query_map([], actor_from_row)
    .classify("actors")?
    .collect::<rusqlite::Result<Vec<_>>>()
    .classify("actor row")?;
  Ok(actors)
}

// ─── Neighbourhoods ──────────────────────────────────────────────────────────

/// Insert `neighbourhood`; if `(name, municipality)` is taken, return the
/// stored one instead.
pub fn add_neighbourhood(
  conn: &Connection,
  mut neighbourhood: Neighbourhood,
) -> Result<Upsert<Neighbourhood>> {
  neighbourhood.municipality = neighbourhood
    .municipality
    .filter(|m| !municipality_is_blank(m));
  let item = format!(
    "neighbourhood {:?} in {:?}",
    neighbourhood.name, neighbourhood.municipality
  );
  let now = now();

  let inserted = conn.execute(
    "INSERT INTO neighbourhoods (name, municipality, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?3)",
    params![neighbourhood.name, neighbourhood.municipality, Stamp(now)],
  );

  match inserted.classify(&item) {
    Ok(0) => Err(Error::InsertFailed(item)),
    Ok(_) => Ok(Upsert::Created(Neighbourhood {
      id: Some(conn.last_insert_rowid()),
      created_at: Some(now),
      updated_at: Some(now),
      deleted_at: None,
      ..neighbourhood
    })),
    Err(Error::Duplicate(_)) => find_neighbourhood(
      conn,
      &neighbourhood.name,
      neighbourhood.municipality.as_deref(),
    )?
    .map(Upsert::Existing)
    .ok_or(Error::NotFound(item)),
    Err(err) => Err(err),
  }
}

/// A missing municipality only matches a missing municipality. A blank one
/// counts as missing.
pub fn find_neighbourhood(
  conn: &Connection,
  name: &str,
  municipality: Option<&str>,
) -> Result<Option<Neighbourhood>> {
  let municipality = municipality.filter(|m| !municipality_is_blank(m));
  conn
    .query_row(
      &format!(
        "SELECT {NEIGHBOURHOOD_COLUMNS} FROM neighbourhoods
         WHERE name = ?1 AND municipality IS ?2"
      ),
      params![name, municipality],
      neighbourhood_from_row,
    )
    .optional()
    .classify(&format!("neighbourhood {name:?}"))
}

fn municipality_is_blank(municipality: &str) -> bool {
  municipality.trim().is_empty()
}

pub fn list_neighbourhoods(conn: &Connection) -> Result<Vec<Neighbourhood>> {
  let mut stmt = conn
    .prepare(&format!(
      "SELECT {NEIGHBOURHOOD_COLUMNS} FROM neighbourhoods
       WHERE deleted_at IS NULL ORDER BY municipality, name"
    ))
    .classify("neighbourhoods")?;
  let neighbourhoods = stmt
    .query_map([], neighbourhood_from_row)
    .classify("neighbourhoods")?
    .collect::<rusqlite::Result<Vec<_>>>()
    .classify("neighbourhood row")?;
  Ok(neighbourhoods)
}

// ─── Use types ───────────────────────────────────────────────────────────────

/// Look a use type up by English name; insert it if absent.
pub fn resolve_use_type(
  conn: &Connection,
  use_type: UseType,
  now: DateTime<Utc>,
) -> Result<Upsert<UseType>> {
  let item = format!("use type {:?}", use_type.name_en);

  let existing = conn
    .query_row(
      &format!("SELECT {USE_TYPE_COLUMNS} FROM use_types WHERE name_en = ?1"),
      [&use_type.name_en],
      use_type_from_row,
    )
    .optional()
    .classify(&item)?;
  if let Some(existing) = existing {
    return Ok(Upsert::Existing(existing));
  }

  let inserted = conn
    .execute(
      "INSERT INTO use_types (name_fi, name_en, name_ru, created_at, updated_at)
       VALUES (?1, ?2, ?3, ?4, ?4)",
      params![use_type.name_fi, use_type.name_en, use_type.name_ru, Stamp(now)],
    )
    .classify(&item)?;
  if inserted == 0 {
    return Err(Error::InsertFailed(item));
  }

  Ok(Upsert::Created(UseType {
    id: Some(conn.last_insert_rowid()),
    created_at: Some(now),
    updated_at: Some(now),
    deleted_at: None,
    ..use_type
  }))
}

pub fn list_use_types(conn: &Connection) -> Result<Vec<UseType>> {
  let mut stmt = conn
    .prepare(&format!(
      "SELECT {USE_TYPE_COLUMNS} FROM use_types WHERE deleted_at IS NULL ORDER BY name_en"
    ))
    .classify("use types")?;
  let uses = stmt
    .query_map([], use_type_from_row)
    .classify("use types")?
    .collect::<rusqlite::Result<Vec<_>>>()
    .classify("use type row")?;
  Ok(uses)
}
