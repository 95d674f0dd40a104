//! The building aggregate: transactional writes and hydrating reads.
//!
//! These functions run on the connection thread inside a single
//! `tokio_rusqlite` call. Writes open a [`rusqlite::Transaction`]; dropping it
//! without a commit rolls back, so every early return leaves nothing behind.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rakennus_core::{
  building::{Address, Building},
  reference::UseType,
  spec::BuildingSpec,
};
use rusqlite::{Connection, OptionalExtension as _, ToSql, params};

use crate::{
  Error, Result,
  classify::Classify as _,
  encode::{
    ADDRESS_COLUMNS, Stamp, USE_TYPE_COLUMNS, address_from_row, building_from_row,
    building_params, building_write_columns, coordinates, now, use_type_from_row,
  },
  reference::resolve_use_type,
  render::Render as _,
};

// ─── Use links ───────────────────────────────────────────────────────────────

/// The two use-type collections, each stored in its own join table.
#[derive(Debug, Clone, Copy)]
enum UseLink {
  Initial,
  Current,
}

impl UseLink {
  const ALL: [Self; 2] = [Self::Initial, Self::Current];

  fn table(self) -> &'static str {
    match self {
      Self::Initial => "initial_uses",
      Self::Current => "current_uses",
    }
  }

  fn collection(self, building: &mut Building) -> &mut Vec<UseType> {
    match self {
      Self::Initial => &mut building.initial_uses,
      Self::Current => &mut building.current_uses,
    }
  }
}

fn label(building: &Building) -> String {
  match building.id {
    Some(id) => format!("building {id}"),
    None => format!("building at {:?}", building.address.street_address),
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// Run `spec` and hydrate every returned building.
///
/// Author ids are required: failing to load them fails the query. Use types
/// are best effort: a failure is logged and the building is returned with
/// that collection empty.
pub fn query(conn: &Connection, spec: &BuildingSpec) -> Result<Vec<Building>> {
  let rendered = spec.render();
  let named = rendered.named_params();

  let mut stmt = conn.prepare(&rendered.sql).classify("building query")?;
  let mut buildings = stmt
    .query_map(named.as_slice(), building_from_row)
    .classify("building query")?
    .collect::<rusqlite::Result<Vec<_>>>()
    .classify("building row")?;

  for building in &mut buildings {
    let Some(id) = building.id else { continue };
    building.author_ids = author_ids(conn, id)?;

    for link in UseLink::ALL {
      match use_types(conn, id, link) {
        Ok(uses) => *link.collection(building) = uses,
        Err(err) => tracing::warn!(
          building_id = id,
          table = link.table(),
          error = %err,
          "could not load use types; returning building without them"
        ),
      }
    }
  }

  Ok(buildings)
}

fn author_ids(conn: &Connection, building_id: i64) -> Result<BTreeSet<i64>> {
  let item = format!("authors of building {building_id}");
  let mut stmt = conn
    .prepare("SELECT actor_id FROM building_authors WHERE building_id = ?1")
    .classify(&item)?;
  let ids = stmt
    .query_map([building_id], |row| row.get(0))
    .classify(&item)?
    .collect::<rusqlite::Result<BTreeSet<i64>>>()
    .classify(&item)?;
  Ok(ids)
}

fn use_types(conn: &Connection, building_id: i64, link: UseLink) -> Result<Vec<UseType>> {
  let item = format!("{} of building {building_id}", link.table());
  let mut stmt = conn
    .prepare(&format!(
      "SELECT {USE_TYPE_COLUMNS} FROM use_types
       WHERE id IN (SELECT use_type_id FROM {table} WHERE building_id = ?1)
       ORDER BY id",
      table = link.table(),
    ))
    .classify(&item)?;
  let uses = stmt
    .query_map([building_id], use_type_from_row)
    .classify(&item)?
    .collect::<rusqlite::Result<Vec<_>>>()
    .classify(&item)?;
  Ok(uses)
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Store a new aggregate: address, building row, author links, use links.
pub fn insert(conn: &mut Connection, mut building: Building) -> Result<Building> {
  let tx = conn.transaction().classify("transaction")?;
  let now = now();
  let item = label(&building);

  building.address = resolve_address(&tx, building.address, now)?;
  let address_id = stored_id(building.address.id, &item)?;

  let id = {
    let coords = coordinates(&building);
    let params = building_params(&building, &address_id, &coords);
    let stamp = Stamp(now);
    let mut named: Vec<(&str, &dyn ToSql)> =
      params.iter().map(|(name, value)| (name.as_str(), *value)).collect();
    named.push((":created_at", &stamp));
    named.push((":updated_at", &stamp));

    let inserted = tx.execute(&insert_sql(), named.as_slice()).classify(&item)?;
    if inserted == 0 {
      return Err(Error::InsertFailed(item));
    }
    tx.last_insert_rowid()
  };

  write_links(&tx, id, &mut building, now)?;
  tx.commit().classify("building transaction commit")?;

  building.id = Some(id);
  building.created_at = Some(now);
  building.updated_at = Some(now);
  building.deleted_at = None;
  tracing::debug!(building_id = id, address_id, "building added");
  Ok(building)
}

/// Overwrite an active building and replace all of its links.
pub fn update(conn: &mut Connection, mut building: Building) -> Result<Building> {
  let item = label(&building);
  let id = building.id.ok_or_else(|| Error::NotFound(item.clone()))?;

  let tx = conn.transaction().classify("transaction")?;
  let now = now();

  building.address = resolve_address(&tx, building.address, now)?;
  let address_id = stored_id(building.address.id, &item)?;

  {
    let coords = coordinates(&building);
    let params = building_params(&building, &address_id, &coords);
    let stamp = Stamp(now);
    let mut named: Vec<(&str, &dyn ToSql)> =
      params.iter().map(|(name, value)| (name.as_str(), *value)).collect();
    named.push((":updated_at", &stamp));
    named.push((":id", &id));

    let changed = tx.execute(&update_sql(), named.as_slice()).classify(&item)?;
    if changed == 0 {
      return Err(Error::NotFound(item));
    }
  }

  let created_at: Stamp = tx
    .query_row("SELECT created_at FROM buildings WHERE id = ?1", [id], |row| {
      row.get(0)
    })
    .classify(&item)?;

  for table in ["building_authors", "initial_uses", "current_uses"] {
    tx.execute(&format!("DELETE FROM {table} WHERE building_id = ?1"), [id])
      .classify(&format!("{table} of {item}"))?;
  }
  write_links(&tx, id, &mut building, now)?;
  tx.commit().classify("building transaction commit")?;

  building.created_at = Some(created_at.0);
  building.updated_at = Some(now);
  building.deleted_at = None;
  tracing::debug!(building_id = id, address_id, "building updated");
  Ok(building)
}

/// Soft-delete an active building.
pub fn remove(conn: &Connection, id: i64) -> Result<()> {
  let item = format!("building {id}");
  let changed = conn
    .execute(
      "UPDATE buildings SET deleted_at = ?1, updated_at = ?1
       WHERE id = ?2 AND deleted_at IS NULL",
      params![Stamp(now()), id],
    )
    .classify(&item)?;
  if changed == 0 {
    return Err(Error::NotFound(item));
  }
  tracing::debug!(building_id = id, "building removed");
  Ok(())
}

fn insert_sql() -> String {
  let columns = building_write_columns();
  let values: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
  format!(
    "INSERT INTO buildings ({}, created_at, updated_at)
     VALUES ({}, :created_at, :updated_at)",
    columns.join(", "),
    values.join(", "),
  )
}

fn update_sql() -> String {
  let assignments: Vec<String> = building_write_columns()
    .iter()
    .map(|c| format!("{c} = :{c}"))
    .collect();
  format!(
    "UPDATE buildings SET {}, updated_at = :updated_at
     WHERE id = :id AND deleted_at IS NULL",
    assignments.join(", "),
  )
}

fn stored_id(id: Option<i64>, item: &str) -> Result<i64> {
  id.ok_or_else(|| Error::InsertFailed(format!("address of {item}")))
}

/// Reuse the active address with the same street text, or insert one.
fn resolve_address(
  conn: &Connection,
  address: Address,
  now: DateTime<Utc>,
) -> Result<Address> {
  let item = format!("address {:?}", address.street_address);

  let existing = conn
    .query_row(
      &format!(
        "SELECT {ADDRESS_COLUMNS} FROM addresses
         WHERE street_address = ?1 AND deleted_at IS NULL
         ORDER BY id LIMIT 1"
      ),
      [&address.street_address],
      address_from_row,
    )
    .optional()
    .classify(&item)?;
  if let Some(existing) = existing {
    return Ok(existing);
  }

  let inserted = conn
    .execute(
      "INSERT INTO addresses (street_address, neighbourhood_id, created_at, updated_at)
       VALUES (?1, ?2, ?3, ?3)",
      params![address.street_address, address.neighbourhood_id, Stamp(now)],
    )
    .classify(&item)?;
  if inserted == 0 {
    return Err(Error::InsertFailed(item));
  }

  Ok(Address {
    id: Some(conn.last_insert_rowid()),
    created_at: Some(now),
    updated_at: Some(now),
    deleted_at: None,
    ..address
  })
}

fn write_links(
  conn: &Connection,
  building_id: i64,
  building: &mut Building,
  now: DateTime<Utc>,
) -> Result<()> {
  link_authors(conn, building_id, &building.author_ids)?;
  for link in UseLink::ALL {
    link_uses(conn, building_id, link, link.collection(building), now)?;
  }
  Ok(())
}

fn link_authors(conn: &Connection, building_id: i64, author_ids: &BTreeSet<i64>) -> Result<()> {
  let mut stmt = conn
    .prepare("INSERT INTO building_authors (building_id, actor_id) VALUES (?1, ?2)")
    .classify("building author link")?;
  for actor_id in author_ids {
    let item = format!("author {actor_id} of building {building_id}");
    let inserted = stmt.execute(params![building_id, actor_id]).classify(&item)?;
    if inserted == 0 {
      return Err(Error::InsertFailed(item));
    }
  }
  Ok(())
}

/// Resolve each use type by English name, then link it. The collection is
/// replaced by the stored use types.
fn link_uses(
  conn: &Connection,
  building_id: i64,
  link: UseLink,
  uses: &mut [UseType],
  now: DateTime<Utc>,
) -> Result<()> {
  let table = link.table();
  let mut stmt = conn
    .prepare(&format!(
      "INSERT INTO {table} (building_id, use_type_id) VALUES (?1, ?2)"
    ))
    .classify(table)?;

  for use_type in uses.iter_mut() {
    let item = format!("{table} {:?} of building {building_id}", use_type.name_en);
    let stored = resolve_use_type(conn, std::mem::take(use_type), now)?.into_inner();
    let use_type_id = stored
      .id
      .ok_or_else(|| Error::InsertFailed(format!("use type {:?}", stored.name_en)))?;

    let inserted = stmt.execute(params![building_id, use_type_id]).classify(&item)?;
    if inserted == 0 {
      return Err(Error::InsertFailed(item));
    }
    *use_type = stored;
  }
  Ok(())
}
