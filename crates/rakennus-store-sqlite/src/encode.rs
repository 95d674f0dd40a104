//! Encoding and decoding between domain types and SQLite rows.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision so text order matches time order. Localized text is spread over
//! `<field>_fi`, `<field>_en` and `<field>_ru` columns.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use rakennus_core::{
  building::{Address, Building, GeoPoint, Localized, ProjectedPoint},
  reference::{Actor, Neighbourhood, UseType},
};
use rusqlite::{
  Row, ToSql,
  types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision a [`Stamp`] keeps, so a written value
/// equals the value read back.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A timestamp column value.
#[derive(Debug, Clone, Copy)]
pub struct Stamp(pub DateTime<Utc>);

impl ToSql for Stamp {
  fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
    Ok(ToSqlOutput::from(encode_dt(self.0)))
  }
}

impl FromSql for Stamp {
  fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
    let text = value.as_str()?;
    DateTime::parse_from_rfc3339(text)
      .map(|dt| Stamp(dt.with_timezone(&Utc)))
      .map_err(|e| FromSqlError::Other(Box::new(e)))
  }
}

fn stamp(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
  Ok(row.get::<_, Option<Stamp>>(column)?.map(|s| s.0))
}

// ─── Building columns ────────────────────────────────────────────────────────

/// Localized building fields; each owns three columns.
pub const TEXT_FIELDS: [&str; 10] = [
  "name",
  "description",
  "history",
  "reasoning",
  "protection_status",
  "foundation",
  "frame",
  "facade",
  "floor_description",
  "special_features",
];

/// Non-text building columns written on insert and update.
const SCALAR_COLUMNS: [&str; 6] = [
  "construction_start_year",
  "completion_year",
  "gk25_easting",
  "gk25_northing",
  "latitude",
  "longitude",
];

fn text_columns() -> impl Iterator<Item = String> {
  TEXT_FIELDS.iter().flat_map(|field| {
    ["fi", "en", "ru"].into_iter().map(move |lang| format!("{field}_{lang}"))
  })
}

/// Columns written from a [`Building`] value, excluding id and audit columns.
pub fn building_write_columns() -> Vec<String> {
  std::iter::once("address_id".to_owned())
    .chain(text_columns())
    .chain(SCALAR_COLUMNS.iter().map(|c| (*c).to_owned()))
    .collect()
}

/// `SELECT` list for a building joined with its address as `b` and `a`.
pub fn building_select_list() -> String {
  let building = ["id".to_owned()]
    .into_iter()
    .chain(building_write_columns())
    .chain(["created_at", "updated_at", "deleted_at"].map(str::to_owned))
    .map(|c| format!("b.{c} AS {c}"));

  let address = [
    "a.street_address AS street_address",
    "a.neighbourhood_id AS neighbourhood_id",
    "a.created_at AS address_created_at",
    "a.updated_at AS address_updated_at",
    "a.deleted_at AS address_deleted_at",
  ]
  .map(str::to_owned);

  building.chain(address).collect::<Vec<_>>().join(", ")
}

/// The localized fields of `b`, named as in [`TEXT_FIELDS`].
pub fn text_fields(b: &Building) -> [(&'static str, &Localized); 10] {
  [
    ("name", &b.name),
    ("description", &b.description),
    ("history", &b.history),
    ("reasoning", &b.reasoning),
    ("protection_status", &b.protection_status),
    ("foundation", &b.foundation),
    ("frame", &b.frame),
    ("facade", &b.facade),
    ("floor_description", &b.floor_description),
    ("special_features", &b.special_features),
  ]
}

/// Named parameters for [`building_write_columns`], plus `:address_id`.
///
/// Returned as owned names so callers can borrow them into a
/// `&[(&str, &dyn ToSql)]`.
pub fn building_params<'a>(
  b: &'a Building,
  address_id: &'a i64,
  coordinates: &'a [Option<f64>; 4],
) -> Vec<(String, &'a dyn ToSql)> {
  let mut params: Vec<(String, &'a dyn ToSql)> =
    vec![(":address_id".to_owned(), address_id)];

  for (field, text) in text_fields(b) {
    params.push((format!(":{field}_fi"), &text.fi));
    params.push((format!(":{field}_en"), &text.en));
    params.push((format!(":{field}_ru"), &text.ru));
  }

  params.push((":construction_start_year".to_owned(), &b.construction_start_year));
  params.push((":completion_year".to_owned(), &b.completion_year));
  params.push((":gk25_easting".to_owned(), &coordinates[0]));
  params.push((":gk25_northing".to_owned(), &coordinates[1]));
  params.push((":latitude".to_owned(), &coordinates[2]));
  params.push((":longitude".to_owned(), &coordinates[3]));
  params
}

/// The two coordinate pairs of `b` flattened in column order.
pub fn coordinates(b: &Building) -> [Option<f64>; 4] {
  [
    b.etrs_gk25.map(|p| p.easting),
    b.etrs_gk25.map(|p| p.northing),
    b.wgs84.map(|p| p.latitude),
    b.wgs84.map(|p| p.longitude),
  ]
}

// ─── Row decoders ────────────────────────────────────────────────────────────

fn localized(row: &Row<'_>, field: &str) -> rusqlite::Result<Localized> {
  Ok(Localized {
    fi: row.get(format!("{field}_fi").as_str())?,
    en: row.get(format!("{field}_en").as_str())?,
    ru: row.get(format!("{field}_ru").as_str())?,
  })
}

/// Decode a row selected with [`building_select_list`]. Author ids and use
/// types are loaded separately.
pub fn building_from_row(row: &Row<'_>) -> rusqlite::Result<Building> {
  let easting: Option<f64> = row.get("gk25_easting")?;
  let northing: Option<f64> = row.get("gk25_northing")?;
  let latitude: Option<f64> = row.get("latitude")?;
  let longitude: Option<f64> = row.get("longitude")?;

  let address = Address {
    id:               row.get("address_id")?,
    street_address:   row.get("street_address")?,
    neighbourhood_id: row.get("neighbourhood_id")?,
    created_at:       stamp(row, "address_created_at")?,
    updated_at:       stamp(row, "address_updated_at")?,
    deleted_at:       stamp(row, "address_deleted_at")?,
  };

  Ok(Building {
    id: row.get("id")?,
    name: localized(row, "name")?,
    description: localized(row, "description")?,
    history: localized(row, "history")?,
    reasoning: localized(row, "reasoning")?,
    protection_status: localized(row, "protection_status")?,
    foundation: localized(row, "foundation")?,
    frame: localized(row, "frame")?,
    facade: localized(row, "facade")?,
    floor_description: localized(row, "floor_description")?,
    special_features: localized(row, "special_features")?,
    construction_start_year: row.get("construction_start_year")?,
    completion_year: row.get("completion_year")?,
    etrs_gk25: easting
      .zip(northing)
      .map(|(easting, northing)| ProjectedPoint { easting, northing }),
    wgs84: latitude
      .zip(longitude)
      .map(|(latitude, longitude)| GeoPoint { latitude, longitude }),
    address,
    author_ids: Default::default(),
    initial_uses: Vec::new(),
    current_uses: Vec::new(),
    created_at: stamp(row, "created_at")?,
    updated_at: stamp(row, "updated_at")?,
    deleted_at: stamp(row, "deleted_at")?,
  })
}

pub const ADDRESS_COLUMNS: &str =
  "id, street_address, neighbourhood_id, created_at, updated_at, deleted_at";

pub fn address_from_row(row: &Row<'_>) -> rusqlite::Result<Address> {
  Ok(Address {
    id:               row.get("id")?,
    street_address:   row.get("street_address")?,
    neighbourhood_id: row.get("neighbourhood_id")?,
    created_at:       stamp(row, "created_at")?,
    updated_at:       stamp(row, "updated_at")?,
    deleted_at:       stamp(row, "deleted_at")?,
  })
}

pub const ACTOR_COLUMNS: &str =
  "id, name, title_fi, title_en, title_ru, created_at, updated_at, deleted_at";

pub fn actor_from_row(row: &Row<'_>) -> rusqlite::Result<Actor> {
  Ok(Actor {
    id:         row.get("id")?,
    name:       row.get("name")?,
    title:      localized(row, "title")?,
    created_at: stamp(row, "created_at")?,
    updated_at: stamp(row, "updated_at")?,
    deleted_at: stamp(row, "deleted_at")?,
  })
}

pub const USE_TYPE_COLUMNS: &str =
  "id, name_fi, name_en, name_ru, created_at, updated_at, deleted_at";

pub fn use_type_from_row(row: &Row<'_>) -> rusqlite::Result<UseType> {
  Ok(UseType {
    id:         row.get("id")?,
    name_fi:    row.get("name_fi")?,
    name_en:    row.get("name_en")?,
    name_ru:    row.get("name_ru")?,
    created_at: stamp(row, "created_at")?,
    updated_at: stamp(row, "updated_at")?,
    deleted_at: stamp(row, "deleted_at")?,
  })
}

pub const NEIGHBOURHOOD_COLUMNS: &str =
  "id, name, municipality, created_at, updated_at, deleted_at";

pub fn neighbourhood_from_row(row: &Row<'_>) -> rusqlite::Result<Neighbourhood> {
  Ok(Neighbourhood {
    id:           row.get("id")?,
    name:         row.get("name")?,
    municipality: row.get("municipality")?,
    created_at:   stamp(row, "created_at")?,
    updated_at:   stamp(row, "updated_at")?,
    deleted_at:   stamp(row, "deleted_at")?,
  })
}
