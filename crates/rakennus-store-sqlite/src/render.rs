//! Rendering [`BuildingSpec`] values into SQLite queries.
//!
//! Every rendered query selects [`building_select_list`] from `buildings b`
//! joined with `addresses a`, excludes soft-deleted buildings, and binds its
//! inputs as named parameters.

use rakennus_core::spec::{BuildingSpec, NearestSpec};
use rusqlite::{ToSql, types::Value};

use crate::encode::building_select_list;

/// A query template and the values for its named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
  pub sql:    String,
  pub params: Vec<(&'static str, Value)>,
}

impl Rendered {
  /// Parameters in the shape `rusqlite` binds by name.
  pub fn named_params(&self) -> Vec<(&str, &dyn ToSql)> {
    self
      .params
      .iter()
      .map(|(name, value)| (*name, value as &dyn ToSql))
      .collect()
  }
}

/// Something that can be turned into a SQLite query.
pub trait Render {
  fn render(&self) -> Rendered;
}

impl Render for BuildingSpec {
  fn render(&self) -> Rendered {
    match self {
      Self::All { limit, offset } => Rendered {
        sql:    select(
          "b.deleted_at IS NULL",
          "b.id ASC",
          "LIMIT :limit OFFSET :offset",
        ),
        params: vec![
          (":limit", Value::Integer(*limit)),
          (":offset", Value::Integer(*offset)),
        ],
      },

      Self::ByAddress { street_address } => Rendered {
        sql:    select(
          "b.deleted_at IS NULL AND a.street_address = :street_address",
          "b.created_at DESC, b.id DESC",
          "",
        ),
        params: vec![(":street_address", Value::Text(street_address.clone()))],
      },

      Self::ByAlikeAddress { prefix, limit, offset } => Rendered {
        sql:    select(
          "b.deleted_at IS NULL \
           AND casefold(a.street_address) LIKE casefold(:pattern) ESCAPE '\\'",
          "casefold(a.street_address) ASC, b.id ASC",
          "LIMIT :limit OFFSET :offset",
        ),
        params: vec![
          (":pattern", Value::Text(format!("{}%", escape_like(prefix)))),
          (":limit", Value::Integer(*limit)),
          (":offset", Value::Integer(*offset)),
        ],
      },

      Self::ById { id } => Rendered {
        sql:    select("b.deleted_at IS NULL AND b.id = :id", "b.id ASC", ""),
        params: vec![(":id", Value::Integer(*id))],
      },

      Self::Nearest(spec) => render_nearest(spec),
    }
  }
}

fn select(filter: &str, order: &str, paging: &str) -> String {
  format!(
    "SELECT {columns}
     FROM buildings b
     JOIN addresses a ON a.id = b.address_id
     WHERE {filter}
     ORDER BY {order}
     {paging}",
    columns = building_select_list(),
  )
}

/// The box test narrows candidates through the position index; the
/// great-circle test decides. Rows without a position fail both.
fn render_nearest(spec: &NearestSpec) -> Rendered {
  let bounds = spec.bounds();
  let distance = "great_circle_m(b.latitude, b.longitude, \
                  CAST(:latitude AS REAL), CAST(:longitude AS REAL))";

  Rendered {
    sql:    select(
      &format!(
        "b.deleted_at IS NULL
         AND b.latitude IS NOT NULL AND b.longitude IS NOT NULL
         AND b.latitude BETWEEN :min_lat AND :max_lat
         AND b.longitude BETWEEN :min_lon AND :max_lon
         AND {distance} <= :distance"
      ),
      &format!("{distance} ASC"),
      "LIMIT :limit OFFSET :offset",
    ),
    params: vec![
      (":latitude", Value::Text(spec.latitude().to_owned())),
      (":longitude", Value::Text(spec.longitude().to_owned())),
      (":min_lat", Value::Real(bounds.min_lat)),
      (":max_lat", Value::Real(bounds.max_lat)),
      (":min_lon", Value::Real(bounds.min_lon)),
      (":max_lon", Value::Real(bounds.max_lon)),
      (":distance", Value::Real(spec.distance_m())),
      (":limit", Value::Integer(spec.limit())),
      (":offset", Value::Integer(spec.offset())),
    ],
  }
}

/// Escape `LIKE` wildcards so a prefix matches literally.
fn escape_like(prefix: &str) -> String {
  let mut escaped = String::with_capacity(prefix.len());
  for c in prefix.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}
