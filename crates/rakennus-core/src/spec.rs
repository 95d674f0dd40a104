//! Building query specifications.
//!
//! A [`BuildingSpec`] describes which buildings to fetch and in what order,
//! independently of the backend that executes it. Each variant holds only
//! the parameters it needs; backends render it into their own query
//! language.

use crate::geo::BoundingBox;

/// Decimal places kept for nearest-search coordinates.
pub const COORDINATE_DECIMALS: usize = 5;

/// A query over active (not soft-deleted) buildings.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildingSpec {
  /// Every building, ordered by id.
  All { limit: i64, offset: i64 },
  /// Buildings at exactly this street address, newest first.
  ByAddress { street_address: String },
  /// Buildings whose street address starts with `prefix`, ignoring case,
  /// ordered by the lower-cased address.
  ByAlikeAddress { prefix: String, limit: i64, offset: i64 },
  ById { id: i64 },
  /// Buildings within a distance of a point, nearest first.
  Nearest(NearestSpec),
}

impl BuildingSpec {
  pub fn all(limit: i64, offset: i64) -> Self { Self::All { limit, offset } }

  pub fn by_address(street_address: impl Into<String>) -> Self {
    Self::ByAddress { street_address: street_address.into() }
  }

  pub fn by_alike_address(
    prefix: impl Into<String>,
    limit: i64,
    offset: i64,
  ) -> Self {
    Self::ByAlikeAddress { prefix: prefix.into(), limit, offset }
  }

  pub fn by_id(id: i64) -> Self { Self::ById { id } }

  pub fn nearest(
    distance_m: f64,
    latitude: f64,
    longitude: f64,
    limit: i64,
    offset: i64,
  ) -> Self {
    Self::Nearest(NearestSpec::new(distance_m, latitude, longitude, limit, offset))
  }
}

// ─── Nearest ─────────────────────────────────────────────────────────────────

/// Buildings whose WGS84 position lies within `distance_m` metres of a point.
///
/// The point is kept as fixed-precision decimal strings, so two specs built
/// from coordinates that format to the same five decimals are equal. The
/// search box is derived from those strings and never from the raw input.
///
/// Negative distances, limits or offsets are stored as given; the backend
/// then matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestSpec {
  distance_m: f64,
  latitude:   String,
  longitude:  String,
  limit:      i64,
  offset:     i64,
  bounds:     BoundingBox,
}

impl NearestSpec {
  pub fn new(
    distance_m: f64,
    latitude: f64,
    longitude: f64,
    limit: i64,
    offset: i64,
  ) -> Self {
    let latitude = format!("{latitude:.COORDINATE_DECIMALS$}");
    let longitude = format!("{longitude:.COORDINATE_DECIMALS$}");
    let bounds = BoundingBox::around(
      parse_normalised(&latitude),
      parse_normalised(&longitude),
      distance_m,
    );
    Self { distance_m, latitude, longitude, limit, offset, bounds }
  }

  pub fn distance_m(&self) -> f64 { self.distance_m }

  /// Latitude as a five-decimal string, e.g. `"60.17030"`.
  pub fn latitude(&self) -> &str { &self.latitude }

  /// Longitude as a five-decimal string, e.g. `"24.95220"`.
  pub fn longitude(&self) -> &str { &self.longitude }

  pub fn limit(&self) -> i64 { self.limit }

  pub fn offset(&self) -> i64 { self.offset }

  pub fn bounds(&self) -> BoundingBox { self.bounds }
}

/// Every string `format!` produces for an `f64` parses back; NaN covers the
/// impossible case so the box matches nothing.
fn parse_normalised(s: &str) -> f64 { s.parse().unwrap_or(f64::NAN) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn nearest_normalises_to_five_decimals() {
    let spec = NearestSpec::new(500.0, 60.170_301_2, 24.952_2, 10, 0);
    assert_eq!(spec.latitude(), "60.17030");
    assert_eq!(spec.longitude(), "24.95220");
  }

  #[test]
  fn nearest_specs_equal_when_coordinates_round_together() {
    let a = BuildingSpec::nearest(500.0, 60.170_301, 24.952_199_6, 10, 0);
    let b = BuildingSpec::nearest(500.0, 60.170_304, 24.952_200_4, 10, 0);
    assert_eq!(a, b);
  }

  #[test]
  fn nearest_specs_differ_past_fifth_decimal_rounding() {
    let a = BuildingSpec::nearest(500.0, 60.170_30, 24.952_2, 10, 0);
    let b = BuildingSpec::nearest(500.0, 60.170_31, 24.952_2, 10, 0);
    assert_ne!(a, b);

    let c = BuildingSpec::nearest(400.0, 60.170_30, 24.952_2, 10, 0);
    assert_ne!(a, c);
  }

  #[test]
  fn variants_compare_structurally() {
    assert_eq!(
      BuildingSpec::by_address("Mannerheimintie 1"),
      BuildingSpec::ByAddress { street_address: "Mannerheimintie 1".into() }
    );
    assert_ne!(BuildingSpec::all(10, 0), BuildingSpec::all(10, 10));
    assert_ne!(BuildingSpec::by_id(1), BuildingSpec::by_id(2));
  }

  #[test]
  fn nearest_bounds_follow_normalised_point() {
    let spec = NearestSpec::new(1_000.0, 60.170_301, 24.952_2, 10, 0);
    let bounds = spec.bounds();
    assert!(bounds.contains(60.1703, 24.9522));
    assert!(bounds.max_lat - bounds.min_lat < 0.02);
  }
}
