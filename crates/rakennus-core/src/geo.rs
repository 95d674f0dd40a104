//! Spherical distance, search bounding boxes and ETRS-GK25 → WGS84
//! conversion.

use crate::{
  building::{GeoPoint, ProjectedPoint},
  Error, Result,
};

/// Mean Earth radius in metres. Distances and bounding boxes use the same
/// sphere so the box always contains the distance circle.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle (haversine) distance between two WGS84 positions, in metres.
pub fn great_circle_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
  let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
  let d_phi = (lat2 - lat1).to_radians();
  let d_lambda = (lon2 - lon1).to_radians();

  let a = (d_phi / 2.0).sin().powi(2)
    + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
  2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

// ─── Bounding box ────────────────────────────────────────────────────────────

/// Slack added to every edge so rounding never cuts into the circle.
const BOX_SLACK_DEG: f64 = 1e-7;

/// A latitude/longitude rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
  pub min_lat: f64,
  pub max_lat: f64,
  pub min_lon: f64,
  pub max_lon: f64,
}

impl BoundingBox {
  /// The smallest rectangle containing every point within `distance_m` of
  /// `(lat, lon)`.
  ///
  /// When the circle reaches a pole or crosses the antimeridian the box spans
  /// all longitudes. A negative distance yields an inverted box that contains
  /// nothing.
  pub fn around(lat: f64, lon: f64, distance_m: f64) -> Self {
    let angular = distance_m / EARTH_RADIUS_M;
    let d_lat = angular.to_degrees() + BOX_SLACK_DEG.copysign(angular);
    let min_lat = lat - d_lat;
    let max_lat = lat + d_lat;

    if min_lat <= -90.0 || max_lat >= 90.0 {
      return Self {
        min_lat: min_lat.max(-90.0),
        max_lat: max_lat.min(90.0),
        min_lon: -180.0,
        max_lon: 180.0,
      };
    }

    // Longitude half-width at the tangent latitude, not at the centre.
    let d_lon = (angular.sin() / lat.to_radians().cos()).asin().to_degrees()
      + BOX_SLACK_DEG.copysign(angular);
    let (min_lon, max_lon) = (lon - d_lon, lon + d_lon);

    if min_lon < -180.0 || max_lon > 180.0 {
      Self { min_lat, max_lat, min_lon: -180.0, max_lon: 180.0 }
    } else {
      Self { min_lat, max_lat, min_lon, max_lon }
    }
  }

  pub fn contains(&self, lat: f64, lon: f64) -> bool {
    (self.min_lat..=self.max_lat).contains(&lat)
      && (self.min_lon..=self.max_lon).contains(&lon)
  }
}

// ─── ETRS-GK25 ───────────────────────────────────────────────────────────────

// GRS80 ellipsoid.
const GRS80_A: f64 = 6_378_137.0;
const GRS80_F: f64 = 1.0 / 298.257_222_101;

// ETRS-GK25: central meridian 25°E, scale 1, zone number in the false easting.
const GK25_CENTRAL_MERIDIAN_DEG: f64 = 25.0;
const GK25_FALSE_EASTING: f64 = 25_500_000.0;
const GK25_SCALE: f64 = 1.0;

/// Convert an ETRS-GK25 coordinate to WGS84 with the inverse Krüger series
/// (accurate to well under a millimetre inside the zone).
pub fn gk25_to_wgs84(point: ProjectedPoint) -> Result<GeoPoint> {
  let ProjectedPoint { easting, northing } = point;
  // Zone 25 eastings all start with the zone number.
  if !(25_000_000.0..26_000_000.0).contains(&easting)
    || !(0.0..10_000_000.0).contains(&northing)
  {
    return Err(Error::OutsideZone { easting, northing });
  }

  let f = GRS80_F;
  let n = f / (2.0 - f);
  let e = (2.0 * f - f * f).sqrt();
  let a1 = GRS80_A / (1.0 + n) * (1.0 + n.powi(2) / 4.0 + n.powi(4) / 64.0);

  let h = [
    n / 2.0 - 2.0 / 3.0 * n.powi(2) + 37.0 / 96.0 * n.powi(3)
      - 1.0 / 360.0 * n.powi(4),
    1.0 / 48.0 * n.powi(2) + 1.0 / 15.0 * n.powi(3)
      - 437.0 / 1440.0 * n.powi(4),
    17.0 / 480.0 * n.powi(3) - 37.0 / 840.0 * n.powi(4),
    4397.0 / 161_280.0 * n.powi(4),
  ];

  let xi = northing / (a1 * GK25_SCALE);
  let eta = (easting - GK25_FALSE_EASTING) / (a1 * GK25_SCALE);

  let (mut xi_p, mut eta_p) = (xi, eta);
  for (i, h_i) in h.iter().enumerate() {
    let k = 2.0 * (i as f64 + 1.0);
    xi_p -= h_i * (k * xi).sin() * (k * eta).cosh();
    eta_p -= h_i * (k * xi).cos() * (k * eta).sinh();
  }

  let beta = (xi_p.sin() / eta_p.cosh()).asin();
  let l = (eta_p.tanh() / beta.cos()).asin();

  // Isometric latitude, solved by fixed-point iteration.
  let q = beta.tan().asinh();
  let mut q_p = q + e * (e * q.tanh()).atanh();
  for _ in 0..8 {
    q_p = q + e * (e * q_p.tanh()).atanh();
  }

  let latitude = q_p.sinh().atan().to_degrees();
  let longitude = GK25_CENTRAL_MERIDIAN_DEG + l.to_degrees();
  if !latitude.is_finite() || !longitude.is_finite() {
    return Err(Error::Conversion);
  }
  Ok(GeoPoint { latitude, longitude })
}
