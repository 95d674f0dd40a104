//! Error types for `rakennus-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The projected coordinate does not lie in the ETRS-GK25 zone.
  #[error("coordinate ({easting}, {northing}) is outside the ETRS-GK25 zone")]
  OutsideZone { easting: f64, northing: f64 },

  #[error("coordinate conversion did not produce a finite position")]
  Conversion,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
