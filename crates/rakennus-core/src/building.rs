//! The building aggregate — a building, its owned address, and the ids of the
//! authors and use types linked to it.
//!
//! Every descriptive column in the store is nullable, so every descriptive
//! field here is an `Option`. "Unknown" and "empty" are different answers.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reference::UseType;

// ─── Localized text ──────────────────────────────────────────────────────────

/// One piece of text in the three languages the store carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
  pub fi: Option<String>,
  pub en: Option<String>,
  pub ru: Option<String>,
}

/// A language the store carries text in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  #[default]
  Fi,
  En,
  Ru,
}

impl Localized {
  /// Text in English only.
  pub fn en(text: impl Into<String>) -> Self {
    Self { en: Some(text.into()), ..Self::default() }
  }

  pub fn get(&self, lang: Language) -> Option<&str> {
    match lang {
      Language::Fi => self.fi.as_deref(),
      Language::En => self.en.as_deref(),
      Language::Ru => self.ru.as_deref(),
    }
  }

  /// Text in `lang`, else the first available of Finnish, English, Russian.
  pub fn get_or_any(&self, lang: Language) -> Option<&str> {
    self
      .get(lang)
      .or(self.fi.as_deref())
      .or(self.en.as_deref())
      .or(self.ru.as_deref())
  }

  pub fn is_empty(&self) -> bool {
    self.fi.is_none() && self.en.is_none() && self.ru.is_none()
  }
}

// ─── Coordinates ─────────────────────────────────────────────────────────────

/// A projected ETRS-GK25 coordinate in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
  pub easting:  f64,
  pub northing: f64,
}

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub latitude:  f64,
  pub longitude: f64,
}

// ─── Address ─────────────────────────────────────────────────────────────────

/// A street address. Matched by its street-address text when a building is
/// written; inserted if no row carries that text yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
  pub id:               Option<i64>,
  pub street_address:   String,
  pub neighbourhood_id: Option<i64>,
  pub created_at:       Option<DateTime<Utc>>,
  pub updated_at:       Option<DateTime<Utc>>,
  pub deleted_at:       Option<DateTime<Utc>>,
}

impl Address {
  pub fn new(street_address: impl Into<String>) -> Self {
    Self { street_address: street_address.into(), ..Self::default() }
  }

  pub fn in_neighbourhood(mut self, neighbourhood_id: i64) -> Self {
    self.neighbourhood_id = Some(neighbourhood_id);
    self
  }
}

// ─── Building ────────────────────────────────────────────────────────────────

/// The building aggregate as written to and read from the store.
///
/// `id` and the audit timestamps are assigned by the store; a value that has
/// never been stored carries `None` in all of them. `author_ids` and the use
/// collections are owned copies, not live relations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Building {
  pub id:                      Option<i64>,
  pub name:                    Localized,
  pub description:             Localized,
  pub history:                 Localized,
  /// Why the building is considered notable.
  pub reasoning:               Localized,
  pub protection_status:       Localized,
  pub foundation:              Localized,
  pub frame:                   Localized,
  pub facade:                  Localized,
  pub floor_description:       Localized,
  pub special_features:        Localized,
  pub construction_start_year: Option<i32>,
  pub completion_year:         Option<i32>,
  pub etrs_gk25:               Option<ProjectedPoint>,
  /// Derived from `etrs_gk25`; absent until converted.
  pub wgs84:                   Option<GeoPoint>,
  pub address:                 Address,
  pub author_ids:              BTreeSet<i64>,
  pub initial_uses:            Vec<UseType>,
  pub current_uses:            Vec<UseType>,
  pub created_at:              Option<DateTime<Utc>>,
  pub updated_at:              Option<DateTime<Utc>>,
  pub deleted_at:              Option<DateTime<Utc>>,
}

impl Building {
  /// A building with nothing known about it beyond its address.
  pub fn new(address: Address) -> Self {
    Self { address, ..Self::default() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn localized_falls_back_in_fixed_order() {
    let text = Localized {
      fi: None,
      en: Some("Cathedral".into()),
      ru: Some("Собор".into()),
    };
    assert_eq!(text.get(Language::Fi), None);
    assert_eq!(text.get_or_any(Language::Fi), Some("Cathedral"));
    assert_eq!(text.get_or_any(Language::Ru), Some("Собор"));
    assert!(!text.is_empty());
    assert!(Localized::default().is_empty());
  }

  #[test]
  fn building_serialises_unknown_fields_as_null() {
    let b = Building::new(Address::new("Unioninkatu 29"));
    let json = serde_json::to_value(&b).unwrap();
    assert_eq!(json["completion_year"], serde_json::Value::Null);
    assert_eq!(json["address"]["street_address"], "Unioninkatu 29");
  }
}
