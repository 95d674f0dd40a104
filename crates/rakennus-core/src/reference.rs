//! Reference data linked from buildings: authors, use types and
//! neighbourhoods. All three are created on demand by the populator and
//! deduplicated on a natural key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::building::Localized;

// ─── Actor ───────────────────────────────────────────────────────────────────

/// An architect, firm or other author of a building. `name` is unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub id:         Option<i64>,
  pub name:       String,
  pub title:      Localized,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
  pub deleted_at: Option<DateTime<Utc>>,
}

impl Actor {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }
}

// ─── UseType ─────────────────────────────────────────────────────────────────

/// What a building is (or was) used for. Keyed by its English name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseType {
  pub id:         Option<i64>,
  pub name_fi:    Option<String>,
  pub name_en:    String,
  pub name_ru:    Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
  pub deleted_at: Option<DateTime<Utc>>,
}

impl UseType {
  pub fn new(name_en: impl Into<String>) -> Self {
    Self { name_en: name_en.into(), ..Self::default() }
  }

  /// The three names as one [`Localized`] value.
  pub fn name(&self) -> Localized {
    Localized {
      fi: self.name_fi.clone(),
      en: Some(self.name_en.clone()),
      ru: self.name_ru.clone(),
    }
  }
}

// ─── Neighbourhood ───────────────────────────────────────────────────────────

/// A neighbourhood, unique on `(name, municipality)` with a missing
/// municipality counting as its own value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbourhood {
  pub id:           Option<i64>,
  pub name:         String,
  pub municipality: Option<String>,
  pub created_at:   Option<DateTime<Utc>>,
  pub updated_at:   Option<DateTime<Utc>>,
  pub deleted_at:   Option<DateTime<Utc>>,
}

impl Neighbourhood {
  pub fn new(name: impl Into<String>, municipality: Option<&str>) -> Self {
    Self {
      name: name.into(),
      municipality: municipality.map(str::to_owned),
      ..Self::default()
    }
  }
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

/// Outcome of a create-on-demand write.
///
/// `Existing` is the duplicate signal: the natural key was already taken and
/// the carried value is the row that was stored before, not a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert<T> {
  Created(T),
  Existing(T),
}

impl<T> Upsert<T> {
  pub fn is_duplicate(&self) -> bool { matches!(self, Self::Existing(_)) }

  pub fn get(&self) -> &T {
    match self {
      Self::Created(v) | Self::Existing(v) => v,
    }
  }

  pub fn into_inner(self) -> T {
    match self {
      Self::Created(v) | Self::Existing(v) => v,
    }
  }
}
