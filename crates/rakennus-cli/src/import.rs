//! `rakennus import` — load buildings from a JSON export of the inventory
//! spreadsheet.
//!
//! Each row carries one building with its address, neighbourhood, author
//! names and use names. Reference rows are created on demand; a building the
//! store rejects as a duplicate or for a missing dependency is skipped.

use std::{collections::BTreeSet, fs::File, io::BufReader, path::Path};

use anyhow::Context as _;
use rakennus_core::{
  building::{Address, Building, GeoPoint, Localized, ProjectedPoint},
  geo::gk25_to_wgs84,
  reference::{Actor, Neighbourhood, UseType},
  repository::Repository as _,
};
use rakennus_store_sqlite::{Error, SqliteStore};
use serde::Deserialize;

// ─── Rows ─────────────────────────────────────────────────────────────────────

/// One spreadsheet row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Row {
  pub street_address:          String,
  pub neighbourhood:           Option<String>,
  pub municipality:            Option<String>,
  pub name:                    Localized,
  pub description:             Localized,
  pub history:                 Localized,
  pub reasoning:               Localized,
  pub protection_status:       Localized,
  pub foundation:              Localized,
  pub frame:                   Localized,
  pub facade:                  Localized,
  pub floor_description:       Localized,
  pub special_features:        Localized,
  pub construction_start_year: Option<i32>,
  pub completion_year:         Option<i32>,
  pub gk25_easting:            Option<f64>,
  pub gk25_northing:           Option<f64>,
  pub latitude:                Option<f64>,
  pub longitude:               Option<f64>,
  pub authors:                 Vec<String>,
  pub initial_uses:            Vec<UseName>,
  pub current_uses:            Vec<UseName>,
}

/// A use type as written in the spreadsheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UseName {
  pub en: String,
  #[serde(default)]
  pub fi: Option<String>,
  #[serde(default)]
  pub ru: Option<String>,
}

impl From<UseName> for UseType {
  fn from(name: UseName) -> Self {
    Self {
      name_fi: name.fi,
      name_ru: name.ru,
      ..UseType::new(name.en)
    }
  }
}

impl Row {
  pub fn projected(&self) -> Option<ProjectedPoint> {
    Some(ProjectedPoint {
      easting:  self.gk25_easting?,
      northing: self.gk25_northing?,
    })
  }

  /// The given WGS84 position, else one derived from the GK25 position.
  pub fn position(&self) -> Option<GeoPoint> {
    if let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) {
      return Some(GeoPoint { latitude, longitude });
    }
    let projected = self.projected()?;
    match gk25_to_wgs84(projected) {
      Ok(point) => Some(point),
      Err(err) => {
        tracing::warn!(
          street_address = %self.street_address,
          error = %err,
          "could not derive a WGS84 position"
        );
        None
      }
    }
  }

  /// The aggregate this row describes, linked to already-stored references.
  pub fn into_building(
    self,
    neighbourhood_id: Option<i64>,
    author_ids: BTreeSet<i64>,
  ) -> Building {
    let etrs_gk25 = self.projected();
    let wgs84 = self.position();
    let mut address = Address::new(self.street_address);
    address.neighbourhood_id = neighbourhood_id;

    Building {
      name: self.name,
      description: self.description,
      history: self.history,
      reasoning: self.reasoning,
      protection_status: self.protection_status,
      foundation: self.foundation,
      frame: self.frame,
      facade: self.facade,
      floor_description: self.floor_description,
      special_features: self.special_features,
      construction_start_year: self.construction_start_year,
      completion_year: self.completion_year,
      etrs_gk25,
      wgs84,
      author_ids,
      initial_uses: self.initial_uses.into_iter().map(UseType::from).collect(),
      current_uses: self.current_uses.into_iter().map(UseType::from).collect(),
      ..Building::new(address)
    }
  }
}

/// Read the rows of a JSON export.
pub fn read_rows(path: &Path) -> anyhow::Result<Vec<Row>> {
  let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
  serde_json::from_reader(BufReader::new(file))
    .with_context(|| format!("failed to parse rows in {}", path.display()))
}

// ─── Import ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
  pub added:   usize,
  pub skipped: usize,
}

/// Store every row. Stops at the first error that is not a duplicate or a
/// missing dependency.
pub async fn import(store: &SqliteStore, rows: Vec<Row>) -> anyhow::Result<Summary> {
  let mut summary = Summary::default();

  for (index, row) in rows.into_iter().enumerate() {
    if row.street_address.trim().is_empty() {
      tracing::warn!(row = index, "row has no street address; skipping");
      summary.skipped += 1;
      continue;
    }

    let neighbourhood_id = match &row.neighbourhood {
      Some(name) => {
        store
          .add_neighbourhood(Neighbourhood::new(name.as_str(), row.municipality.as_deref()))
          .await
          .with_context(|| format!("row {index}: neighbourhood {name:?}"))?
          .into_inner()
          .id
      }
      None => None,
    };

    let mut author_ids = BTreeSet::new();
    for name in &row.authors {
      let actor = store
        .add_actor(Actor::new(name.as_str()))
        .await
        .with_context(|| format!("row {index}: author {name:?}"))?
        .into_inner();
      author_ids.extend(actor.id);
    }

    let street_address = row.street_address.clone();
    match store.add(row.into_building(neighbourhood_id, author_ids)).await {
      Ok(building) => {
        tracing::debug!(row = index, building_id = building.id, %street_address, "imported");
        summary.added += 1;
      }
      Err(err @ (Error::Duplicate(_) | Error::MissingDependency(_))) => {
        tracing::warn!(row = index, %street_address, error = %err, "skipping row");
        summary.skipped += 1;
      }
      Err(err) => {
        return Err(err).with_context(|| format!("row {index}: {street_address:?}"));
      }
    }
  }

  tracing::info!(added = summary.added, skipped = summary.skipped, "import finished");
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use rakennus_core::spec::BuildingSpec;

  use super::*;

  fn rows(json: &str) -> Vec<Row> {
    serde_json::from_str(json).expect("valid rows")
  }

  #[test]
  fn sparse_row_parses() {
    let rows = rows(r#"[{ "street_address": "Meripuistotie 5" }]"#);
    assert_eq!(rows[0].street_address, "Meripuistotie 5");
    assert!(rows[0].name.is_empty());
    assert!(rows[0].position().is_none());
  }

  #[test]
  fn position_prefers_given_wgs84() {
    let row = Row {
      latitude: Some(60.17),
      longitude: Some(24.94),
      gk25_easting: Some(25_500_000.0),
      gk25_northing: Some(6_654_072.819),
      ..Row::default()
    };
    assert_eq!(
      row.position(),
      Some(GeoPoint { latitude: 60.17, longitude: 24.94 })
    );
  }

  #[test]
  fn position_falls_back_to_gk25() {
    let row = Row {
      gk25_easting: Some(25_500_000.0),
      gk25_northing: Some(6_654_072.819),
      ..Row::default()
    };
    let point = row.position().unwrap();
    assert!((point.latitude - 60.0).abs() < 1e-6, "{point:?}");
    assert!((point.longitude - 25.0).abs() < 1e-9, "{point:?}");
  }

  #[test]
  fn position_outside_zone_is_dropped() {
    let row = Row {
      gk25_easting: Some(24_500_000.0),
      gk25_northing: Some(6_654_072.819),
      ..Row::default()
    };
    assert!(row.position().is_none());
    assert!(row.projected().is_some());
  }

  #[tokio::test]
  async fn import_creates_references_and_skips_rejected_rows() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let rows = rows(
      r#"[
        {
          "street_address": "Meripuistotie 5",
          "neighbourhood": "Lauttasaari",
          "municipality": "Helsinki",
          "name": { "fi": "Lauttasaaren kirkko", "en": "Lauttasaari church" },
          "completion_year": 1958,
          "gk25_easting": 25494000.0,
          "gk25_northing": 6672000.0,
          "authors": ["Keijo Petäjä"],
          "initial_uses": [{ "en": "church", "fi": "kirkko" }]
        },
        {
          "street_address": "Otavantie 1",
          "neighbourhood": "Lauttasaari",
          "municipality": "Helsinki",
          "authors": ["Keijo Petäjä"],
          "current_uses": [{ "en": "school" }, { "en": "school" }]
        },
        { "street_address": "  " }
      ]"#,
    );

    let summary = import(&store, rows).await.unwrap();
    assert_eq!(summary, Summary { added: 1, skipped: 2 });

    assert_eq!(store.list_neighbourhoods().await.unwrap().len(), 1);
    assert_eq!(store.list_actors().await.unwrap().len(), 1);

    let found = store
      .query(&BuildingSpec::by_address("Meripuistotie 5"))
      .await
      .unwrap();
    assert_eq!(found.len(), 1);
    let church = &found[0];
    assert_eq!(church.name.fi.as_deref(), Some("Lauttasaaren kirkko"));
    assert_eq!(church.author_ids.len(), 1);
    assert_eq!(church.initial_uses[0].name_fi.as_deref(), Some("kirkko"));
    assert!(church.address.neighbourhood_id.is_some());
    assert!(church.wgs84.is_some());
    assert!(church.etrs_gk25.is_some());

    let rejected = store
      .query(&BuildingSpec::by_address("Otavantie 1"))
      .await
      .unwrap();
    assert!(rejected.is_empty());
  }
}
