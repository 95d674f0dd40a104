//! Plain-text rendering of buildings in one of the stored languages.

use std::collections::BTreeMap;

use rakennus_core::{
  building::{Building, Language, Localized},
  reference::UseType,
};

/// Field labels in each language.
struct Labels {
  name:       &'static str,
  built:      &'static str,
  position:   &'static str,
  authors:    &'static str,
  initial:    &'static str,
  current:    &'static str,
  protection: &'static str,
  history:    &'static str,
}

fn labels(lang: Language) -> Labels {
  match lang {
    Language::Fi => Labels {
      name:       "Nimi",
      built:      "Rakennettu",
      position:   "Sijainti",
      authors:    "Suunnittelijat",
      initial:    "Alkuperäinen käyttö",
      current:    "Nykyinen käyttö",
      protection: "Suojelu",
      history:    "Historia",
    },
    Language::En => Labels {
      name:       "Name",
      built:      "Built",
      position:   "Position",
      authors:    "Authors",
      initial:    "Initial use",
      current:    "Current use",
      protection: "Protection",
      history:    "History",
    },
    Language::Ru => Labels {
      name:       "Название",
      built:      "Построено",
      position:   "Координаты",
      authors:    "Авторы",
      initial:    "Первоначальное назначение",
      current:    "Текущее назначение",
      protection: "Охрана",
      history:    "История",
    },
  }
}

/// Render `building` as an indented block, one newline-terminated line per
/// field. Author ids missing from `actors` are shown as `#id`.
pub fn building(building: &Building, lang: Language, actors: &BTreeMap<i64, String>) -> String {
  let labels = labels(lang);

  let id = building.id.map(|id| format!("#{id} ")).unwrap_or_default();
  let header = format!("{id}{}", building.address.street_address);

  let built = years(building.construction_start_year, building.completion_year)
    .map(|years| field(labels.built, &years));
  let position = building.wgs84.map(|point| {
    field(labels.position, &format!("{:.5}, {:.5}", point.latitude, point.longitude))
  });
  let authors = (!building.author_ids.is_empty()).then(|| {
    let names: Vec<String> = building
      .author_ids
      .iter()
      .map(|id| actors.get(id).cloned().unwrap_or_else(|| format!("#{id}")))
      .collect();
    field(labels.authors, &names.join(", "))
  });

  let fields = [
    localized(labels.name, &building.name, lang),
    built,
    position,
    authors,
    uses(labels.initial, &building.initial_uses, lang),
    uses(labels.current, &building.current_uses, lang),
    localized(labels.protection, &building.protection_status, lang),
    localized(labels.history, &building.history, lang),
  ];

  let mut out = header;
  out.push('\n');
  for line in fields.into_iter().flatten() {
    out.push_str(&line);
    out.push('\n');
  }
  out
}

fn field(label: &str, value: &str) -> String { format!("  {label}: {value}") }

fn localized(label: &str, text: &Localized, lang: Language) -> Option<String> {
  text.get_or_any(lang).map(|text| field(label, text))
}

fn uses(label: &str, uses: &[UseType], lang: Language) -> Option<String> {
  if uses.is_empty() {
    return None;
  }
  let names: Vec<String> = uses
    .iter()
    .map(|u| u.name().get_or_any(lang).unwrap_or(u.name_en.as_str()).to_owned())
    .collect();
  Some(field(label, &names.join(", ")))
}

fn years(start: Option<i32>, end: Option<i32>) -> Option<String> {
  match (start, end) {
    (Some(start), Some(end)) if start != end => Some(format!("{start}-{end}")),
    (_, Some(year)) | (Some(year), None) => Some(year.to_string()),
    (None, None) => None,
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use rakennus_core::building::{Address, GeoPoint};

  use super::*;

  fn church() -> Building {
    Building {
      id: Some(7),
      name: Localized {
        fi: Some("Lauttasaaren kirkko".into()),
        en: Some("Lauttasaari church".into()),
        ru: None,
      },
      construction_start_year: Some(1956),
      completion_year: Some(1958),
      wgs84: Some(GeoPoint { latitude: 60.158_391, longitude: 24.874_12 }),
      author_ids: BTreeSet::from([1, 2]),
      initial_uses: vec![UseType {
        name_fi: Some("kirkko".into()),
        ..UseType::new("church")
      }],
      ..Building::new(Address::new("Meripuistotie 5"))
    }
  }

  #[test]
  fn renders_in_requested_language() {
    let actors = BTreeMap::from([(1, "Keijo Petäjä".to_owned())]);
    let text = building(&church(), Language::Fi, &actors);

    assert!(text.starts_with("#7 Meripuistotie 5\n"), "{text}");
    assert!(text.contains("  Nimi: Lauttasaaren kirkko\n"), "{text}");
    assert!(text.contains("  Rakennettu: 1956-1958\n"), "{text}");
    assert!(text.contains("  Sijainti: 60.15839, 24.87412\n"), "{text}");
    assert!(text.contains("  Suunnittelijat: Keijo Petäjä, #2\n"), "{text}");
    assert!(text.contains("  Alkuperäinen käyttö: kirkko\n"), "{text}");
    assert!(!text.contains("Nykyinen"), "{text}");
  }

  #[test]
  fn missing_language_falls_back() {
    let text = building(&church(), Language::Ru, &BTreeMap::new());
    assert!(text.contains("  Название: Lauttasaaren kirkko\n"), "{text}");
    assert!(text.contains("  Первоначальное назначение: kirkko\n"), "{text}");
  }

  #[test]
  fn fields_keep_their_order_and_skip_missing_values() {
    let bare = Building::new(Address::new("Tehtaankatu 1"));
    assert_eq!(building(&bare, Language::En, &BTreeMap::new()), "Tehtaankatu 1\n");

    let text = building(&church(), Language::En, &BTreeMap::new());
    let labels: Vec<&str> = text
      .lines()
      .skip(1)
      .filter_map(|line| line.trim_start().split(':').next())
      .collect();
    assert_eq!(labels, ["Name", "Built", "Position", "Authors", "Initial use"]);
  }

  #[test]
  fn single_year_is_not_a_range() {
    assert_eq!(years(Some(1958), Some(1958)).as_deref(), Some("1958"));
    assert_eq!(years(Some(1956), None).as_deref(), Some("1956"));
    assert_eq!(years(None, None), None);
  }
}
