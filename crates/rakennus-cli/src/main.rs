//! `rakennus` — import and look up buildings in the Helsinki buildings store.
//!
//! # Usage
//!
//! ```
//! rakennus import buildings.json
//! rakennus find "Meripuistotie 5"
//! rakennus nearest --lat 60.1699 --lon 24.9384 --distance 300 --lang en
//! rakennus --json search mann
//! ```

mod import;
mod render;
mod settings;

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rakennus_core::{building::Building, repository::Repository as _, spec::BuildingSpec};
use rakennus_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{Overrides, Settings};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rakennus", version, about = "Helsinki buildings store")]
struct Args {
  /// Path to the TOML settings file.
  #[arg(short, long, value_name = "FILE", default_value = "rakennus.toml")]
  config: PathBuf,

  /// SQLite database file (overrides `store_path`).
  #[arg(long, value_name = "FILE", env = "RAKENNUS_STORE")]
  store: Option<String>,

  /// Language for text output.
  #[arg(long, value_parser = ["fi", "en", "ru"])]
  lang: Option<String>,

  /// Rows per page for `list` and `search`.
  #[arg(long)]
  page_size: Option<i64>,

  /// Print buildings as JSON instead of text.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Load buildings from a JSON export of the inventory spreadsheet.
  Import { file: PathBuf },

  /// Buildings at an exact street address, newest first.
  Find { address: String },

  /// Buildings whose street address starts with PREFIX (any case).
  Search {
    prefix: String,
    #[arg(long, default_value_t = 0)]
    page:   i64,
  },

  /// Buildings within a distance of a WGS84 point, closest first.
  Nearest {
    #[arg(long, allow_hyphen_values = true)]
    lat:      f64,
    #[arg(long, allow_hyphen_values = true)]
    lon:      f64,
    /// Radius in metres (default: `nearest_distance_m`).
    #[arg(long)]
    distance: Option<f64>,
    #[arg(long, default_value_t = 0)]
    page:     i64,
  },

  /// One building by id.
  Show { id: i64 },

  /// All active buildings by id.
  List {
    #[arg(long, default_value_t = 0)]
    page: i64,
  },

  /// Soft-delete a building.
  Remove { id: i64 },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let settings = settings::load(&args.config, &Overrides {
    store_path: args.store.clone(),
    page_size:  args.page_size,
    language:   args.lang.clone(),
  })?;

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;

  run(&store, &settings, args.json, args.command).await
}

async fn run(
  store: &SqliteStore,
  settings: &Settings,
  json: bool,
  command: Command,
) -> anyhow::Result<()> {
  let page = |page: i64| page_window(settings.page_size, page);

  let spec = match command {
    Command::Import { file } => {
      let rows = import::read_rows(&file)?;
      tracing::info!(rows = rows.len(), file = %file.display(), "importing");
      import::import(store, rows).await?;
      return Ok(());
    }
    Command::Remove { id } => {
      store
        .remove(id)
        .await
        .with_context(|| format!("failed to remove building {id}"))?;
      tracing::info!(building_id = id, "building removed");
      return Ok(());
    }
    Command::Find { address } => BuildingSpec::by_address(address),
    Command::Search { prefix, page: n } => {
      let (limit, offset) = page(n);
      BuildingSpec::by_alike_address(prefix, limit, offset)
    }
    Command::Nearest { lat, lon, distance, page: n } => {
      let (limit, offset) = page(n);
      let distance = distance.unwrap_or(settings.nearest_distance_m);
      BuildingSpec::nearest(distance, lat, lon, limit, offset)
    }
    Command::Show { id } => BuildingSpec::by_id(id),
    Command::List { page: n } => {
      let (limit, offset) = page(n);
      BuildingSpec::all(limit, offset)
    }
  };

  let buildings = store.query(&spec).await.context("query failed")?;
  if matches!(spec, BuildingSpec::ById { .. }) && buildings.is_empty() {
    anyhow::bail!("no such building");
  }
  print(store, settings, json, &buildings).await
}

/// `(limit, offset)` for a zero-based page. Offsets past `i64::MAX` clamp
/// there and match nothing.
fn page_window(page_size: i64, page: i64) -> (i64, i64) {
  (page_size, page.max(0).saturating_mul(page_size))
}

async fn print(
  store: &SqliteStore,
  settings: &Settings,
  json: bool,
  buildings: &[Building],
) -> anyhow::Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(buildings)?);
    return Ok(());
  }

  let actors: BTreeMap<i64, String> = store
    .list_actors()
    .await
    .context("failed to load authors")?
    .into_iter()
    .filter_map(|actor| Some((actor.id?, actor.name)))
    .collect();

  for building in buildings {
    println!("{}", render::building(building, settings.language, &actors));
  }
  if buildings.is_empty() {
    tracing::info!("no buildings found");
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_window_offsets_by_whole_pages() {
    assert_eq!(page_window(10, 0), (10, 0));
    assert_eq!(page_window(10, 3), (10, 30));
    assert_eq!(page_window(10, -2), (10, 0));
  }

  #[test]
  fn page_window_saturates_on_huge_pages() {
    assert_eq!(page_window(10, i64::MAX), (10, i64::MAX));
    assert_eq!(page_window(25, i64::MAX / 10), (25, i64::MAX));
  }

  #[test]
  fn nearest_accepts_negative_coordinates() {
    let args = Args::try_parse_from([
      "rakennus", "nearest", "--lat", "-33.86", "--lon", "-151.2", "--page", "2",
    ])
    .unwrap();
    assert!(matches!(
      args.command,
      Command::Nearest { lat, lon, distance: None, page: 2 } if lat == -33.86 && lon == -151.2
    ));
  }
}
