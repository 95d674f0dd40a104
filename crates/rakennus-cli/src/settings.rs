//! Layered settings: built-in defaults, then the optional TOML file, then
//! `RAKENNUS_*` environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, Source};
use rakennus_core::building::Language;
use serde::Deserialize;

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
  pub store_path:         PathBuf,
  pub nearest_distance_m: f64,
  pub page_size:          i64,
  pub language:           Language,
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Default)]
pub struct Overrides {
  pub store_path: Option<String>,
  pub page_size:  Option<i64>,
  pub language:   Option<String>,
}

/// Load settings with `file` as the (optional) TOML layer.
pub fn load(file: &Path, overrides: &Overrides) -> anyhow::Result<Settings> {
  resolve(File::from(file).required(false), overrides)
    .with_context(|| format!("failed to read settings from {}", file.display()))
}

fn resolve<S>(file: S, overrides: &Overrides) -> anyhow::Result<Settings>
where
  S: Source + Send + Sync + 'static,
{
  let settings = Config::builder()
    .set_default("store_path", "rakennus.db")?
    .set_default("nearest_distance_m", 500.0)?
    .set_default("page_size", 10)?
    .set_default("language", "fi")?
    .add_source(file)
    .add_source(Environment::with_prefix("RAKENNUS"))
    .set_override_option("store_path", overrides.store_path.clone())?
    .set_override_option("page_size", overrides.page_size)?
    .set_override_option("language", overrides.language.clone())?
    .build()?;

  let settings: Settings = settings
    .try_deserialize()
    .context("failed to deserialise settings")?;
  anyhow::ensure!(settings.page_size > 0, "page_size must be positive");
  Ok(settings)
}
