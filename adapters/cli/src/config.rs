//! Optional TOML file overriding the default tuning.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use colony_fleet_core::Tuning;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    tuning: Tuning,
}

/// Reads the tuning from `path`, falling back to defaults when no file is
/// given. Fields missing from the file keep their default values.
pub(crate) fn load_tuning(path: Option<&Path>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse_tuning(&contents)
        .with_context(|| format!("invalid config file at {}", path.display()))
}

fn parse_tuning(contents: &str) -> Result<Tuning> {
    let config: ConfigFile =
        toml::from_str(contents).context("failed to parse config toml contents")?;
    Ok(config.tuning)
}
