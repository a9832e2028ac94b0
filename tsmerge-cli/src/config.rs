//! Optional `tsmerge.toml` configuration.
//!
//! Every field is optional; command-line flags win over the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Name of the config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tsmerge.toml";

/// Conflict strategy as spelled on the command line and in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    /// Finished over unfinished over vanished; later input breaks ties (default)
    Preferred,
    /// Keep the version seen first
    First,
    /// Keep the version seen last
    Last,
    /// Ask in a terminal menu for every conflict
    Interactive,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TsMergeConfig {
    pub strategy: Option<StrategyChoice>,
    pub drop_vanished: Option<bool>,
    pub force: Option<bool>,
    pub keep_alternatives: Option<bool>,
    pub menu: Option<MenuCfg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuCfg {
    pub marker: Option<String>,
    pub highlight: Option<String>,
}

/// Loads the config from `explicit`, or from `./tsmerge.toml` when present.
///
/// A missing default file is not an error; a missing explicit file is.
pub fn load_config(explicit: Option<&Path>) -> Result<TsMergeConfig, String> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return Ok(TsMergeConfig::default());
            }
            default
        }
    };

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    let config: TsMergeConfig = toml::from_str(&contents)
        .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}
