//! Dashboard Configuration
//! Optional TOML file with the data path and pipeline settings.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::{LoaderOptions, DEFAULT_CUTOFF_YEAR, DEFAULT_SUGGEST_COUNT};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "climate_dash.toml";
pub const DEFAULT_DATA_PATH: &str = "data/global_climate_events_economic_impact_2020_2025.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// Rows from this year on are treated as incomplete.
    pub cutoff_year: i32,
    /// How many series the random button picks.
    pub suggest_count: usize,
    /// Fixed seed for reproducible suggestions.
    pub seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            cutoff_year: DEFAULT_CUTOFF_YEAR,
            suggest_count: DEFAULT_SUGGEST_COUNT,
            seed: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Read `explicit` if given, else the default file if it exists, else
    /// fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            cutoff_year: self.cutoff_year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(DashboardConfig::from_toml("").unwrap(), DashboardConfig::default());
    }

    #[test]
    fn partial_file_overrides_fields() {
        let cfg = DashboardConfig::from_toml("data_path = \"events.csv\"\nseed = 9\n").unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("events.csv"));
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.cutoff_year, DEFAULT_CUTOFF_YEAR);
        assert_eq!(cfg.loader_options().cutoff_year, DEFAULT_CUTOFF_YEAR);
    }

    #[test]
    fn explicit_file_is_read() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "cutoff_year = 2024\nsuggest_count = 5").unwrap();
        file.flush().unwrap();

        let cfg = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.cutoff_year, 2024);
        assert_eq!(cfg.suggest_count, 5);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            DashboardConfig::from_toml("cutoff_year = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DashboardConfig::from_file(Path::new("/no/such/config.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
