use crate::core::{Result, StoreError};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding the store file, relative to the working directory
pub const DEFAULT_DATABASE_DIR: &str = "database";
/// Base name of the store file
pub const DEFAULT_DATABASE_NAME: &str = "hookah";
/// Extension appended to the base name
pub const DEFAULT_DATABASE_EXTENSION: &str = "db";

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Potency per brand, used when new tobaccos are added. Keys are lowercased on load.
    #[serde(default)]
    pub potency: HashMap<String, i64>,
}

/// Location of the SQLite store.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_DIR)
}

fn default_name() -> String {
    DEFAULT_DATABASE_NAME.to_string()
}

fn default_extension() -> String {
    DEFAULT_DATABASE_EXTENSION.to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            dir: default_dir(),
            name: default_name(),
            extension: default_extension(),
        }
    }
}

impl DatabaseConfig {
    /// Store named `name` under the default directory
    pub fn named(name: impl Into<String>) -> Self {
        DatabaseConfig {
            name: name.into(),
            ..DatabaseConfig::default()
        }
    }

    /// `<dir>/<name>.<extension>`
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", self.name, self.extension))
    }
}

impl Config {
    /// Potency configured for `brand` in any letter case, 0 when unknown
    pub fn potency_for(&self, brand: &str) -> i64 {
        self.potency
            .get(&brand.trim().to_lowercase())
            .copied()
            .unwrap_or(0)
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content).map_err(|e| StoreError::Config(e.to_string()))?;
    // Brands are stored lowercased, so the lookup table must be too
    config.potency = config
        .potency
        .into_iter()
        .map(|(brand, potency)| (brand.trim().to_lowercase(), potency))
        .collect();
    Ok(config)
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = hookah_store::config::load_config("hookah.toml").expect("Failed to load config");
/// println!("{:?}", config.database.path());
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))?;
    parse_config(&content)
}
