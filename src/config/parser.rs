//! Parser configuration loading from config.toml
//!
//! The only tunables of the ingestion pipeline live here: the ordered
//! item-identifier table used by the name normalizer and the length at which
//! fallback display text is truncated. Both can be changed without touching
//! code; when no file exists the built-in defaults are used.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable pointing at the configuration file
pub const CONFIG_PATH_ENV: &str = "FARM_CONFIG_PATH";
/// Environment variable overriding `display_limit`
pub const DISPLAY_LIMIT_ENV: &str = "DISPLAY_LIMIT";
/// Default truncation threshold for fallback display text, in characters
pub const DEFAULT_DISPLAY_LIMIT: usize = 150;

// Order matters: substring lookups take the first entry that matches, so
// products come before the animals that produce them and specific keys before
// generic ones. A short key also matches inside unrelated words (`water` in
// `watermelon`); such items need their own entry ahead of the short key.
const DEFAULT_ITEMS: &[(&str, &str)] = &[
    ("eggplant", "Berinjela"),
    ("watermelon", "Melancia"),
    ("milk", "Leite"),
    ("egg", "Ovo"),
    ("wool", "Lã"),
    ("leather", "Couro"),
    ("meat", "Carne"),
    ("corn_seed", "Semente de Milho"),
    ("wheat_seed", "Semente de Trigo"),
    ("cow_female", "Vaca"),
    ("cow_male", "Touro"),
    ("bull", "Touro"),
    ("cow", "Vaca"),
    ("chicken_female", "Galinha"),
    ("chicken_male", "Galo"),
    ("chicken", "Galinha"),
    ("pig_female", "Porca"),
    ("pig", "Porco"),
    ("sheep", "Ovelha"),
    ("goat", "Cabra"),
    ("horse", "Cavalo"),
    ("corn", "Milho"),
    ("milho", "Milho"),
    ("wheat", "Trigo"),
    ("tomato", "Tomate"),
    ("potato", "Batata"),
    ("carrot", "Cenoura"),
    ("seed", "Semente"),
    ("fertilizer", "Fertilizante"),
    ("animal_feed", "Ração"),
    ("water", "Água"),
];

/// One entry of the item-name table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemAlias {
    /// Internal identifier as it appears in game logs (e.g. `cow_female`)
    pub key: String,
    /// Name shown on the dashboard (e.g. `Vaca`)
    pub name: String,
}

/// Configuration structure representing the parser section of config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Maximum characters of fallback display text
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
    /// Ordered identifier → display-name table
    #[serde(default = "default_items")]
    pub items: Vec<ItemAlias>,
}

const fn default_display_limit() -> usize {
    DEFAULT_DISPLAY_LIMIT
}

fn default_items() -> Vec<ItemAlias> {
    DEFAULT_ITEMS
        .iter()
        .map(|(key, name)| ItemAlias {
            key: (*key).to_string(),
            name: (*name).to_string(),
        })
        .collect()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            display_limit: DEFAULT_DISPLAY_LIMIT,
            items: default_items(),
        }
    }
}

impl ParserConfig {
    /// Applies `DISPLAY_LIMIT` from the environment, if set.
    ///
    /// # Errors
    /// Returns `Error::Config` if the variable is set but is not a positive integer.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var(DISPLAY_LIMIT_ENV) {
            self.display_limit = parse_display_limit(&raw)?;
        }
        Ok(self)
    }
}

fn parse_display_limit(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(Error::Config {
            message: format!("{DISPLAY_LIMIT_ENV} must be a positive integer, got '{raw}'"),
        }),
    }
}

/// Loads parser configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - `display_limit` is zero
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ParserConfig> {
    debug!("Loading parser configuration from {:?}", path.as_ref());
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

fn parse_config(contents: &str) -> Result<ParserConfig> {
    let config: ParserConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if config.display_limit == 0 {
        return Err(Error::Config {
            message: "display_limit must be greater than zero".to_string(),
        });
    }

    Ok(config)
}

/// Loads parser configuration from `$FARM_CONFIG_PATH` (or `./config.toml`),
/// falling back to built-in defaults when the file does not exist, then applies
/// environment overrides.
pub fn load_default_config() -> Result<ParserConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());

    let config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        info!("No configuration file at {path}, using built-in parser defaults");
        ParserConfig::default()
    };

    config.with_env_overrides()
}
