use crate::entities::EntityType;
use crate::error::GraphError;
use crate::sink::SinkFormat;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_DB: &str = "childcare.db";
pub const DEFAULT_CSV: &str = "childcare_data.csv";
pub const DEFAULT_EXPORT_DIR: &str = "exports";

/// Pipeline configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite database holding the source table and the materialized graph
    pub database_path: PathBuf,
    pub csv_path: PathBuf,
    pub sink: SinkFormat,
    pub export_dir: PathBuf,
    pub entity_types: BTreeSet<EntityType>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from(DEFAULT_DB),
            csv_path: PathBuf::from(DEFAULT_CSV),
            sink: SinkFormat::Tables,
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            entity_types: EntityType::ALL.into_iter().collect(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        Ok(Self {
            database_path: lookup("CHILDCARE_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            csv_path: lookup("CHILDCARE_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.csv_path),
            sink: match lookup("CHILDCARE_SINK") {
                Some(value) => value.parse().context("CHILDCARE_SINK must be 'tables' or 'triples'")?,
                None => defaults.sink,
            },
            export_dir: lookup("CHILDCARE_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            entity_types: match lookup("CHILDCARE_ENTITY_TYPES") {
                Some(value) => {
                    parse_entity_types(&value).context("CHILDCARE_ENTITY_TYPES is invalid")?
                }
                None => defaults.entity_types,
            },
        })
    }
}

/// Comma-separated entity type names; empty means every type
pub fn parse_entity_types(value: &str) -> std::result::Result<BTreeSet<EntityType>, GraphError> {
    let names: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    if names.is_empty() {
        return Ok(EntityType::ALL.into_iter().collect());
    }

    names.into_iter().map(str::parse).collect()
}
