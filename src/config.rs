use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Prefix for the environment variables read by [`Config::load`]:
/// `DCP_DATABASE_URL` and `DCP_DATABASE_NAME`.
const ENV_PREFIX: &str = "DCP";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// `:memory:`, `sqlite::memory:`, `sqlite://<dir>` or a bare directory.
    pub database_url: String,
    /// File stem of the database inside `database_url`.
    pub database_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl Config {
    /// Load `.env` (if present) and read the database settings from the environment.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => bail!("Error loading .env file: {}", e),
        }
        Self::from_source(None)
    }

    /// Same as [`Config::load`] but against an explicit set of variables.
    #[cfg(test)]
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self> {
        Self::from_source(Some(vars))
    }

    fn from_source(vars: Option<HashMap<String, String>>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .ignore_empty(true)
                    .source(vars),
            )
            .build()
            .context("Failed to read configuration from environment")?;

        let config: Config = settings
            .try_deserialize()
            .context("DCP_DATABASE_URL and DCP_DATABASE_NAME must both be set")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let name = self.database_name.trim();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            bail!("Invalid database name: {:?}", self.database_name);
        }
        Ok(())
    }

    pub fn location(&self) -> StoreLocation {
        let url = self.database_url.trim();
        if url == ":memory:" || url == "sqlite::memory:" {
            return StoreLocation::Memory;
        }
        let dir = url.strip_prefix("sqlite://").unwrap_or(url);
        StoreLocation::File(PathBuf::from(dir).join(format!("{}.sqlite", self.database_name.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_prefixed_variables() {
        let config = Config::from_env_map(vars(&[
            ("DCP_DATABASE_URL", "sqlite://data"),
            ("DCP_DATABASE_NAME", "dcp"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite://data");
        assert_eq!(config.database_name, "dcp");
    }

    #[test]
    fn missing_name_is_an_error() {
        let err = Config::from_env_map(vars(&[("DCP_DATABASE_URL", "data")])).unwrap_err();
        assert!(format!("{:#}", err).contains("DCP_DATABASE_NAME"));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let result = Config::from_env_map(vars(&[
            ("DCP_DATABASE_URL", ""),
            ("DCP_DATABASE_NAME", "dcp"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn unprefixed_variables_are_ignored() {
        let result = Config::from_env_map(vars(&[
            ("DATABASE_URL", "data"),
            ("DATABASE_NAME", "dcp"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_path_like_names() {
        let result = Config::from_env_map(vars(&[
            ("DCP_DATABASE_URL", "data"),
            ("DCP_DATABASE_NAME", "../dcp"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn resolves_store_location() {
        let config = |url: &str| Config {
            database_url: url.to_string(),
            database_name: "dcp".to_string(),
        };
        assert_eq!(config(":memory:").location(), StoreLocation::Memory);
        assert_eq!(config("sqlite::memory:").location(), StoreLocation::Memory);
        assert_eq!(
            config("sqlite://data").location(),
            StoreLocation::File(PathBuf::from("data/dcp.sqlite"))
        );
        assert_eq!(
            config("data").location(),
            StoreLocation::File(PathBuf::from("data/dcp.sqlite"))
        );
    }
}
