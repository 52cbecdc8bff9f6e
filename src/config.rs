//! TOML configuration for OID Explorer.
//!
//! ```toml
//! [db]
//! path = "./data/oids.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:9000"
//!
//! [search]
//! max_limit = 1000
//! ```
//!
//! Only `[db]` is required. `OIDX_DB_PATH`, `OIDX_SERVER_BIND` and
//! `OIDX_SEARCH_MAX_LIMIT` override the file. See [`load_config`] for
//! validation rules.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:9000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Upper bound on the number of search results. Requests without a
    /// limit get this many at most.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_limit: default_max_limit(),
        }
    }
}

fn default_max_limit() -> usize {
    1000
}

impl Config {
    /// Defaults for every section, with the database at
    /// `./data/oids.sqlite`.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/oids.sqlite"),
            },
            server: ServerConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Environment variable overriding `[db].path`.
pub const ENV_DB_PATH: &str = "OIDX_DB_PATH";
/// Environment variable overriding `[server].bind`.
pub const ENV_SERVER_BIND: &str = "OIDX_SERVER_BIND";
/// Environment variable overriding `[search].max_limit`.
pub const ENV_SEARCH_MAX_LIMIT: &str = "OIDX_SEARCH_MAX_LIMIT";

/// Loads the TOML file, applies `OIDX_*` environment overrides, and
/// validates the result.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }

    if config.search.max_limit == 0 {
        anyhow::bail!("search.max_limit must be >= 1");
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(config)
}

/// Replaces config values with non-empty environment values looked up
/// through `lookup`.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(path) = var(ENV_DB_PATH) {
        config.db.path = PathBuf::from(path);
    }
    if let Some(bind) = var(ENV_SERVER_BIND) {
        config.server.bind = bind;
    }
    if let Some(raw) = var(ENV_SEARCH_MAX_LIMIT) {
        config.search.max_limit = raw
            .parse()
            .with_context(|| format!("{} is not a valid limit: {}", ENV_SEARCH_MAX_LIMIT, raw))?;
    }
    Ok(())
}
