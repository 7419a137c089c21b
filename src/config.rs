//! # Configuration
//!
//! Service settings come from an optional YAML file, then environment
//! variables override individual values.
//!
//! ```yaml
//! http:
//!   addr: "0.0.0.0:3000"
//! database:
//!   path: dogs.db          # or ":memory:"
//!   busy_timeout_ms: 5000
//! api:
//!   not_found_status: 404  # or 204
//!   expose_store_errors: false
//! metrics:
//!   enabled: true
//! ```
//!
//! | Variable | Overrides |
//! |---|---|
//! | `DOGS_ADDR` | `http.addr` |
//! | `DOGS_DATABASE_PATH` | `database.path` |
//! | `DOGS_NOT_FOUND_STATUS` | `api.not_found_status` |
//! | `DOGS_EXPOSE_STORE_ERRORS` | `api.expose_store_errors` |
//!
//! Unknown keys in the file are rejected rather than silently ignored.

use crate::error::{ErrorPolicy, NotFoundStatus};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Loaded when no `--config` is given and the file exists.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
pub const IN_MEMORY_DATABASE: &str = ":memory:";

pub const ADDR_ENV: &str = "DOGS_ADDR";
pub const DATABASE_PATH_ENV: &str = "DOGS_DATABASE_PATH";
pub const NOT_FOUND_STATUS_ENV: &str = "DOGS_NOT_FOUND_STATUS";
pub const EXPOSE_STORE_ERRORS_ENV: &str = "DOGS_EXPOSE_STORE_ERRORS";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub api: ErrorPolicy,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dogs.db"),
            busy_timeout_ms: 5_000,
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY_DATABASE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Serve `/metrics` and count dispatched requests.
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Load the file (if any) and apply environment overrides.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// read when present and built-in defaults are used otherwise.
    ///
    /// # Errors
    ///
    /// Unreadable or invalid files, unknown keys, and unparseable variables.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => {
                debug!("No config file, using defaults");
                Self::default()
            }
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `DOGS_*` overrides read through `lookup`.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        if let Some(addr) = lookup(ADDR_ENV) {
            self.http.addr = addr;
        }
        if let Some(path) = lookup(DATABASE_PATH_ENV) {
            self.database.path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(NOT_FOUND_STATUS_ENV) {
            let code: u16 = raw
                .trim()
                .parse()
                .with_context(|| format!("{NOT_FOUND_STATUS_ENV}={raw} is not a status code"))?;
            self.api.not_found_status = NotFoundStatus::try_from(code)
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {NOT_FOUND_STATUS_ENV}"))?;
        }
        if let Some(raw) = lookup(EXPOSE_STORE_ERRORS_ENV) {
            self.api.expose_store_errors = parse_bool(&raw)
                .with_context(|| format!("invalid {EXPOSE_STORE_ERRORS_ENV}"))?;
        }
        Ok(self)
    }
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected true or false, got '{other}'"),
    }
}
