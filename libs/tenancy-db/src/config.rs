//! Layered configuration: built-in defaults, then an optional YAML file, then
//! `TENANCY__`-prefixed environment variables (`__` separates nesting levels,
//! so `TENANCY__DATABASE__DSN` sets `database.dsn`).

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use tenancy_security::DEFAULT_TENANT_HEADER;

use crate::{ConnectOpts, DbError};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "TENANCY__";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TenancyConfig {
    /// Name of the request header carrying the tenant id.
    pub tenant_header: String,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            tenant_header: DEFAULT_TENANT_HEADER.to_owned(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub dsn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_conns: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_conns: Option<u32>,
    /// e.g. `"30s"`.
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub acquire_timeout: Option<Duration>,
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<Duration>,
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub max_lifetime: Option<Duration>,
    pub test_before_acquire: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite::memory:".to_owned(),
            max_conns: None,
            min_conns: None,
            acquire_timeout: None,
            idle_timeout: None,
            max_lifetime: None,
            test_before_acquire: false,
        }
    }
}

impl From<&DatabaseConfig> for ConnectOpts {
    fn from(cfg: &DatabaseConfig) -> Self {
        let defaults = ConnectOpts::default();
        Self {
            max_conns: cfg.max_conns.or(defaults.max_conns),
            min_conns: cfg.min_conns.or(defaults.min_conns),
            acquire_timeout: cfg.acquire_timeout.or(defaults.acquire_timeout),
            idle_timeout: cfg.idle_timeout.or(defaults.idle_timeout),
            max_lifetime: cfg.max_lifetime.or(defaults.max_lifetime),
            test_before_acquire: cfg.test_before_acquire,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// When false every cache lookup misses and every write is dropped.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl TenancyConfig {
    /// Extract from a caller-assembled figment.
    ///
    /// # Errors
    /// Returns `DbError::InvalidConfig` if the figment does not describe a valid config.
    pub fn from_figment(figment: &Figment) -> Result<Self, DbError> {
        let cfg: Self = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults, then `path` (YAML) if given, then the environment.
    ///
    /// # Errors
    /// Returns `DbError::InvalidConfig` on unreadable or invalid input.
    pub fn load(path: Option<&Path>) -> Result<Self, DbError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(&figment)
    }

    fn validate(&self) -> Result<(), DbError> {
        if self.tenant_header.trim().is_empty() {
            return Err(DbError::InvalidConfig("tenant_header must not be empty".to_owned()));
        }
        if http::HeaderName::from_bytes(self.tenant_header.as_bytes()).is_err() {
            return Err(DbError::InvalidConfig(format!(
                "tenant_header '{}' is not a valid header name",
                self.tenant_header
            )));
        }
        if let (Some(min), Some(max)) = (self.database.min_conns, self.database.max_conns)
            && min > max
        {
            return Err(DbError::InvalidConfig(format!(
                "database.min_conns ({min}) exceeds database.max_conns ({max})"
            )));
        }
        Ok(())
    }
}
