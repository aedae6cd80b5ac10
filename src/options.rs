use std::path::Path;

use serde::Deserialize;

use crate::{DbError, Result};

/// Column layout family of the backend's replication status output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    /// Stock MySQL column layout.
    #[default]
    Standard,
    /// FDB variant: extra placeholder columns, trimmed slave status tail.
    Fdb,
}

impl Flavor {
    /// Maps the boolean backend-flavor flag onto a layout family.
    pub fn from_flag(is_fdb: bool) -> Self {
        if is_fdb {
            Self::Fdb
        } else {
            Self::Standard
        }
    }
}

/// Configures statement timeouts, pool sizing and backend flavor.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Default read-write statement timeout in seconds, `<= 0` disables it.
    pub rw_timeout_sec: i64,
    /// Replication status layout family.
    pub flavor: Flavor,
    /// Maximum wait for a pooled connection in seconds.
    pub conn_timeout_sec: u64,
    /// Connections the pool keeps open while idle.
    pub max_idle_conns: usize,
    /// Upper bound of physical connections.
    pub max_open_conns: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            rw_timeout_sec: 30,
            flavor: Flavor::Standard,
            conn_timeout_sec: 3,
            max_idle_conns: 30,
            max_open_conns: 3000,
        }
    }
}

impl EngineOptions {
    /// Parses options from a JSON document; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|err| DbError::Config(format!("invalid options JSON: {err}")))?;
        options.validate()?;
        Ok(options)
    }

    /// Reads and parses a JSON options file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            DbError::Config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Builds options from `MYSQL_OPS_*` environment variables.
    ///
    /// Reads `MYSQL_OPS_RW_TIMEOUT_SEC`, `MYSQL_OPS_FDB` (`1`/`true`),
    /// `MYSQL_OPS_CONN_TIMEOUT_SEC`, `MYSQL_OPS_MAX_IDLE_CONNS` and
    /// `MYSQL_OPS_MAX_OPEN_CONNS`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();
        if let Some(value) = env_parsed::<i64>("MYSQL_OPS_RW_TIMEOUT_SEC")? {
            options.rw_timeout_sec = value;
        }
        if let Ok(value) = std::env::var("MYSQL_OPS_FDB") {
            let flag = matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
            options.flavor = Flavor::from_flag(flag);
        }
        if let Some(value) = env_parsed::<u64>("MYSQL_OPS_CONN_TIMEOUT_SEC")? {
            options.conn_timeout_sec = value;
        }
        if let Some(value) = env_parsed::<usize>("MYSQL_OPS_MAX_IDLE_CONNS")? {
            options.max_idle_conns = value;
        }
        if let Some(value) = env_parsed::<usize>("MYSQL_OPS_MAX_OPEN_CONNS")? {
            options.max_open_conns = value;
        }
        options.validate()?;
        Ok(options)
    }

    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn with_rw_timeout_sec(mut self, timeout_sec: i64) -> Self {
        self.rw_timeout_sec = timeout_sec;
        self
    }

    /// Checks pool bounds.
    pub fn validate(&self) -> Result<()> {
        if self.max_open_conns == 0 {
            return Err(DbError::Config("max_open_conns must be positive".to_owned()));
        }
        if self.max_idle_conns > self.max_open_conns {
            return Err(DbError::Config(format!(
                "max_idle_conns ({}) exceeds max_open_conns ({})",
                self.max_idle_conns, self.max_open_conns
            )));
        }
        Ok(())
    }
}

fn env_parsed<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| DbError::Config(format!("invalid {name} '{raw}': {err}"))),
        Err(_) => Ok(None),
    }
}
