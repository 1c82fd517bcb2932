//! Connection profiles resolved from the process environment.
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `TEST_ENV` | Profile name: `local` (default) or `remote_for_check` |
//! | `{PREFIX}_DB_HOST` | Database host |
//! | `{PREFIX}_DB_NAME` | Database name |
//! | `{PREFIX}_DB_USER` | Database user |
//! | `{PREFIX}_DB_PASSWORD` | Database password |
//! | `{PREFIX}_DB_PORT` | Database port |
//!
//! `PREFIX` is `LOCAL` or `REMOTE_FOR_CHECK`. Unset connection variables are
//! left as `None` and the driver default applies.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use helios_dbcheck::config::{DbConfig, Profile};
//!
//! let vars = HashMap::from([
//!     ("TEST_ENV", "remote_for_check"),
//!     ("REMOTE_FOR_CHECK_DB_HOST", "db.internal"),
//!     ("REMOTE_FOR_CHECK_DB_PORT", "6432"),
//! ]);
//! let config = DbConfig::resolve(|name| vars.get(name).map(|v| v.to_string())).unwrap();
//! assert_eq!(config.host.as_deref(), Some("db.internal"));
//! assert_eq!(config.port, Some(6432));
//!
//! assert!("staging".parse::<Profile>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the variable that selects the profile.
pub const PROFILE_VAR: &str = "TEST_ENV";

/// A named set of connection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Developer database.
    #[default]
    Local,
    /// Shared database used for verification runs.
    RemoteForCheck,
}

impl Profile {
    /// Returns the profile name as accepted in `TEST_ENV`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Local => "local",
            Profile::RemoteForCheck => "remote_for_check",
        }
    }

    /// Returns the prefix of this profile's connection variables.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Profile::Local => "LOCAL",
            Profile::RemoteForCheck => "REMOTE_FOR_CHECK",
        }
    }

    /// Returns the variable name for one connection field, e.g. `LOCAL_DB_HOST`.
    pub fn variable(&self, field: &str) -> String {
        format!("{}_DB_{}", self.env_prefix(), field)
    }

    /// Reads the profile from `TEST_ENV`, defaulting to [`Profile::Local`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Reads the profile through the given variable lookup.
    ///
    /// An unset variable selects the default profile; a set but unrecognized
    /// value, including the empty string, is an error.
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(PROFILE_VAR) {
            Some(name) => name.parse(),
            None => Ok(Profile::default()),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Profile::Local),
            "remote_for_check" => Ok(Profile::RemoteForCheck),
            other => Err(ConfigError::UnknownProfile {
                name: other.to_string(),
            }),
        }
    }
}

/// Connection parameters for one profile.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Database host.
    #[serde(default)]
    pub host: Option<String>,

    /// Database name.
    #[serde(default)]
    pub dbname: Option<String>,

    /// Database user.
    #[serde(default)]
    pub user: Option<String>,

    /// Database password. Never serialized.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Database port.
    #[serde(default)]
    pub port: Option<u16>,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("port", &self.port)
            .finish()
    }
}

impl DbConfig {
    /// Resolves the profile from `TEST_ENV` and reads its variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::for_profile(Profile::from_env()?, |name| std::env::var(name).ok())
    }

    /// Resolves the profile and reads its variables through `lookup`.
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = Profile::resolve(&lookup)?;
        Self::for_profile(profile, lookup)
    }

    /// Reads the connection variables of a known profile through `lookup`.
    pub fn for_profile<F>(profile: Profile, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port_var = profile.variable("PORT");
        let port = match lookup(&port_var) {
            Some(value) => match value.trim().parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    return Err(ConfigError::InvalidPort {
                        variable: port_var,
                        value,
                    });
                }
            },
            None => None,
        };

        Ok(Self {
            host: lookup(&profile.variable("HOST")),
            dbname: lookup(&profile.variable("NAME")),
            user: lookup(&profile.variable("USER")),
            password: lookup(&profile.variable("PASSWORD")),
            port,
        })
    }
}
