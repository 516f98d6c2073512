//! Runtime configuration parsed from environment variables.
//!
//! Values are read once at start-up. Parsing goes through a lookup closure so
//! tests can feed a fixed map instead of mutating the process environment.

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DB_HOST: &str = "localhost:5432";
pub const DEFAULT_DB_NAME: &str = "servicehub";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_IDENTITY_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_IDENTITY_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Credentials for the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Web API key of the identity project.
    pub api_key: String,
    /// `host:port` of a local auth emulator; when set, lookups go there over
    /// plain HTTP.
    pub emulator_host: Option<String>,
    pub timeouts: IdentityTimeouts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub identity: IdentityConfig,
}

impl ServerConfig {
    /// Build typed config from the process environment.
    ///
    /// Required:
    /// - `FIREBASE_API_KEY`
    /// - `DATABASE_URL`, or both `DB_USER` and `DB_PASS`
    ///
    /// Optional:
    /// - `PORT`: default 5000
    /// - `DB_HOST`: default `localhost:5432`
    /// - `DB_NAME`: default `servicehub`
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `FIREBASE_AUTH_EMULATOR_HOST`
    /// - `IDENTITY_REQUEST_TIMEOUT_SECS`: default 10
    /// - `IDENTITY_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a numeric one
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let database_url = database_url(&get)?;
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS)?;
        let identity = IdentityConfig {
            api_key: non_empty(get("FIREBASE_API_KEY")).ok_or(ConfigError::Missing("FIREBASE_API_KEY"))?,
            emulator_host: non_empty(get("FIREBASE_AUTH_EMULATOR_HOST")),
            timeouts: IdentityTimeouts {
                request_secs: parse_or(
                    "IDENTITY_REQUEST_TIMEOUT_SECS",
                    get("IDENTITY_REQUEST_TIMEOUT_SECS"),
                    DEFAULT_IDENTITY_REQUEST_TIMEOUT_SECS,
                )?,
                connect_secs: parse_or(
                    "IDENTITY_CONNECT_TIMEOUT_SECS",
                    get("IDENTITY_CONNECT_TIMEOUT_SECS"),
                    DEFAULT_IDENTITY_CONNECT_TIMEOUT_SECS,
                )?,
            },
        };
        Ok(Self { port, database_url, db_max_connections, identity })
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match non_empty(raw) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { var, value }),
    }
}

/// `DATABASE_URL` wins; otherwise assemble one from the `DB_*` parts.
fn database_url(get: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    if let Some(url) = non_empty(get("DATABASE_URL")) {
        return Ok(url);
    }
    let user = non_empty(get("DB_USER")).ok_or(ConfigError::Missing("DB_USER"))?;
    let pass = non_empty(get("DB_PASS")).ok_or(ConfigError::Missing("DB_PASS"))?;
    let host = non_empty(get("DB_HOST")).unwrap_or_else(|| DEFAULT_DB_HOST.to_owned());
    let name = non_empty(get("DB_NAME")).unwrap_or_else(|| DEFAULT_DB_NAME.to_owned());
    Ok(format!("postgres://{user}:{pass}@{host}/{name}"))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
