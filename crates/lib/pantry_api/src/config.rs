//! API server configuration.
//!
//! Required values have no fallback: a missing or malformed one is a
//! startup-fatal error surfaced before the listener binds, never a silent
//! default.

use thiserror::Error;

/// Configuration errors raised at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3400").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret for access tokens.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (typical deployment: 900).
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl_secs: i64,
    /// Rolling-quota reset interval in seconds.
    pub quota_reset_interval_secs: i64,
    /// Substitute the fixed demo identity for all auth checks.
    pub auth_bypass: bool,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                    | Required | Default |
    /// |-----------------------------|----------|---------|
    /// | `JWT_SECRET`                | yes      | — |
    /// | `ACCESS_TOKEN_TTL_SECS`     | yes      | — |
    /// | `REFRESH_TOKEN_TTL_SECS`    | yes      | — |
    /// | `QUOTA_RESET_INTERVAL_SECS` | yes      | — |
    /// | `AUTH_BYPASS`               | no       | `false` |
    /// | `BIND_ADDR`                 | no       | `127.0.0.1:3400` |
    /// | `DATABASE_URL`              | no       | `postgres://localhost:5432/pantry` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3400".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/pantry".into()),
            jwt_secret: require("JWT_SECRET")?,
            access_token_ttl_secs: require_secs("ACCESS_TOKEN_TTL_SECS")?,
            refresh_token_ttl_secs: require_secs("REFRESH_TOKEN_TTL_SECS")?,
            quota_reset_interval_secs: require_secs("QUOTA_RESET_INTERVAL_SECS")?,
            auth_bypass: std::env::var("AUTH_BYPASS")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
        })
    }

    /// Refresh token TTL as a chrono duration.
    pub fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_token_ttl_secs)
    }

    /// Rolling-quota reset interval as a chrono duration.
    pub fn reset_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.quota_reset_interval_secs)
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn require_secs(name: &'static str) -> Result<i64, ConfigError> {
    parse_secs(name, &require(name)?)
}

fn parse_secs(name: &'static str, raw: &str) -> Result<i64, ConfigError> {
    match raw.parse::<i64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ConfigError::Invalid(name, raw.to_string())),
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_secs_accepts_positive_integers() {
        assert_eq!(parse_secs("X", "900").unwrap(), 900);
    }

    #[test]
    fn parse_secs_rejects_zero_negative_and_garbage() {
        assert!(parse_secs("X", "0").is_err());
        assert!(parse_secs("X", "-5").is_err());
        assert!(parse_secs("X", "15m").is_err());
    }

    #[test]
    fn parse_bool_accepts_common_truthy_forms() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool(" yes "));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }
}
