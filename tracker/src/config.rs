//! Configuration.
//!
//! ```text
//! defaults
//!     → optional TOML file (--config)
//!     → env HOST / PORT / TRACKER_SECRET
//!     → CLI flags --host / --port
//!     → validate()
//!     → Config, immutable for the life of the process
//! ```
//!
//! Every field has a default, so an empty file (or none) is a valid config.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracker_core::TieBreak;

/// Signing secret used when none is configured. Fine for local runs only.
pub const DEFAULT_SECRET: &str = "secret";

/// Upper bound for `auth.token_ttl_secs` (one year).
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub router: RouterConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
        }
    }
}

/// Access-token signing settings, handed to `TokenService::new` at startup.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.into(),
            issuer: "ja".into(),
            token_ttl_secs: 24 * 60 * 60,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub tie_break: TieBreak,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read a TOML file. Not validated: env and CLI overrides still apply on top.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `HOST`, `PORT` and `TRACKER_SECRET` from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: "PORT", value: port })?;
        }
        if let Some(secret) = lookup("TRACKER_SECRET") {
            self.auth.secret = secret;
        }
        Ok(())
    }

    /// Semantic checks; collects every problem into one error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if self.server.host.trim().is_empty() {
            problems.push("server.host must not be empty");
        }
        if self.auth.secret.is_empty() {
            problems.push("auth.secret must not be empty");
        }
        if self.auth.issuer.is_empty() {
            problems.push("auth.issuer must not be empty");
        }
        if self.auth.token_ttl_secs == 0 || self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            problems.push("auth.token_ttl_secs must be between 1 and one year");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.issuer, "ja");
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert_eq!(config.router.tie_break, TieBreak::LastMatch);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [auth]
            secret = "s3cr3t"
            token_ttl_secs = 60

            [router]
            tie_break = "most_specific"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.secret, "s3cr3t");
        assert_eq!(config.auth.issuer, "ja");
        assert_eq!(config.auth.token_ttl_secs, 60);
        assert_eq!(config.router.tie_break, TieBreak::MostSpecific);
    }

    #[test]
    fn unknown_tie_break_is_a_parse_error() {
        let err = Config::from_toml_str("[router]\ntie_break = \"first\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [("HOST", "::1"), ("PORT", "9000"), ("TRACKER_SECRET", "env")].into();
        let mut config = Config::default();
        config
            .apply_env_from(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.host, "::1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.secret, "env");
    }

    #[test]
    fn bad_port_in_env_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env_from(|name| (name == "PORT").then(|| "http".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "PORT", .. }));
    }

    #[test]
    fn file_gaps_can_be_filled_by_env() {
        let path = std::env::temp_dir().join(format!("tracker-config-{}.toml", std::process::id()));
        fs::write(&path, "[server]\nhost = \"\"\n\n[auth]\nsecret = \"\"\n").unwrap();
        let mut config = Config::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(config.validate().is_err());

        config
            .apply_env_from(|name| match name {
                "HOST" => Some("0.0.0.0".to_owned()),
                "TRACKER_SECRET" => Some("from-env".to_owned()),
                _ => None,
            })
            .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.auth.secret, "from-env");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load(Path::new("/nonexistent/tracker.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn validation_reports_every_problem() {
        let mut config = Config::default();
        config.auth.secret.clear();
        config.auth.token_ttl_secs = 0;
        let ConfigError::Invalid(message) = config.validate().unwrap_err() else {
            panic!("expected Invalid");
        };
        assert!(message.contains("auth.secret"));
        assert!(message.contains("auth.token_ttl_secs"));
    }
}
