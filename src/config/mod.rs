//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::util::rate_limit::DEFAULT_INPUT_RATE_LIMIT;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Bind address
    pub host: String,
    /// First port tried
    pub port: u16,
    /// How many successive ports to try when the port is taken
    pub port_retry_limit: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Directory served for every non-API path
    pub static_dir: PathBuf,
    /// Allowed client origins for CORS, `*` allows any
    pub client_origin: String,

    /// Move intents per second per connection
    pub input_rate_limit: u32,
    /// Longest distance a single move intent may cover
    pub max_move_distance: Option<f32>,
    /// Seed for the world RNG
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            port_retry_limit: 100,
            log_level: "info".to_string(),
            static_dir: PathBuf::from("public"),
            client_origin: "*".to_string(),
            input_rate_limit: DEFAULT_INPUT_RATE_LIMIT,
            max_move_distance: None,
            rng_seed: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_move_distance = parse_optional::<f32, _>(&lookup, "MAX_MOVE_DISTANCE")?;
        if let Some(distance) = max_move_distance {
            if !distance.is_finite() || distance <= 0.0 {
                return Err(ConfigError::Invalid {
                    var: "MAX_MOVE_DISTANCE",
                    value: distance.to_string(),
                });
            }
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_optional(&lookup, "PORT")?.unwrap_or(defaults.port),
            port_retry_limit: parse_optional(&lookup, "PORT_RETRY_LIMIT")?
                .unwrap_or(defaults.port_retry_limit),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            client_origin: lookup("CLIENT_ORIGIN").unwrap_or(defaults.client_origin),
            input_rate_limit: parse_optional(&lookup, "INPUT_RATE_LIMIT")?
                .unwrap_or(defaults.input_rate_limit),
            max_move_distance,
            rng_seed: parse_optional(&lookup, "RNG_SEED")?,
        })
    }

    /// Whether CORS should allow any origin
    pub fn allows_any_origin(&self) -> bool {
        self.client_origin.trim() == "*"
    }

    /// Explicit CORS allow-list
    pub fn allowed_origins(&self) -> Vec<String> {
        self.client_origin
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn parse_optional<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.port_retry_limit, 100);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert!(config.allows_any_origin());
        assert_eq!(config.input_rate_limit, 600);
        assert!(config.max_move_distance.is_none());
        assert!(config.rng_seed.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("MAX_MOVE_DISTANCE", "12.5"),
            ("RNG_SEED", "42"),
            ("CLIENT_ORIGIN", "http://a.test, http://b.test"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.max_move_distance, Some(12.5));
        assert_eq!(config.rng_seed, Some(42));
        assert!(!config.allows_any_origin());
        assert_eq!(config.allowed_origins(), vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_invalid_port() {
        let err = from_pairs(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
        assert_eq!(err.to_string(), "Invalid value for PORT: \"eighty\"");
    }

    #[test]
    fn test_non_positive_move_distance_rejected() {
        assert!(from_pairs(&[("MAX_MOVE_DISTANCE", "0")]).is_err());
        assert!(from_pairs(&[("MAX_MOVE_DISTANCE", "-3")]).is_err());
    }
}
