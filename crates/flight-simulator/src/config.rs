//! # Run Configuration
//!
//! Environment-based settings for the simulator binary. Command-line flags
//! override whatever is read here.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, SimError};
use crate::launch::LaunchLayout;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(SimError::Env {
                name: "LOG_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Simulator run settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    pub log_format: LogFormat,

    /// Directory the exported documents are written to
    pub data_dir: PathBuf,

    pub launch: LaunchLayout,

    /// Seed for random launch points
    pub seed: Option<u64>,

    /// Ticks after which the stop key is asserted
    pub max_ticks: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            data_dir: PathBuf::from("./data"),
            launch: LaunchLayout::Random,
            seed: None,
            max_ticks: 1800,
        }
    }
}

impl RunConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// A set variable that does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// A present value that does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),

            log_format: lookup("LOG_FORMAT")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.log_format),

            data_dir: lookup("FLIGHT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),

            launch: lookup("FLIGHT_LAUNCH")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.launch),

            seed: lookup("FLIGHT_SEED")
                .map(|v| parse_number("FLIGHT_SEED", &v))
                .transpose()?,

            max_ticks: lookup("FLIGHT_MAX_TICKS")
                .map(|v| parse_number("FLIGHT_MAX_TICKS", &v))
                .transpose()?
                .unwrap_or(defaults.max_ticks),
        })
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| SimError::Env {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<RunConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RunConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(load(&[]).unwrap(), RunConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("LOG_FORMAT", "json"),
            ("FLIGHT_DATA_DIR", "/tmp/flights"),
            ("FLIGHT_LAUNCH", "default"),
            ("FLIGHT_SEED", "99"),
            ("FLIGHT_MAX_TICKS", "120"),
        ])
        .unwrap();

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/flights"));
        assert_eq!(config.launch, LaunchLayout::Default);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.max_ticks, 120);
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert!(matches!(
            load(&[("FLIGHT_SEED", "abc")]),
            Err(SimError::Env { name: "FLIGHT_SEED", .. })
        ));
        assert!(matches!(
            load(&[("FLIGHT_LAUNCH", "spiral")]),
            Err(SimError::UnknownLayout(_))
        ));
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
