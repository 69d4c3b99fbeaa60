//! Simulator error types.

use flight_domain::DomainError;
use thiserror::Error;

/// Simulator errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid configuration, scenario or leadership graph
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A tick was requested after termination
    #[error("Simulation clock has halted; no further ticks run")]
    Halted,

    /// Tick index does not continue the entity's history
    #[error("Tick {got} out of order for {entity}: expected {expected}")]
    TickOrder {
        entity: String,
        expected: u64,
        got: u64,
    },

    /// Malformed input script
    #[error("Invalid input script: {0}")]
    Script(String),

    /// Unparseable environment variable
    #[error("Invalid value for {name}: {value:?}")]
    Env { name: &'static str, value: String },

    /// Launch layout name not recognised
    #[error("Unknown launch layout: {0}")]
    UnknownLayout(String),
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Domain(DomainError::from(err))
    }
}

/// Result type for simulator operations.
pub type Result<T> = std::result::Result<T, SimError>;
