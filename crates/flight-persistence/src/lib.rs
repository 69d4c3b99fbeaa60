//! # Flight Persistence Library
//!
//! Receiving side of the simulator's one-shot export. Every named payload
//! (one trajectory per aircraft plus the configuration) is written as a
//! JSON document whose name is the channel it arrived on:
//!
//! ```text
//!  simulator ── Envelope{channel, payload} ──► PersistenceService
//!                                                   │
//!                                                   ▼
//!                                        DocumentStore (JsonFileStore)
//!                                        <data_dir>/<channel>.json
//! ```
//!
//! Writes overwrite any previous document of the same name. Failures are
//! logged and never reported back to the sender.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flight_persistence::{JsonFileStore, PersistenceService};
//!
//! let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//! let handle = PersistenceService::new(JsonFileStore::new("./data")).spawn(rx);
//! // hand `tx` to the simulator's transport, drop it when done
//! let (_, report) = handle.await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod service;
pub mod store;

pub use error::{PersistenceError, Result};
pub use service::{PersistenceService, ServiceReport};
pub use store::{DocumentStore, JsonFileStore, MemoryStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
