//! # Flight Simulator
//!
//! Fixed-step 2D kinematics for a manually flown leader and a follower that
//! mirrors its speed and turn rate.
//!
//! ## Tick
//!
//! ```text
//!  draw world ─► phase 1: manual aircraft ─► phase 2: followers ─► termination?
//!                 (read keys, clamp,          (copy leader's          │
//!                  integrate, record)          same-tick action)      ▼
//!                                                              export once, halt
//! ```
//!
//! Each aircraft integrates with a first-order Euler step: move `speed`
//! along the current heading, then turn by `angular_speed`. Every tick
//! appends the pre-step pose and the applied action to the aircraft's
//! history.
//!
//! ## Collaborators
//!
//! - [`InputSource`]: keys held at the tick boundary
//! - [`Renderer`]: receives the scenery and every aircraft each tick
//! - [`Transport`]: carries the one-shot export to persistence

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aircraft;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod fleet;
pub mod history;
pub mod input;
pub mod launch;
pub mod render;
pub mod scenario;

pub use aircraft::{Aircraft, euler_step};
pub use clock::{ClockState, SimulationClock, Termination, TerminationReason, TickOutcome};
pub use config::{LogFormat, RunConfig};
pub use controller::{Controller, ControllerSpec, DecisionContext, MotionBoard};
pub use error::{Result, SimError};
pub use export::{
    ChannelFailure, ChannelTransport, ExportError, Exporter, MemoryTransport, Transport,
    TransportError,
};
pub use fleet::Fleet;
pub use history::{History, HistoryRecord};
pub use input::{InputScript, InputSource, KeyboardState, ScriptSegment};
pub use launch::{LaunchGenerator, LaunchLayout, LaunchPoints};
pub use render::{Renderer, TraceRenderer, WorldFrame};
pub use scenario::{AircraftSpec, FOLLOWER_ID, LEADER_ID, ScenarioSpec};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
