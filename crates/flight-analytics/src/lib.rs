//! # Flight Analytics
//!
//! Turns exported simulator runs into datasets for learning.
//!
//! ## Pipeline
//!
//! ```text
//!  data_dir/{config,airplane1,airplane2}.json
//!        │  TrialRun::load (remap to centered frame)
//!        ▼
//!  data_dir/all_{states,actions}.json
//!        │  archive_trial
//!        ▼
//!  trials/<name>/<name>-<n>/...
//!        │  Collation::load, ring extraction
//!        ▼
//!  collated/{all,ring,rel-ring}-{states,actions,samples}.json
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod collate;
pub mod error;
mod files;
pub mod trajectory;
pub mod trial;

pub use archive::{archive_trial, count_trials, trial_dir};
pub use collate::{Collation, RingMode, RingRadii, Sample};
pub use error::{AnalyticsError, Result};
pub use trajectory::{ActionBounds, Bounds, Trajectory};
pub use trial::{JointAction, JointState, TrialRun};
