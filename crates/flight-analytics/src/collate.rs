//! Collation of archived trials into one dataset, and ring extraction.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::archive::trial_dir;
use crate::error::{AnalyticsError, Result};
use crate::files::{read_json, write_json};
use crate::trial::{ACTIONS_FILE, JointAction, JointState, STATES_FILE};

/// One joint sample tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Trial")]
    pub trial: usize,
    #[serde(rename = "Trial_index")]
    pub index: usize,
    pub state: JointState,
    pub action: JointAction,
    #[serde(rename = "rel_X", default, skip_serializing_if = "Option::is_none")]
    pub rel_x: Option<f64>,
    #[serde(rename = "rel_Y", default, skip_serializing_if = "Option::is_none")]
    pub rel_y: Option<f64>,
}

impl Sample {
    /// Offset of the first aircraft from the second.
    pub fn relative_offset(&self) -> (f64, f64) {
        (self.state[0] - self.state[3], self.state[1] - self.state[4])
    }

    /// Distances of both aircraft from the world center.
    pub fn radii(&self) -> (f64, f64) {
        (
            self.state[0].hypot(self.state[1]),
            self.state[3].hypot(self.state[4]),
        )
    }
}

/// Annulus used to select samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingRadii {
    pub inner: f64,
    pub outer: f64,
}

impl Default for RingRadii {
    fn default() -> Self {
        Self {
            inner: 120.0,
            outer: 200.0,
        }
    }
}

impl RingRadii {
    /// # Errors
    ///
    /// Negative or non-finite radii, or `inner > outer`.
    pub fn new(inner: f64, outer: f64) -> Result<Self> {
        if !(inner.is_finite() && outer.is_finite() && inner >= 0.0 && inner <= outer) {
            return Err(AnalyticsError::InvalidParameter(format!(
                "ring radii must satisfy 0 <= inner <= outer, got {inner}..{outer}"
            )));
        }
        Ok(Self { inner, outer })
    }

    pub fn contains(&self, radius: f64) -> bool {
        (self.inner..=self.outer).contains(&radius)
    }
}

/// Which distance the ring is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingMode {
    /// Both aircraft must lie in the ring
    Absolute,
    /// The offset between the aircraft must lie in the ring
    Relative,
}

/// All samples of every archived trial.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collation {
    samples: Vec<Sample>,
}

impl Collation {
    pub const fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Load every trial under `trials_root`, names in sorted order and each
    /// name's trials numbered from 1.
    ///
    /// # Errors
    ///
    /// `NoData` if there are no trials, otherwise IO or JSON failures.
    pub fn load(trials_root: &Path) -> Result<Self> {
        let mut names = Vec::new();
        let entries = fs::read_dir(trials_root).map_err(|e| AnalyticsError::io(trials_root, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| AnalyticsError::io(trials_root, e))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        let mut samples = Vec::new();
        for name in &names {
            let count = fs::read_dir(trials_root.join(name))
                .map_err(|e| AnalyticsError::io(trials_root.join(name), e))?
                .count();
            for trial in 1..=count {
                let dir = trial_dir(trials_root, name, trial);
                let states: Vec<JointState> = read_json(&dir.join(STATES_FILE))?;
                let actions: Vec<JointAction> = read_json(&dir.join(ACTIONS_FILE))?;
                samples.extend(states.into_iter().zip(actions).enumerate().map(
                    |(index, (state, action))| Sample {
                        name: name.clone(),
                        trial,
                        index,
                        state,
                        action,
                        rel_x: None,
                        rel_y: None,
                    },
                ));
            }
            tracing::info!(name = %name, trials = count, "Loaded trials");
        }

        if samples.is_empty() {
            return Err(AnalyticsError::NoData(trials_root.to_path_buf()));
        }
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Fill in `rel_X`/`rel_Y` on every sample.
    #[must_use]
    pub fn with_relative(mut self) -> Self {
        for sample in &mut self.samples {
            let (dx, dy) = sample.relative_offset();
            sample.rel_x = Some(dx);
            sample.rel_y = Some(dy);
        }
        self
    }

    /// Samples whose radius lies within `radii`, bounds included.
    pub fn ring(&self, radii: RingRadii, mode: RingMode) -> Self {
        let samples = self
            .samples
            .iter()
            .filter(|s| match mode {
                RingMode::Absolute => {
                    let (r1, r2) = s.radii();
                    radii.contains(r1) && radii.contains(r2)
                }
                RingMode::Relative => {
                    let (dx, dy) = s.relative_offset();
                    radii.contains(dx.hypot(dy))
                }
            })
            .cloned()
            .collect();
        Self { samples }
    }

    /// Write `<prefix>-states.json`, `<prefix>-actions.json` and the tagged
    /// `<prefix>-samples.json` into `dir`.
    ///
    /// # Errors
    ///
    /// Filesystem or serialization failure.
    pub fn write(&self, dir: &Path, prefix: &str) -> Result<()> {
        let states: Vec<JointState> = self.samples.iter().map(|s| s.state).collect();
        let actions: Vec<JointAction> = self.samples.iter().map(|s| s.action).collect();

        write_json(&dir.join(format!("{prefix}-states.json")), &states)?;
        write_json(&dir.join(format!("{prefix}-actions.json")), &actions)?;
        write_json(&dir.join(format!("{prefix}-samples.json")), &self.samples)?;

        tracing::info!(prefix, samples = self.samples.len(), dir = %dir.display(), "Collated data written");
        Ok(())
    }
}
