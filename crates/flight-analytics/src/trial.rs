//! One simulation run: configuration plus both trajectories, joined per tick.

use flight_domain::{CONFIG_CHANNEL, SimulationConfig, TrajectoryPoint};
use std::path::Path;

use crate::error::{AnalyticsError, Result};
use crate::files::{read_json, write_json};
use crate::trajectory::Trajectory;

/// Names of the exported trajectory documents, in joint column order.
pub const TRAJECTORY_NAMES: [&str; 2] = ["airplane1", "airplane2"];

/// Joint state file written next to the exported documents.
pub const STATES_FILE: &str = "all_states.json";
/// Joint action file written next to the exported documents.
pub const ACTIONS_FILE: &str = "all_actions.json";

/// `[X_1, Y_1, Theta_1, X_2, Y_2, Theta_2]`
pub type JointState = [f64; 6];
/// `[V_1, W_1, V_2, W_2]`
pub type JointAction = [f64; 4];

/// Exported run with states remapped to the centered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRun {
    config: SimulationConfig,
    first: Trajectory,
    second: Trajectory,
}

impl TrialRun {
    /// Read `config.json`, `airplane1.json` and `airplane2.json` from
    /// `data_dir` and remap both trajectories' states.
    ///
    /// # Errors
    ///
    /// Missing or malformed documents, an invalid configuration, or
    /// trajectories of different length.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(format!("{CONFIG_CHANNEL}.json"));
        let config: SimulationConfig = read_json(&config_path)?;
        config.validate()?;

        let [first, second] = TRAJECTORY_NAMES.map(|name| {
            let points: Result<Vec<TrajectoryPoint>> =
                read_json(&data_dir.join(format!("{name}.json")));
            points.map(|p| {
                let mut trajectory = Trajectory::from_points(name, &p);
                trajectory.remap_states(&config.world_size);
                trajectory
            })
        });
        let (first, second) = (first?, second?);

        if first.len() != second.len() {
            return Err(AnalyticsError::LengthMismatch {
                first: first.name().to_string(),
                first_len: first.len(),
                second: second.name().to_string(),
                second_len: second.len(),
            });
        }

        tracing::debug!(dir = %data_dir.display(), samples = first.len(), "Trial loaded");
        Ok(Self {
            config,
            first,
            second,
        })
    }

    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub const fn first(&self) -> &Trajectory {
        &self.first
    }

    pub const fn second(&self) -> &Trajectory {
        &self.second
    }

    pub fn states(&self) -> Vec<JointState> {
        self.first
            .states()
            .iter()
            .zip(self.second.states())
            .map(|(a, b)| [a[0], a[1], a[2], b[0], b[1], b[2]])
            .collect()
    }

    pub fn actions(&self) -> Vec<JointAction> {
        self.first
            .actions()
            .iter()
            .zip(self.second.actions())
            .map(|(a, b)| [a[0], a[1], b[0], b[1]])
            .collect()
    }

    /// Write the joint state and action files into `dir`.
    ///
    /// # Errors
    ///
    /// Filesystem or serialization failure.
    pub fn write_joint(&self, dir: &Path) -> Result<()> {
        write_json(&dir.join(STATES_FILE), &self.states())?;
        write_json(&dir.join(ACTIONS_FILE), &self.actions())?;
        tracing::info!(dir = %dir.display(), samples = self.first.len(), "Joint trial files written");
        Ok(())
    }
}
