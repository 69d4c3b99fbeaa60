//! Single-aircraft trajectories and their remapping into learning ranges.

use flight_domain::{SimulationConfig, TrajectoryPoint, WorldSize};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Closed interval of one quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clip into this interval, then map linearly onto `target`.
    pub fn map_onto(&self, value: f64, target: &Self) -> f64 {
        let clipped = value.clamp(self.min, self.max);
        let span = self.max - self.min;
        if span == 0.0 {
            return target.min;
        }
        target.min + (clipped - self.min) * (target.max - target.min) / span
    }
}

/// Speed and angular speed intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionBounds {
    pub speed: Bounds,
    #[serde(rename = "ang_speed")]
    pub angular_speed: Bounds,
}

impl ActionBounds {
    /// Ranges the learning side expects.
    pub const fn learning() -> Self {
        Self {
            speed: Bounds::new(0.1, 1.0),
            angular_speed: Bounds::new(-1.0, 1.0),
        }
    }

    /// Ranges the simulator clamps to.
    pub const fn from_config(config: &SimulationConfig) -> Self {
        Self {
            speed: Bounds::new(config.speed.min, config.speed.max),
            angular_speed: Bounds::new(config.angular_speed.min, config.angular_speed.max),
        }
    }
}

impl Default for ActionBounds {
    fn default() -> Self {
        Self::learning()
    }
}

/// States `[x, y, θ]` and actions `[v, ω]` of one aircraft, tick ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    name: String,
    states: Vec<[f64; 3]>,
    actions: Vec<[f64; 2]>,
}

impl Trajectory {
    pub fn from_points(name: impl Into<String>, points: &[TrajectoryPoint]) -> Self {
        Self {
            name: name.into(),
            states: points.iter().map(|p| p.data.state).collect(),
            actions: points.iter().map(|p| p.data.action).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &[[f64; 3]] {
        &self.states
    }

    pub fn actions(&self) -> &[[f64; 2]] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Move the origin to the world center with y pointing up, and reduce
    /// headings into `[0, 2π)`.
    pub fn remap_states(&mut self, world: &WorldSize) {
        let (half_w, half_h) = (world.x / 2.0, world.y / 2.0);
        for [x, y, theta] in &mut self.states {
            *x -= half_w;
            *y = half_h - *y;
            *theta = theta.rem_euclid(TAU);
        }
    }

    /// Clip actions into `source` and rescale them onto `target`.
    pub fn remap_actions(&mut self, source: &ActionBounds, target: &ActionBounds) {
        for [v, w] in &mut self.actions {
            *v = source.speed.map_onto(*v, &target.speed);
            *w = source.angular_speed.map_onto(*w, &target.angular_speed);
        }
    }
}
