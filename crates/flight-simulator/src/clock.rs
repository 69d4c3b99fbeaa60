//! Simulation clock: tick driver, termination and the one-shot export.

use flight_domain::{DomainError, EntityId, Key, Position};

use crate::error::{Result, SimError};
use crate::export::{ExportError, Exporter};
use crate::fleet::Fleet;
use crate::history::History;
use crate::input::InputSource;
use crate::render::{Renderer, WorldFrame};

/// Why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The watched aircraft entered its goal square
    GoalReached,
    /// The stop key was held at a tick boundary
    ManualStop,
}

impl TerminationReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GoalReached => "goal_reached",
            Self::ManualStop => "manual_stop",
        }
    }
}

/// Clock lifecycle. `Halted` and `Faulted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Running { next_tick: u64 },
    Halted { reason: TerminationReason, ticks: u64 },
    /// A fleet update failed during `tick`; aircraft may be partly advanced
    Faulted { tick: u64 },
}

/// Result of the tick that ended the run.
#[derive(Debug)]
pub struct Termination {
    pub reason: TerminationReason,
    /// Ticks executed, including the final one
    pub ticks: u64,
    /// Export outcome. A failed export does not undo the halt.
    pub export: std::result::Result<(), ExportError>,
}

/// Outcome of one [`SimulationClock::step`].
#[derive(Debug)]
pub enum TickOutcome {
    Continue,
    Halted(Termination),
}

/// Fixed-step driver over a fleet.
pub struct SimulationClock {
    fleet: Fleet,
    exporter: Exporter,
    goal_watch: EntityId,
    goals: Vec<Position>,
    stop_key: Key,
    state: ClockState,
}

impl SimulationClock {
    /// Stop key used unless overridden
    pub const DEFAULT_STOP_KEY: Key = Key::Enter;

    /// Build a clock that ends when `goal_watch` reaches its goal.
    ///
    /// # Errors
    ///
    /// `UnknownEntity` if `goal_watch` is not in the fleet.
    pub fn new(
        fleet: Fleet,
        exporter: Exporter,
        goal_watch: EntityId,
    ) -> std::result::Result<Self, DomainError> {
        if fleet.get(&goal_watch).is_none() {
            return Err(DomainError::UnknownEntity(goal_watch.to_string()));
        }
        let goals = fleet.iter().map(crate::aircraft::Aircraft::goal).collect();

        Ok(Self {
            fleet,
            exporter,
            goal_watch,
            goals,
            stop_key: Self::DEFAULT_STOP_KEY,
            state: ClockState::Running { next_tick: 0 },
        })
    }

    pub const fn stop_key(&self) -> Key {
        self.stop_key
    }

    pub const fn is_halted(&self) -> bool {
        matches!(self.state, ClockState::Halted { .. })
    }

    /// Ticks executed so far.
    pub const fn ticks_run(&self) -> u64 {
        match self.state {
            ClockState::Running { next_tick } => next_tick,
            ClockState::Halted { ticks, .. } => ticks,
            ClockState::Faulted { tick } => tick,
        }
    }

    pub const fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Whether the watched aircraft is inside its goal square.
    pub fn goal_reached(&self) -> bool {
        let half_width = self.fleet.config().launch_radius;
        self.fleet
            .get(&self.goal_watch)
            .is_some_and(|a| a.reached_goal(half_width))
    }

    /// Run one tick: draw the world, advance the fleet, check termination.
    ///
    /// On termination the export runs exactly once and the clock halts for
    /// good.
    ///
    /// # Errors
    ///
    /// `SimError::Halted` once the clock has halted or faulted. A fleet error
    /// is returned once and faults the clock, since the aircraft updated
    /// before it have already moved on.
    pub fn step(
        &mut self,
        input: &dyn InputSource,
        renderer: &mut dyn Renderer,
    ) -> Result<TickOutcome> {
        let ClockState::Running { next_tick: tick } = self.state else {
            return Err(SimError::Halted);
        };

        let config = self.fleet.config();
        renderer.draw_world(&WorldFrame {
            size: config.world_size,
            center_radius: config.center_radius,
            launch_radius: config.launch_radius,
            goals: &self.goals,
        });

        if let Err(e) = self.fleet.step(tick, input, renderer) {
            tracing::error!(tick, error = %e, "Fleet update failed");
            self.state = ClockState::Faulted { tick };
            return Err(e);
        }

        let reason = if input.is_down(self.stop_key) {
            Some(TerminationReason::ManualStop)
        } else if self.goal_reached() {
            Some(TerminationReason::GoalReached)
        } else {
            None
        };

        match reason {
            None => {
                tracing::debug!(tick, "Tick complete");
                self.state = ClockState::Running {
                    next_tick: tick + 1,
                };
                Ok(TickOutcome::Continue)
            }
            Some(reason) => Ok(TickOutcome::Halted(self.halt(reason, tick + 1))),
        }
    }

    fn halt(&mut self, reason: TerminationReason, ticks: u64) -> Termination {
        self.state = ClockState::Halted { reason, ticks };

        let trajectories: Vec<(&EntityId, &History)> =
            self.fleet.iter().map(|a| (a.id(), a.history())).collect();
        let export = self.exporter.export(&trajectories, self.fleet.config());

        match &export {
            Ok(()) => tracing::info!(reason = reason.as_str(), ticks, "Simulation halted"),
            Err(e) => tracing::warn!(
                reason = reason.as_str(),
                ticks,
                error = %e,
                "Simulation halted with incomplete export"
            ),
        }

        Termination {
            reason,
            ticks,
            export,
        }
    }
}
