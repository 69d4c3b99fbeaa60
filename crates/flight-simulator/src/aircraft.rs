//! Kinematic aircraft: state, controller and trajectory log.

use flight_domain::{Action, AircraftState, EntityId, Pose, Position, SimulationConfig};

use crate::controller::{Controller, DecisionContext};
use crate::error::{Result, SimError};
use crate::history::History;
use crate::render::Renderer;

/// First-order Euler step: move along the current heading, then turn.
#[must_use]
pub fn euler_step(pose: Pose, action: Action) -> Pose {
    Pose {
        position: Position::new(
            pose.position.x + action.speed * pose.heading.cos(),
            pose.position.y + action.speed * pose.heading.sin(),
        ),
        heading: pose.heading + action.angular_speed,
    }
}

/// Simulated aircraft.
#[derive(Debug, Clone)]
pub struct Aircraft {
    id: EntityId,
    state: AircraftState,
    goal: Position,
    controller: Controller,
    history: History,
}

impl Aircraft {
    /// Create an aircraft at `launch` with the configured initial speeds.
    pub fn new(
        id: impl Into<EntityId>,
        launch: Pose,
        goal: Position,
        controller: Controller,
        config: &SimulationConfig,
    ) -> Self {
        Self {
            id: id.into(),
            state: AircraftState::launch(launch, config),
            goal,
            controller,
            history: History::new(),
        }
    }

    pub const fn id(&self) -> &EntityId {
        &self.id
    }

    pub const fn state(&self) -> &AircraftState {
        &self.state
    }

    pub const fn position(&self) -> Position {
        self.state.position
    }

    pub const fn speed(&self) -> f64 {
        self.state.speed
    }

    pub const fn angular_speed(&self) -> f64 {
        self.state.angular_speed
    }

    pub const fn goal(&self) -> Position {
        self.goal
    }

    pub const fn controller(&self) -> &Controller {
        &self.controller
    }

    pub const fn history(&self) -> &History {
        &self.history
    }

    pub fn last_action(&self) -> Option<Action> {
        self.history.last().map(|r| r.action)
    }

    /// Whether the aircraft sits in the goal square of half-width `half_width`.
    pub fn reached_goal(&self, half_width: f64) -> bool {
        self.state.position.within_square(&self.goal, half_width)
    }

    /// Advance one tick: draw, snapshot, decide, integrate, record.
    ///
    /// # Errors
    ///
    /// `TickOrder` when `tick` does not continue the history, or the
    /// controller's error. Nothing is mutated in either case.
    pub fn tick(
        &mut self,
        tick: u64,
        ctx: &DecisionContext<'_>,
        renderer: &mut dyn Renderer,
    ) -> Result<Action> {
        let expected = self.history.next_tick();
        if tick != expected {
            return Err(SimError::TickOrder {
                entity: self.id.to_string(),
                expected,
                got: tick,
            });
        }

        renderer.draw_aircraft(self.id.as_str(), &self.state);

        let snapshot = self.state.pose();
        let action = self.controller.decide(self.state.motion(), ctx)?;
        self.state.speed = action.speed;
        self.state.angular_speed = action.angular_speed;

        let next = euler_step(snapshot, action);
        self.state.position = next.position;
        self.state.heading = next.heading;

        self.history.record(snapshot, action);

        tracing::trace!(
            entity = %self.id,
            tick,
            x = next.position.x,
            y = next.position.y,
            speed = action.speed,
            "aircraft advanced"
        );
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::MotionBoard;
    use crate::input::KeyboardState;
    use crate::render::TraceRenderer;
    use flight_domain::KeyBindings;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_euler_step() {
        let next = euler_step(Pose::new(10.0, 20.0, 0.0), Action::new(2.0, 0.05));
        assert_eq!(next.position, Position::new(12.0, 20.0));
        assert_eq!(next.heading, 0.05);

        let next = euler_step(Pose::new(0.0, 0.0, FRAC_PI_2), Action::new(3.0, 0.0));
        assert!(next.position.x.abs() < 1e-12);
        assert!((next.position.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tick_records_pre_action_state() {
        let config = SimulationConfig::default();
        let mut aircraft = Aircraft::new(
            "airplane1",
            Pose::new(100.0, 50.0, 0.0),
            Position::new(800.0, 50.0),
            Controller::Manual(KeyBindings::arrows()),
            &config,
        );
        let input = KeyboardState::new();
        let motions = MotionBoard::default();
        let ctx = DecisionContext {
            config: &config,
            input: &input,
            motions: &motions,
        };
        let mut renderer = TraceRenderer::default();

        aircraft.tick(0, &ctx, &mut renderer).unwrap();
        aircraft.tick(1, &ctx, &mut renderer).unwrap();

        let records = aircraft.history().records();
        assert_eq!(records[0].state, Pose::new(100.0, 50.0, 0.0));
        assert_eq!(records[1].state, Pose::new(102.0, 50.0, 0.0));
        assert_eq!(records[1].action, Action::new(2.0, 0.0));
        assert_eq!(aircraft.position(), Position::new(104.0, 50.0));
    }

    #[test]
    fn test_tick_out_of_order_is_rejected() {
        let config = SimulationConfig::default();
        let mut aircraft = Aircraft::new(
            "airplane1",
            Pose::default(),
            Position::default(),
            Controller::Manual(KeyBindings::arrows()),
            &config,
        );
        let input = KeyboardState::new();
        let motions = MotionBoard::default();
        let ctx = DecisionContext {
            config: &config,
            input: &input,
            motions: &motions,
        };

        let err = aircraft.tick(3, &ctx, &mut TraceRenderer::default()).unwrap_err();
        assert!(matches!(err, SimError::TickOrder { expected: 0, got: 3, .. }));
        assert!(aircraft.history().is_empty());
    }
}
