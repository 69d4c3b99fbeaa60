//! Controllers decide each aircraft's (speed, angular speed) for a tick.

use flight_domain::{
    Action, ControlMode, ControlSignal, DomainError, EntityId, KeyBindings, SimulationConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::input::InputSource;

/// Latest speed pair of every aircraft in the fleet.
///
/// Seeded at the start of a tick and updated as each aircraft moves, so a
/// follower scheduled after its leader reads the leader's value for the
/// same tick.
#[derive(Debug, Clone, Default)]
pub struct MotionBoard {
    motions: HashMap<EntityId, Action>,
}

impl MotionBoard {
    pub fn get(&self, id: &EntityId) -> Option<Action> {
        self.motions.get(id).copied()
    }

    pub fn publish(&mut self, id: &EntityId, action: Action) {
        self.motions.insert(id.clone(), action);
    }
}

impl<'a> FromIterator<(&'a EntityId, Action)> for MotionBoard {
    fn from_iter<I: IntoIterator<Item = (&'a EntityId, Action)>>(iter: I) -> Self {
        Self {
            motions: iter.into_iter().map(|(id, a)| (id.clone(), a)).collect(),
        }
    }
}

/// Read-only view handed to a controller.
pub struct DecisionContext<'a> {
    pub config: &'a SimulationConfig,
    pub input: &'a dyn InputSource,
    pub motions: &'a MotionBoard,
}

/// How an aircraft picks its next action. Fixed for the aircraft's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Controller {
    /// Keyboard-driven speed and turn-rate adjustments
    Manual(KeyBindings),
    /// Copy the leader's speed pair verbatim
    Follow { leader: EntityId },
}

impl Controller {
    pub const fn mode(&self) -> ControlMode {
        match self {
            Self::Manual(_) => ControlMode::Manual,
            Self::Follow { .. } => ControlMode::Follow,
        }
    }

    pub const fn leader(&self) -> Option<&EntityId> {
        match self {
            Self::Manual(_) => None,
            Self::Follow { leader } => Some(leader),
        }
    }

    /// Decide the action for this tick given the aircraft's `current` speeds.
    ///
    /// # Errors
    ///
    /// A follower whose leader is absent from the motion board yields
    /// `DomainError::UnknownEntity`. Fleet assembly rules this out.
    pub fn decide(&self, current: Action, ctx: &DecisionContext<'_>) -> Result<Action> {
        match self {
            Self::Manual(bindings) => Ok(manual_action(bindings, current, ctx)),
            Self::Follow { leader } => ctx
                .motions
                .get(leader)
                .ok_or_else(|| DomainError::UnknownEntity(leader.to_string()).into()),
        }
    }
}

/// Sum the steps of every held signal, then clamp once per quantity.
fn manual_action(bindings: &KeyBindings, current: Action, ctx: &DecisionContext<'_>) -> Action {
    let speed = &ctx.config.speed;
    let angular = &ctx.config.angular_speed;

    let mut speed_delta = 0.0;
    let mut angular_delta = 0.0;

    for signal in ControlSignal::ALL {
        if !ctx.input.is_down(bindings.key_for(signal)) {
            continue;
        }
        match signal {
            ControlSignal::Accelerate => speed_delta += speed.step,
            ControlSignal::Decelerate => speed_delta -= speed.step,
            ControlSignal::AngularAccelerate => angular_delta += angular.step,
            ControlSignal::AngularDecelerate => angular_delta -= angular.step,
        }
    }

    Action::new(
        speed.clamp(current.speed + speed_delta),
        angular.clamp(current.angular_speed + angular_delta),
    )
}

/// Controller as written in scenario files.
///
/// ```json
/// {"mode": "manual", "keys": {"accelerate": "right", ...}}
/// {"mode": "follow", "leader": "airplane1"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSpec {
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<KeyBindings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<EntityId>,
}

impl ControllerSpec {
    pub fn manual(keys: KeyBindings) -> Self {
        Self {
            mode: ControlMode::Manual.as_str().to_string(),
            keys: Some(keys),
            leader: None,
        }
    }

    pub fn follow(leader: impl Into<EntityId>) -> Self {
        Self {
            mode: ControlMode::Follow.as_str().to_string(),
            keys: None,
            leader: Some(leader.into()),
        }
    }

    /// Build the controller for aircraft `owner`.
    ///
    /// # Errors
    ///
    /// `InvalidMode` for a mode other than `manual`/`follow`, and
    /// `MissingLeader` for a follower without a leader.
    pub fn build(&self, owner: &EntityId) -> std::result::Result<Controller, DomainError> {
        match self.mode.parse::<ControlMode>()? {
            ControlMode::Manual => Ok(Controller::Manual(self.keys.unwrap_or_default())),
            ControlMode::Follow => self
                .leader
                .clone()
                .map(|leader| Controller::Follow { leader })
                .ok_or_else(|| DomainError::MissingLeader {
                    entity: owner.to_string(),
                }),
        }
    }
}
