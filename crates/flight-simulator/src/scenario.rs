//! Scenario files: which aircraft fly, and who follows whom.

use flight_domain::{DomainError, EntityId, KeyBindings, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::aircraft::Aircraft;
use crate::controller::ControllerSpec;
use crate::error::Result;
use crate::fleet::Fleet;
use crate::launch::LaunchPoints;

/// Entity id of the manually flown aircraft in the stock scenario.
pub const LEADER_ID: &str = "airplane1";
/// Entity id of the mirroring aircraft in the stock scenario.
pub const FOLLOWER_ID: &str = "airplane2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AircraftSpec {
    pub id: EntityId,
    pub controller: ControllerSpec,
}

/// Two aircraft, in launch order.
///
/// ```json
/// {
///   "aircraft": [
///     {"id": "airplane1", "controller": {"mode": "manual"}},
///     {"id": "airplane2", "controller": {"mode": "follow", "leader": "airplane1"}}
///   ],
///   "goal_watch": "airplane2"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub aircraft: Vec<AircraftSpec>,
    /// Aircraft whose arrival ends the run. Defaults to the second one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_watch: Option<EntityId>,
}

impl Default for ScenarioSpec {
    fn default() -> Self {
        Self::pair()
    }
}

impl ScenarioSpec {
    /// Arrow-key leader with a follower mirroring it.
    pub fn pair() -> Self {
        Self {
            aircraft: vec![
                AircraftSpec {
                    id: LEADER_ID.into(),
                    controller: ControllerSpec::manual(KeyBindings::arrows()),
                },
                AircraftSpec {
                    id: FOLLOWER_ID.into(),
                    controller: ControllerSpec::follow(LEADER_ID),
                },
            ],
            goal_watch: None,
        }
    }

    /// Parse a scenario document.
    ///
    /// # Errors
    ///
    /// Malformed JSON or unknown key names.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Aircraft that ends the run by reaching its goal.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on an empty scenario.
    pub fn goal_watch(&self) -> std::result::Result<EntityId, DomainError> {
        self.goal_watch
            .clone()
            .or_else(|| self.aircraft.last().map(|a| a.id.clone()))
            .ok_or_else(|| DomainError::InvalidConfig("scenario has no aircraft".to_string()))
    }

    /// Place both aircraft on `launch`, each aiming at the other's start.
    ///
    /// # Errors
    ///
    /// Anything other than exactly two aircraft, an invalid controller, or a
    /// leadership graph the fleet rejects.
    pub fn build_fleet(
        &self,
        config: Arc<SimulationConfig>,
        launch: &LaunchPoints,
    ) -> std::result::Result<Fleet, DomainError> {
        let [first, second] = self.aircraft.as_slice() else {
            return Err(DomainError::InvalidConfig(format!(
                "scenario needs exactly two aircraft, got {}",
                self.aircraft.len()
            )));
        };

        let aircraft = vec![
            Aircraft::new(
                first.id.clone(),
                launch.first,
                launch.first_goal(),
                first.controller.build(&first.id)?,
                &config,
            ),
            Aircraft::new(
                second.id.clone(),
                launch.second,
                launch.second_goal(),
                second.controller.build(&second.id)?,
                &config,
            ),
        ];
        Fleet::new(config, aircraft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::{LaunchGenerator, LaunchLayout};
    use flight_domain::{ControlMode, Key};

    fn launch() -> LaunchPoints {
        LaunchGenerator::new(SimulationConfig::default().world_size, Some(3))
            .generate(LaunchLayout::Default)
    }

    #[test]
    fn test_pair_builds_leader_and_follower() {
        let scenario = ScenarioSpec::pair();
        let points = launch();
        let fleet = scenario
            .build_fleet(Arc::new(SimulationConfig::default()), &points)
            .unwrap();

        let leader = fleet.get(&LEADER_ID.into()).unwrap();
        let follower = fleet.get(&FOLLOWER_ID.into()).unwrap();
        assert_eq!(leader.controller().mode(), ControlMode::Manual);
        assert_eq!(follower.controller().leader(), Some(&EntityId::from(LEADER_ID)));
        assert_eq!(leader.goal(), points.second.position);
        assert_eq!(follower.goal(), points.first.position);
        assert_eq!(scenario.goal_watch().unwrap(), EntityId::from(FOLLOWER_ID));
    }

    #[test]
    fn test_parse_with_custom_keys() {
        let scenario = ScenarioSpec::from_json_str(
            r#"{
                "aircraft": [
                    {"id": "lead", "controller": {"mode": "manual", "keys": {
                        "accelerate": "d", "decelerate": "a",
                        "ang_accelerate": "s", "ang_decelerate": "w"}}},
                    {"id": "wing", "controller": {"mode": "follow", "leader": "lead"}}
                ],
                "goal_watch": "lead"
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.goal_watch().unwrap(), EntityId::from("lead"));
        let keys = scenario.aircraft[0].controller.keys.unwrap();
        assert_eq!(keys.accelerate, Key::Char('d'));
    }

    #[test]
    fn test_rejects_wrong_aircraft_count() {
        let mut scenario = ScenarioSpec::pair();
        scenario.aircraft.pop();
        let result = scenario.build_fleet(Arc::new(SimulationConfig::default()), &launch());
        assert!(matches!(result, Err(DomainError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_invalid_mode() {
        let mut scenario = ScenarioSpec::pair();
        scenario.aircraft[1].controller.mode = "autopilot".to_string();
        let result = scenario.build_fleet(Arc::new(SimulationConfig::default()), &launch());
        assert!(matches!(result, Err(DomainError::InvalidMode(_))));
    }
}
