//! # Flight Pair Simulator - Domain Model
//!
//! Value objects, configuration and wire formats shared by the simulator,
//! the persistence service and the analytics tools. These types are the
//! single source of truth for what an aircraft state, an action and an
//! exported trajectory look like.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Planar position in world coordinates (screen convention: y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether this point lies in the axis-aligned square of half-width
    /// `half_width` centred on `center`. Both edges count as inside.
    #[must_use]
    pub fn within_square(&self, center: &Self, half_width: f64) -> bool {
        self.x >= center.x - half_width
            && self.x <= center.x + half_width
            && self.y >= center.y - half_width
            && self.y <= center.y + half_width
    }
}

/// Position plus heading, used for launch points and pre-action snapshots
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Position,
    /// Heading in radians, unbounded
    pub heading: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            position: Position::new(x, y),
            heading,
        }
    }

    /// Wire form `[x, y, heading]`
    #[must_use]
    pub const fn as_array(&self) -> [f64; 3] {
        [self.position.x, self.position.y, self.heading]
    }
}

/// Speed pair applied to an aircraft for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    pub speed: f64,
    pub angular_speed: f64,
}

impl Action {
    pub const fn new(speed: f64, angular_speed: f64) -> Self {
        Self {
            speed,
            angular_speed,
        }
    }

    /// Wire form `[speed, angular_speed]`
    #[must_use]
    pub const fn as_array(&self) -> [f64; 2] {
        [self.speed, self.angular_speed]
    }
}

/// Full kinematic state of one aircraft
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AircraftState {
    pub position: Position,
    pub heading: f64,
    pub speed: f64,
    pub angular_speed: f64,
}

impl AircraftState {
    /// State at launch: the given pose with the configured initial speeds.
    #[must_use]
    pub const fn launch(pose: Pose, config: &SimulationConfig) -> Self {
        Self {
            position: pose.position,
            heading: pose.heading,
            speed: config.speed.init,
            angular_speed: config.angular_speed.init,
        }
    }

    #[must_use]
    pub const fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            heading: self.heading,
        }
    }

    /// Current speed pair
    #[must_use]
    pub const fn motion(&self) -> Action {
        Action::new(self.speed, self.angular_speed)
    }
}

/// Stable aircraft identifier. Also names the export channel of its trajectory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// CONTROLS
// =============================================================================

/// Manual control signals, in the order they are applied each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSignal {
    Accelerate,
    Decelerate,
    #[serde(rename = "ang_accelerate")]
    AngularAccelerate,
    #[serde(rename = "ang_decelerate")]
    AngularDecelerate,
}

impl ControlSignal {
    pub const ALL: [Self; 4] = [
        Self::Accelerate,
        Self::Decelerate,
        Self::AngularAccelerate,
        Self::AngularDecelerate,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accelerate => "accelerate",
            Self::Decelerate => "decelerate",
            Self::AngularAccelerate => "ang_accelerate",
            Self::AngularDecelerate => "ang_decelerate",
        }
    }
}

/// Keyboard key as seen by an input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Enter,
    Space,
    Char(char),
}

impl FromStr for Key {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "enter" | "return" => Ok(Self::Enter),
            "space" => Ok(Self::Space),
            _ => {
                let mut chars = lowered.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphanumeric() => Ok(Self::Char(c)),
                    _ => Err(DomainError::UnknownKey(s.to_string())),
                }
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
            Self::Enter => f.write_str("enter"),
            Self::Space => f.write_str("space"),
            Self::Char(c) => write!(f, "{c}"),
        }
    }
}

impl TryFrom<String> for Key {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

/// Key assignment for the four manual control signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub accelerate: Key,
    pub decelerate: Key,
    #[serde(rename = "ang_accelerate")]
    pub angular_accelerate: Key,
    #[serde(rename = "ang_decelerate")]
    pub angular_decelerate: Key,
}

impl KeyBindings {
    /// Arrow-key layout: right/left for speed, down/up for turn rate.
    pub const fn arrows() -> Self {
        Self {
            accelerate: Key::Right,
            decelerate: Key::Left,
            angular_accelerate: Key::Down,
            angular_decelerate: Key::Up,
        }
    }

    pub const fn key_for(&self, signal: ControlSignal) -> Key {
        match signal {
            ControlSignal::Accelerate => self.accelerate,
            ControlSignal::Decelerate => self.decelerate,
            ControlSignal::AngularAccelerate => self.angular_accelerate,
            ControlSignal::AngularDecelerate => self.angular_decelerate,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::arrows()
    }
}

/// Controller mode as written in scenario files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlMode {
    Manual,
    Follow,
}

impl ControlMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Follow => "follow",
        }
    }
}

impl FromStr for ControlMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "manual" => Ok(Self::Manual),
            "follow" => Ok(Self::Follow),
            other => Err(DomainError::InvalidMode(other.to_string())),
        }
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Bounds, step and initial value of one controlled quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub init: f64,
}

impl ControlRange {
    /// Clamp into `[min, max]`. Only meaningful on a validated range.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn validate(&self, name: &str) -> Result<()> {
        let finite = [self.min, self.max, self.step, self.init]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(DomainError::InvalidConfig(format!("{name}: values must be finite")));
        }
        if self.min > self.max {
            return Err(DomainError::InvalidConfig(format!(
                "{name}: min {} exceeds max {}",
                self.min, self.max
            )));
        }
        if self.step < 0.0 {
            return Err(DomainError::InvalidConfig(format!("{name}: negative step {}", self.step)));
        }
        if !self.contains(self.init) {
            return Err(DomainError::InvalidConfig(format!(
                "{name}: init {} outside [{}, {}]",
                self.init, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// World extent in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldSize {
    pub x: f64,
    pub y: f64,
}

impl WorldSize {
    #[must_use]
    pub const fn center(&self) -> Position {
        Position::new(self.x / 2.0, self.y / 2.0)
    }
}

/// Immutable simulation parameters.
///
/// Serialized with the key names the persistence and analytics side expect
/// (`ang_speed`, `freq`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub speed: ControlRange,
    #[serde(rename = "ang_speed")]
    pub angular_speed: ControlRange,
    pub center_radius: f64,
    /// Half-width of the square goal region
    pub launch_radius: f64,
    pub world_size: WorldSize,
    /// Ticks per second
    #[serde(rename = "freq")]
    pub tick_rate: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed: ControlRange {
                min: 0.5,
                max: 5.0,
                step: 0.2,
                init: 2.0,
            },
            angular_speed: ControlRange {
                min: -0.1,
                max: 0.1,
                step: 0.004,
                init: 0.0,
            },
            center_radius: 50.0,
            launch_radius: 20.0,
            world_size: WorldSize { x: 961.0, y: 721.0 },
            tick_rate: 30,
        }
    }
}

impl SimulationConfig {
    /// Check every bound, radius and rate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.speed.validate("speed")?;
        self.angular_speed.validate("ang_speed")?;

        if !(self.center_radius >= 0.0 && self.launch_radius >= 0.0) {
            return Err(DomainError::InvalidConfig(
                "radii must be non-negative".to_string(),
            ));
        }
        if !(self.world_size.x > 0.0 && self.world_size.y > 0.0) {
            return Err(DomainError::InvalidConfig(format!(
                "world size {}x{} must be positive",
                self.world_size.x, self.world_size.y
            )));
        }
        if self.tick_rate == 0 {
            return Err(DomainError::InvalidConfig("freq must be positive".to_string()));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or an invalid configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Wall-clock interval between ticks
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }
}

// =============================================================================
// WIRE FORMATS
// =============================================================================

/// Channel name carrying the configuration document
pub const CONFIG_CHANNEL: &str = "config";

/// One exported trajectory sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Tick index
    pub time: u64,
    pub data: TrajectoryData,
}

/// Pre-action state `[x, y, heading]` and the action applied at that tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryData {
    pub state: [f64; 3],
    pub action: [f64; 2],
}

/// Named payload handed from the exporter to a transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub channel: String,
    pub payload: serde_json::Value,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Input {0} is not a valid mode")]
    InvalidMode(String),

    #[error("Follow controller of {entity} has no leader assigned")]
    MissingLeader { entity: String },

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Duplicate entity id: {0}")]
    DuplicateEntity(String),

    #[error("Leadership cycle involving {0}")]
    LeadershipCycle(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_bounds_are_inclusive() {
        let goal = Position::new(100.0, 100.0);
        assert!(Position::new(80.0, 120.0).within_square(&goal, 20.0));
        assert!(!Position::new(79.9, 100.0).within_square(&goal, 20.0));
        assert!(!Position::new(100.0, 120.5).within_square(&goal, 20.0));
    }

    #[test]
    fn test_config_wire_names() {
        let value = serde_json::to_value(SimulationConfig::default()).unwrap();
        assert_eq!(value["ang_speed"]["step"], 0.004);
        assert_eq!(value["freq"], 30);
        assert_eq!(value["world_size"]["x"], 961.0);

        let back: SimulationConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, SimulationConfig::default());
    }

    #[test]
    fn test_config_validation() {
        assert!(SimulationConfig::default().validate().is_ok());

        let mut config = SimulationConfig::default();
        config.speed.init = 9.0;
        assert!(matches!(config.validate(), Err(DomainError::InvalidConfig(_))));

        let mut config = SimulationConfig::default();
        config.angular_speed.min = 1.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.tick_rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("Right".parse::<Key>().unwrap(), Key::Right);
        assert_eq!("W".parse::<Key>().unwrap(), Key::Char('w'));
        assert!("f13".parse::<Key>().is_err());

        let bindings: KeyBindings = serde_json::from_str(
            r#"{"accelerate":"w","decelerate":"s","ang_accelerate":"d","ang_decelerate":"a"}"#,
        )
        .unwrap();
        assert_eq!(bindings.key_for(ControlSignal::Decelerate), Key::Char('s'));
    }

    #[test]
    fn test_control_mode() {
        assert_eq!("follow".parse::<ControlMode>().unwrap(), ControlMode::Follow);
        let err = "autopilot".parse::<ControlMode>().unwrap_err();
        assert_eq!(err.to_string(), "Input autopilot is not a valid mode");
    }
}
