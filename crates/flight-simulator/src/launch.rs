//! Launch points for the two-aircraft scenario.

use flight_domain::{Pose, Position, WorldSize};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::SimError;

/// Distance of the default launch points from the left and right edges.
pub const EDGE_MARGIN: f64 = 100.0;

/// How launch points are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchLayout {
    /// Mirror-image points on the horizontal midline, facing each other
    Default,
    /// Random point in the left third, mirrored through the world center
    #[default]
    Random,
}

impl LaunchLayout {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Random => "rand",
        }
    }
}

impl FromStr for LaunchLayout {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "rand" | "random" => Ok(Self::Random),
            _ => Err(SimError::UnknownLayout(s.to_string())),
        }
    }
}

impl fmt::Display for LaunchLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Launch poses of both aircraft. Each aircraft's goal is the other's
/// launch position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchPoints {
    pub first: Pose,
    pub second: Pose,
}

impl LaunchPoints {
    pub const fn first_goal(&self) -> Position {
        self.second.position
    }

    pub const fn second_goal(&self) -> Position {
        self.first.position
    }
}

/// Produces launch points inside a world of the given size.
#[derive(Debug)]
pub struct LaunchGenerator {
    world: WorldSize,
    rng: StdRng,
}

impl LaunchGenerator {
    /// Seeded generators are reproducible; `None` seeds from the OS.
    pub fn new(world: WorldSize, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self { world, rng }
    }

    pub fn generate(&mut self, layout: LaunchLayout) -> LaunchPoints {
        let (w, h) = (self.world.x, self.world.y);
        match layout {
            LaunchLayout::Default => LaunchPoints {
                first: Pose::new(EDGE_MARGIN, h / 2.0, 0.0),
                second: Pose::new(w - EDGE_MARGIN, h / 2.0, PI),
            },
            LaunchLayout::Random => {
                let x = self.rng.gen_range(0.0..1.0) * w / 3.0;
                let y = self.rng.gen_range(0.0..1.0) * h;
                let heading = (h / 2.0 - y).atan2(w / 2.0 - x);
                LaunchPoints {
                    first: Pose::new(x, y, heading),
                    second: Pose::new(w - x, h - y, heading + PI),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: WorldSize = WorldSize { x: 961.0, y: 721.0 };

    #[test]
    fn test_default_layout() {
        let points = LaunchGenerator::new(WORLD, Some(1)).generate(LaunchLayout::Default);
        assert_eq!(points.first, Pose::new(100.0, 360.5, 0.0));
        assert_eq!(points.second, Pose::new(861.0, 360.5, PI));
        assert_eq!(points.first_goal(), points.second.position);
        assert_eq!(points.second_goal(), points.first.position);
    }

    #[test]
    fn test_random_layout_is_mirrored_and_aimed_at_center() {
        let mut generator = LaunchGenerator::new(WORLD, Some(42));
        for _ in 0..50 {
            let points = generator.generate(LaunchLayout::Random);
            let (a, b) = (points.first, points.second);

            assert!((0.0..WORLD.x / 3.0).contains(&a.position.x));
            assert!((0.0..WORLD.y).contains(&a.position.y));
            assert!((a.position.x + b.position.x - WORLD.x).abs() < 1e-9);
            assert!((a.position.y + b.position.y - WORLD.y).abs() < 1e-9);
            assert!((b.heading - a.heading - PI).abs() < 1e-12);

            let to_center = WORLD.center();
            let expected = (to_center.y - a.position.y).atan2(to_center.x - a.position.x);
            assert!((a.heading - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_same_seed_same_points() {
        let a = LaunchGenerator::new(WORLD, Some(7)).generate(LaunchLayout::Random);
        let b = LaunchGenerator::new(WORLD, Some(7)).generate(LaunchLayout::Random);
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_layout() {
        assert_eq!("rand".parse::<LaunchLayout>().unwrap(), LaunchLayout::Random);
        assert_eq!("Random".parse::<LaunchLayout>().unwrap(), LaunchLayout::Random);
        assert_eq!("default".parse::<LaunchLayout>().unwrap(), LaunchLayout::Default);
        assert!(matches!(
            "spiral".parse::<LaunchLayout>(),
            Err(SimError::UnknownLayout(s)) if s == "spiral"
        ));
    }
}
