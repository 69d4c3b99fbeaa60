//! Rendering collaborator.
//!
//! The simulation only hands out what to draw; how it is drawn is up to
//! the implementation. The shipped renderer emits trace events so headless
//! runs can still be inspected with `RUST_LOG=flight_simulator=trace`.

use flight_domain::{AircraftState, Position, WorldSize};

/// Static scenery drawn at the start of every tick.
#[derive(Debug, Clone, Copy)]
pub struct WorldFrame<'a> {
    pub size: WorldSize,
    pub center_radius: f64,
    /// Half-width of the goal markers
    pub launch_radius: f64,
    pub goals: &'a [Position],
}

pub trait Renderer {
    fn draw_world(&mut self, frame: &WorldFrame<'_>);

    fn draw_aircraft(&mut self, label: &str, state: &AircraftState);
}

/// Renderer that logs every draw call at TRACE level.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    frames: u64,
}

impl TraceRenderer {
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for TraceRenderer {
    fn draw_world(&mut self, frame: &WorldFrame<'_>) {
        self.frames += 1;
        tracing::trace!(
            frame = self.frames,
            width = frame.size.x,
            height = frame.size.y,
            goals = frame.goals.len(),
            "draw world"
        );
    }

    fn draw_aircraft(&mut self, label: &str, state: &AircraftState) {
        tracing::trace!(
            label,
            x = state.position.x,
            y = state.position.y,
            heading = state.heading,
            "draw aircraft"
        );
    }
}
