//! Input collaborators: which keys are held down at a tick boundary.

use flight_domain::Key;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, SimError};

/// Polled once per control signal per tick. No event queueing.
pub trait InputSource {
    fn is_down(&self, key: Key) -> bool;
}

/// Set of keys currently held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    pressed: HashSet<Key>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            pressed: keys.into_iter().collect(),
        }
    }

    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}

impl InputSource for KeyboardState {
    fn is_down(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

/// Keys held for the tick range `from..to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSegment {
    pub from: u64,
    pub to: u64,
    pub keys: Vec<Key>,
}

/// Scripted key presses for headless runs.
///
/// JSON form: `[{"from": 0, "to": 20, "keys": ["right"]}, ...]`. Segments
/// may overlap; the held set at a tick is the union of every covering
/// segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputScript {
    segments: Vec<ScriptSegment>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `keys` for ticks `from..to`.
    #[must_use]
    pub fn hold(mut self, from: u64, to: u64, keys: impl IntoIterator<Item = Key>) -> Self {
        self.segments.push(ScriptSegment {
            from,
            to,
            keys: keys.into_iter().collect(),
        });
        self
    }

    /// Parse a script document.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, unknown key names or an inverted range.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let script: Self = serde_json::from_str(json)?;
        if let Some(bad) = script.segments.iter().find(|s| s.from > s.to) {
            return Err(SimError::Script(format!(
                "segment {}..{} ends before it starts",
                bad.from, bad.to
            )));
        }
        Ok(script)
    }

    /// Keys held at `tick`.
    pub fn frame(&self, tick: u64) -> KeyboardState {
        KeyboardState::with_keys(
            self.segments
                .iter()
                .filter(|s| (s.from..s.to).contains(&tick))
                .flat_map(|s| s.keys.iter().copied()),
        )
    }

    /// First tick after which the script holds nothing.
    pub fn end(&self) -> u64 {
        self.segments.iter().map(|s| s.to).max().unwrap_or(0)
    }
}
