//! Per-aircraft trajectory log.

use flight_domain::{Action, Pose, TrajectoryData, TrajectoryPoint};
use serde::{Deserialize, Serialize};

/// What happened to one aircraft at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub tick: u64,
    /// Position and heading before the action was applied
    pub state: Pose,
    pub action: Action,
}

impl HistoryRecord {
    /// Wire form of this record.
    pub const fn to_point(&self) -> TrajectoryPoint {
        TrajectoryPoint {
            time: self.tick,
            data: TrajectoryData {
                state: self.state.as_array(),
                action: self.action.as_array(),
            },
        }
    }
}

/// Append-only log. Indices run `0..len` without gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Tick index the next record must carry.
    pub fn next_tick(&self) -> u64 {
        self.records.len() as u64
    }

    pub(crate) fn record(&mut self, state: Pose, action: Action) {
        let tick = self.next_tick();
        self.records.push(HistoryRecord {
            tick,
            state,
            action,
        });
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&HistoryRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ordered wire form of the whole log.
    pub fn to_trajectory(&self) -> Vec<TrajectoryPoint> {
        self.records.iter().map(HistoryRecord::to_point).collect()
    }
}
