//! Fleet registry and the two-phase tick.
//!
//! Aircraft are addressed by [`EntityId`]; followers hold only their
//! leader's id. Assembly computes an update schedule once: every manual
//! aircraft first (phase 1), then followers in leadership order (phase 2),
//! so a follower always reads a leader value already updated this tick.

use flight_domain::{DomainError, EntityId, SimulationConfig};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::aircraft::Aircraft;
use crate::controller::{Controller, DecisionContext, MotionBoard};
use crate::error::Result;
use crate::input::InputSource;
use crate::render::Renderer;

/// Aircraft registry with a fixed update schedule.
#[derive(Debug)]
pub struct Fleet {
    config: Arc<SimulationConfig>,
    aircraft: Vec<Aircraft>,
    index: HashMap<EntityId, usize>,
    schedule: Vec<usize>,
    /// Position in `schedule` where phase 2 starts
    phase_split: usize,
}

impl Fleet {
    /// Assemble a fleet, checking the leadership graph up front.
    ///
    /// # Errors
    ///
    /// Invalid configuration, duplicate ids, a leader that does not exist,
    /// or a follower chain that loops back on itself.
    pub fn new(
        config: Arc<SimulationConfig>,
        aircraft: Vec<Aircraft>,
    ) -> std::result::Result<Self, DomainError> {
        config.validate()?;

        let mut index = HashMap::with_capacity(aircraft.len());
        for (i, a) in aircraft.iter().enumerate() {
            if index.insert(a.id().clone(), i).is_some() {
                return Err(DomainError::DuplicateEntity(a.id().to_string()));
            }
        }

        for a in &aircraft {
            if let Some(leader) = a.controller().leader() {
                if leader == a.id() {
                    return Err(DomainError::LeadershipCycle(a.id().to_string()));
                }
                if !index.contains_key(leader) {
                    return Err(DomainError::UnknownEntity(leader.to_string()));
                }
            }
        }

        let (schedule, phase_split) = schedule(&aircraft)?;

        Ok(Self {
            config,
            aircraft,
            index,
            schedule,
            phase_split,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn get(&self, id: &EntityId) -> Option<&Aircraft> {
        self.index.get(id).map(|&i| &self.aircraft[i])
    }

    /// Aircraft in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Aircraft> {
        self.aircraft.iter()
    }

    /// Aircraft in update order.
    pub fn scheduled(&self) -> impl Iterator<Item = &Aircraft> {
        self.schedule.iter().map(|&i| &self.aircraft[i])
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    /// Advance every aircraft by one tick.
    ///
    /// # Errors
    ///
    /// Propagates the first aircraft error; aircraft updated before it keep
    /// their new state.
    pub fn step(
        &mut self,
        tick: u64,
        input: &dyn InputSource,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let mut motions: MotionBoard = self
            .aircraft
            .iter()
            .map(|a| (a.id(), a.state().motion()))
            .collect();

        let (leaders, followers) = self.schedule.split_at(self.phase_split);
        for phase in [leaders, followers] {
            run_phase(
                &mut self.aircraft,
                phase,
                &self.config,
                &mut motions,
                tick,
                input,
                renderer,
            )?;
        }
        Ok(())
    }
}

fn run_phase(
    aircraft: &mut [Aircraft],
    order: &[usize],
    config: &SimulationConfig,
    motions: &mut MotionBoard,
    tick: u64,
    input: &dyn InputSource,
    renderer: &mut dyn Renderer,
) -> Result<()> {
    for &i in order {
        let entity = &mut aircraft[i];
        let ctx = DecisionContext {
            config,
            input,
            motions,
        };
        let action = entity.tick(tick, &ctx, renderer)?;
        motions.publish(entity.id(), action);
    }
    Ok(())
}

/// Manual aircraft in insertion order, then followers whose leader is
/// already scheduled, repeated until none are left.
fn schedule(aircraft: &[Aircraft]) -> std::result::Result<(Vec<usize>, usize), DomainError> {
    let mut order: Vec<usize> = aircraft
        .iter()
        .enumerate()
        .filter(|(_, a)| matches!(a.controller(), Controller::Manual(_)))
        .map(|(i, _)| i)
        .collect();
    let phase_split = order.len();

    let mut placed: HashSet<&EntityId> = order.iter().map(|&i| aircraft[i].id()).collect();
    let mut pending: Vec<usize> = (0..aircraft.len())
        .filter(|i| !placed.contains(aircraft[*i].id()))
        .collect();

    while !pending.is_empty() {
        let (ready, waiting): (Vec<usize>, Vec<usize>) = pending.iter().copied().partition(|&i| {
            aircraft[i]
                .controller()
                .leader()
                .is_some_and(|leader| placed.contains(leader))
        });
        if ready.is_empty() {
            return Err(DomainError::LeadershipCycle(
                aircraft[waiting[0]].id().to_string(),
            ));
        }
        for &i in &ready {
            placed.insert(aircraft[i].id());
        }
        order.extend(ready);
        pending = waiting;
    }

    Ok((order, phase_split))
}
