//! The body registry that drives the live simulation
//!
//! A [`Universe`] owns its constants and the set of registered bodies, in
//! registration order. Bodies are handed to it explicitly and get back a
//! [`BodyId`]; nothing is discovered at runtime. Each call to
//! [`Universe::step`] advances every registered body by exactly one tick.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::simulation::error::SimError;
use crate::simulation::integrator::{two_phase_step, Slot};
use crate::simulation::orbital::{EntityHost, HostedBody, Orbital};
use crate::simulation::params::SimulationConstants;
use crate::simulation::predictor::{snapshot_of, Snapshot, Trajectories, TrajectoryPredictor};
use crate::simulation::preview::PreviewSettings;
use crate::simulation::states::{Body, BodyId, NVec3};

/// Result of one live tick
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub tick: u64, // tick number, starting at 1
    pub positions: Vec<(BodyId, NVec3)>, // new position per body, for write-back
}

pub struct Universe {
    constants: SimulationConstants,
    slots: Vec<Slot<Box<dyn Orbital>>>,
    next_id: u64,
    tick: u64,
}

impl fmt::Debug for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bodies: Vec<_> = self
            .slots
            .iter()
            .map(|s| (s.id, s.body.position(), s.body.velocity(), s.body.mass()))
            .collect();
        f.debug_struct("Universe")
            .field("constants", &self.constants)
            .field("tick", &self.tick)
            .field("bodies", &bodies)
            .finish()
    }
}

impl Universe {
    pub fn new(constants: SimulationConstants) -> Self {
        Self {
            constants,
            slots: Vec::new(),
            next_id: 0,
            tick: 0,
        }
    }

    pub fn constants(&self) -> &SimulationConstants {
        &self.constants
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Register a body. Every call hands out a new id, so the same body can
    /// never be simulated twice. Bodies without constants (detached) are
    /// refused and never take part in a step or a prediction.
    pub fn register<O: Orbital + 'static>(&mut self, body: O) -> Result<BodyId, SimError> {
        if body.constants().is_none() {
            warn!("refused detached body");
            return Err(SimError::Detached);
        }
        let id = BodyId(self.next_id);
        self.next_id += 1;
        let body: Box<dyn Orbital> = Box::new(body);
        self.slots.push(Slot { id, body });
        debug!(%id, bodies = self.slots.len(), "registered body");
        Ok(id)
    }

    /// Create and register a self-contained body using this universe's constants
    pub fn spawn(&mut self, position: NVec3, velocity: NVec3, mass: f64) -> Result<BodyId, SimError> {
        let body = Body::new(self.constants, position, velocity, mass)?;
        self.register(body)
    }

    /// Seed a body from an external entity and register it.
    /// Every position it computes is proposed back to `host`.
    pub fn attach<H: EntityHost + 'static>(&mut self, host: H) -> Result<BodyId, SimError> {
        let body = HostedBody::attach(host, self.constants)?;
        self.register(body)
    }

    /// Remove a body, handing it back. Absent ids are a no-op.
    pub fn unregister(&mut self, id: BodyId) -> Option<Box<dyn Orbital>> {
        let index = self.slots.iter().position(|s| s.id == id)?;
        let slot = self.slots.remove(index);
        debug!(%id, bodies = self.slots.len(), "unregistered body");
        Some(slot.body)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.slots.iter().any(|s| s.id == id)
    }

    pub fn get(&self, id: BodyId) -> Option<&dyn Orbital> {
        self.slots
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.body.as_ref())
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.slots.iter().map(|s| s.id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Advance every registered body by one tick.
    ///
    /// On error the tick is not counted and no body has moved.
    pub fn step(&mut self) -> Result<StepReport, SimError> {
        let positions = two_phase_step(&mut self.slots).map_err(|err| {
            warn!(tick = self.tick + 1, %err, "step aborted");
            err
        })?;
        self.tick += 1;
        trace!(tick = self.tick, bodies = positions.len(), "tick");

        Ok(StepReport {
            tick: self.tick,
            positions,
        })
    }

    /// Total linear momentum, sum of m * v
    pub fn total_momentum(&self) -> NVec3 {
        self.slots
            .iter()
            .fold(NVec3::zeros(), |p, s| p + s.body.velocity() * s.body.mass())
    }

    /// Mass-weighted mean position, `None` for an empty universe
    pub fn center_of_mass(&self) -> Option<NVec3> {
        let mass: f64 = self.slots.iter().map(|s| s.body.mass()).sum();
        if self.slots.is_empty() || mass <= 0.0 {
            return None;
        }
        let weighted = self
            .slots
            .iter()
            .fold(NVec3::zeros(), |c, s| c + s.body.position() * s.body.mass());
        Some(weighted / mass)
    }

    /// Independent copy of every body, integrating with `constants`
    pub fn snapshot(&self, constants: SimulationConstants) -> Result<Snapshot, SimError> {
        snapshot_of(self.slots.iter().map(|s| (s.id, s.body.as_ref())), constants)
    }

    /// Predict trajectories from the current state without touching it
    pub fn predict(&self, settings: &PreviewSettings) -> Result<Trajectories, SimError> {
        let constants = settings.constants(&self.constants)?;
        let snapshot = self.snapshot(constants)?;
        TrajectoryPredictor::new(settings.steps)
            .relative_to(settings.reference)
            .predict(snapshot)
    }
}
