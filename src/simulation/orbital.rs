//! The orbiting-body capability and its two variants
//!
//! [`Orbital`] is what the two-phase step and the predictor integrate. It is
//! implemented by:
//! - [`Body`], a self-contained point mass used for snapshots,
//! - [`HostedBody`], a body whose canonical state belongs to an external
//!   entity ([`EntityHost`]). The kernel only reads the entity to seed itself
//!   and proposes every new position back to it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::simulation::error::SimError;
use crate::simulation::params::SimulationConstants;
use crate::simulation::states::{Body, BodyId, NVec3, Peer};

/// Anything the step can advance
pub trait Orbital {
    fn position(&self) -> NVec3;
    fn velocity(&self) -> NVec3;
    fn mass(&self) -> f64;

    /// Constants this body integrates with, `None` when it is not simulated
    fn constants(&self) -> Option<&SimulationConstants>;

    /// Net acceleration from `peers`, skipping the entry whose id is `own`
    fn compute_acceleration(&self, own: BodyId, peers: &[Peer]) -> Result<NVec3, SimError>;

    /// v += a * dt, returns the new velocity
    fn apply_acceleration(&mut self, acc: NVec3) -> NVec3;

    /// x += v * dt, returns the new position
    fn update_location(&mut self) -> NVec3;

    fn update_velocity(&mut self, own: BodyId, peers: &[Peer]) -> Result<NVec3, SimError> {
        let acc = self.compute_acceleration(own, peers)?;
        Ok(self.apply_acceleration(acc))
    }

    fn as_peer(&self, id: BodyId) -> Peer {
        Peer {
            id,
            position: self.position(),
            mass: self.mass(),
        }
    }

    /// Independent copy of the current state integrating with `constants`
    fn snapshot(&self, constants: SimulationConstants) -> Result<Body, SimError> {
        Body::new(constants, self.position(), self.velocity(), self.mass())
    }
}

impl Orbital for Body {
    fn position(&self) -> NVec3 {
        Body::position(self)
    }

    fn velocity(&self) -> NVec3 {
        Body::velocity(self)
    }

    fn mass(&self) -> f64 {
        Body::mass(self)
    }

    fn constants(&self) -> Option<&SimulationConstants> {
        Some(Body::constants(self))
    }

    fn compute_acceleration(&self, own: BodyId, peers: &[Peer]) -> Result<NVec3, SimError> {
        Body::compute_acceleration(self, own, peers)
    }

    fn apply_acceleration(&mut self, acc: NVec3) -> NVec3 {
        Body::apply_acceleration(self, acc)
    }

    fn update_location(&mut self) -> NVec3 {
        Body::update_location(self)
    }

    fn snapshot(&self, constants: SimulationConstants) -> Result<Body, SimError> {
        Ok(self.with_constants(constants))
    }
}

impl<O: Orbital + ?Sized> Orbital for Box<O> {
    fn position(&self) -> NVec3 {
        (**self).position()
    }

    fn velocity(&self) -> NVec3 {
        (**self).velocity()
    }

    fn mass(&self) -> f64 {
        (**self).mass()
    }

    fn constants(&self) -> Option<&SimulationConstants> {
        (**self).constants()
    }

    fn compute_acceleration(&self, own: BodyId, peers: &[Peer]) -> Result<NVec3, SimError> {
        (**self).compute_acceleration(own, peers)
    }

    fn apply_acceleration(&mut self, acc: NVec3) -> NVec3 {
        (**self).apply_acceleration(acc)
    }

    fn update_location(&mut self) -> NVec3 {
        (**self).update_location()
    }

    fn update_velocity(&mut self, own: BodyId, peers: &[Peer]) -> Result<NVec3, SimError> {
        (**self).update_velocity(own, peers)
    }

    fn snapshot(&self, constants: SimulationConstants) -> Result<Body, SimError> {
        (**self).snapshot(constants)
    }
}

/// Read access to an externally owned entity plus a write-back hook
pub trait EntityHost {
    fn position(&self) -> NVec3;
    fn velocity(&self) -> NVec3;
    fn mass(&self) -> f64;

    /// Called with every position the kernel computes for this entity
    fn propose_position(&mut self, position: NVec3);
}

/// Minimal entity: plain state that accepts every proposed position
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    pub position: NVec3,
    pub velocity: NVec3,
    pub mass: f64,
}

impl EntityHost for EntityState {
    fn position(&self) -> NVec3 {
        self.position
    }

    fn velocity(&self) -> NVec3 {
        self.velocity
    }

    fn mass(&self) -> f64 {
        self.mass
    }

    fn propose_position(&mut self, position: NVec3) {
        self.position = position;
    }
}

// Shared handle: the owner keeps its entity and sees the write-backs
impl<H: EntityHost> EntityHost for Rc<RefCell<H>> {
    fn position(&self) -> NVec3 {
        self.borrow().position()
    }

    fn velocity(&self) -> NVec3 {
        self.borrow().velocity()
    }

    fn mass(&self) -> f64 {
        self.borrow().mass()
    }

    fn propose_position(&mut self, position: NVec3) {
        self.borrow_mut().propose_position(position);
    }
}

/// A body backed by an external entity.
///
/// The kernel is seeded from the host when attached. A detached body has no
/// kernel: it reports the host's state and never moves.
#[derive(Debug, Clone)]
pub struct HostedBody<H> {
    host: H,
    kernel: Option<Body>,
}

impl<H: EntityHost> HostedBody<H> {
    /// Seed a kernel from the host's current state
    pub fn attach(host: H, constants: SimulationConstants) -> Result<Self, SimError> {
        let kernel = Body::new(constants, host.position(), host.velocity(), host.mass())?;
        Ok(Self {
            host,
            kernel: Some(kernel),
        })
    }

    pub fn detached(host: H) -> Self {
        Self { host, kernel: None }
    }

    pub fn is_attached(&self) -> bool {
        self.kernel.is_some()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

impl<H: EntityHost> Orbital for HostedBody<H> {
    // the entity owns the canonical transform
    fn position(&self) -> NVec3 {
        self.host.position()
    }

    fn velocity(&self) -> NVec3 {
        match &self.kernel {
            Some(kernel) => kernel.velocity(),
            None => self.host.velocity(),
        }
    }

    fn mass(&self) -> f64 {
        match &self.kernel {
            Some(kernel) => kernel.mass(),
            None => self.host.mass(),
        }
    }

    fn constants(&self) -> Option<&SimulationConstants> {
        self.kernel.as_ref().map(Body::constants)
    }

    fn compute_acceleration(&self, own: BodyId, peers: &[Peer]) -> Result<NVec3, SimError> {
        match &self.kernel {
            Some(kernel) => kernel.compute_acceleration(own, peers),
            None => Ok(NVec3::zeros()),
        }
    }

    fn apply_acceleration(&mut self, acc: NVec3) -> NVec3 {
        match &mut self.kernel {
            Some(kernel) => kernel.apply_acceleration(acc),
            None => self.host.velocity(),
        }
    }

    fn update_location(&mut self) -> NVec3 {
        match &mut self.kernel {
            Some(kernel) => {
                let position = kernel.update_location();
                self.host.propose_position(position);
                position
            }
            None => self.host.position(),
        }
    }
}
