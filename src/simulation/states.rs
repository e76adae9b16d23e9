//! Core state types for the N-body simulation.
//!
//! - `BodyId` identifies a body inside a registry or snapshot
//! - `Peer` is the frozen view of a body other bodies integrate against
//! - `Body` is a self-contained point mass with its own constants
//!
//! A `Body` only changes through its own integration operations.

use std::fmt;

use nalgebra::Vector3;

use crate::simulation::error::SimError;
use crate::simulation::forces::NewtonianGravity;
use crate::simulation::params::SimulationConstants;

pub type NVec3 = Vector3<f64>;

/// Identity of a body. Two bodies with identical state are still distinct
/// as long as their ids differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub(crate) u64);

impl BodyId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pre-step position and mass of one body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peer {
    pub id: BodyId,
    pub position: NVec3,
    pub mass: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    position: NVec3, // position
    velocity: NVec3, // velocity
    mass: f64, // mass, always > 0
    constants: SimulationConstants,
}

impl Body {
    pub fn new(
        constants: SimulationConstants,
        position: NVec3,
        velocity: NVec3,
        mass: f64,
    ) -> Result<Self, SimError> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(SimError::InvalidMass(mass));
        }
        if !is_finite(&position) {
            return Err(SimError::NonFiniteInput("position"));
        }
        if !is_finite(&velocity) {
            return Err(SimError::NonFiniteInput("velocity"));
        }
        Ok(Self {
            position,
            velocity,
            mass,
            constants,
        })
    }

    /// Copy of this body integrating with other constants
    pub fn with_constants(&self, constants: SimulationConstants) -> Self {
        Self {
            constants,
            ..self.clone()
        }
    }

    pub fn position(&self) -> NVec3 {
        self.position
    }

    pub fn velocity(&self) -> NVec3 {
        self.velocity
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn constants(&self) -> &SimulationConstants {
        &self.constants
    }

    pub fn as_peer(&self, id: BodyId) -> Peer {
        Peer {
            id,
            position: self.position,
            mass: self.mass,
        }
    }

    /// Net gravitational acceleration on this body from every peer except `own`.
    ///
    /// Contributions from all other peers are summed, there is no early exit.
    /// Fails on a peer sitting exactly on this body or on a non-finite sum.
    pub fn compute_acceleration(&self, own: BodyId, peers: &[Peer]) -> Result<NVec3, SimError> {
        let gravity = NewtonianGravity::from_constants(&self.constants);
        let mut acc = NVec3::zeros();

        for peer in peers {
            if peer.id == own {
                continue; // no self-interaction
            }
            acc += gravity
                .acceleration(self.position, self.mass, peer.position, peer.mass)
                .ok_or(SimError::CoincidentBodies {
                    body: own,
                    other: peer.id,
                })?;
        }

        if !is_finite(&acc) {
            return Err(SimError::NonFiniteState(own));
        }
        Ok(acc)
    }

    /// Kick: v += a * dt, returns the new velocity
    pub fn apply_acceleration(&mut self, acc: NVec3) -> NVec3 {
        self.velocity += acc * self.constants.dt();
        self.velocity
    }

    /// v += a(peers) * dt
    ///
    /// `peers` must hold pre-step positions. Velocity is left untouched on error.
    pub fn update_velocity(&mut self, own: BodyId, peers: &[Peer]) -> Result<NVec3, SimError> {
        let acc = self.compute_acceleration(own, peers)?;
        Ok(self.apply_acceleration(acc))
    }

    /// Drift: x += v * dt, returns the new position
    pub fn update_location(&mut self) -> NVec3 {
        self.position += self.velocity * self.constants.dt();
        self.position
    }
}

pub(crate) fn is_finite(v: &NVec3) -> bool {
    v.iter().all(|c| c.is_finite())
}
