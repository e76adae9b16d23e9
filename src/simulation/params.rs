//! Physical and numerical constants for one simulated universe
//!
//! `SimulationConstants` holds:
//! - the gravitational constant `G`,
//! - the integration timestep `dt`,
//! - an optional minimum separation used to clamp close encounters
//!
//! Several instances may coexist: the live universe and a preview run share
//! `G` but usually integrate with different timesteps.

use crate::simulation::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConstants {
    g: f64, // gravitational constant
    dt: f64, // step size
    min_separation: f64, // distance clamp, 0 = off
}

impl SimulationConstants {
    /// Build constants for gravitational constant `g` and timestep `dt`.
    ///
    /// Both must be finite and `dt` must be strictly positive.
    pub fn new(g: f64, dt: f64) -> Result<Self, SimError> {
        if !g.is_finite() {
            return Err(SimError::InvalidConstant { name: "G", value: g });
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidConstant { name: "dt", value: dt });
        }
        Ok(Self {
            g,
            dt,
            min_separation: 0.0,
        })
    }

    /// Clamp the distance used by the force law to at least `min_separation`.
    pub fn with_min_separation(self, min_separation: f64) -> Result<Self, SimError> {
        if !min_separation.is_finite() || min_separation < 0.0 {
            return Err(SimError::InvalidConstant {
                name: "min_separation",
                value: min_separation,
            });
        }
        Ok(Self {
            min_separation,
            ..self
        })
    }

    /// Same universe, different timestep
    pub fn with_timestep(self, dt: f64) -> Result<Self, SimError> {
        Self::new(self.g, dt)?.with_min_separation(self.min_separation)
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn min_separation(&self) -> f64 {
        self.min_separation
    }
}
