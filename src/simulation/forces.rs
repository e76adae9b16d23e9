//! Pairwise Newtonian gravity for the n-body kernel
//!
//! Computes the acceleration one point mass feels from another. The
//! accumulation over a peer set lives on [`Body`](crate::simulation::states::Body),
//! this module only knows about a single pair.

use crate::simulation::params::SimulationConstants;
use crate::simulation::states::NVec3;

/// Newtonian gravity between two point masses
/// `min_separation` clamps the distance used for the magnitude so close
/// encounters stay bounded; `0.0` disables the clamp
#[derive(Debug, Clone, Copy)]
pub struct NewtonianGravity {
    pub g: f64, // gravitational constant
    pub min_separation: f64, // distance clamp
}

impl NewtonianGravity {
    pub fn from_constants(constants: &SimulationConstants) -> Self {
        Self {
            g: constants.g(),
            min_separation: constants.min_separation(),
        }
    }

    /// Acceleration on a body of mass `mi` at `xi` due to a body of mass `mj` at `xj`.
    ///
    /// Follows the force form:
    ///   F   = dir * G * mi * mj / r^2
    ///   a_i = F / mi
    ///
    /// Returns `None` when both positions coincide, since the direction is
    /// undefined there.
    pub fn acceleration(&self, xi: NVec3, mi: f64, xj: NVec3, mj: f64) -> Option<NVec3> {
        // r points from i to j, i is pulled along +r
        let r = xj - xi;
        let r2 = r.norm_squared();
        if r2 == 0.0 {
            return None;
        }

        let dir = r / r2.sqrt();

        // clamp only the magnitude, direction stays exact
        let floor2 = self.min_separation * self.min_separation;
        let d2 = r2.max(floor2);

        let force = dir * (self.g * mi * mj) / d2;
        Some(force / mi)
    }
}
