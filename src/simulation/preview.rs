//! Settings for the trajectory preview run
//!
//! Picks the step count, the timestep the preview integrates with, and the
//! body whose frame trajectories are drawn relative to.

use crate::simulation::error::SimError;
use crate::simulation::params::SimulationConstants;
use crate::simulation::states::BodyId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSettings {
    pub steps: usize, // number of preview steps
    pub timestep: f64, // preview dt, unless `use_physics_timestep`
    pub use_physics_timestep: bool, // reuse the live dt
    pub reference: Option<BodyId>, // frame to rebase into
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            steps: 1000,
            timestep: 0.1,
            use_physics_timestep: false,
            reference: None,
        }
    }
}

impl PreviewSettings {
    /// Constants the preview integrates with, derived from the live ones.
    /// `G` and the distance clamp always come from `live`.
    pub fn constants(&self, live: &SimulationConstants) -> Result<SimulationConstants, SimError> {
        if self.use_physics_timestep {
            Ok(*live)
        } else {
            live.with_timestep(self.timestep)
        }
    }
}
