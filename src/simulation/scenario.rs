//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime `Scenario`:
//! - the live `Universe` with every body registered in file order
//! - a name table mapping body names to ids
//! - resolved `PreviewSettings`

use crate::configuration::config::{ConfigError, ScenarioConfig};
use crate::simulation::params::SimulationConstants;
use crate::simulation::preview::PreviewSettings;
use crate::simulation::states::BodyId;
use crate::simulation::universe::Universe;

#[derive(Debug)]
pub struct Scenario {
    pub universe: Universe,
    pub preview: PreviewSettings,
    names: Vec<(BodyId, String)>,
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        let c_cfg = &cfg.constants;
        let constants = SimulationConstants::new(c_cfg.g, c_cfg.dt)?
            .with_min_separation(c_cfg.min_separation.unwrap_or(0.0))?;

        let mut universe = Universe::new(constants);
        let mut names: Vec<(BodyId, String)> = Vec::with_capacity(cfg.bodies.len());

        for bc in &cfg.bodies {
            if names.iter().any(|(_, n)| *n == bc.name) {
                return Err(ConfigError::DuplicateBody(bc.name.clone()));
            }
            let id = universe.spawn(bc.position()?, bc.velocity()?, bc.m)?;
            names.push((id, bc.name.clone()));
        }

        // Preview: defaults, overridden by whatever the file sets
        let p_cfg = &cfg.preview;
        let defaults = PreviewSettings::default();
        let reference = match &p_cfg.relative_to {
            Some(name) => Some(lookup(&names, name)?),
            None => None,
        };
        let preview = PreviewSettings {
            steps: p_cfg.steps.unwrap_or(defaults.steps),
            timestep: p_cfg.timestep.unwrap_or(defaults.timestep),
            use_physics_timestep: p_cfg.use_physics_timestep,
            reference,
        };
        // fail early on a bad preview timestep
        preview.constants(&constants)?;

        Ok(Self {
            universe,
            preview,
            names,
        })
    }

    pub fn id_of(&self, name: &str) -> Option<BodyId> {
        lookup(&self.names, name).ok()
    }

    pub fn name_of(&self, id: BodyId) -> Option<&str> {
        self.names
            .iter()
            .find(|(i, _)| *i == id)
            .map(|(_, n)| n.as_str())
    }

    /// Resolve an optional body name into a preview reference
    pub fn reference_by_name(&self, name: &str) -> Result<BodyId, ConfigError> {
        lookup(&self.names, name)
    }
}

fn lookup(names: &[(BodyId, String)], name: &str) -> Result<BodyId, ConfigError> {
    names
        .iter()
        .find(|(_, n)| n == name)
        .map(|(id, _)| *id)
        .ok_or_else(|| ConfigError::UnknownBody(name.to_string()))
}
