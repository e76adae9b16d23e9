//! Configuration types for loading simulation scenarios from YAML.
//!
//! A scenario file is a thin, `serde`-deserializable description of one
//! universe:
//!
//! - [`ConstantsConfig`] – gravitational constant, live timestep, distance clamp
//! - [`PreviewConfig`]   – trajectory preview options (all optional)
//! - [`BodyConfig`]      – initial state for each body
//! - [`ScenarioConfig`]  – top-level wrapper
//!
//! # YAML format
//!
//! ```yaml
//! constants:
//!   G: 1.0                  # gravitational constant
//!   dt: 0.01                # live timestep
//!   min_separation: 0.0     # optional distance clamp
//!
//! preview:
//!   steps: 1000             # number of preview steps
//!   timestep: 0.1           # preview timestep
//!   use_physics_timestep: false
//!   relative_to: sun        # optional reference body name
//!
//! bodies:
//!   - name: sun
//!     x: [0.0, 0.0, 0.0]
//!     v: [0.0, 0.0, 0.0]
//!     m: 1000.0
//!   - name: planet
//!     x: [10.0, 0.0, 0.0]
//!     v: [0.0, 10.0, 0.0]
//!     m: 1.0
//! ```
//!
//! [`Scenario::build`](crate::simulation::scenario::Scenario::build) maps this
//! onto a runtime `Universe`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::simulation::error::SimError;
use crate::simulation::states::NVec3;

/// Errors that can occur while loading or applying a scenario file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("body `{body}`: `{field}` needs 3 components, got {len}")]
    VectorLength {
        body: String,
        field: &'static str,
        len: usize,
    },

    #[error("body name `{0}` is used more than once")]
    DuplicateBody(String),

    #[error("unknown body `{0}`")]
    UnknownBody(String),

    #[error("invalid scenario: {0}")]
    Simulation(#[from] SimError),
}

/// Physical constants of the universe
#[derive(Deserialize, Debug, Clone)]
pub struct ConstantsConfig {
    #[serde(rename = "G")]
    pub g: f64, // gravitational constant
    pub dt: f64, // live timestep
    #[serde(default)]
    pub min_separation: Option<f64>, // distance clamp for close encounters
}

/// Trajectory preview options, anything omitted falls back to the defaults
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PreviewConfig {
    #[serde(default)]
    pub steps: Option<usize>,
    #[serde(default)]
    pub timestep: Option<f64>,
    #[serde(default)]
    pub use_physics_timestep: bool,
    #[serde(default)]
    pub relative_to: Option<String>, // name of the reference body
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub name: String,
    pub x: Vec<f64>, // initial position
    pub v: Vec<f64>, // initial velocity
    pub m: f64, // mass, must be > 0
}

impl BodyConfig {
    pub fn position(&self) -> Result<NVec3, ConfigError> {
        self.vec3("x", &self.x)
    }

    pub fn velocity(&self) -> Result<NVec3, ConfigError> {
        self.vec3("v", &self.v)
    }

    fn vec3(&self, field: &'static str, values: &[f64]) -> Result<NVec3, ConfigError> {
        match values {
            [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
            _ => Err(ConfigError::VectorLength {
                body: self.name.clone(),
                field,
                len: values.len(),
            }),
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub constants: ConstantsConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Load a scenario from a YAML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_yaml::from_reader(reader)?)
}
