pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::error::SimError;
pub use simulation::params::SimulationConstants;
pub use simulation::states::{Body, BodyId, Peer, NVec3};
pub use simulation::forces::NewtonianGravity;
pub use simulation::orbital::{Orbital, EntityHost, EntityState, HostedBody};
pub use simulation::integrator::{two_phase_step, Slot};
pub use simulation::predictor::{Snapshot, Trajectory, Trajectories, TrajectoryPredictor};
pub use simulation::preview::PreviewSettings;
pub use simulation::universe::{Universe, StepReport};
pub use simulation::scenario::Scenario;

pub use configuration::config::{load_scenario, ConfigError, ScenarioConfig, ConstantsConfig, PreviewConfig, BodyConfig};

pub use benchmark::benchmark::{bench_step, bench_predict, BenchRecord};
