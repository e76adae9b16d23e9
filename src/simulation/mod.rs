pub mod error;
pub mod params;
pub mod states;
pub mod forces;
pub mod orbital;
pub mod integrator;
pub mod predictor;
pub mod preview;
pub mod universe;
pub mod scenario;
