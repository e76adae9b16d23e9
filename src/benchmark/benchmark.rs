use std::time::Instant;

use crate::simulation::error::SimError;
use crate::simulation::params::SimulationConstants;
use crate::simulation::preview::PreviewSettings;
use crate::simulation::states::NVec3;
use crate::simulation::universe::Universe;

/// One timing row
#[derive(Debug, Clone, Copy)]
pub struct BenchRecord {
    pub n: usize, // bodies
    pub steps: usize, // steps timed
    pub seconds_per_step: f64,
}

/// Time live `Universe::step` for each system size in `sizes`
pub fn bench_step(sizes: &[usize], steps: usize) -> Result<Vec<BenchRecord>, SimError> {
    let mut records = Vec::with_capacity(sizes.len());

    for &n in sizes {
        let mut universe = make_universe(n)?;

        // Warm up
        universe.step()?;

        let t0 = Instant::now();
        for _ in 0..steps {
            universe.step()?;
        }
        records.push(BenchRecord {
            n,
            steps,
            seconds_per_step: per_step(t0.elapsed().as_secs_f64(), steps),
        });
    }

    Ok(records)
}

/// Time a full trajectory prediction of `steps` steps for each size
pub fn bench_predict(sizes: &[usize], steps: usize) -> Result<Vec<BenchRecord>, SimError> {
    let mut records = Vec::with_capacity(sizes.len());

    for &n in sizes {
        let universe = make_universe(n)?;
        let settings = PreviewSettings {
            steps,
            timestep: 0.01,
            use_physics_timestep: false,
            reference: universe.ids().next(),
        };

        let t0 = Instant::now();
        universe.predict(&settings)?;
        records.push(BenchRecord {
            n,
            steps,
            seconds_per_step: per_step(t0.elapsed().as_secs_f64(), steps),
        });
    }

    Ok(records)
}

fn per_step(seconds: f64, steps: usize) -> f64 {
    if steps == 0 {
        0.0
    } else {
        seconds / steps as f64
    }
}

/// Helper to build a universe of size `n`, deterministic positions, no rand needed
fn make_universe(n: usize) -> Result<Universe, SimError> {
    let constants = SimulationConstants::new(0.1, 0.001)?.with_min_separation(0.01)?;
    let mut universe = Universe::new(constants);

    for i in 0..n {
        let i_f = i as f64;
        let x = NVec3::new(
            (i_f * 0.37).sin() * 5.0,
            (i_f * 0.13).cos() * 5.0,
            (i_f * 0.07).sin() * 5.0 + i_f * 1.0e-3,
        );
        universe.spawn(x, NVec3::zeros(), 1.0)?;
    }

    Ok(universe)
}
