use orbitsim::{load_scenario, Scenario};
use orbitsim::{bench_predict, bench_step};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "N-body orbit simulator")]
struct Args {
    /// Scenario file, relative paths resolve against the `scenarios` directory
    #[arg(short, long, default_value = "two_body.yaml")]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Advance the live simulation
    Run {
        #[arg(short, long, default_value_t = 1000)]
        steps: u64,
    },
    /// Predict trajectories from the initial state
    Predict {
        /// Overrides the scenario's preview step count
        #[arg(short, long)]
        steps: Option<usize>,
        /// Body whose frame the trajectories are drawn in
        #[arg(short, long)]
        relative_to: Option<String>,
    },
    /// Time live steps and predictions for growing system sizes
    Bench,
}

// load here to keep main clean
fn load(file: &PathBuf) -> Result<Scenario> {
    let path = if file.is_absolute() || file.exists() {
        file.clone()
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file)
    };

    let cfg = load_scenario(&path).with_context(|| format!("loading {}", path.display()))?;
    let scenario = Scenario::build(cfg).with_context(|| format!("building {}", path.display()))?;
    info!(bodies = scenario.universe.len(), path = %path.display(), "scenario loaded");
    Ok(scenario)
}

fn run(mut scenario: Scenario, steps: u64) -> Result<()> {
    let p0 = scenario.universe.total_momentum();

    for _ in 0..steps {
        scenario.universe.step().context("live step failed")?;
    }

    println!("after {} ticks:", scenario.universe.tick());
    let ids: Vec<_> = scenario.universe.ids().collect();
    for id in ids {
        if let Some(body) = scenario.universe.get(id) {
            let x = body.position();
            let v = body.velocity();
            println!(
                "  {:>10}  x = [{:12.6}, {:12.6}, {:12.6}]  v = [{:10.6}, {:10.6}, {:10.6}]",
                scenario.name_of(id).unwrap_or("?"),
                x.x, x.y, x.z, v.x, v.y, v.z
            );
        }
    }
    let drift = (scenario.universe.total_momentum() - p0).norm();
    println!("momentum drift = {:.3e}", drift);

    Ok(())
}

fn predict(mut scenario: Scenario, steps: Option<usize>, relative_to: Option<String>) -> Result<()> {
    if let Some(steps) = steps {
        scenario.preview.steps = steps;
    }
    if let Some(name) = relative_to {
        scenario.preview.reference = Some(scenario.reference_by_name(&name)?);
    }

    let trajectories = scenario
        .universe
        .predict(&scenario.preview)
        .context("prediction failed")?;

    let frame = trajectories
        .reference()
        .and_then(|id| scenario.name_of(id))
        .unwrap_or("inertial");
    println!("{} steps, frame: {}", trajectories.steps(), frame);

    for track in trajectories.iter() {
        let name = scenario.name_of(track.id).unwrap_or("?");
        match (track.samples.first(), track.last()) {
            (Some(a), Some(b)) => println!(
                "  {:>10}  first = [{:.4}, {:.4}, {:.4}]  last = [{:.4}, {:.4}, {:.4}]  segments = {}",
                name, a.x, a.y, a.z, b.x, b.y, b.z,
                track.segments().count()
            ),
            _ => println!("  {:>10}  no samples", name),
        }
    }

    Ok(())
}

fn bench() -> Result<()> {
    let sizes = [50, 100, 200, 400, 800];

    println!("N,step_ms");
    for r in bench_step(&sizes, 5)? {
        println!("{},{:.6}", r.n, r.seconds_per_step * 1000.0);
    }

    println!("N,predict_step_ms");
    for r in bench_predict(&sizes, 20)? {
        println!("{},{:.6}", r.n, r.seconds_per_step * 1000.0);
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Run { steps } => run(load(&args.file)?, steps),
        Command::Predict { steps, relative_to } => predict(load(&args.file)?, steps, relative_to),
        Command::Bench => bench(),
    }
}
