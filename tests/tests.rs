use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use orbitsim::{
    load_scenario, BodyId, ConfigError, EntityState, NVec3, Orbital, PreviewSettings, Scenario,
    SimError, SimulationConstants, Universe,
};

/// Build a universe with the given constants
pub fn universe(g: f64, dt: f64) -> Universe {
    Universe::new(SimulationConstants::new(g, dt).unwrap())
}

/// Build a simple 2-body universe separated along the x-axis, at rest
pub fn two_body_universe(g: f64, dt: f64, dist: f64, m1: f64, m2: f64) -> (Universe, BodyId, BodyId) {
    let mut u = universe(g, dt);
    let a = u.spawn(NVec3::new(-dist / 2.0, 0.0, 0.0), NVec3::zeros(), m1).unwrap();
    let b = u.spawn(NVec3::new(dist / 2.0, 0.0, 0.0), NVec3::zeros(), m2).unwrap();
    (u, a, b)
}

/// (position, velocity, mass) of a small bound 3-body system
pub fn three_body_state() -> Vec<(NVec3, NVec3, f64)> {
    vec![
        (NVec3::new(0.0, 0.0, 0.0), NVec3::new(0.0, -0.1, 0.0), 10.0),
        (NVec3::new(3.0, 0.0, 0.0), NVec3::new(0.0, 1.8, 0.1), 1.0),
        (NVec3::new(-2.0, 1.0, 0.5), NVec3::new(0.4, -1.5, 0.0), 0.5),
    ]
}

fn position(u: &Universe, id: BodyId) -> NVec3 {
    u.get(id).unwrap().position()
}

fn velocity(u: &Universe, id: BodyId) -> NVec3 {
    u.get(id).unwrap().velocity()
}

// ==================================================================================
// Kernel tests
// ==================================================================================

#[test]
fn two_body_speed_change_matches_newton() {
    let (g, dt, d, m1, m2) = (0.5, 0.01, 2.0, 2.0, 3.0);
    let (mut u, a, b) = two_body_universe(g, dt, d, m1, m2);

    u.step().unwrap();

    let force = g * m1 * m2 / (d * d);
    let va = velocity(&u, a);
    let vb = velocity(&u, b);

    // a sits on -x and is pulled toward +x, b the other way
    assert!((va - NVec3::new(force / m1 * dt, 0.0, 0.0)).norm() < 1e-12, "va = {va:?}");
    assert!((vb - NVec3::new(-force / m2 * dt, 0.0, 0.0)).norm() < 1e-12, "vb = {vb:?}");
}

#[test]
fn unit_two_body_round_trip() {
    let mut u = universe(1.0, 1.0);
    let a = u.spawn(NVec3::new(0.0, 0.0, 0.0), NVec3::zeros(), 1.0).unwrap();
    let b = u.spawn(NVec3::new(1.0, 0.0, 0.0), NVec3::zeros(), 1.0).unwrap();

    let report = u.step().unwrap();

    assert_eq!(velocity(&u, a), NVec3::new(1.0, 0.0, 0.0));
    assert_eq!(velocity(&u, b), NVec3::new(-1.0, 0.0, 0.0));
    assert_eq!(position(&u, a), NVec3::new(1.0, 0.0, 0.0));
    assert_eq!(position(&u, b), NVec3::new(0.0, 0.0, 0.0));
    assert_eq!(report.tick, 1);
    assert_eq!(report.positions, vec![(a, NVec3::new(1.0, 0.0, 0.0)), (b, NVec3::zeros())]);
}

#[test]
fn single_body_feels_no_force() {
    let mut u = universe(10.0, 0.1);
    let v0 = NVec3::new(0.3, -0.2, 1.0);
    let a = u.spawn(NVec3::new(1.0, 2.0, 3.0), v0, 5.0).unwrap();

    for _ in 0..100 {
        u.step().unwrap();
    }

    assert_eq!(velocity(&u, a), v0);
    assert!((position(&u, a) - (NVec3::new(1.0, 2.0, 3.0) + v0 * 10.0)).norm() < 1e-9);
}

#[test]
fn momentum_is_conserved() {
    let mut u = universe(1.0, 0.001);
    for (x, v, m) in three_body_state() {
        u.spawn(x, v, m).unwrap();
    }
    u.spawn(NVec3::new(0.0, -4.0, 0.0), NVec3::new(1.2, 0.0, 0.0), 0.2).unwrap();

    let p0 = u.total_momentum();
    for _ in 0..2000 {
        u.step().unwrap();
    }
    let drift = (u.total_momentum() - p0).norm();

    assert!(drift < 1e-10, "Net momentum drifted by {drift:e}");
}

#[test]
fn identical_state_bodies_are_still_distinct() {
    let mut u = universe(1.0, 0.1);
    let x = NVec3::new(1.0, 1.0, 1.0);
    let a = u.spawn(x, NVec3::zeros(), 1.0).unwrap();
    let b = u.spawn(x, NVec3::zeros(), 1.0).unwrap();

    let err = u.step().unwrap_err();

    assert_eq!(err, SimError::CoincidentBodies { body: a, other: b });
    // aborted before any mutation
    assert_eq!(position(&u, a), x);
    assert_eq!(velocity(&u, b), NVec3::zeros());
    assert_eq!(u.tick(), 0);
}

#[test]
fn min_separation_keeps_close_pass_finite() {
    let constants = SimulationConstants::new(1.0, 0.01)
        .and_then(|c| c.with_min_separation(0.1))
        .unwrap();
    let mut u = Universe::new(constants);
    let a = u.spawn(NVec3::new(-1.0e-9, 0.0, 0.0), NVec3::zeros(), 1.0).unwrap();
    u.spawn(NVec3::new(1.0e-9, 0.0, 0.0), NVec3::zeros(), 1.0).unwrap();

    u.step().unwrap();

    // |a| <= G m / min_separation^2 = 100
    assert!((velocity(&u, a).norm() - 100.0 * 0.01).abs() < 1e-9);
}

// ==================================================================================
// Two-phase ordering tests
// ==================================================================================

/// Straightforward two-phase step on plain vectors: all accelerations from
/// pre-step positions, then velocities, then positions
fn reference_step(state: &mut [(NVec3, NVec3, f64)], g: f64, dt: f64) {
    let accels: Vec<NVec3> = (0..state.len())
        .map(|i| {
            let mut acc = NVec3::zeros();
            for j in 0..state.len() {
                if i == j {
                    continue;
                }
                let r = state[j].0 - state[i].0;
                acc += g * state[j].2 * r / r.norm().powi(3);
            }
            acc
        })
        .collect();

    for (s, a) in state.iter_mut().zip(accels) {
        s.1 += a * dt;
    }
    for s in state.iter_mut() {
        s.0 += s.1 * dt;
    }
}

#[test]
fn two_phase_step_matches_reference() {
    let (g, dt) = (1.0, 0.01);
    let mut expected = three_body_state();
    let mut u = universe(g, dt);
    let ids: Vec<BodyId> = expected
        .iter()
        .map(|(x, v, m)| u.spawn(*x, *v, *m).unwrap())
        .collect();

    for _ in 0..50 {
        u.step().unwrap();
        reference_step(&mut expected, g, dt);

        for (id, (x, v, _)) in ids.iter().zip(expected.iter()) {
            assert!((position(&u, *id) - x).norm() < 1e-10);
            assert!((velocity(&u, *id) - v).norm() < 1e-10);
        }
    }
}

#[test]
fn registration_order_does_not_change_result() {
    let state = three_body_state();
    let mut forward = universe(1.0, 0.01);
    let mut backward = universe(1.0, 0.01);

    let fwd: Vec<BodyId> = state.iter().map(|(x, v, m)| forward.spawn(*x, *v, *m).unwrap()).collect();
    let mut bwd: Vec<BodyId> = state
        .iter()
        .rev()
        .map(|(x, v, m)| backward.spawn(*x, *v, *m).unwrap())
        .collect();
    bwd.reverse();

    for _ in 0..50 {
        forward.step().unwrap();
        backward.step().unwrap();
    }

    for (f, b) in fwd.iter().zip(bwd.iter()) {
        assert!((position(&forward, *f) - position(&backward, *b)).norm() < 1e-10);
    }
}

// ==================================================================================
// Registry tests
// ==================================================================================

#[test]
fn unregistered_body_leaves_simulation() {
    let state = three_body_state();
    let mut with = universe(1.0, 0.01);
    let mut without = universe(1.0, 0.01);

    let ids: Vec<BodyId> = state.iter().map(|(x, v, m)| with.spawn(*x, *v, *m).unwrap()).collect();
    let kept: Vec<BodyId> = state[..2]
        .iter()
        .map(|(x, v, m)| without.spawn(*x, *v, *m).unwrap())
        .collect();

    let removed = with.unregister(ids[2]).unwrap();
    let removed_position = removed.position();

    for _ in 0..20 {
        with.step().unwrap();
        without.step().unwrap();
    }

    assert_eq!(with.len(), 2);
    assert!(with.get(ids[2]).is_none());
    assert_eq!(removed.position(), removed_position);
    for (a, b) in ids[..2].iter().zip(kept.iter()) {
        assert_eq!(position(&with, *a), position(&without, *b));
    }
}

#[test]
fn hosted_bodies_propose_positions_to_their_owner() {
    let mut u = universe(1.0, 1.0);
    let left = Rc::new(RefCell::new(EntityState {
        position: NVec3::new(0.0, 0.0, 0.0),
        velocity: NVec3::zeros(),
        mass: 1.0,
    }));
    let right = Rc::new(RefCell::new(EntityState {
        position: NVec3::new(1.0, 0.0, 0.0),
        velocity: NVec3::zeros(),
        mass: 1.0,
    }));

    u.attach(Rc::clone(&left)).unwrap();
    u.attach(Rc::clone(&right)).unwrap();
    u.step().unwrap();

    assert_eq!(left.borrow().position, NVec3::new(1.0, 0.0, 0.0));
    assert_eq!(right.borrow().position, NVec3::new(0.0, 0.0, 0.0));
}

// ==================================================================================
// Prediction tests
// ==================================================================================

#[test]
fn prediction_leaves_live_state_untouched() {
    let mut u = universe(1.0, 0.01);
    let ids: Vec<BodyId> = three_body_state()
        .into_iter()
        .map(|(x, v, m)| u.spawn(x, v, m).unwrap())
        .collect();
    let before: Vec<(NVec3, NVec3)> = ids.iter().map(|id| (position(&u, *id), velocity(&u, *id))).collect();

    let out = u.predict(&PreviewSettings {
        steps: 200,
        ..Default::default()
    });

    assert!(out.is_ok());
    let after: Vec<(NVec3, NVec3)> = ids.iter().map(|id| (position(&u, *id), velocity(&u, *id))).collect();
    assert_eq!(before, after);
    assert_eq!(u.tick(), 0);
}

#[test]
fn prediction_with_physics_timestep_matches_live_steps() {
    let mut u = universe(1.0, 0.01);
    let ids: Vec<BodyId> = three_body_state()
        .into_iter()
        .map(|(x, v, m)| u.spawn(x, v, m).unwrap())
        .collect();
    let settings = PreviewSettings {
        steps: 30,
        use_physics_timestep: true,
        ..Default::default()
    };

    let predicted = u.predict(&settings).unwrap();
    for _ in 0..30 {
        u.step().unwrap();
    }

    for id in ids {
        let track = predicted.get(id).unwrap();
        assert_eq!(track.samples.len(), 30);
        assert_eq!(track.last(), Some(position(&u, id)));
    }
}

#[test]
fn reference_body_is_pinned_and_others_are_rebased() {
    let (g, dt, steps) = (1.0, 0.01, 100);
    let mut u = universe(g, dt);
    // reference drifts along +y on top of the mutual pull
    let star = u.spawn(NVec3::new(0.0, 0.0, 0.0), NVec3::new(0.0, 0.5, 0.0), 50.0).unwrap();
    let rock = u.spawn(NVec3::new(4.0, 0.0, 0.0), NVec3::new(0.0, 3.5, 0.0), 0.5).unwrap();

    let out = u
        .predict(&PreviewSettings {
            steps,
            timestep: dt,
            use_physics_timestep: false,
            reference: Some(star),
        })
        .unwrap();

    // independent relative-motion calculation on a plain copy
    let mut state = vec![
        (NVec3::new(0.0, 0.0, 0.0), NVec3::new(0.0, 0.5, 0.0), 50.0),
        (NVec3::new(4.0, 0.0, 0.0), NVec3::new(0.0, 3.5, 0.0), 0.5),
    ];
    let star_initial = state[0].0;
    let mut expected_rock = Vec::with_capacity(steps);
    for _ in 0..steps {
        let star_before = state[0].0;
        reference_step(&mut state, g, dt);
        expected_rock.push(state[1].0 - (star_before - star_initial));
    }

    let star_track = out.get(star).unwrap();
    assert_eq!(out.reference(), Some(star));
    assert!(star_track.samples.iter().all(|s| *s == star_initial));

    let rock_track = out.get(rock).unwrap();
    assert_eq!(rock_track.samples.len(), steps);
    for (got, want) in rock_track.samples.iter().zip(expected_rock.iter()) {
        assert!((got - want).norm() < 1e-10, "got {got:?}, want {want:?}");
    }
    // the star really moved, so rebasing did something
    assert!((state[0].0 - star_initial).norm() > 0.4);
}

#[test]
fn degenerate_prediction_reports_error() {
    let mut u = universe(1.0, 0.01);
    u.spawn(NVec3::zeros(), NVec3::zeros(), 1.0).unwrap();
    u.spawn(NVec3::zeros(), NVec3::zeros(), 1.0).unwrap();

    let err = u.predict(&PreviewSettings::default()).unwrap_err();

    assert!(matches!(err, SimError::CoincidentBodies { .. }));
}

// ==================================================================================
// Scenario tests
// ==================================================================================

fn scenario_path(name: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn bundled_scenarios_build_and_predict() {
    for name in ["two_body.yaml", "sun_planet_moon.yaml"] {
        let cfg = load_scenario(scenario_path(name)).expect("scenario yaml");
        let scenario = Scenario::build(cfg).expect("scenario builds");

        let out = scenario.universe.predict(&scenario.preview).expect("prediction");
        assert_eq!(out.len(), scenario.universe.len());
        assert!(out.iter().all(|t| t.samples.len() == scenario.preview.steps));
    }
}

#[test]
fn planet_frame_scenario_pins_planet() {
    let cfg = load_scenario(scenario_path("sun_planet_moon.yaml")).unwrap();
    let scenario = Scenario::build(cfg).unwrap();
    let planet = scenario.id_of("planet").unwrap();

    let out = scenario.universe.predict(&scenario.preview).unwrap();

    let initial = scenario.universe.get(planet).unwrap().position();
    assert!(out.get(planet).unwrap().samples.iter().all(|s| *s == initial));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "constants: [not, a, map]").unwrap();

    let err = load_scenario(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_scenario(dir.path().join("absent.yaml")).unwrap_err();

    assert!(matches!(err, ConfigError::Io(_)));
}
