//! Kepler sweep E2E tests.
//!
//! Validates acceptance criteria AC-1 through AC-9 for the equal-area demo.
//!
//! Each test is designed to falsify a hypothesis about the system:
//! - Tests are deterministic and reproducible
//! - Tests verify invariant properties
//! - Tests use metamorphic relations where an oracle is unavailable

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use kepler_sweep::orbit::metamorphic::run_all_metamorphic_tests;
use kepler_sweep::prelude::*;
use kepler_sweep::render::{FrameRecorder, JsonLinesRenderer, NullRenderer};

/// AC-1: Newton-Raphson satisfies Kepler's equation to 1e-9
///
/// Hypothesis to falsify: some (M, e) in the UI range leaves a residual
#[test]
fn ac1_round_trip_residual() {
    let solver = KeplerSolver::new();
    for ei in 0..=85 {
        let e = f64::from(ei) / 100.0;
        for mi in 0..360 {
            let m = TAU * f64::from(mi) / 360.0;
            let big_e = solver.solve(m, e);
            let residual = (big_e - e * big_e.sin() - m).abs();
            assert!(
                residual < 1e-9,
                "AC-1 FAILED: residual {residual:.3e} at M={m:.4}, e={e}"
            );
        }
    }
}

/// AC-2: Apsides sit at a(1-e) and a(1+e)
#[test]
fn ac2_apsides() {
    let computer = OrbitStateComputer::default();
    for &(a, e) in &[(1.0, 0.35), (2.0, 0.85), (0.5, 0.1)] {
        let peri = computer.point(a, e, 0.0).expect("valid");
        let apo = computer.point(a, e, PI).expect("valid");
        assert!((peri.radius - a * (1.0 - e)).abs() < 1e-12, "AC-2 FAILED: perihelion");
        assert!((apo.radius - a * (1.0 + e)).abs() < 1e-12, "AC-2 FAILED: aphelion");
    }
}

/// AC-3: A circular orbit keeps r = a and constant speed
#[test]
fn ac3_circular_orbit() {
    let computer = OrbitStateComputer::default();
    let a: f64 = 1.7;
    let expected_speed = 1.0 / a.sqrt();
    for i in 0..100 {
        let s = computer.point(a, 0.0, f64::from(i) * 0.063).expect("valid");
        assert!((s.radius - a).abs() < 1e-12);
        assert!((s.speed() - expected_speed).abs() < 1e-12);
    }
}

/// AC-4: The history keeps exactly the most recent num_wedges + 1 points
#[test]
fn ac4_bounded_history() {
    let mut tracker = AreaWedgeTracker::new(4).expect("valid");
    for i in 0..20 {
        tracker.record(f64::from(i), 1.0);
    }
    let xs: Vec<f64> = tracker.history().iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![15.0, 16.0, 17.0, 18.0, 19.0]);
    assert_eq!(tracker.areas().len(), 4);
}

/// AC-5: Wedge areas stay nearly equal once the history is full
///
/// Hypothesis to falsify: the CV exceeds 10% at some point of a full orbit
#[test]
fn ac5_equal_area_tendency() {
    let config = KeplerConfig::builder().eccentricity(0.35).time_step(0.08).build();
    let mut state = SimulationState::new(&config).expect("valid");
    let orbit_ticks = (TAU / 0.08).ceil() as usize;

    for tick in 0..(orbit_ticks + 20) {
        state.tick();
        if tick >= 8 {
            let stats = state.tracker().stats().expect("full history");
            assert!(stats.cv < 10.0, "AC-5 FAILED: CV {:.3}% at tick {tick}", stats.cv);
        }
    }
}

/// AC-6: Changing eccentricity clears history and zeroes M
#[test]
fn ac6_eccentricity_change_resets() {
    let mut state = SimulationState::new(&KeplerConfig::default()).expect("valid");
    for _ in 0..30 {
        state.tick();
    }
    state.apply(InputController::eccentricity_changed(0.7)).expect("valid");

    assert!(state.clock().mean_anomaly().abs() < f64::EPSILON);
    assert!(state.tracker().is_empty());
    let frame = state.snapshot();
    assert!(frame.wedges.is_empty());
    assert!(frame.stats.is_none());
    assert!((frame.body.radius - 0.3).abs() < 1e-12);
}

/// AC-7: Scenario a=1, e=0.35 starting at perihelion
#[test]
fn ac7_reference_scenario() {
    let config = KeplerConfig::builder().eccentricity(0.35).time_step(0.08).build();
    let mut state = SimulationState::new(&config).expect("valid");

    let body = state.current();
    assert!(body.eccentric_anomaly.abs() < 1e-15);
    assert!(body.true_anomaly.abs() < 1e-15);
    assert!((body.radius - 0.65).abs() < 1e-12);
    assert!((body.position.x - 0.65).abs() < 1e-12);
    assert!(body.position.y.abs() < 1e-12);

    assert!(state.tick());
    let m = state.clock().mean_anomaly();
    assert!((m - 0.08).abs() < 1e-15);
    let big_e = state.current().eccentric_anomaly;
    assert!((big_e - 0.35 * big_e.sin() - m).abs() < 1e-9);
}

/// AC-8: Cartesian speed agrees with vis-viva everywhere on the orbit
#[test]
fn ac8_vis_viva_agreement() {
    let computer = OrbitStateComputer::default();
    for ei in 0..=17 {
        let params = OrbitParameters::new(1.3, f64::from(ei) * 0.05).expect("valid");
        for mi in 0..64 {
            let s = computer.state_at(&params, TAU * f64::from(mi) / 64.0);
            assert!(
                s.vis_viva_mismatch() < 1e-9,
                "AC-8 FAILED: mismatch {:.3e}",
                s.vis_viva_mismatch()
            );
        }
    }
}

/// AC-9: Batch solving is bitwise identical to scalar solving
#[test]
fn ac9_batch_scalar_identity() {
    let solver = KeplerSolver::new();
    let ms: Vec<f64> = (0..500).map(|i| TAU * f64::from(i) / 499.0).collect();
    let batch = solver.solve_batch(&ms, 0.85);
    for (m, e_batch) in ms.iter().zip(&batch) {
        assert_eq!(e_batch.to_bits(), solver.solve(*m, 0.85).to_bits());
    }
}

#[test]
fn metamorphic_relations_hold_across_ui_range() {
    for &e in &[0.0, 0.2, 0.5, 0.7, 0.85] {
        let params = OrbitParameters::new(1.0, e).expect("valid");
        for result in run_all_metamorphic_tests(&params, 0.02) {
            assert!(
                result.passed,
                "{} failed at e={e}: {:.3e} > {:.3e}",
                result.relation, result.error, result.tolerance
            );
        }
    }
}

/// Solver periodicity must survive the high-eccentricity initial guess
#[test]
fn solver_handles_mean_anomaly_past_one_turn() {
    let solver = KeplerSolver::new();
    for i in 0..128 {
        let m = TAU + TAU * f64::from(i) / 128.0;
        let outcome = solver.solve_detailed(m, 0.85);
        assert!(
            outcome.converged && outcome.residual < 1e-9,
            "M={m:.4}: residual {:.3e}",
            outcome.residual
        );
    }
}

#[test]
fn non_finite_clock_config_is_rejected() {
    assert!(KeplerConfig::from_yaml("clock:\n  time_step: .nan\n").is_err());
    assert!(KeplerConfig::from_yaml("clock:\n  speed: .nan\n").is_err());
}

#[test]
fn scheduler_applies_script_between_ticks() {
    let config = KeplerConfig::builder()
        .schedule(40, InputCommand::SetEccentricity(0.6))
        .schedule(60, InputCommand::PlayPause)
        .build();
    let mut recorder = FrameRecorder::default();
    let (state, summary) =
        run_simulation(&config, &mut recorder, 80, Pacing::Unpaced).expect("run");

    assert_eq!(summary.commands_applied, 2);
    assert_eq!(summary.advanced, 60);
    assert_eq!(state.clock().run_state(), RunState::Paused);
    assert_eq!(state.clock().tick_count(), 20);

    // The curve is shared between frames until the eccentricity changes.
    assert!(Arc::ptr_eq(&recorder.frames[0].curve, &recorder.frames[39].curve));
    assert!(!Arc::ptr_eq(&recorder.frames[39].curve, &recorder.frames[40].curve));
    assert_eq!(recorder.frames[40].tick, 1);
}

#[test]
fn reset_policy_pause_stops_clock() {
    let config = KeplerConfig::builder()
        .reset_policy(ResetPolicy::Pause)
        .schedule(10, InputCommand::Reset)
        .build();
    let (state, summary) =
        run_simulation(&config, &mut NullRenderer, 20, Pacing::Unpaced).expect("run");
    assert_eq!(summary.advanced, 10);
    assert_eq!(state.clock().tick_count(), 0);
    assert!(state.tracker().is_empty());
}

#[test]
fn json_lines_output_is_parseable() {
    let mut renderer = JsonLinesRenderer::new(Vec::new());
    let config = KeplerConfig::builder().num_wedges(4).build();
    run_simulation(&config, &mut renderer, 10, Pacing::Unpaced).expect("run");

    let output = String::from_utf8(renderer.into_inner()).expect("utf8");
    let frames: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(frames.len(), 10);
    assert_eq!(frames[9]["wedges"].as_array().map(Vec::len), Some(4));
    assert!(frames[0]["curve"].is_array());
    assert!(frames[9].get("curve").is_none());
}

#[test]
fn embedded_config_runs_clean() {
    let config = KeplerConfig::embedded().expect("embedded");
    let (state, summary) =
        run_simulation(&config, &mut NullRenderer, 400, Pacing::Unpaced).expect("run");
    assert_eq!(summary.warnings, 0);
    assert_eq!(state.guard_status().halts, 0);
    assert!(summary.final_cv.is_some_and(|cv| cv < 10.0));
}

#[test]
fn eccentric_sweep_config_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/eccentric_sweep.yaml");
    let config = KeplerConfig::load(path).expect("valid config");
    assert_eq!(config.script.len(), 3);
    let (state, summary) =
        run_simulation(&config, &mut NullRenderer, 320, Pacing::Unpaced).expect("run");
    assert_eq!(summary.commands_applied, 3);
    assert!((state.params().eccentricity() - 0.8).abs() < f64::EPSILON);
    assert_eq!(state.clock().tick_count(), 20);
}
