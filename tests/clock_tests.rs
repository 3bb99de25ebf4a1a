// Host-side tests for the phase/easing engine.

use glass_melon::core::*;
use std::f64::consts::TAU;

fn cut_cycle() -> TimeCycle {
    TimeCycle::new(CUT_RATE, BLADE_PHASE_OFFSET)
}

#[test]
fn smoothstep_hits_endpoints_and_midpoint() {
    assert_eq!(smoothstep(0.0), 0.0);
    assert_eq!(smoothstep(1.0), 1.0);
    assert!((smoothstep(0.5) - 0.5).abs() < 1e-6);
    // Clamped outside the unit interval
    assert_eq!(smoothstep(-3.0), 0.0);
    assert_eq!(smoothstep(7.0), 1.0);
}

#[test]
fn smoothstep_is_monotonic() {
    let mut prev = smoothstep(0.0);
    for i in 1..=1000 {
        let v = smoothstep(i as f32 / 1000.0);
        assert!(v >= prev, "smoothstep decreased at {i}");
        prev = v;
    }
}

#[test]
fn eased_value_stays_in_unit_range() {
    let c = cut_cycle();
    for i in 0..20_000 {
        let t = i as f64 * 0.0137;
        let p = c.phase(t);
        let e = c.eased(t);
        assert!((0.0..=1.0).contains(&p), "phase {p} at t={t}");
        assert!((0.0..=1.0).contains(&e), "eased {e} at t={t}");
    }
}

#[test]
fn eased_value_has_no_jumps() {
    // |d/dt e| <= 1.5 * rate / 2 for smoothstep over the sine phase
    let c = cut_cycle();
    let dt = 1.0 / 60.0;
    let bound = (1.5 * CUT_RATE as f64 * 0.5 * dt) as f32 + 1e-4;
    let mut prev = c.eased(0.0);
    for i in 1..10_000 {
        let e = c.eased(i as f64 * dt);
        assert!((e - prev).abs() <= bound, "jump {} at frame {i}", (e - prev).abs());
        prev = e;
    }
}

#[test]
fn cycle_is_periodic() {
    let c = cut_cycle();
    let period = c.period();
    assert!((period - TAU / CUT_RATE as f64).abs() < 1e-9);
    for i in 0..500 {
        let t = i as f64 * 0.173;
        assert!((c.eased(t) - c.eased(t + period)).abs() < 1e-5, "t={t}");
        assert!((c.eased(t) - c.eased(t + 7.0 * period)).abs() < 1e-5, "t={t}");
    }
}

#[test]
fn phase_is_a_pure_function_of_time() {
    let c = cut_cycle();
    let forward: Vec<f32> = (0..100).map(|i| c.eased(i as f64 * 0.31)).collect();
    let backward: Vec<f32> = (0..100).rev().map(|i| c.eased(i as f64 * 0.31)).collect();
    let reversed: Vec<f32> = backward.into_iter().rev().collect();
    assert_eq!(forward, reversed);
}

#[test]
fn offset_of_minus_quarter_turn_starts_at_zero() {
    let c = cut_cycle();
    assert!(c.phase(0.0) < 1e-6);
    assert!(c.eased(0.0) < 1e-6);
    // Half a period later the cycle is at its far end
    assert!((c.eased(c.period() / 2.0) - 1.0).abs() < 1e-5);
}

#[test]
fn long_sessions_keep_precision() {
    let c = cut_cycle();
    let t = 1.234;
    let later = t + 10_000.0 * c.period();
    assert!((c.eased(t) - c.eased(later)).abs() < 1e-3);
}

#[test]
fn lerp_interpolates() {
    assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
    assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
    assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
}
