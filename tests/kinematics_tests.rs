// Host-side tests for the blade, split and sway transforms.

use glam::Vec3;
use glass_melon::core::*;

const EPS: f32 = 1e-5;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
}

#[test]
fn starts_with_blade_raised_and_halves_closed() {
    let k = Kinematics::default();
    let blade = k.blade(0.0);
    assert!(close(blade.position.x, BLADE_RAISED[0]));
    assert!(close(blade.position.y, BLADE_RAISED[1]));
    assert!(close(blade.rotation.z, BLADE_TILT_DEG[0].to_radians()));

    for side in Side::BOTH {
        let half = k.half(side, 0.0);
        assert!(close(half.position.x, side.sign() * HALF_GAP_CLOSED));
        assert!(close(half.rotation.y, 0.0));
    }
    assert!(close(k.separation(0.0), 2.0 * HALF_GAP_CLOSED));
}

#[test]
fn quarter_period_is_the_midpoint_crossing() {
    let k = Kinematics::default();
    let quarter = k.blade_cycle.period() / 4.0;
    let blade = k.blade(quarter);
    let mid_x = (BLADE_RAISED[0] + BLADE_LOWERED[0]) / 2.0;
    let mid_y = (BLADE_RAISED[1] + BLADE_LOWERED[1]) / 2.0;
    assert!((blade.position.x - mid_x).abs() < 1e-4, "x={}", blade.position.x);
    assert!((blade.position.y - mid_y).abs() < 1e-4, "y={}", blade.position.y);

    let before = k.separation(quarter - 0.05);
    let at = k.separation(quarter);
    let after = k.separation(quarter + 0.05);
    assert!(at > 2.0 * HALF_GAP_CLOSED);
    assert!(before < at && at < after);
}

#[test]
fn blade_reaches_lowered_pose_at_half_period() {
    let k = Kinematics::default();
    let blade = k.blade(k.blade_cycle.period() / 2.0);
    assert!((blade.position.x - BLADE_LOWERED[0]).abs() < 1e-4);
    assert!((blade.position.y - BLADE_LOWERED[1]).abs() < 1e-4);
    assert!((k.separation(k.split_cycle.period() / 2.0) - 2.0 * HALF_GAP_OPEN).abs() < 1e-4);
}

#[test]
fn halves_mirror_each_other() {
    let k = Kinematics::default();
    for i in 0..200 {
        let t = i as f64 * 0.097;
        let left = k.half(Side::Left, t);
        let right = k.half(Side::Right, t);
        assert!(close(left.position.x, -right.position.x));
        assert!(close(left.rotation.y, -right.rotation.y));
        assert!(right.position.x > 0.0);
    }
}

#[test]
fn separation_stays_between_closed_and_open() {
    let k = Kinematics::default();
    for i in 0..5_000 {
        let s = k.separation(i as f64 * 0.021);
        assert!(s >= 2.0 * HALF_GAP_CLOSED - EPS && s <= 2.0 * HALF_GAP_OPEN + EPS);
    }
}

#[test]
fn blade_motion_is_continuous() {
    let k = Kinematics::default();
    let dt = 1.0 / 60.0;
    let mut prev = k.blade(0.0).position;
    for i in 1..5_000 {
        let p = k.blade(i as f64 * dt).position;
        assert!((p - prev).length() < 0.05, "blade jumped at frame {i}");
        prev = p;
    }
}

#[test]
fn sway_bobs_around_the_origin() {
    let start = Kinematics::sway(0.0);
    assert_eq!(start.position, Vec3::ZERO);
    assert!(close(start.rotation.y, 0.0));

    let peak = Kinematics::sway(std::f64::consts::FRAC_PI_2 / BOB_RATE as f64);
    assert!(close(peak.position.y, BOB_AMPLITUDE));
    for i in 0..1_000 {
        let s = Kinematics::sway(i as f64 * 0.11);
        assert!(s.position.y.abs() <= BOB_AMPLITUDE + EPS);
        assert_eq!(s.position.x, 0.0);
        assert!(s.rotation.y.abs() <= SWAY_AMPLITUDE + EPS);
        assert_eq!(s.rotation.x, 0.0);
        assert_eq!(s.rotation.z, 0.0);
    }
}

#[test]
fn float_wobble_is_small() {
    for i in 0..1_000 {
        let f = Kinematics::float(i as f64 * 0.13);
        assert!(f.position.y.abs() <= FLOAT_INTENSITY / 10.0 + EPS);
        assert!(f.rotation.abs().max_element() <= FLOAT_ROTATION_INTENSITY / 8.0 + EPS);
    }
}

#[test]
fn apply_overwrites_every_transform() {
    let k = Kinematics::default();
    let mut pose = FramePose {
        assembly: TransformState::at(Vec3::splat(99.0)),
        float: TransformState::at(Vec3::splat(99.0)),
        blade: TransformState::at(Vec3::splat(99.0)),
        halves: [TransformState::at(Vec3::splat(99.0)); 2],
    };
    k.apply(3.5, &mut pose);
    assert_eq!(pose, k.pose(3.5));
    assert_eq!(*pose.half(Side::Left), k.half(Side::Left, 3.5));
    assert_eq!(*pose.half(Side::Right), k.half(Side::Right, 3.5));
}

#[test]
fn pose_depends_only_on_time() {
    let k = Kinematics::default();
    let a = k.pose(12.75);
    let _ = k.pose(1.0);
    let _ = k.pose(400.0);
    assert_eq!(a, k.pose(12.75));
}

#[test]
fn transform_matrix_applies_rotation_then_translation() {
    let t = TransformState::at(Vec3::new(1.0, 2.0, 3.0))
        .with_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
    let m = t.matrix(Vec3::ONE);
    let p = m.transform_point3(Vec3::X);
    // +X rotated a quarter turn about Y lands on -Z
    assert!((p - Vec3::new(1.0, 2.0, 2.0)).length() < 1e-5, "{p:?}");
}
