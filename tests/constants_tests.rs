// Host-side tests for constants and their relationships.

#![allow(clippy::assertions_on_constants)]

use glass_melon::constants::*;
use glass_melon::core::*;
use std::f32::consts::FRAC_PI_2;

#[test]
fn melon_layers_nest_inside_the_glass() {
    assert!(FLESH_RADIUS < RIND_RADIUS);
    assert!(RIND_RADIUS < OUTER_RADIUS);
    assert!(HEMISPHERE_SEGMENTS >= 3);
}

#[test]
fn cut_cycle_starts_closed_and_raised() {
    assert_eq!(BLADE_PHASE_OFFSET, -FRAC_PI_2);
    assert_eq!(SPLIT_PHASE_OFFSET, BLADE_PHASE_OFFSET);
    assert!(CUT_RATE > 0.0);
    assert!(HALF_GAP_CLOSED < HALF_GAP_OPEN);
    assert!(BLADE_LOWERED[1] < BLADE_RAISED[1]);
}

#[test]
fn gains_stay_quiet() {
    for gain in [MASTER_GAIN, NOISE_GAIN, NOISE_AMPLITUDE, LFO_DEPTH] {
        assert!(gain > 0.0 && gain <= 1.0, "{gain}");
    }
    assert!(SHIMMER_FLOOR > 0.0 && SHIMMER_FLOOR < LFO_DEPTH);
    assert!(NOISE_LOWPASS_HZ < 22_050.0);
    assert!(LFO_HZ < 1.0);
    assert!(NOISE_LOOP_SECONDS > 0.0);
}

#[test]
fn seed_streams_are_distinct() {
    assert_ne!(DROPLET_SEED_STREAM, SPARKLE_SEED_STREAM);
    assert_ne!(DROPLET_SEED_STREAM, NOISE_SEED_STREAM);
    assert_ne!(SPARKLE_SEED_STREAM, NOISE_SEED_STREAM);
    assert!(RESUME_RETRY_LIMIT >= 1);
}

#[test]
fn particle_ranges_are_positive() {
    assert!(DROPLET_COUNT > 0 && SPARKLE_COUNT > 0);
    assert!(DROPLET_RADIAL_MIN > 0.0 && DROPLET_RADIAL_MIN + DROPLET_RADIAL_SPAN < OUTER_RADIUS);
    assert!(DROPLET_SCALE_MIN > 0.0 && DROPLET_SPEED_MIN > 0.0);
    assert!(SPARKLE_OPACITY > 0.0 && SPARKLE_OPACITY <= 1.0);
}

#[test]
fn shadow_sits_under_the_bobbing_melon() {
    // Below the lowest bob of the cut face, within reach of the shell
    assert!(SHADOW_POSITION[1] < -BOB_AMPLITUDE);
    assert!(-SHADOW_POSITION[1] < OUTER_RADIUS + BOB_AMPLITUDE);
    assert!(SHADOW_OPACITY > 0.0 && SHADOW_OPACITY < 1.0);
    assert!(CAMERA_ZNEAR < CAMERA_EYE[2] && CAMERA_EYE[2] < CAMERA_ZFAR);
}
