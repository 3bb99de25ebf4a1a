// Host-side tests for the droplet swarm and sparkle field.

use glam::Vec3;
use glass_melon::core::*;
use glass_melon::SeedPolicy;
use std::f32::consts::TAU;

fn droplets(seed: u64) -> ParticleField {
    ParticleField::droplets(&mut SeedPolicy::Fixed(seed).rng(1), DROPLET_COUNT)
}

#[test]
fn droplet_count_is_fixed() {
    let field = droplets(7);
    assert_eq!(field.len(), DROPLET_COUNT);
    assert!(!field.is_empty());
    let mut out = vec![Vec3::ZERO; field.len()];
    for i in 0..100 {
        field.write_positions(i as f64 * 0.5, &mut out);
    }
    assert_eq!(field.len(), DROPLET_COUNT);
}

#[test]
fn droplets_are_spread_evenly_around_the_ring() {
    let field = droplets(3);
    let step = TAU / DROPLET_COUNT as f32;
    for (i, p) in field.particles().iter().enumerate() {
        assert!((p.angle - i as f32 * step).abs() < 1e-5);
    }
}

#[test]
fn droplet_parameters_stay_in_their_ranges() {
    let field = droplets(11);
    for p in field.particles() {
        assert!(p.radial >= DROPLET_RADIAL_MIN && p.radial <= DROPLET_RADIAL_MIN + DROPLET_RADIAL_SPAN);
        assert!(p.height >= 0.0 && p.height <= DROPLET_HEIGHT_SPAN);
        assert!(p.scale >= DROPLET_SCALE_MIN && p.scale <= DROPLET_SCALE_MIN + DROPLET_SCALE_SPAN);
        assert!(p.speed >= DROPLET_SPEED_MIN && p.speed <= DROPLET_SPEED_MIN + DROPLET_SPEED_SPAN);
        assert!(p.phase >= 0.0 && p.phase <= TAU);
    }
}

#[test]
fn same_seed_same_positions() {
    let a = droplets(42);
    let b = droplets(42);
    assert_eq!(a.particles(), b.particles());
    let mut pa = vec![Vec3::ZERO; a.len()];
    let mut pb = vec![Vec3::ZERO; b.len()];
    a.write_positions(17.25, &mut pa);
    b.write_positions(17.25, &mut pb);
    assert_eq!(pa, pb);
}

#[test]
fn different_seeds_differ() {
    assert_ne!(droplets(1).particles(), droplets(2).particles());
}

#[test]
fn positions_do_not_accumulate_state() {
    let field = droplets(5);
    let mut direct = vec![Vec3::ZERO; field.len()];
    field.write_positions(30.0, &mut direct);

    let mut stepped = vec![Vec3::ZERO; field.len()];
    for i in 0..=1800 {
        field.write_positions(i as f64 / 60.0, &mut stepped);
    }
    assert_eq!(direct, stepped);
}

#[test]
fn droplets_stay_near_the_cut() {
    let field = droplets(9);
    for i in 0..300 {
        let t = i as f64 * 0.4;
        for p in field.particles() {
            let pos = p.position_at(t);
            let horizontal = (pos.x * pos.x + pos.z * pos.z).sqrt();
            assert!(horizontal <= p.radial + 1e-5);
            assert!((pos.y - p.height).abs() <= DROPLET_BOB + 1e-5);
        }
    }
}

#[test]
fn sparkles_fill_a_centred_cube() {
    let field = SparkleField::scatter(&mut SeedPolicy::Fixed(8).rng(2), SPARKLE_COUNT, SPARKLE_EXTENT);
    assert_eq!(field.len(), SPARKLE_COUNT);
    let half = SPARKLE_EXTENT / 2.0;
    for s in field.sparkles() {
        assert!(s.home.abs().max_element() <= half);
        assert_eq!(s.size, SPARKLE_SIZE);
        for i in 0..50 {
            let drift = s.position_at(i as f64 * 0.7) - s.home;
            assert!(drift.abs().max_element() <= SPARKLE_JITTER + 1e-5);
        }
    }
}

#[test]
fn sparkle_positions_are_reproducible() {
    let field = SparkleField::scatter(&mut SeedPolicy::Fixed(8).rng(2), 16, 2.0);
    let mut a = vec![Vec3::ZERO; 16];
    let mut b = vec![Vec3::ZERO; 16];
    field.write_positions(3.0, &mut a);
    field.write_positions(99.0, &mut b);
    field.write_positions(3.0, &mut b);
    assert_eq!(a, b);
}

#[test]
fn empty_fields_are_allowed() {
    let field = ParticleField::droplets(&mut SeedPolicy::Fixed(0).rng(1), 0);
    assert!(field.is_empty());
    field.write_positions(1.0, &mut []);
}
