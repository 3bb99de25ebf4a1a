//! Fixed-size droplet swarm and ambient sparkle field.
//!
//! Parameters are drawn once at construction; positions are recomputed from
//! those parameters and the shared elapsed time every frame, never integrated.

use super::constants::*;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// One juice droplet orbiting the cut.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Ring angle, evenly spread by index.
    pub angle: f32,
    pub radial: f32,
    pub height: f32,
    /// Local-time multiplier.
    pub speed: f32,
    pub phase: f32,
    pub scale: f32,
}

impl Particle {
    #[inline]
    pub fn position_at(&self, t: f64) -> Vec3 {
        let local = t * self.speed as f64 + self.phase as f64;
        let orbit = local * DROPLET_ORBIT_RATE as f64;
        Vec3::new(
            self.angle.cos() * self.radial * orbit.cos() as f32,
            self.height + local.sin() as f32 * DROPLET_BOB,
            self.angle.sin() * self.radial * orbit.sin() as f32,
        )
    }
}

#[derive(Clone, Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn droplets(rng: &mut impl Rng, count: usize) -> Self {
        let particles = (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * TAU;
                let radial = DROPLET_RADIAL_MIN + rng.gen::<f32>() * DROPLET_RADIAL_SPAN;
                let height = rng.gen::<f32>() * DROPLET_HEIGHT_SPAN;
                let scale = DROPLET_SCALE_MIN + rng.gen::<f32>() * DROPLET_SCALE_SPAN;
                let speed = DROPLET_SPEED_MIN + rng.gen::<f32>() * DROPLET_SPEED_SPAN;
                let phase = rng.gen::<f32>() * TAU;
                Particle {
                    angle,
                    radial,
                    height,
                    speed,
                    phase,
                    scale,
                }
            })
            .collect();
        Self { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Write every droplet position at `t` into `out` (one slot per particle).
    pub fn write_positions(&self, t: f64, out: &mut [Vec3]) {
        for (slot, p) in out.iter_mut().zip(&self.particles) {
            *slot = p.position_at(t);
        }
    }
}

/// One ambient glint drifting around its home point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sparkle {
    pub home: Vec3,
    pub size: f32,
}

impl Sparkle {
    #[inline]
    pub fn position_at(&self, t: f64) -> Vec3 {
        let a = t * SPARKLE_SPEED as f64;
        let hx = self.home.x as f64;
        Vec3::new(
            self.home.x + (a + hx * 300.0).cos() as f32 * SPARKLE_JITTER,
            self.home.y + (a + hx * 100.0).sin() as f32 * SPARKLE_JITTER,
            self.home.z + (a + hx * 200.0).cos() as f32 * SPARKLE_JITTER,
        )
    }
}

#[derive(Clone, Debug)]
pub struct SparkleField {
    sparkles: Vec<Sparkle>,
}

impl SparkleField {
    /// Scatter `count` sparkles uniformly in a centred cube of edge `extent`.
    pub fn scatter(rng: &mut impl Rng, count: usize, extent: f32) -> Self {
        let sparkles = (0..count)
            .map(|_| Sparkle {
                home: Vec3::new(
                    (rng.gen::<f32>() - 0.5) * extent,
                    (rng.gen::<f32>() - 0.5) * extent,
                    (rng.gen::<f32>() - 0.5) * extent,
                ),
                size: SPARKLE_SIZE,
            })
            .collect();
        Self { sparkles }
    }

    pub fn len(&self) -> usize {
        self.sparkles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparkles.is_empty()
    }

    pub fn sparkles(&self) -> &[Sparkle] {
        &self.sparkles
    }

    pub fn write_positions(&self, t: f64, out: &mut [Vec3]) {
        for (slot, s) in out.iter_mut().zip(&self.sparkles) {
            *slot = s.position_at(t);
        }
    }
}
