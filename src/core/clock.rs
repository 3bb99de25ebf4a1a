//! Phase and easing helpers driven by a single elapsed-time value.
//!
//! Everything here is a pure function of `t`; callers may evaluate any time in
//! any order and always get the same answer.

use std::f64::consts::TAU;

/// Cubic smoothstep `x²(3 − 2x)`; input is clamped to \[0, 1\].
#[inline]
pub fn smoothstep(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

#[inline]
pub fn lerp(a: f32, b: f32, f: f32) -> f32 {
    a + (b - a) * f
}

/// Periodic motion descriptor: `rate` in radians per second, `phase_offset` in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeCycle {
    pub rate: f32,
    pub phase_offset: f32,
}

impl TimeCycle {
    pub const fn new(rate: f32, phase_offset: f32) -> Self {
        Self { rate, phase_offset }
    }

    /// Seconds per full back-and-forth cycle.
    pub fn period(&self) -> f64 {
        TAU / self.rate as f64
    }

    /// Normalized phase `(sin(t·rate + offset) + 1) / 2`, in \[0, 1\].
    ///
    /// Time is kept in `f64` until after the sine so long sessions don't
    /// quantize the motion.
    #[inline]
    pub fn phase(&self, t: f64) -> f32 {
        let s = (t * self.rate as f64 + self.phase_offset as f64).sin();
        (((s + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
    }

    /// Eased interpolation factor with zero velocity at both turning points.
    #[inline]
    pub fn eased(&self, t: f64) -> f32 {
        smoothstep(self.phase(t))
    }
}
