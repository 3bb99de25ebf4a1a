//! Per-frame transforms for the blade, the two halves and the ambient motion
//! layered on the whole assembly.

use super::clock::{lerp, TimeCycle};
use super::constants::*;
use super::geometry::Side;
use glam::{Mat4, Quat, Vec3};

/// Position plus XYZ Euler rotation (radians) of one scene node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformState {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl TransformState {
    pub const IDENTITY: TransformState = TransformState {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
    };

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_rotation_x(self.rotation.x)
            * Quat::from_rotation_y(self.rotation.y)
            * Quat::from_rotation_z(self.rotation.z)
    }

    pub fn matrix(&self, scale: Vec3) -> Mat4 {
        Mat4::from_scale_rotation_translation(scale, self.rotation_quat(), self.position)
    }
}

/// Every animated transform for one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FramePose {
    /// Sway and bob of the whole melon assembly.
    pub assembly: TransformState,
    /// Float wobble nested inside the assembly.
    pub float: TransformState,
    pub blade: TransformState,
    /// Indexed by `Side::Left`, `Side::Right`.
    pub halves: [TransformState; 2],
}

impl FramePose {
    pub fn half(&self, side: Side) -> &TransformState {
        &self.halves[side.slot()]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Kinematics {
    pub blade_cycle: TimeCycle,
    pub split_cycle: TimeCycle,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            blade_cycle: TimeCycle::new(CUT_RATE, BLADE_PHASE_OFFSET),
            split_cycle: TimeCycle::new(CUT_RATE, SPLIT_PHASE_OFFSET),
        }
    }
}

impl Kinematics {
    pub fn blade(&self, t: f64) -> TransformState {
        let e = self.blade_cycle.eased(t);
        TransformState {
            position: Vec3::new(
                lerp(BLADE_RAISED[0], BLADE_LOWERED[0], e),
                lerp(BLADE_RAISED[1], BLADE_LOWERED[1], e),
                0.0,
            ),
            rotation: Vec3::new(0.0, 0.0, lerp(BLADE_TILT_DEG[0], BLADE_TILT_DEG[1], e).to_radians()),
        }
    }

    /// Outward offset and opening angle of one half, mirrored by side.
    pub fn half(&self, side: Side, t: f64) -> TransformState {
        let e = self.split_cycle.eased(t);
        let sign = side.sign();
        TransformState {
            position: Vec3::new(sign * lerp(HALF_GAP_CLOSED, HALF_GAP_OPEN, e), 0.0, 0.0),
            rotation: Vec3::new(0.0, sign * lerp(0.0, HALF_OPEN_DEG, e).to_radians(), 0.0),
        }
    }

    /// Separation of the two halves' origins along X.
    pub fn separation(&self, t: f64) -> f32 {
        let e = self.split_cycle.eased(t);
        2.0 * lerp(HALF_GAP_CLOSED, HALF_GAP_OPEN, e)
    }

    /// Yaw sway plus a vertical bob centred on the origin.
    pub fn sway(t: f64) -> TransformState {
        let yaw = (t * SWAY_RATE as f64).sin() as f32 * SWAY_AMPLITUDE;
        let bob = (t * BOB_RATE as f64).sin() as f32 * BOB_AMPLITUDE;
        TransformState {
            position: Vec3::new(0.0, bob, 0.0),
            rotation: Vec3::new(0.0, yaw, 0.0),
        }
    }

    pub fn float(t: f64) -> TransformState {
        let s = t / 4.0 * FLOAT_SPEED as f64;
        let (sin, cos) = (s.sin() as f32, s.cos() as f32);
        TransformState {
            position: Vec3::new(0.0, sin / 10.0 * FLOAT_INTENSITY, 0.0),
            rotation: Vec3::new(cos / 8.0, sin / 8.0, sin / 20.0) * FLOAT_ROTATION_INTENSITY,
        }
    }

    /// Overwrite every transform in `pose` with its value at `t`.
    pub fn apply(&self, t: f64, pose: &mut FramePose) {
        pose.assembly = Self::sway(t);
        pose.float = Self::float(t);
        pose.blade = self.blade(t);
        for side in Side::BOTH {
            pose.halves[side.slot()] = self.half(side, t);
        }
    }

    pub fn pose(&self, t: f64) -> FramePose {
        let mut pose = FramePose::default();
        self.apply(t, &mut pose);
        pose
    }
}
