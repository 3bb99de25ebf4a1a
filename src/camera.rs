//! Fixed stage camera.
//!
//! The framing never animates; only the aspect ratio follows the canvas.

use crate::core::{CAMERA_EYE, CAMERA_FOV_DEG, CAMERA_ZFAR, CAMERA_ZNEAR};
use glam::{Mat4, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// The stage camera looking at the origin; portrait aspect until resized.
    pub fn stage() -> Self {
        Self {
            eye: Vec3::from_array(CAMERA_EYE),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 9.0 / 16.0,
            fovy_radians: CAMERA_FOV_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }

    pub fn with_aspect(&self, aspect: f32) -> Self {
        Self {
            aspect: aspect.max(1e-3),
            ..self.clone()
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
