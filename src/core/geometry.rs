//! Parametric surfaces for the melon halves and the small props around them.
//!
//! Meshes are plain CPU-side vertex/index arrays so the animation core stays
//! free of any rendering library. Surfaces are immutable once built and are
//! shared behind `Rc` by every renderer node that draws them.

use super::constants::{FLESH_RADIUS, OUTER_RADIUS, RIND_RADIUS};
use glam::Vec3;
use std::cell::OnceCell;
use std::f32::consts::PI;
use std::rc::Rc;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("half side must be -1 or +1, got {0}")]
    InvalidSide(i32),
}

/// Which half of the bisected body; `Left` is `-1`, `Right` is `+1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    /// Azimuth where this half's sweep starts; the sweep always spans `π`.
    #[inline]
    pub fn phi_start(self) -> f32 {
        match self {
            Side::Left => 0.0,
            Side::Right => PI,
        }
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

impl TryFrom<i32> for Side {
    type Error = GeometryError;

    fn try_from(sign: i32) -> Result<Self, Self::Error> {
        match sign {
            -1 => Ok(Side::Left),
            1 => Ok(Side::Right),
            other => Err(GeometryError::InvalidSide(other)),
        }
    }
}

/// Indexed triangle mesh with per-vertex normals and UVs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        self.uvs.push(uv);
        index
    }

    /// Latitude/longitude sphere patch covering azimuths
    /// `[phi_start, phi_start + phi_length]` and the full polar range.
    ///
    /// Uses `x = −r·cos φ·sin θ`, `y = r·cos θ`, `z = r·sin φ·sin θ`, so a
    /// patch starting at `π` is the point reflection (through the Y axis) of
    /// the one starting at `0`.
    pub fn sphere_segment(
        radius: f32,
        width_segments: u32,
        height_segments: u32,
        phi_start: f32,
        phi_length: f32,
    ) -> Self {
        assert!(
            width_segments >= 3 && height_segments >= 2,
            "sphere tessellation too coarse: {width_segments}x{height_segments}"
        );
        let mut mesh = SurfaceMesh::default();
        let stride = width_segments + 1;
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            // Pole rows shift their UVs half a cell so texture seams stay symmetric
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };
            let theta = v * PI;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = phi_start + u * phi_length;
                let p = Vec3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                );
                mesh.push_vertex(p, p.normalize_or_zero(), [u + u_offset, 1.0 - v]);
            }
        }
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * stride + ix + 1;
                let b = iy * stride + ix;
                let c = (iy + 1) * stride + ix;
                let d = (iy + 1) * stride + ix + 1;
                if iy != 0 {
                    mesh.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    mesh.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        mesh
    }

    pub fn sphere(radius: f32, segments: u32) -> Self {
        Self::sphere_segment(radius, segments, segments, 0.0, 2.0 * PI)
    }

    /// Axis-aligned box centred on the origin.
    pub fn cuboid(size: [f32; 3]) -> Self {
        let half = Vec3::from_array(size) * 0.5;
        // (normal, u axis, v axis) with u × v == normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let mut mesh = SurfaceMesh::default();
        for (n, u, v) in faces {
            let base = mesh.positions.len() as u32;
            for (su, sv, uv) in [
                (-1.0, -1.0, [0.0, 1.0]),
                (1.0, -1.0, [1.0, 1.0]),
                (1.0, 1.0, [1.0, 0.0]),
                (-1.0, 1.0, [0.0, 0.0]),
            ] {
                mesh.push_vertex((n + u * su + v * sv) * half, n, uv);
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// Capped cylinder along Y; a zero `radius_top` gives a cone.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        assert!(radial_segments >= 3, "cylinder needs at least 3 segments");
        let mut mesh = SurfaceMesh::default();
        let half_height = height * 0.5;
        let slope = (radius_bottom - radius_top) / height;
        let stride = radial_segments + 1;
        for (row, radius, y) in [(0.0, radius_top, half_height), (1.0, radius_bottom, -half_height)] {
            for x in 0..=radial_segments {
                let u = x as f32 / radial_segments as f32;
                let (sin, cos) = (u * 2.0 * PI).sin_cos();
                let normal = Vec3::new(sin, slope, cos).normalize();
                mesh.push_vertex(Vec3::new(radius * sin, y, radius * cos), normal, [u, 1.0 - row]);
            }
        }
        for x in 0..radial_segments {
            let a = x;
            let b = stride + x;
            let c = stride + x + 1;
            let d = x + 1;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
        for (radius, sign) in [(radius_top, 1.0_f32), (radius_bottom, -1.0)] {
            if radius <= 0.0 {
                continue;
            }
            let normal = Vec3::Y * sign;
            let center = mesh.push_vertex(Vec3::Y * half_height * sign, normal, [0.5, 0.5]);
            let ring = mesh.positions.len() as u32;
            for x in 0..=radial_segments {
                let (sin, cos) = (x as f32 / radial_segments as f32 * 2.0 * PI).sin_cos();
                mesh.push_vertex(
                    Vec3::new(radius * sin, half_height * sign, radius * cos),
                    normal,
                    [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5],
                );
            }
            for x in 0..radial_segments {
                let i = ring + x;
                if sign > 0.0 {
                    mesh.indices.extend_from_slice(&[i, i + 1, center]);
                } else {
                    mesh.indices.extend_from_slice(&[i + 1, i, center]);
                }
            }
        }
        mesh
    }

    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self::cylinder(0.0, radius, height, radial_segments)
    }

    /// Square in the XZ plane facing +Y, UVs spanning \[0, 1\].
    pub fn ground_plane(size: f32) -> Self {
        let h = size * 0.5;
        let mut mesh = SurfaceMesh::default();
        for (x, z, uv) in [
            (-h, -h, [0.0, 0.0]),
            (-h, h, [0.0, 1.0]),
            (h, h, [1.0, 1.0]),
            (h, -h, [1.0, 0.0]),
        ] {
            mesh.push_vertex(Vec3::new(x, 0.0, z), Vec3::Y, uv);
        }
        mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
        mesh
    }
}

/// The three nested hemispherical surfaces of one melon half.
#[derive(Debug)]
pub struct HalfGeometry {
    pub side: Side,
    pub shell: Rc<SurfaceMesh>,
    pub flesh: Rc<SurfaceMesh>,
    pub rind: Rc<SurfaceMesh>,
}

impl HalfGeometry {
    pub fn build(side: Side, segments: u32) -> Self {
        let hemisphere =
            |radius| Rc::new(SurfaceMesh::sphere_segment(radius, segments, segments, side.phi_start(), PI));
        Self {
            side,
            shell: hemisphere(OUTER_RADIUS),
            flesh: hemisphere(FLESH_RADIUS),
            rind: hemisphere(RIND_RADIUS),
        }
    }
}

/// Builds each half at most once per scene and hands out shared references.
pub struct GeometryFactory {
    segments: u32,
    halves: [OnceCell<Rc<HalfGeometry>>; 2],
}

impl GeometryFactory {
    pub fn new(segments: u32) -> Self {
        assert!(segments >= 3, "hemisphere tessellation must be at least 3, got {segments}");
        Self {
            segments,
            halves: [OnceCell::new(), OnceCell::new()],
        }
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn half(&self, side: Side) -> Rc<HalfGeometry> {
        self.halves[side.slot()]
            .get_or_init(|| {
                log::debug!("[geometry] building {:?} half at {} segments", side, self.segments);
                Rc::new(HalfGeometry::build(side, self.segments))
            })
            .clone()
    }
}
