//! Scene composition: the boundary between the animation core and a renderer.
//!
//! The static stage (lights, environment, contact shadow, camera) and the
//! node hierarchy are assembled once. Each frame the composer's transforms
//! are applied to the renderer's nodes and the frame is submitted.

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::constants::{DROPLET_SEED_STREAM, SPARKLE_SEED_STREAM};
use crate::core::*;
use crate::frame::FrameUpdate;
use glam::Vec3;
use std::rc::Rc;

pub type Rgb = [f32; 3];

/// Split a `0xRRGGBB` colour into sRGB-encoded channels in \[0, 1\].
pub fn hex_rgb(hex: u32) -> Rgb {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Rough/metal surface lit by the stage lights and environment.
    Standard,
    /// Thin transmissive surface with clearcoat highlights.
    Glass,
    /// Flat colour, no lighting.
    Unlit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialDesc {
    pub shading: Shading,
    pub color: Rgb,
    pub opacity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub transmission: f32,
    pub clearcoat: f32,
    pub env_intensity: f32,
}

impl MaterialDesc {
    fn standard(color: u32, roughness: f32, metalness: f32) -> Self {
        Self {
            shading: Shading::Standard,
            color: hex_rgb(color),
            opacity: 1.0,
            roughness,
            metalness,
            transmission: 0.0,
            clearcoat: 0.0,
            env_intensity: 1.0,
        }
    }

    pub fn glass_shell() -> Self {
        Self {
            shading: Shading::Glass,
            transmission: 0.98,
            clearcoat: 1.0,
            ..Self::standard(GLASS_COLOR, 0.04, 0.05)
        }
    }

    pub fn flesh() -> Self {
        Self {
            shading: Shading::Glass,
            opacity: 0.8,
            transmission: 0.45,
            ..Self::standard(FLESH_COLOR, 0.25, 0.05)
        }
    }

    pub fn rind() -> Self {
        Self {
            opacity: 0.85,
            ..Self::standard(RIND_COLOR, 0.3, 0.15)
        }
    }

    pub fn seed() -> Self {
        Self::standard(SEED_COLOR, 0.35, 0.0)
    }

    pub fn blade_steel() -> Self {
        Self {
            env_intensity: 1.4,
            ..Self::standard(BLADE_COLOR, 0.1, 0.85)
        }
    }

    pub fn handle() -> Self {
        Self::standard(HANDLE_COLOR, 0.4, 0.3)
    }

    pub fn droplet() -> Self {
        Self {
            shading: Shading::Glass,
            opacity: 0.9,
            transmission: 0.95,
            ..Self::standard(GLASS_COLOR, 0.02, 0.0)
        }
    }

    pub fn sparkle() -> Self {
        Self {
            shading: Shading::Unlit,
            opacity: SPARKLE_OPACITY,
            ..Self::standard(SPARKLE_COLOR, 1.0, 0.0)
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0 || self.transmission > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub intensity: f32,
    pub position: Vec3,
    pub cast_shadow: bool,
}

/// Emissive panel that only shows up in reflections.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lightformer {
    pub intensity: f32,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvironmentPreset {
    Studio,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Environment {
    pub preset: EnvironmentPreset,
    pub lightformers: [Lightformer; 2],
}

/// Soft blob shadow on the ground plane under the melon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactShadow {
    pub opacity: f32,
    pub scale: f32,
    pub blur: f32,
    pub far: f32,
    pub position: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToneMapping {
    AcesFilmic,
}

/// Everything about the frame that never changes after setup.
#[derive(Clone, Debug, PartialEq)]
pub struct StageDesc {
    pub camera: Camera,
    pub ambient_intensity: f32,
    pub lights: [DirectionalLight; 2],
    pub environment: Environment,
    pub contact_shadow: ContactShadow,
    pub tone_mapping: ToneMapping,
}

impl StageDesc {
    pub fn studio() -> Self {
        Self {
            camera: Camera::stage(),
            ambient_intensity: 0.5,
            lights: [
                DirectionalLight {
                    intensity: 1.6,
                    position: Vec3::new(4.0, 3.0, 2.0),
                    cast_shadow: true,
                },
                DirectionalLight {
                    intensity: 0.8,
                    position: Vec3::new(-3.0, 4.0, -2.0),
                    cast_shadow: false,
                },
            ],
            environment: Environment {
                preset: EnvironmentPreset::Studio,
                lightformers: [
                    Lightformer {
                        intensity: 4.0,
                        position: Vec3::new(2.5, 2.0, -1.0),
                        rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
                        scale: Vec3::new(2.0, 3.0, 1.0),
                    },
                    Lightformer {
                        intensity: 3.0,
                        position: Vec3::new(-2.0, 1.5, 2.0),
                        rotation: Vec3::new(0.0, -std::f32::consts::FRAC_PI_2, 0.0),
                        scale: Vec3::new(1.5, 2.5, 0.5),
                    },
                ],
            },
            contact_shadow: ContactShadow {
                opacity: SHADOW_OPACITY,
                scale: SHADOW_SCALE,
                blur: SHADOW_BLUR,
                far: SHADOW_FAR,
                position: Vec3::from_array(SHADOW_POSITION),
            },
            tone_mapping: ToneMapping::AcesFilmic,
        }
    }
}

/// One drawable surface instance.
#[derive(Clone, Debug)]
pub struct MeshDesc {
    pub label: &'static str,
    pub surface: Rc<SurfaceMesh>,
    pub material: MaterialDesc,
    pub transform: TransformState,
    pub scale: Vec3,
    pub cast_shadow: bool,
}

/// What the composer needs from a rasterizer.
///
/// Nodes form a hierarchy: a child's transform is relative to its parent.
/// Nodes are created parent-first and live as long as the renderer.
pub trait SceneRenderer {
    type Node: Copy;

    fn configure_stage(&mut self, stage: &StageDesc) -> anyhow::Result<()>;

    fn create_group(
        &mut self,
        label: &'static str,
        parent: Option<Self::Node>,
        transform: TransformState,
    ) -> anyhow::Result<Self::Node>;

    fn create_mesh(&mut self, parent: Option<Self::Node>, mesh: MeshDesc) -> anyhow::Result<Self::Node>;

    fn set_transform(&mut self, node: Self::Node, transform: &TransformState);

    /// Draw one frame with the transforms applied so far.
    fn submit(&mut self, elapsed: f64) -> anyhow::Result<()>;
}

struct SceneNodes<N> {
    assembly: N,
    float: N,
    halves: [N; 2],
    blade: N,
    droplets: Vec<N>,
    sparkles: Vec<N>,
}

pub struct Scene<R: SceneRenderer> {
    renderer: R,
    geometry: GeometryFactory,
    kinematics: Kinematics,
    pose: FramePose,
    droplets: ParticleField,
    sparkles: SparkleField,
    scratch: Vec<Vec3>,
    nodes: SceneNodes<R::Node>,
}

impl<R: SceneRenderer> Scene<R> {
    pub fn new(mut renderer: R, config: &EngineConfig) -> anyhow::Result<Self> {
        let geometry = GeometryFactory::new(config.hemisphere_segments);
        let kinematics = Kinematics::default();
        let pose = kinematics.pose(0.0);
        let droplets = ParticleField::droplets(&mut config.seed.rng(DROPLET_SEED_STREAM), DROPLET_COUNT);
        let sparkles = SparkleField::scatter(
            &mut config.seed.rng(SPARKLE_SEED_STREAM),
            SPARKLE_COUNT,
            SPARKLE_EXTENT,
        );

        renderer.configure_stage(&StageDesc::studio())?;

        let assembly = renderer.create_group("assembly", None, pose.assembly)?;
        let float = renderer.create_group("float", Some(assembly), pose.float)?;

        let seed_cone = Rc::new(SurfaceMesh::cone(SEED_CONE[0], SEED_CONE[1], SEED_SEGMENTS));
        let mut halves = Vec::with_capacity(2);
        for side in Side::BOTH {
            let group = renderer.create_group("half", Some(float), *pose.half(side))?;
            build_half(&mut renderer, group, &geometry.half(side), &seed_cone)?;
            halves.push(group);
        }
        let halves = [halves[0], halves[1]];

        let droplet_sphere = Rc::new(SurfaceMesh::sphere(1.0, DROPLET_SEGMENTS));
        let droplet_group = renderer.create_group("droplets", Some(float), TransformState::IDENTITY)?;
        let droplet_nodes = droplets
            .particles()
            .iter()
            .map(|p| {
                renderer.create_mesh(
                    Some(droplet_group),
                    MeshDesc {
                        label: "droplet",
                        surface: droplet_sphere.clone(),
                        material: MaterialDesc::droplet(),
                        transform: TransformState::at(p.position_at(0.0)),
                        scale: Vec3::splat(p.scale),
                        cast_shadow: true,
                    },
                )
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let knife = renderer.create_group(
            "knife",
            None,
            TransformState::at(Vec3::from_array(KNIFE_GROUP_POSITION)),
        )?;
        let blade = renderer.create_mesh(
            Some(knife),
            MeshDesc {
                label: "blade",
                surface: Rc::new(SurfaceMesh::cuboid(BLADE_SIZE)),
                material: MaterialDesc::blade_steel(),
                transform: pose.blade,
                scale: Vec3::ONE,
                cast_shadow: true,
            },
        )?;
        renderer.create_mesh(
            Some(knife),
            MeshDesc {
                label: "handle",
                surface: Rc::new(SurfaceMesh::cylinder(
                    HANDLE_RADII[0],
                    HANDLE_RADII[1],
                    HANDLE_HEIGHT,
                    HANDLE_SEGMENTS,
                )),
                material: MaterialDesc::handle(),
                transform: TransformState::at(Vec3::from_array(HANDLE_POSITION)),
                scale: Vec3::ONE,
                cast_shadow: true,
            },
        )?;

        let sparkle_sphere = Rc::new(SurfaceMesh::sphere(1.0, 6));
        let sparkle_nodes = sparkles
            .sparkles()
            .iter()
            .map(|s| {
                renderer.create_mesh(
                    None,
                    MeshDesc {
                        label: "sparkle",
                        surface: sparkle_sphere.clone(),
                        material: MaterialDesc::sparkle(),
                        transform: TransformState::at(s.position_at(0.0)),
                        scale: Vec3::splat(s.size * SPARKLE_WORLD_SCALE),
                        cast_shadow: false,
                    },
                )
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        log::info!(
            "[scene] assembled: droplets={} sparkles={} segments={}",
            droplets.len(),
            sparkles.len(),
            geometry.segments()
        );

        let scratch = Vec::with_capacity(droplets.len().max(sparkles.len()));
        Ok(Self {
            renderer,
            geometry,
            kinematics,
            pose,
            droplets,
            sparkles,
            scratch,
            nodes: SceneNodes {
                assembly,
                float,
                halves,
                blade,
                droplets: droplet_nodes,
                sparkles: sparkle_nodes,
            },
        })
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn pose(&self) -> &FramePose {
        &self.pose
    }

    pub fn geometry(&self) -> &GeometryFactory {
        &self.geometry
    }

    pub fn droplets(&self) -> &ParticleField {
        &self.droplets
    }

    pub fn sparkles(&self) -> &SparkleField {
        &self.sparkles
    }

    /// Compute every transform at `t`, push them to the renderer, then submit.
    pub fn render_frame(&mut self, t: f64) -> anyhow::Result<()> {
        self.kinematics.apply(t, &mut self.pose);
        let r = &mut self.renderer;
        r.set_transform(self.nodes.assembly, &self.pose.assembly);
        r.set_transform(self.nodes.float, &self.pose.float);
        r.set_transform(self.nodes.blade, &self.pose.blade);
        for side in Side::BOTH {
            r.set_transform(self.nodes.halves[side.slot()], self.pose.half(side));
        }

        self.scratch.resize(self.droplets.len(), Vec3::ZERO);
        self.droplets.write_positions(t, &mut self.scratch);
        for (node, p) in self.nodes.droplets.iter().zip(&self.scratch) {
            r.set_transform(*node, &TransformState::at(*p));
        }

        self.scratch.resize(self.sparkles.len(), Vec3::ZERO);
        self.sparkles.write_positions(t, &mut self.scratch);
        for (node, p) in self.nodes.sparkles.iter().zip(&self.scratch) {
            r.set_transform(*node, &TransformState::at(*p));
        }

        r.submit(t)
    }
}

impl<R: SceneRenderer> FrameUpdate for Scene<R> {
    fn update(&mut self, elapsed: f64) -> anyhow::Result<()> {
        self.render_frame(elapsed)
    }
}

// Shell, flesh and rind plus the seed ring on the cut face.
fn build_half<R: SceneRenderer>(
    renderer: &mut R,
    group: R::Node,
    half: &HalfGeometry,
    seed_cone: &Rc<SurfaceMesh>,
) -> anyhow::Result<()> {
    let layers = [
        ("shell", &half.shell, MaterialDesc::glass_shell(), true),
        ("flesh", &half.flesh, MaterialDesc::flesh(), false),
        ("rind", &half.rind, MaterialDesc::rind(), false),
    ];
    for (label, surface, material, cast_shadow) in layers {
        renderer.create_mesh(
            Some(group),
            MeshDesc {
                label,
                surface: surface.clone(),
                material,
                transform: TransformState::IDENTITY,
                scale: Vec3::ONE,
                cast_shadow,
            },
        )?;
    }

    let sign = half.side.sign();
    let cluster = renderer.create_group(
        "seeds",
        Some(group),
        TransformState::at(Vec3::new(sign * SEED_CLUSTER_OFFSET[0], SEED_CLUSTER_OFFSET[1], 0.0)),
    )?;
    for i in 0..SEEDS_PER_HALF {
        let angle = i as f32 / SEEDS_PER_HALF as f32 * std::f32::consts::PI - std::f32::consts::FRAC_PI_2;
        renderer.create_mesh(
            Some(cluster),
            MeshDesc {
                label: "seed",
                surface: seed_cone.clone(),
                material: MaterialDesc::seed(),
                transform: TransformState::at(Vec3::new(
                    angle.cos() * SEED_ELLIPSE[0],
                    angle.sin() * SEED_ELLIPSE[1],
                    sign * SEED_DEPTH,
                ))
                .with_rotation(Vec3::new(0.0, sign * SEED_TILT, 0.0)),
                scale: Vec3::ONE,
                cast_shadow: false,
            },
        )?;
    }
    Ok(())
}
