pub mod clock;
pub mod constants;
pub mod geometry;
pub mod kinematics;
pub mod particles;

pub use clock::*;
pub use constants::*;
pub use geometry::*;
pub use kinematics::*;
pub use particles::*;

// Shader bundled as a string constant
#[cfg(target_arch = "wasm32")]
pub static SCENE_WGSL: &str = include_str!("../../shaders/scene.wgsl");
