//! A glass watermelon sliced forever by a floating knife, with an optional
//! procedural ASMR ambience started by a user gesture.
//!
//! Everything that decides *what* happens on a frame (cycles, poses,
//! particles, geometry, the audio graph and its lifecycle) is plain Rust and
//! testable on the host. The browser adapters (WebGPU renderer, WebAudio
//! device, DOM wiring) only exist on `wasm32`.

pub mod audio;
pub mod camera;
pub mod config;
pub mod constants;
pub mod core;
pub mod frame;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod render;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{EngineConfig, SeedPolicy};
pub use scene::{Scene, SceneRenderer};
