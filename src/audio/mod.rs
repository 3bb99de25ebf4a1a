//! Procedural ambience: the device boundary, the graph builder and the
//! gesture-gated lifecycle controller.

use std::future::Future;

pub mod graph;
pub mod headless;
pub mod lifecycle;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use graph::{build_graph, build_noise_buffer, noise_envelope, AudioGraph, GraphId};
pub use headless::{HeadlessDevice, HeadlessFactory, NodeKind, ResumeBehavior};
pub use lifecycle::{Affordance, AudioController, AudioState, WeakAudioController};

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("failed to create {node} node: {reason}")]
    NodeCreation { node: &'static str, reason: String },

    #[error("failed to connect {from} -> {to}: {reason}")]
    Connection {
        from: &'static str,
        to: &'static str,
        reason: String,
    },

    #[error("failed to {action} generator: {reason}")]
    Scheduling { action: &'static str, reason: String },

    #[error("resume rejected: {0}")]
    ResumeRejected(String),

    #[error("audio device is closed")]
    Closed,
}

/// Running state reported by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceState {
    Suspended,
    Running,
    Closed,
}

/// Minimal audio device capable of hosting the ambience graph.
///
/// Handles are cheap to clone and refer to the same underlying device.
pub trait AudioDevice: Clone {
    type Node: Clone;

    fn sample_rate(&self) -> f32;

    fn state(&self) -> DeviceState;

    /// Looping mono source playing `samples` at the device rate.
    fn create_loop_source(&self, samples: &[f32]) -> AudioResult<Self::Node>;

    fn create_lowpass(&self, cutoff_hz: f32, q: f32) -> AudioResult<Self::Node>;

    fn create_gain(&self, gain: f32) -> AudioResult<Self::Node>;

    /// Sine oscillator.
    fn create_oscillator(&self, frequency_hz: f32) -> AudioResult<Self::Node>;

    fn connect(&self, from: &Self::Node, to: &Self::Node) -> AudioResult<()>;

    /// Route `from` into the gain parameter of `gain_node`, summed with its base value.
    fn connect_gain_param(&self, from: &Self::Node, gain_node: &Self::Node) -> AudioResult<()>;

    fn connect_destination(&self, from: &Self::Node) -> AudioResult<()>;

    fn start(&self, source: &Self::Node) -> AudioResult<()>;

    fn stop(&self, source: &Self::Node) -> AudioResult<()>;

    /// Ask the device to run; hosts may refuse without a user gesture.
    fn resume(&self) -> impl Future<Output = AudioResult<()>>;

    /// Release the device. Closing an already closed device is a no-op.
    fn close(&self) -> AudioResult<()>;
}

/// Opens a fresh device for each activation attempt.
pub trait DeviceFactory {
    type Device: AudioDevice;

    fn open(&mut self) -> AudioResult<Self::Device>;
}
