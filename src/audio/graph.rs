//! The fixed ambience topology:
//!
//! ```text
//! noise loop -> lowpass -> noise gain ----\
//!                                          +--> master -> destination
//! shimmer osc -> shimmer gain ------------/
//!                    ^ (gain param)
//! lfo osc -> lfo depth
//! ```
//!
//! Once started the graph runs on the device's own clock with no further
//! input; the LFO modulation is part of the wiring, not a per-frame update.

use super::{AudioDevice, AudioError, AudioResult};
use crate::constants::*;
use rand::Rng;
use smallvec::{smallvec, SmallVec};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one constructed graph; never reused within a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphId(u64);

/// Symmetric loop envelope `(1 − |0.5 − p|·2)^1.8`; zero at both ends.
#[inline]
pub fn noise_envelope(progress: f32) -> f32 {
    (1.0 - (0.5 - progress).abs() * 2.0)
        .max(0.0)
        .powf(NOISE_ENVELOPE_EXPONENT)
}

/// One loop's worth of enveloped white noise.
pub fn build_noise_buffer(sample_rate: f32, seconds: f32, rng: &mut impl Rng) -> Vec<f32> {
    let len = (seconds * sample_rate).max(0.0) as usize;
    (0..len)
        .map(|i| {
            let progress = i as f32 / len as f32;
            (rng.gen::<f32>() * 2.0 - 1.0) * noise_envelope(progress) * NOISE_AMPLITUDE
        })
        .collect()
}

pub struct AudioGraph<N> {
    id: GraphId,
    pub master: N,
    pub noise: N,
    pub lowpass: N,
    pub noise_gain: N,
    pub shimmer: N,
    pub shimmer_gain: N,
    pub lfo: N,
    pub lfo_depth: N,
    pub noise_len: usize,
}

impl<N> AudioGraph<N> {
    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Source nodes that must be stopped on teardown.
    pub fn generators(&self) -> SmallVec<[&N; 3]> {
        smallvec![&self.noise, &self.shimmer, &self.lfo]
    }
}

fn link<D: AudioDevice>(
    device: &D,
    (from, from_name): (&D::Node, &'static str),
    (to, to_name): (&D::Node, &'static str),
) -> AudioResult<()> {
    device.connect(from, to).map_err(|e| AudioError::Connection {
        from: from_name,
        to: to_name,
        reason: e.to_string(),
    })
}

/// Build, wire and start the ambience graph on `device`.
///
/// Every node is created and connected before any generator starts. If a
/// generator fails to start, the ones already running are stopped again.
pub fn build_graph<D: AudioDevice>(device: &D, rng: &mut impl Rng) -> AudioResult<AudioGraph<D::Node>> {
    let master = device.create_gain(MASTER_GAIN)?;
    device
        .connect_destination(&master)
        .map_err(|e| AudioError::Connection {
            from: "master",
            to: "destination",
            reason: e.to_string(),
        })?;

    // Noise loop layer
    let samples = build_noise_buffer(device.sample_rate(), NOISE_LOOP_SECONDS, rng);
    let noise = device.create_loop_source(&samples)?;
    let lowpass = device.create_lowpass(NOISE_LOWPASS_HZ, NOISE_LOWPASS_Q)?;
    let noise_gain = device.create_gain(NOISE_GAIN)?;
    link(device, (&noise, "noise"), (&lowpass, "lowpass"))?;
    link(device, (&lowpass, "lowpass"), (&noise_gain, "noise gain"))?;
    link(device, (&noise_gain, "noise gain"), (&master, "master"))?;

    // Shimmer layer with LFO on its gain
    let shimmer = device.create_oscillator(SHIMMER_HZ)?;
    let shimmer_gain = device.create_gain(SHIMMER_FLOOR)?;
    let lfo = device.create_oscillator(LFO_HZ)?;
    let lfo_depth = device.create_gain(LFO_DEPTH)?;
    link(device, (&lfo, "lfo"), (&lfo_depth, "lfo depth"))?;
    device
        .connect_gain_param(&lfo_depth, &shimmer_gain)
        .map_err(|e| AudioError::Connection {
            from: "lfo depth",
            to: "shimmer gain param",
            reason: e.to_string(),
        })?;
    link(device, (&shimmer, "shimmer"), (&shimmer_gain, "shimmer gain"))?;
    link(device, (&shimmer_gain, "shimmer gain"), (&master, "master"))?;

    let graph = AudioGraph {
        id: GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed)),
        master,
        noise,
        lowpass,
        noise_gain,
        shimmer,
        shimmer_gain,
        lfo,
        lfo_depth,
        noise_len: samples.len(),
    };
    start_generators(device, &graph)?;
    log::info!(
        "[audio] graph {:?} built: noise={} samples @ {} Hz",
        graph.id,
        graph.noise_len,
        device.sample_rate()
    );
    Ok(graph)
}

fn start_generators<D: AudioDevice>(device: &D, graph: &AudioGraph<D::Node>) -> AudioResult<()> {
    let mut started: SmallVec<[&D::Node; 3]> = SmallVec::new();
    for node in graph.generators() {
        if let Err(e) = device.start(node) {
            for running in &started {
                _ = device.stop(running);
            }
            return Err(e);
        }
        started.push(node);
    }
    Ok(())
}

/// Stop every generator, logging (not failing on) individual errors.
pub(crate) fn stop_generators<D: AudioDevice>(device: &D, graph: &AudioGraph<D::Node>) {
    for node in graph.generators() {
        if let Err(e) = device.stop(node) {
            log::warn!("[audio] stop failed on graph {:?}: {}", graph.id, e);
        }
    }
}
