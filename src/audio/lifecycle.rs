//! Gesture-gated lifecycle of the ambience graph.
//!
//! ```text
//! Uninitialized --gesture--> Active <--gesture/host--> Suspended
//!        \                     |                          /
//!         +------------- release / drop ---------------- +--> Closed
//! ```
//!
//! The graph is built lazily on the first gesture and at most once per
//! device. Failures are logged and leave the controller retryable; nothing
//! here ever propagates an error to the host.

use super::graph::{build_graph, stop_generators, AudioGraph, GraphId};
use super::{AudioDevice, AudioResult, DeviceFactory, DeviceState};
use crate::config::{EngineConfig, SeedPolicy};
use crate::constants::NOISE_SEED_STREAM;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioState {
    Uninitialized,
    Active,
    Suspended,
    /// Terminal.
    Closed,
}

/// What the host's audio button should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affordance {
    Idle,
    Priming,
    Active,
}

impl Affordance {
    pub fn label(self) -> &'static str {
        match self {
            Affordance::Idle => "Tap for ASMR Audio",
            Affordance::Priming => "Priming...",
            Affordance::Active => "ASMR Active",
        }
    }

    /// The button stays tappable until audio is running.
    pub fn is_interactive(self) -> bool {
        self != Affordance::Active
    }
}

struct Session<D: AudioDevice> {
    device: D,
    graph: AudioGraph<D::Node>,
}

impl<D: AudioDevice> Session<D> {
    fn teardown(self) {
        stop_generators(&self.device, &self.graph);
        if let Err(e) = self.device.close() {
            log::warn!("[audio] close failed for graph {:?}: {}", self.graph.id(), e);
        }
    }
}

struct Inner<F: DeviceFactory> {
    factory: F,
    state: AudioState,
    session: Option<Session<F::Device>>,
    activating: bool,
    builds: u32,
    seed: SeedPolicy,
    retry_limit: u32,
}

impl<F: DeviceFactory> Inner<F> {
    fn transition(&mut self, next: AudioState) {
        if self.state != next {
            log::info!("[audio] {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    // Open a device and build the graph on it; a half-built device is closed, never kept.
    fn construct(&mut self) -> AudioResult<Session<F::Device>> {
        let device = self.factory.open()?;
        let mut rng = self.seed.rng(NOISE_SEED_STREAM);
        match build_graph(&device, &mut rng) {
            Ok(graph) => {
                self.builds += 1;
                Ok(Session { device, graph })
            }
            Err(e) => {
                if let Err(close_err) = device.close() {
                    log::warn!("[audio] discarding partial graph: close failed: {}", close_err);
                }
                Err(e)
            }
        }
    }

    fn discard_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.teardown();
        }
    }
}

impl<F: DeviceFactory> Drop for Inner<F> {
    fn drop(&mut self) {
        if self.state != AudioState::Closed {
            log::info!("[audio] controller dropped while {:?}; releasing device", self.state);
            self.state = AudioState::Closed;
            self.discard_session();
        }
    }
}

/// Owns the single audio session of a scene.
///
/// Cheap to clone; clones share the same session. The device is released by
/// `release()` or when the last clone is dropped, whichever comes first.
/// Long-lived callbacks should hold a `WeakAudioController` so they do not
/// keep the session alive.
pub struct AudioController<F: DeviceFactory> {
    inner: Rc<RefCell<Inner<F>>>,
}

/// Non-owning handle to an `AudioController`.
pub struct WeakAudioController<F: DeviceFactory> {
    inner: Weak<RefCell<Inner<F>>>,
}

impl<F: DeviceFactory> Clone for WeakAudioController<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F: DeviceFactory> WeakAudioController<F> {
    /// The controller, unless every owning handle has been dropped.
    pub fn upgrade(&self) -> Option<AudioController<F>> {
        self.inner.upgrade().map(|inner| AudioController { inner })
    }
}

impl<F: DeviceFactory> Clone for AudioController<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F: DeviceFactory> AudioController<F> {
    pub fn new(factory: F, config: &EngineConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                factory,
                state: AudioState::Uninitialized,
                session: None,
                activating: false,
                builds: 0,
                seed: config.seed,
                retry_limit: config.resume_retry_limit,
            })),
        }
    }

    pub fn downgrade(&self) -> WeakAudioController<F> {
        WeakAudioController {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn state(&self) -> AudioState {
        self.inner.borrow().state
    }

    pub fn affordance(&self) -> Affordance {
        let inner = self.inner.borrow();
        match inner.state {
            AudioState::Active => Affordance::Active,
            _ if inner.activating => Affordance::Priming,
            _ => Affordance::Idle,
        }
    }

    pub fn is_activating(&self) -> bool {
        self.inner.borrow().activating
    }

    /// Identity of the live graph, if one is built.
    pub fn graph_id(&self) -> Option<GraphId> {
        self.inner.borrow().session.as_ref().map(|s| s.graph.id())
    }

    /// How many graphs this controller has successfully built.
    pub fn builds(&self) -> u32 {
        self.inner.borrow().builds
    }

    pub fn device(&self) -> Option<F::Device> {
        self.inner.borrow().session.as_ref().map(|s| s.device.clone())
    }

    /// React to a user gesture: build the graph if needed, then bring the
    /// device to running.
    ///
    /// Idempotent while active or while a previous activation is still in
    /// flight. Never fails: errors are logged and the returned state tells
    /// the caller where the controller ended up.
    pub async fn activate(&self) -> AudioState {
        let Some(device) = self.begin_activation() else {
            return self.state();
        };
        let retry_limit = self.inner.borrow().retry_limit;
        // No borrow is held across this await: teardown may run meanwhile.
        let outcome = resume_until_running(&device, retry_limit).await;
        self.finish_activation(outcome, retry_limit)
    }

    fn begin_activation(&self) -> Option<F::Device> {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            AudioState::Closed => {
                log::debug!("[audio] gesture ignored: controller closed");
                return None;
            }
            _ if inner.activating => {
                log::debug!("[audio] gesture ignored: activation already in flight");
                return None;
            }
            AudioState::Active => {
                let running = inner
                    .session
                    .as_ref()
                    .is_some_and(|s| s.device.state() == DeviceState::Running);
                if running {
                    return None;
                }
            }
            AudioState::Uninitialized | AudioState::Suspended => {}
        }
        if inner.session.is_none() {
            match inner.construct() {
                Ok(session) => inner.session = Some(session),
                Err(e) => {
                    log::error!("[audio] Failed to start ASMR audio: {}", e);
                    return None;
                }
            }
        }
        inner.activating = true;
        inner.session.as_ref().map(|s| s.device.clone())
    }

    fn finish_activation(&self, outcome: AudioResult<DeviceState>, retry_limit: u32) -> AudioState {
        let mut inner = self.inner.borrow_mut();
        inner.activating = false;
        if inner.state == AudioState::Closed {
            log::info!("[audio] activation aborted: released while resuming");
            return AudioState::Closed;
        }
        match outcome {
            Ok(DeviceState::Running) => inner.transition(AudioState::Active),
            Ok(DeviceState::Suspended) => {
                log::warn!(
                    "[audio] device still suspended after {} resume retries",
                    retry_limit
                );
                inner.transition(AudioState::Suspended);
            }
            Ok(DeviceState::Closed) => {
                log::warn!("[audio] device closed by host during activation");
                inner.discard_session();
                inner.transition(AudioState::Uninitialized);
            }
            Err(e) => {
                log::error!("[audio] Failed to start ASMR audio: {}", e);
                inner.transition(AudioState::Suspended);
            }
        }
        inner.state
    }

    /// Re-read the device state after the host changed it (tab hidden,
    /// output device lost, ...). Ignored while an activation is in flight.
    pub fn sync_device_state(&self) -> AudioState {
        let mut inner = self.inner.borrow_mut();
        if inner.activating {
            return inner.state;
        }
        let Some(device_state) = inner.session.as_ref().map(|s| s.device.state()) else {
            return inner.state;
        };
        match (inner.state, device_state) {
            (AudioState::Active, DeviceState::Suspended) => inner.transition(AudioState::Suspended),
            (AudioState::Suspended, DeviceState::Running) => inner.transition(AudioState::Active),
            (AudioState::Active | AudioState::Suspended, DeviceState::Closed) => {
                log::warn!("[audio] device closed by host");
                inner.discard_session();
                inner.transition(AudioState::Uninitialized);
            }
            _ => {}
        }
        inner.state
    }

    /// Stop every generator and close the device. Irreversible; safe to call
    /// from any state and more than once.
    pub fn release(&self) {
        let session = {
            let mut inner = self.inner.borrow_mut();
            if inner.state == AudioState::Closed {
                return;
            }
            inner.transition(AudioState::Closed);
            inner.session.take()
        };
        if let Some(session) = session {
            session.teardown();
        }
    }
}

async fn resume_until_running<D: AudioDevice>(device: &D, retry_limit: u32) -> AudioResult<DeviceState> {
    let mut attempt = 0;
    loop {
        let state = device.state();
        if state != DeviceState::Suspended {
            return Ok(state);
        }
        if attempt > retry_limit {
            return Ok(DeviceState::Suspended);
        }
        if attempt > 0 {
            log::debug!("[audio] device still suspended; resume retry {}/{}", attempt, retry_limit);
        }
        device.resume().await?;
        attempt += 1;
    }
}
