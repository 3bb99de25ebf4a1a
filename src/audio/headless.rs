//! In-memory audio device.
//!
//! Records the node topology and scheduling state instead of producing
//! sound. Used on hosts without an audio stack and to exercise the lifecycle
//! controller without a live device.

use super::{AudioDevice, AudioError, AudioResult, DeviceFactory, DeviceState};
use fnv::FnvHashMap;
use std::cell::RefCell;
use std::future::{ready, Future};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    LoopSource { samples: usize },
    Lowpass { cutoff_hz: f32, q: f32 },
    Gain { gain: f32 },
    Oscillator { frequency_hz: f32 },
}

impl NodeKind {
    pub fn is_generator(&self) -> bool {
        matches!(self, NodeKind::LoopSource { .. } | NodeKind::Oscillator { .. })
    }
}

/// Where a node's output goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Node(HeadlessNode),
    GainParam(HeadlessNode),
    Destination,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeadlessNode(usize);

/// How the device answers `resume()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeBehavior {
    Run,
    /// The first `n` resume calls leave the device suspended.
    StaySuspended(u32),
    Reject,
}

struct NodeRecord {
    kind: NodeKind,
    started: bool,
    stopped: bool,
    outputs: Vec<Target>,
}

struct DeviceInner {
    sample_rate: f32,
    state: DeviceState,
    behavior: ResumeBehavior,
    fail_on: Option<&'static str>,
    nodes: Vec<NodeRecord>,
    buffers: FnvHashMap<usize, Vec<f32>>,
    resume_calls: u32,
    resume_hook: Option<Rc<dyn Fn()>>,
}

#[derive(Clone)]
pub struct HeadlessDevice {
    inner: Rc<RefCell<DeviceInner>>,
}

impl HeadlessDevice {
    pub fn new(sample_rate: f32, behavior: ResumeBehavior) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DeviceInner {
                sample_rate,
                state: DeviceState::Suspended,
                behavior,
                fail_on: None,
                nodes: Vec::new(),
                buffers: FnvHashMap::default(),
                resume_calls: 0,
                resume_hook: None,
            })),
        }
    }

    /// Make the named operation fail (`"loop"`, `"lowpass"`, `"gain"`,
    /// `"oscillator"`, `"connect"`, `"param"`, `"destination"`, `"start"`).
    pub fn fail_on(&self, operation: &'static str) {
        self.inner.borrow_mut().fail_on = Some(operation);
    }

    pub fn set_resume(&self, behavior: ResumeBehavior) {
        self.inner.borrow_mut().behavior = behavior;
    }

    /// Run `hook` inside every `resume()` call, before the device answers.
    pub fn set_resume_hook(&self, hook: Rc<dyn Fn()>) {
        self.inner.borrow_mut().resume_hook = Some(hook);
    }

    /// Simulate the host changing the device state (e.g. backgrounding a tab).
    pub fn force_state(&self, state: DeviceState) {
        self.inner.borrow_mut().state = state;
    }

    pub fn node_count(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn kind(&self, node: &HeadlessNode) -> Option<NodeKind> {
        self.inner.borrow().nodes.get(node.0).map(|n| n.kind)
    }

    pub fn outputs(&self, node: &HeadlessNode) -> Vec<Target> {
        self.inner
            .borrow()
            .nodes
            .get(node.0)
            .map(|n| n.outputs.clone())
            .unwrap_or_default()
    }

    pub fn is_started(&self, node: &HeadlessNode) -> bool {
        self.inner.borrow().nodes.get(node.0).is_some_and(|n| n.started)
    }

    pub fn is_stopped(&self, node: &HeadlessNode) -> bool {
        self.inner.borrow().nodes.get(node.0).is_some_and(|n| n.stopped)
    }

    /// Generators that were started and not yet stopped.
    pub fn running_generators(&self) -> usize {
        self.inner
            .borrow()
            .nodes
            .iter()
            .filter(|n| n.kind.is_generator() && n.started && !n.stopped)
            .count()
    }

    pub fn loop_samples(&self, node: &HeadlessNode) -> Option<Vec<f32>> {
        self.inner.borrow().buffers.get(&node.0).cloned()
    }

    pub fn resume_calls(&self) -> u32 {
        self.inner.borrow().resume_calls
    }

    fn check(&self, operation: &'static str) -> AudioResult<()> {
        let inner = self.inner.borrow();
        if inner.state == DeviceState::Closed {
            return Err(AudioError::Closed);
        }
        if inner.fail_on == Some(operation) {
            return Err(AudioError::NodeCreation {
                node: operation,
                reason: "injected failure".into(),
            });
        }
        Ok(())
    }

    fn add_node(&self, operation: &'static str, kind: NodeKind) -> AudioResult<HeadlessNode> {
        self.check(operation)?;
        let mut inner = self.inner.borrow_mut();
        inner.nodes.push(NodeRecord {
            kind,
            started: false,
            stopped: false,
            outputs: Vec::new(),
        });
        Ok(HeadlessNode(inner.nodes.len() - 1))
    }

    fn add_output(&self, operation: &'static str, from: &HeadlessNode, target: Target) -> AudioResult<()> {
        self.check(operation)?;
        let mut inner = self.inner.borrow_mut();
        let record = inner.nodes.get_mut(from.0).ok_or_else(|| AudioError::Connection {
            from: "node",
            to: "node",
            reason: format!("unknown node {}", from.0),
        })?;
        record.outputs.push(target);
        Ok(())
    }
}

impl AudioDevice for HeadlessDevice {
    type Node = HeadlessNode;

    fn sample_rate(&self) -> f32 {
        self.inner.borrow().sample_rate
    }

    fn state(&self) -> DeviceState {
        self.inner.borrow().state
    }

    fn create_loop_source(&self, samples: &[f32]) -> AudioResult<HeadlessNode> {
        if samples.is_empty() {
            return Err(AudioError::NodeCreation {
                node: "loop",
                reason: "empty buffer".into(),
            });
        }
        let node = self.add_node(
            "loop",
            NodeKind::LoopSource {
                samples: samples.len(),
            },
        )?;
        self.inner.borrow_mut().buffers.insert(node.0, samples.to_vec());
        Ok(node)
    }

    fn create_lowpass(&self, cutoff_hz: f32, q: f32) -> AudioResult<HeadlessNode> {
        self.add_node("lowpass", NodeKind::Lowpass { cutoff_hz, q })
    }

    fn create_gain(&self, gain: f32) -> AudioResult<HeadlessNode> {
        self.add_node("gain", NodeKind::Gain { gain })
    }

    fn create_oscillator(&self, frequency_hz: f32) -> AudioResult<HeadlessNode> {
        self.add_node("oscillator", NodeKind::Oscillator { frequency_hz })
    }

    fn connect(&self, from: &HeadlessNode, to: &HeadlessNode) -> AudioResult<()> {
        self.add_output("connect", from, Target::Node(*to))
    }

    fn connect_gain_param(&self, from: &HeadlessNode, gain_node: &HeadlessNode) -> AudioResult<()> {
        if !matches!(self.kind(gain_node), Some(NodeKind::Gain { .. })) {
            return Err(AudioError::Connection {
                from: "node",
                to: "gain param",
                reason: "target is not a gain node".into(),
            });
        }
        self.add_output("param", from, Target::GainParam(*gain_node))
    }

    fn connect_destination(&self, from: &HeadlessNode) -> AudioResult<()> {
        self.add_output("destination", from, Target::Destination)
    }

    fn start(&self, source: &HeadlessNode) -> AudioResult<()> {
        self.check("start")?;
        let mut inner = self.inner.borrow_mut();
        match inner.nodes.get_mut(source.0) {
            Some(n) if n.kind.is_generator() && !n.started => {
                n.started = true;
                Ok(())
            }
            _ => Err(AudioError::Scheduling {
                action: "start",
                reason: format!("node {} is not a fresh generator", source.0),
            }),
        }
    }

    fn stop(&self, source: &HeadlessNode) -> AudioResult<()> {
        let mut inner = self.inner.borrow_mut();
        match inner.nodes.get_mut(source.0) {
            Some(n) if n.started => {
                n.stopped = true;
                Ok(())
            }
            _ => Err(AudioError::Scheduling {
                action: "stop",
                reason: format!("node {} was never started", source.0),
            }),
        }
    }

    fn resume(&self) -> impl Future<Output = AudioResult<()>> {
        let hook = self.inner.borrow().resume_hook.clone();
        if let Some(hook) = hook {
            hook();
        }
        let mut inner = self.inner.borrow_mut();
        inner.resume_calls += 1;
        let result = match (inner.state, inner.behavior) {
            (DeviceState::Closed, _) => Err(AudioError::Closed),
            (_, ResumeBehavior::Reject) => Err(AudioError::ResumeRejected("not allowed to start".into())),
            (_, ResumeBehavior::StaySuspended(n)) if inner.resume_calls <= n => Ok(()),
            _ => {
                inner.state = DeviceState::Running;
                Ok(())
            }
        };
        ready(result)
    }

    fn close(&self) -> AudioResult<()> {
        self.inner.borrow_mut().state = DeviceState::Closed;
        Ok(())
    }
}

struct FactoryInner {
    sample_rate: f32,
    behavior: ResumeBehavior,
    fail_open: bool,
    fail_on: Option<&'static str>,
    resume_hook: Option<Rc<dyn Fn()>>,
    opened: Vec<HeadlessDevice>,
}

/// Opens `HeadlessDevice`s and keeps a handle to each for inspection.
#[derive(Clone)]
pub struct HeadlessFactory {
    inner: Rc<RefCell<FactoryInner>>,
}

impl HeadlessFactory {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(FactoryInner {
                sample_rate,
                behavior: ResumeBehavior::Run,
                fail_open: false,
                fail_on: None,
                resume_hook: None,
                opened: Vec::new(),
            })),
        }
    }

    pub fn with_resume(self, behavior: ResumeBehavior) -> Self {
        self.inner.borrow_mut().behavior = behavior;
        self
    }

    pub fn set_resume(&self, behavior: ResumeBehavior) {
        self.inner.borrow_mut().behavior = behavior;
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.inner.borrow_mut().fail_open = fail;
    }

    /// Devices opened from now on fail the named operation.
    pub fn set_fail_on(&self, operation: Option<&'static str>) {
        self.inner.borrow_mut().fail_on = operation;
    }

    pub fn set_resume_hook(&self, hook: Rc<dyn Fn()>) {
        self.inner.borrow_mut().resume_hook = Some(hook);
    }

    pub fn opened(&self) -> Vec<HeadlessDevice> {
        self.inner.borrow().opened.clone()
    }

    pub fn last_device(&self) -> Option<HeadlessDevice> {
        self.inner.borrow().opened.last().cloned()
    }
}

impl DeviceFactory for HeadlessFactory {
    type Device = HeadlessDevice;

    fn open(&mut self) -> AudioResult<HeadlessDevice> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_open {
            return Err(AudioError::DeviceUnavailable("headless device refused to open".into()));
        }
        let device = HeadlessDevice::new(inner.sample_rate, inner.behavior);
        if let Some(op) = inner.fail_on {
            device.fail_on(op);
        }
        if let Some(hook) = &inner.resume_hook {
            device.set_resume_hook(hook.clone());
        }
        inner.opened.push(device.clone());
        Ok(device)
    }
}
