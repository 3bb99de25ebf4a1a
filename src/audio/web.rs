//! WebAudio-backed device.

use super::{AudioDevice, AudioError, AudioResult, DeviceFactory, DeviceState};
use std::future::Future;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn describe(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

fn creation_error(node: &'static str) -> impl FnOnce(JsValue) -> AudioError {
    move |e| AudioError::NodeCreation {
        node,
        reason: describe(e),
    }
}

#[derive(Clone)]
pub struct WebAudioDevice {
    ctx: web::AudioContext,
}

impl WebAudioDevice {
    pub fn context(&self) -> &web::AudioContext {
        &self.ctx
    }

    /// Call `f` whenever the browser changes the context state.
    pub fn on_state_change(&self, mut f: impl FnMut() + 'static) {
        let closure = Closure::wrap(Box::new(move || f()) as Box<dyn FnMut()>);
        self.ctx.set_onstatechange(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }

    fn scheduled<'a>(&self, node: &'a web::AudioNode) -> AudioResult<&'a web::AudioScheduledSourceNode> {
        node.dyn_ref::<web::AudioScheduledSourceNode>()
            .ok_or_else(|| AudioError::Scheduling {
                action: "schedule",
                reason: "node is not a source".into(),
            })
    }
}

impl AudioDevice for WebAudioDevice {
    type Node = web::AudioNode;

    fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate()
    }

    fn state(&self) -> DeviceState {
        match self.ctx.state() {
            web::AudioContextState::Running => DeviceState::Running,
            web::AudioContextState::Closed => DeviceState::Closed,
            _ => DeviceState::Suspended,
        }
    }

    fn create_loop_source(&self, samples: &[f32]) -> AudioResult<web::AudioNode> {
        let buffer = self
            .ctx
            .create_buffer(1, samples.len() as u32, self.ctx.sample_rate())
            .map_err(creation_error("noise buffer"))?;
        let mut data = samples.to_vec();
        buffer
            .copy_to_channel(&mut data, 0)
            .map_err(creation_error("noise buffer"))?;
        let src = web::AudioBufferSourceNode::new(&self.ctx).map_err(creation_error("loop"))?;
        src.set_buffer(Some(&buffer));
        src.set_loop(true);
        Ok(src.into())
    }

    fn create_lowpass(&self, cutoff_hz: f32, q: f32) -> AudioResult<web::AudioNode> {
        let filter = web::BiquadFilterNode::new(&self.ctx).map_err(creation_error("lowpass"))?;
        filter.set_type(web::BiquadFilterType::Lowpass);
        filter.frequency().set_value(cutoff_hz);
        filter.q().set_value(q);
        Ok(filter.into())
    }

    fn create_gain(&self, gain: f32) -> AudioResult<web::AudioNode> {
        let g = web::GainNode::new(&self.ctx).map_err(creation_error("gain"))?;
        g.gain().set_value(gain);
        Ok(g.into())
    }

    fn create_oscillator(&self, frequency_hz: f32) -> AudioResult<web::AudioNode> {
        let osc = web::OscillatorNode::new(&self.ctx).map_err(creation_error("oscillator"))?;
        osc.set_type(web::OscillatorType::Sine);
        osc.frequency().set_value(frequency_hz);
        Ok(osc.into())
    }

    fn connect(&self, from: &web::AudioNode, to: &web::AudioNode) -> AudioResult<()> {
        from.connect_with_audio_node(to)
            .map(|_| ())
            .map_err(|e| AudioError::Connection {
                from: "node",
                to: "node",
                reason: describe(e),
            })
    }

    fn connect_gain_param(&self, from: &web::AudioNode, gain_node: &web::AudioNode) -> AudioResult<()> {
        let gain = gain_node
            .dyn_ref::<web::GainNode>()
            .ok_or_else(|| AudioError::Connection {
                from: "node",
                to: "gain param",
                reason: "target is not a GainNode".into(),
            })?;
        from.connect_with_audio_param(&gain.gain())
            .map_err(|e| AudioError::Connection {
                from: "node",
                to: "gain param",
                reason: describe(e),
            })
    }

    fn connect_destination(&self, from: &web::AudioNode) -> AudioResult<()> {
        from.connect_with_audio_node(&self.ctx.destination())
            .map(|_| ())
            .map_err(|e| AudioError::Connection {
                from: "node",
                to: "destination",
                reason: describe(e),
            })
    }

    fn start(&self, source: &web::AudioNode) -> AudioResult<()> {
        self.scheduled(source)?
            .start()
            .map_err(|e| AudioError::Scheduling {
                action: "start",
                reason: describe(e),
            })
    }

    fn stop(&self, source: &web::AudioNode) -> AudioResult<()> {
        self.scheduled(source)?
            .stop()
            .map_err(|e| AudioError::Scheduling {
                action: "stop",
                reason: describe(e),
            })
    }

    fn resume(&self) -> impl Future<Output = AudioResult<()>> {
        let ctx = self.ctx.clone();
        async move {
            let promise = ctx
                .resume()
                .map_err(|e| AudioError::ResumeRejected(describe(e)))?;
            JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|e| AudioError::ResumeRejected(describe(e)))
        }
    }

    fn close(&self) -> AudioResult<()> {
        if self.ctx.state() == web::AudioContextState::Closed {
            return Ok(());
        }
        // Closing settles asynchronously; nothing waits on it.
        let promise = self
            .ctx
            .close()
            .map_err(|e| AudioError::DeviceUnavailable(describe(e)))?;
        _ = promise;
        Ok(())
    }
}

/// Opens a fresh `AudioContext` tuned for interactive latency.
#[derive(Default)]
pub struct WebDeviceFactory;

impl DeviceFactory for WebDeviceFactory {
    type Device = WebAudioDevice;

    fn open(&mut self) -> AudioResult<WebAudioDevice> {
        let opts = web::AudioContextOptions::new();
        opts.set_latency_hint(&JsValue::from_str("interactive"));
        let ctx = web::AudioContext::new_with_context_options(&opts)
            .map_err(|e| AudioError::DeviceUnavailable(describe(e)))?;
        log::info!("[audio] context opened @ {} Hz", ctx.sample_rate());
        Ok(WebAudioDevice { ctx })
    }
}
