//! Browser entry points: canvas mounting, the frame loop and the audio button.

use crate::audio::web::WebDeviceFactory;
use crate::audio::{Affordance, AudioController, GraphId};
use crate::config::EngineConfig;
use crate::frame::{start_loop, FrameScheduler};
use crate::render::GpuRenderer;
use crate::scene::Scene;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys as web;

mod dom;

const AUDIO_BUTTON_ID: &str = "asmr-toggle";

fn to_js(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", e))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("glass-melon starting");
    Ok(())
}

/// A mounted scene: the frame loop plus its audio session.
///
/// Page callbacks hold weak handles, so freeing this handle from JS also
/// closes the audio device.
#[wasm_bindgen]
pub struct LoopEngine {
    audio: AudioController<WebDeviceFactory>,
    running: Rc<Cell<bool>>,
    button: Option<web::HtmlButtonElement>,
    watched: Rc<Cell<Option<GraphId>>>,
}

#[wasm_bindgen]
impl LoopEngine {
    /// Handle a user gesture. Resolves to the resulting audio state name.
    pub fn activate(&self) -> js_sys::Promise {
        let audio = self.audio.clone();
        let button = self.button.clone();
        let watched = self.watched.clone();
        if audio.affordance() == Affordance::Idle {
            dom::show_affordance(button.as_ref(), Affordance::Priming);
        }
        future_to_promise(async move {
            let state = audio.activate().await;
            watch_device(&audio, &watched, button.clone());
            dom::show_affordance(button.as_ref(), audio.affordance());
            Ok(JsValue::from_str(&format!("{:?}", state)))
        })
    }

    /// Stop the frame loop and close the audio device. Irreversible.
    pub fn release(&self) {
        self.running.set(false);
        self.audio.release();
        dom::show_affordance(self.button.as_ref(), self.audio.affordance());
    }

    #[wasm_bindgen(getter)]
    pub fn affordance_label(&self) -> String {
        self.audio.affordance().label().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn audio_state(&self) -> String {
        format!("{:?}", self.audio.state())
    }
}

// Follow host-driven state changes of the current device once per graph.
fn watch_device(
    audio: &AudioController<WebDeviceFactory>,
    watched: &Rc<Cell<Option<GraphId>>>,
    button: Option<web::HtmlButtonElement>,
) {
    let (Some(device), Some(id)) = (audio.device(), audio.graph_id()) else {
        return;
    };
    if watched.get() == Some(id) {
        return;
    }
    watched.set(Some(id));
    let audio = audio.downgrade();
    device.on_state_change(move || {
        let Some(audio) = audio.upgrade() else { return };
        audio.sync_device_state();
        dom::show_affordance(button.as_ref(), audio.affordance());
    });
}

/// Mount the scene on the canvas with id `canvas_id` and start animating.
///
/// If the page has a `#asmr-toggle` button it is wired to the audio
/// controller. The loop and the audio device are released on `pagehide`.
#[wasm_bindgen]
pub async fn mount(canvas_id: String) -> Result<LoopEngine, JsValue> {
    let document = dom::window_document().ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(&canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{}", canvas_id)))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| JsValue::from_str(&format!("{:?}", e)))?;
    dom::wire_canvas_resize(&canvas);

    let config = EngineConfig::default();
    let renderer = GpuRenderer::new(&canvas).await.map_err(to_js)?;
    let scene = Scene::new(renderer, &config).map_err(to_js)?;
    let scheduler = Rc::new(RefCell::new(FrameScheduler::new(scene)));
    let running = Rc::new(Cell::new(true));
    {
        let scheduler_resize = scheduler.clone();
        let canvas_resize = canvas.clone();
        start_loop(scheduler, running.clone(), move || {
            scheduler_resize
                .borrow_mut()
                .update_mut()
                .renderer_mut()
                .resize_if_needed(canvas_resize.width(), canvas_resize.height());
        });
    }

    let engine = LoopEngine {
        audio: AudioController::new(WebDeviceFactory, &config),
        running,
        button: dom::find_button(&document, AUDIO_BUTTON_ID),
        watched: Rc::new(Cell::new(None)),
    };
    dom::show_affordance(engine.button.as_ref(), engine.audio.affordance());

    if let Some(button) = engine.button.clone() {
        let audio = engine.audio.downgrade();
        let watched = engine.watched.clone();
        let label_target = button.clone();
        dom::on_click(&button, move || {
            let Some(audio) = audio.upgrade() else { return };
            let watched = watched.clone();
            let label_target = label_target.clone();
            if audio.affordance() == Affordance::Idle {
                dom::show_affordance(Some(&label_target), Affordance::Priming);
            }
            spawn_local(async move {
                audio.activate().await;
                watch_device(&audio, &watched, Some(label_target.clone()));
                dom::show_affordance(Some(&label_target), audio.affordance());
            });
        });
    }

    {
        let audio = engine.audio.downgrade();
        let running = engine.running.clone();
        dom::on_window_event("pagehide", move || {
            running.set(false);
            if let Some(audio) = audio.upgrade() {
                audio.release();
            }
        });
    }

    log::info!("[web] mounted on #{}", canvas_id);
    Ok(engine)
}
