use crate::audio::Affordance;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn find_button(document: &web::Document, element_id: &str) -> Option<web::HtmlButtonElement> {
    document
        .get_element_by_id(element_id)
        .and_then(|el| el.dyn_into::<web::HtmlButtonElement>().ok())
}

pub fn on_click(target: &web::HtmlButtonElement, mut handler: impl FnMut() + 'static) {
    let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
    _ = target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn on_window_event(event: &str, mut handler: impl FnMut() + 'static) {
    let Some(window) = web::window() else { return };
    let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
    _ = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// Keep the canvas backing store at CSS size times the device pixel ratio.
pub fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    sync_canvas_backing_size(canvas);
    let canvas = canvas.clone();
    on_window_event("resize", move || sync_canvas_backing_size(&canvas));
}

/// Reflect the audio affordance on the host button, if there is one.
pub fn show_affordance(button: Option<&web::HtmlButtonElement>, affordance: Affordance) {
    let Some(button) = button else { return };
    button.set_text_content(Some(affordance.label()));
    button.set_disabled(!affordance.is_interactive());
    _ = button.set_attribute(
        "data-state",
        match affordance {
            Affordance::Idle => "idle",
            Affordance::Priming => "priming",
            Affordance::Active => "active",
        },
    );
}
