//! # vizcanvas-wasm
//!
//! Browser binding for vizcanvas. A [`VizCanvas`] attaches to a `<canvas>`
//! element, drives a [`FrameScheduler`] from `requestAnimationFrame`, and
//! accepts visualization payloads of any shape from JavaScript.

mod canvas;
mod console;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::{error, info, warn};
use vizcanvas_core::{CanvasConfig, Theme, Timestamp, VizConfig, VizError, VizResult};
use vizcanvas_render::{FrameHost, FrameScheduler};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use canvas::{js_err, CanvasSurface};

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Schedules refreshes through `window.requestAnimationFrame`.
struct BrowserHost {
    window: Window,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameHost for BrowserHost {
    fn request_frame(&mut self) -> VizResult<i32> {
        let callback = self.callback.borrow();
        let callback = callback
            .as_ref()
            .ok_or_else(|| VizError::surface("frame callback is not installed"))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(js_err)
    }

    fn cancel_frame(&mut self, handle: i32) {
        if let Err(e) = self.window.cancel_animation_frame(handle) {
            warn!(error = %js_err(e), "failed to cancel animation frame");
        }
    }
}

/// Everything one refresh callback needs.
struct Attached {
    scheduler: FrameScheduler,
    surface: CanvasSurface,
    window: Window,
    canvas_config: CanvasConfig,
}

impl Attached {
    fn frame(&mut self, host: &mut dyn FrameHost, now_ms: f64) {
        self.surface.fit(self.window.device_pixel_ratio(), &self.canvas_config);
        if let Err(e) = self
            .scheduler
            .on_frame(&mut self.surface, host, Timestamp::from_millis(now_ms))
        {
            error!(error = %e, "failed to schedule next frame");
        }
    }
}

/// Convert a JS value into JSON for the normalizer. Strings stay strings
/// so that the content extractor sees them; values `JSON.stringify`
/// cannot represent become `null`.
fn js_to_json(value: &JsValue) -> Value {
    if value.is_null() || value.is_undefined() {
        return Value::Null;
    }
    if let Some(text) = value.as_string() {
        return Value::String(text);
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(Value::Null)
}

fn to_js(err: VizError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// An animated canvas bound to one `<canvas>` element.
#[wasm_bindgen]
pub struct VizCanvas {
    attached: Rc<RefCell<Attached>>,
    host: Rc<RefCell<BrowserHost>>,
    detached: bool,
}

#[wasm_bindgen]
impl VizCanvas {
    /// Attach to the canvas with element id `canvas_id` using the default
    /// configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<VizCanvas, JsValue> {
        Self::with_config(canvas_id, "")
    }

    /// Attach with a TOML configuration document (empty for defaults).
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(canvas_id: &str, config_toml: &str) -> Result<VizCanvas, JsValue> {
        let config = VizConfig::from_toml_str(config_toml)
            .map_err(|e| JsValue::from_str(&format!("invalid config: {}", e)))?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document available"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id '{}'", canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()?;
        Self::attach(window, canvas, config)
    }

    /// Attach to a canvas element the host already holds.
    #[wasm_bindgen(js_name = fromElement)]
    pub fn from_element(canvas: HtmlCanvasElement) -> Result<VizCanvas, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))?;
        Self::attach(window, canvas, VizConfig::default())
    }

    fn attach(window: Window, canvas: HtmlCanvasElement, config: VizConfig) -> Result<VizCanvas, JsValue> {
        console::init("info");
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let mut surface = CanvasSurface::new(canvas, ctx);
        surface.fit(window.device_pixel_ratio(), &config.canvas);

        let attached = Rc::new(RefCell::new(Attached {
            scheduler: FrameScheduler::new(&config),
            surface,
            window: window.clone(),
            canvas_config: config.canvas.clone(),
        }));
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let host = Rc::new(RefCell::new(BrowserHost {
            window,
            callback: Rc::clone(&callback),
        }));

        {
            let attached = Rc::clone(&attached);
            let host = Rc::clone(&host);
            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
                attached.borrow_mut().frame(&mut *host.borrow_mut(), now_ms);
            }) as Box<dyn FnMut(f64)>));
        }

        attached
            .borrow_mut()
            .scheduler
            .attach(&mut *host.borrow_mut())
            .map_err(to_js)?;
        info!(viewport = ?attached.borrow().surface.viewport(), "canvas attached");

        Ok(VizCanvas {
            attached,
            host,
            detached: false,
        })
    }

    /// Replace the visualization. Accepts any JS value; returns whether a
    /// scene was recognized (otherwise the demo animation plays).
    #[wasm_bindgen(js_name = setVisualization)]
    pub fn set_visualization(&self, payload: JsValue) -> bool {
        let value = js_to_json(&payload);
        self.attached.borrow_mut().scheduler.load_payload(&value)
    }

    /// Load the built-in sample scene and start playing.
    #[wasm_bindgen(js_name = loadSample)]
    pub fn load_sample(&self) {
        let mut attached = self.attached.borrow_mut();
        attached.scheduler.load_scene(Some(vizcanvas_ir::sample_scene()));
        attached.scheduler.set_playing(true);
    }

    /// Flip play/pause; returns whether playback is now running.
    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) -> bool {
        let mut attached = self.attached.borrow_mut();
        attached.scheduler.toggle_play();
        attached.scheduler.is_playing()
    }

    #[wasm_bindgen(js_name = setPlaying)]
    pub fn set_playing(&self, playing: bool) {
        self.attached.borrow_mut().scheduler.set_playing(playing);
    }

    #[wasm_bindgen(js_name = setDarkMode)]
    pub fn set_dark_mode(&self, dark: bool) {
        self.attached
            .borrow_mut()
            .scheduler
            .set_theme(Theme::from_dark_flag(dark));
    }

    /// Rewind to time zero at the next frame.
    pub fn reset(&self) {
        self.attached.borrow_mut().scheduler.reset();
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.attached.borrow().scheduler.is_playing()
    }

    #[wasm_bindgen(js_name = usingDemo)]
    pub fn using_demo(&self) -> bool {
        self.attached.borrow().scheduler.using_demo()
    }

    #[wasm_bindgen(js_name = elapsedMs)]
    pub fn elapsed_ms(&self) -> f64 {
        self.attached.borrow().scheduler.elapsed().as_millis()
    }

    /// Normalization trace of the last payload, empty before the first.
    #[wasm_bindgen(js_name = debugTrace)]
    pub fn debug_trace(&self) -> String {
        self.attached
            .borrow()
            .scheduler
            .trace()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn status(&self) -> String {
        self.attached.borrow().scheduler.status_line()
    }

    /// Stop the frame loop and release the callback. Safe to call twice.
    pub fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        self.attached
            .borrow_mut()
            .scheduler
            .detach(&mut *self.host.borrow_mut());
        // Dropping the closure breaks the callback -> host -> callback cycle.
        let callback = self.host.borrow().callback.borrow_mut().take();
        drop(callback);
    }
}

impl Drop for VizCanvas {
    fn drop(&mut self) {
        self.detach();
    }
}

#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_js_strings_stay_strings() {
        let value = js_to_json(&JsValue::from_str("{\"layers\": []}"));
        assert_eq!(value, Value::String("{\"layers\": []}".into()));
    }

    #[wasm_bindgen_test]
    fn test_js_objects_become_json() {
        let object = js_sys::JSON::parse("{\"duration\": 1200, \"layers\": [{\"type\": \"rect\"}]}").unwrap();
        let value = js_to_json(&object);
        assert_eq!(value["duration"], 1200);
        assert_eq!(value["layers"][0]["type"], "rect");
    }

    #[wasm_bindgen_test]
    fn test_missing_values_become_null() {
        assert_eq!(js_to_json(&JsValue::UNDEFINED), Value::Null);
        assert_eq!(js_to_json(&JsValue::NULL), Value::Null);
        let func = js_sys::Function::new_no_args("return 1");
        assert_eq!(js_to_json(&func), Value::Null);
    }
}
