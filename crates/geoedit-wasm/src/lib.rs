//! WASM bridge for geoedit: runs the editor session on an HTML canvas
//! layered over a map widget.
//!
//! Compiled via `wasm-pack build --target web`. The host passes its map
//! projection as two JS functions and forwards DOM input events. Geometry
//! changes are reported back as GeoJSON.

mod canvas;

use canvas::{CanvasSurface, JsProjection};
use geoedit_core::{EditorConfig, Geometry, LngLat, Point, Settings};
use geoedit_editor::{EditorSession, ListenerId};
use geoedit_render::RenderTheme;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

/// The WASM-facing editor controller.
///
/// All interaction from the page goes through this struct. Coordinates
/// are canvas pixels; times are milliseconds on any monotonic clock
/// (`performance.now()`).
#[wasm_bindgen]
pub struct MapEditorCanvas {
    session: EditorSession<CanvasSurface, JsProjection>,
}

#[wasm_bindgen]
impl MapEditorCanvas {
    /// Attach to `canvas`, using the host's projection callbacks.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        to_screen: js_sys::Function,
        to_geo: js_sys::Function,
    ) -> Result<MapEditorCanvas, JsValue> {
        console_error_panic_hook_setup();
        console_logger_setup();

        let config = EditorConfig::default()
            .with_viewport(f64::from(canvas.width()), f64::from(canvas.height()));
        let surface = CanvasSurface::from_canvas(&canvas)?;
        let projection = JsProjection::new(to_screen, to_geo);
        Ok(Self {
            session: EditorSession::new(surface, projection, config),
        })
    }

    // ─── Data ────────────────────────────────────────────────────────────

    /// Replace the edited geometry with a GeoJSON object or array.
    /// Returns `false` (and keeps the current data) when it cannot be decoded.
    pub fn load(&mut self, geojson: &str) -> bool {
        match self.session.load_json(geojson) {
            Ok(count) => {
                log::info!("loaded {count} geometries");
                true
            }
            Err(e) => {
                log::warn!("geometry rejected: {e}");
                false
            }
        }
    }

    /// Current geometry as a GeoJSON array in geographic coordinates.
    pub fn get_data(&self) -> String {
        to_json(&self.session.geometries(), "[]")
    }

    /// Swap the projection callbacks, then reproject.
    pub fn set_projection(&mut self, to_screen: js_sys::Function, to_geo: js_sys::Function) {
        *self.session.projection_mut() = JsProjection::new(to_screen, to_geo);
        self.session.reproject();
    }

    /// Re-run the projection after the map moved or zoomed.
    pub fn reproject(&mut self) {
        self.session.reproject();
    }

    /// Resize the canvas.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.resize(width, height);
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle_pointer_down(&mut self, x: f64, y: f64, time_ms: f64) {
        self.session.pointer_down(Point::new(x, y), time_ms);
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) {
        self.session.pointer_move(Point::new(x, y));
    }

    pub fn handle_pointer_up(&mut self) {
        self.session.pointer_up();
    }

    pub fn handle_click(&mut self, x: f64, y: f64) {
        self.session.click(Point::new(x, y));
    }

    /// Handle a keyup. Returns `true` if the key was consumed.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        self.session.key(key, ctrl, shift, alt, meta)
    }

    /// Fire the press-and-hold timer if due. Returns `true` if a drag began.
    pub fn tick(&mut self, time_ms: f64) -> bool {
        self.session.tick(time_ms)
    }

    /// When to call [`tick`](Self::tick) next, or `undefined`.
    pub fn next_deadline(&self) -> Option<f64> {
        self.session.next_deadline()
    }

    /// One hover-fade step. Returns `true` while more animation frames are
    /// needed.
    pub fn advance_hover(&mut self) -> bool {
        self.session.advance_hover()
    }

    /// CSS `cursor` value to apply to the canvas.
    pub fn cursor(&self) -> String {
        self.session.cursor().as_css().to_string()
    }

    /// While `true`, the host should not pan the map.
    pub fn is_dragging(&self) -> bool {
        self.session.is_dragging()
    }

    // ─── Settings ────────────────────────────────────────────────────────

    pub fn get_settings(&self) -> String {
        to_json(&self.session.settings(), "{}")
    }

    /// Replace all settings from JSON. Returns `false` on malformed input.
    pub fn set_settings(&mut self, json: &str) -> bool {
        match parse_settings(json) {
            Ok(settings) => {
                self.session.set_settings(settings);
                true
            }
            Err(e) => {
                log::warn!("settings rejected: {e}");
                false
            }
        }
    }

    pub fn toggle_point_snap(&mut self) {
        self.session.toggle_point_snap();
    }

    pub fn toggle_line_snap(&mut self) {
        self.session.toggle_line_snap();
    }

    pub fn toggle_topology(&mut self) {
        self.session.toggle_topology();
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.session.set_theme(theme_for(is_dark));
    }

    /// Stop drawing while the canvas is hidden.
    pub fn set_paused(&mut self, paused: bool) {
        self.session.set_paused(paused);
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    pub fn begin_add_shape(&mut self) {
        self.session.begin_add_shape();
    }

    /// End the current edit or new shape. Returns `true` if one was active.
    pub fn finish(&mut self) -> bool {
        self.session.finish()
    }

    // ─── Change notification ─────────────────────────────────────────────

    /// Call `callback(geojson)` after every geometry change, with the
    /// collection as a parsed GeoJSON array. Returns a handle for
    /// [`remove_change_listener`](Self::remove_change_listener).
    pub fn on_change(&mut self, callback: js_sys::Function) -> u32 {
        let id = self.session.on_change(move |data: &[Geometry<LngLat>]| {
            let json = to_json(data, "[]");
            let arg = js_sys::JSON::parse(&json).unwrap_or_else(|_| JsValue::from_str(&json));
            if let Err(e) = callback.call1(&JsValue::NULL, &arg) {
                log::warn!("change listener threw: {e:?}");
            }
        });
        u32::try_from(id.raw()).unwrap_or(u32::MAX)
    }

    pub fn remove_change_listener(&mut self, id: u32) -> bool {
        self.session
            .remove_change_listener(ListenerId::from_raw(u64::from(id)))
    }

    /// Editor internals as JSON, for debugging.
    pub fn inspect(&self) -> String {
        to_json(&self.session.inspect(), "{}")
    }
}

/// Set the console log level (`"error"` … `"trace"`, or `"off"`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => {
            log::set_max_level(filter);
            true
        }
        Err(_) => false,
    }
}

fn theme_for(is_dark: bool) -> RenderTheme {
    if is_dark {
        RenderTheme::dark()
    } else {
        RenderTheme::light()
    }
}

fn parse_settings(json: &str) -> Result<Settings, serde_json::Error> {
    serde_json::from_str(json)
}

fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("serialization failed: {e}");
        fallback.to_string()
    })
}

// ─── Console plumbing ────────────────────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("geoedit panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

/// Routes the `log` facade to the browser console.
#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

fn console_logger_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        static LOGGER: ConsoleLogger = ConsoleLogger;
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Info);
        }
    }
}
