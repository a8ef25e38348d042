//! Canvas 2D backend and the adapter for host projection callbacks.

use geoedit_core::{LngLat, Point, Projection, Rect};
use geoedit_render::DrawSurface;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule, HtmlCanvasElement};

/// [`DrawSurface`] over a browser `CanvasRenderingContext2d`.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { ctx })
    }
}

impl DrawSurface for CanvasSurface {
    fn clear_rect(&mut self, rect: Rect) {
        self.ctx
            .clear_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn move_to(&mut self, p: Point) {
        self.ctx.move_to(p.x, p.y);
    }

    fn line_to(&mut self, p: Point) {
        self.ctx.line_to(p.x, p.y);
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64) {
        let _ = self.ctx.arc(center.x, center.y, radius, start, end);
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill(&mut self) {
        self.ctx
            .fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        let _ = self.ctx.fill_text(text, at.x, at.y);
    }

    fn set_fill_style(&mut self, style: &str) {
        self.ctx.set_fill_style_str(style);
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.ctx.set_stroke_style_str(style);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_dash(&mut self, dash: &[f64]) {
        let segments: js_sys::Array = dash.iter().map(|&d| JsValue::from_f64(d)).collect();
        let _ = self.ctx.set_line_dash(&segments);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }
}

/// Host projection supplied as two JS functions, each mapping a
/// two-element array to a two-element array:
/// `toScreen([lng, lat]) -> [x, y]` and `toGeo([x, y]) -> [lng, lat]`.
pub struct JsProjection {
    to_screen: js_sys::Function,
    to_geo: js_sys::Function,
}

impl JsProjection {
    pub fn new(to_screen: js_sys::Function, to_geo: js_sys::Function) -> Self {
        Self { to_screen, to_geo }
    }
}

/// Call `f([a, b])` and read back a pair. A throwing callback or a
/// malformed result yields NaNs, which no hit test or snap ever matches.
fn call_pair(f: &js_sys::Function, a: f64, b: f64, name: &str) -> (f64, f64) {
    let arg = js_sys::Array::of2(&JsValue::from_f64(a), &JsValue::from_f64(b));
    let result = match f.call1(&JsValue::NULL, &arg) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("{name} threw for ({a}, {b}): {e:?}");
            return (f64::NAN, f64::NAN);
        }
    };
    match result.dyn_into::<js_sys::Array>() {
        Ok(pair) => match (pair.get(0).as_f64(), pair.get(1).as_f64()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                log::warn!("{name} returned a non-numeric pair for ({a}, {b})");
                (f64::NAN, f64::NAN)
            }
        },
        Err(_) => {
            log::warn!("{name} did not return an array for ({a}, {b})");
            (f64::NAN, f64::NAN)
        }
    }
}

impl Projection for JsProjection {
    fn to_screen(&self, geo: LngLat) -> Point {
        let (x, y) = call_pair(&self.to_screen, geo.lng, geo.lat, "toScreen");
        Point::new(x, y)
    }

    fn to_geo(&self, screen: Point) -> LngLat {
        let (lng, lat) = call_pair(&self.to_geo, screen.x, screen.y, "toGeo");
        LngLat::new(lng, lat)
    }
}
