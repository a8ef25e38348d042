//! Immediate-mode drawing surface.
//!
//! The redraw pass only needs the handful of Canvas2D primitives below, so
//! any vector backend can host the editor. [`RecordingSurface`] keeps the
//! calls as data for tests and debugging.

use kurbo::{Point, Rect};

/// Minimal immediate-mode 2D drawing API.
pub trait DrawSurface {
    fn clear_rect(&mut self, rect: Rect);
    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    /// Circular arc around `center`, angles in radians.
    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64);
    fn stroke(&mut self);
    /// Fill the current path. Holes are cut with the even-odd rule.
    fn fill(&mut self);
    fn fill_text(&mut self, text: &str, at: Point);
    fn set_fill_style(&mut self, style: &str);
    fn set_stroke_style(&mut self, style: &str);
    fn set_line_width(&mut self, width: f64);
    /// Empty `dash` restores solid lines.
    fn set_line_dash(&mut self, dash: &[f64]);
    fn set_font(&mut self, font: &str);
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    ClearRect(Rect),
    BeginPath,
    ClosePath,
    MoveTo(Point),
    LineTo(Point),
    Arc { center: Point, radius: f64 },
    Stroke,
    Fill,
    FillText { text: String, at: Point },
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f64),
    LineDash(Vec<f64>),
    Font(String),
}

/// A surface that records every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Every `fill_text` call, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every arc as `(center, radius)`.
    pub fn arcs(&self) -> Vec<(Point, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Arc { center, radius } => Some((*center, *radius)),
                _ => None,
            })
            .collect()
    }

    /// Fill style in effect at each `fill` call.
    pub fn fills(&self) -> Vec<String> {
        let mut style = String::new();
        let mut out = Vec::new();
        for op in &self.ops {
            match op {
                DrawOp::FillStyle(s) => style.clone_from(s),
                DrawOp::Fill => out.push(style.clone()),
                _ => {}
            }
        }
        out
    }

    /// Straight strokes as `(from, to, stroke style, dashed)`, one per
    /// two-point path.
    pub fn segments(&self) -> Vec<(Point, Point, String, bool)> {
        let mut style = String::new();
        let mut dashed = false;
        let mut path: Vec<Point> = Vec::new();
        let mut out = Vec::new();
        for op in &self.ops {
            match op {
                DrawOp::StrokeStyle(s) => style.clone_from(s),
                DrawOp::LineDash(d) => dashed = !d.is_empty(),
                DrawOp::BeginPath => path.clear(),
                DrawOp::MoveTo(p) | DrawOp::LineTo(p) => path.push(*p),
                DrawOp::Stroke => {
                    if let [a, b] = path.as_slice() {
                        out.push((*a, *b, style.clone(), dashed));
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

impl DrawSurface for RecordingSurface {
    fn clear_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::ClearRect(rect));
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn close_path(&mut self) {
        self.ops.push(DrawOp::ClosePath);
    }

    fn move_to(&mut self, p: Point) {
        self.ops.push(DrawOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.ops.push(DrawOp::LineTo(p));
    }

    fn arc(&mut self, center: Point, radius: f64, _start: f64, _end: f64) {
        self.ops.push(DrawOp::Arc { center, radius });
    }

    fn stroke(&mut self) {
        self.ops.push(DrawOp::Stroke);
    }

    fn fill(&mut self) {
        self.ops.push(DrawOp::Fill);
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            at,
        });
    }

    fn set_fill_style(&mut self, style: &str) {
        self.ops.push(DrawOp::FillStyle(style.to_string()));
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.ops.push(DrawOp::StrokeStyle(style.to_string()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(DrawOp::LineWidth(width));
    }

    fn set_line_dash(&mut self, dash: &[f64]) {
        self.ops.push(DrawOp::LineDash(dash.to_vec()));
    }

    fn set_font(&mut self, font: &str) {
        self.ops.push(DrawOp::Font(font.to_string()));
    }
}
