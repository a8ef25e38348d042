//! geoedit render: the redraw pass and the surface it draws on.
//!
//! - [`surface`]: the immediate-mode drawing API plus a recording backend
//! - [`theme`]: colors and stroke metrics
//! - [`redraw`]: per-frame walk producing pixels and the staged geometry

pub mod redraw;
pub mod surface;
pub mod theme;

pub use redraw::{CursorStyle, Frame, RenderView, redraw};
pub use surface::{DrawOp, DrawSurface, RecordingSurface};
pub use theme::RenderTheme;
