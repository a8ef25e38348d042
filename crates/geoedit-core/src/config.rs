//! User settings and engine tuning.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Which snap targets are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapSettings {
    pub points: bool,
    pub lines: bool,
}

/// User-facing toggles, replaced wholesale by the settings surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub snap: SnapSettings,
    /// Drag every coincident copy of a vertex together, across rings and
    /// geometries.
    pub topology: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snap: SnapSettings {
                points: true,
                lines: true,
            },
            topology: true,
        }
    }
}

impl Settings {
    pub fn with_point_snap(self, points: bool) -> Self {
        Self {
            snap: SnapSettings { points, ..self.snap },
            ..self
        }
    }

    pub fn with_line_snap(self, lines: bool) -> Self {
        Self {
            snap: SnapSettings { lines, ..self.snap },
            ..self
        }
    }

    pub fn with_topology(self, topology: bool) -> Self {
        Self { topology, ..self }
    }
}

/// Engine constants. All distances are in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Radius for vertex snapping and for the `near` set. Default: **10**.
    pub point_snap_radius: f64,
    /// Maximum cursor-to-edge distance for edge snapping. Default: **5**.
    pub line_snap_distance: f64,
    /// Upper bound of the hover fade counter. Default: **20**.
    pub hover_transition_max: f64,
    /// Fade counter increment per animation frame. Default: **0.2**.
    pub hover_transition_step: f64,
    /// Press duration after which a press on a vertex becomes a drag.
    /// Default: **100 ms**.
    pub drag_delay_ms: f64,
    /// Radius of editable-vertex handles. Default: **5**.
    pub marker_radius: f64,
    /// Canvas area; geometries whose box misses it are not redrawn.
    pub viewport: Rect,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            point_snap_radius: 10.0,
            line_snap_distance: 5.0,
            hover_transition_max: 20.0,
            hover_transition_step: 0.2,
            drag_delay_ms: 100.0,
            marker_radius: 5.0,
            viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
        }
    }
}

impl EditorConfig {
    pub fn with_viewport(self, width: f64, height: f64) -> Self {
        Self {
            viewport: Rect::new(0.0, 0.0, width, height),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_through_json() {
        let json = r#"{"snap":{"points":false,"lines":true},"topology":false}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s, Settings::default().with_point_snap(false).with_topology(false));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let c: EditorConfig = serde_json::from_str(r#"{"drag_delay_ms": 250}"#).unwrap();
        assert_eq!(c.drag_delay_ms, 250.0);
        assert_eq!(c.point_snap_radius, 10.0);
    }
}
