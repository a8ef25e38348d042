//! Colors and stroke metrics for the redraw pass.

/// Theme-dependent styles, as CSS color strings where the surface takes
/// one directly.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTheme {
    /// Area fill, composed with an alpha per frame.
    pub fill_rgb: (u8, u8, u8),
    /// Fill alpha of every area that is not hovered.
    pub fill_alpha: f64,
    /// Fill alpha a hovered area fades in to.
    pub hover_fill_alpha: f64,
    pub outline: &'static str,
    pub outline_width: f64,
    /// Standalone points outside edit mode.
    pub point: &'static str,
    pub point_radius: f64,
    /// The edge the cursor is snapped to.
    pub snapped_line: &'static str,
    pub snapped_line_width: f64,
    pub placeholder: &'static str,
    pub placeholder_dash: [f64; 2],
    pub marker_fill: &'static str,
    /// Marker fill for a vertex shared with an earlier marker.
    pub marker_duplicate: &'static str,
    pub marker_stroke: &'static str,
    pub cursor: &'static str,
    pub cursor_dot_radius: f64,
    pub cursor_ring_radius: f64,
    pub label_font: &'static str,
    /// Label position relative to the cursor.
    pub label_offset: (f64, f64),
}

impl RenderTheme {
    /// Light theme: amber areas on a light basemap.
    pub fn light() -> Self {
        Self {
            fill_rgb: (226, 186, 38),
            fill_alpha: 0.6,
            hover_fill_alpha: 0.8,
            outline: "#333333",
            outline_width: 1.0,
            point: "#333333",
            point_radius: 3.0,
            snapped_line: "cyan",
            snapped_line_width: 2.0,
            placeholder: "#555555",
            placeholder_dash: [5.0, 5.0],
            marker_fill: "white",
            marker_duplicate: "red",
            marker_stroke: "#000000",
            cursor: "#000000",
            cursor_dot_radius: 2.0,
            cursor_ring_radius: 25.0,
            label_font: "12px monospace, serif",
            label_offset: (40.0, -40.0),
        }
    }

    /// Dark theme for dark basemaps.
    pub fn dark() -> Self {
        Self {
            fill_alpha: 0.45,
            hover_fill_alpha: 0.7,
            outline: "#E5E5EA",
            point: "#E5E5EA",
            placeholder: "#98989D",
            marker_fill: "#1C1C1E",
            marker_duplicate: "#FF453A",
            marker_stroke: "#F5F5F7",
            cursor: "#F5F5F7",
            ..Self::light()
        }
    }

    /// `rgba(...)` fill for the given alpha.
    pub fn fill_style(&self, alpha: f64) -> String {
        let (r, g, b) = self.fill_rgb;
        format!("rgba({r}, {g}, {b}, {alpha})")
    }

    /// Fill alpha of a hovered area `progress` (0..=1) into its fade-in.
    pub fn hover_alpha(&self, progress: f64) -> f64 {
        let t = progress.clamp(0.0, 1.0);
        self.fill_alpha + (self.hover_fill_alpha - self.fill_alpha) * t
    }
}

impl Default for RenderTheme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_alpha_ramps_between_bounds() {
        let theme = RenderTheme::light();
        assert_eq!(theme.hover_alpha(0.0), 0.6);
        assert_eq!(theme.hover_alpha(1.0), 0.8);
        assert_eq!(theme.hover_alpha(7.0), 0.8);
        assert_eq!(theme.hover_alpha(-1.0), 0.6);
    }

    #[test]
    fn fill_style_is_css_rgba() {
        assert_eq!(RenderTheme::light().fill_style(0.6), "rgba(226, 186, 38, 0.6)");
    }
}
