//! Pass-through configuration of the plot.

/// Styling of the line layers.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    /// Maximum number of lines drawn in one frame.
    pub block_line_count: usize,
    pub pixel_ratio: f64,
    /// Color of the lines of the context layer.
    pub context_color: [u8; 3],
    pub context_opacity: f64,
    /// Blend the focus lines instead of depth testing them.
    pub focus_alpha_blending: bool,
    /// Vertical inset of the lines, in pixels.
    pub vertical_padding: f64,
    /// Margin beyond the plot width that axes may be dragged into, in pixels.
    pub canvas_overdrag: f64,
}

impl LineStyle {
    pub const MIN_PIXEL_RATIO: f64 = 0.25;
    pub const MAX_PIXEL_RATIO: f64 = 4.0;

    /// Clamps every knob to its supported bounds.
    pub fn sanitized(mut self) -> Self {
        self.block_line_count = self.block_line_count.max(1);
        self.pixel_ratio = if self.pixel_ratio.is_finite() {
            self.pixel_ratio
                .clamp(Self::MIN_PIXEL_RATIO, Self::MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        self.context_opacity = if self.context_opacity.is_finite() {
            self.context_opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.vertical_padding = finite_non_negative(self.vertical_padding);
        self.canvas_overdrag = finite_non_negative(self.canvas_overdrag);
        self
    }

    /// Overdrag in canvas pixels.
    pub fn canvas_overdrag_px(&self) -> f64 {
        self.canvas_overdrag * self.pixel_ratio
    }
}

fn finite_non_negative(v: f64) -> f64 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            block_line_count: 5000,
            pixel_ratio: 1.0,
            context_color: [0, 0, 0],
            context_opacity: 0.025,
            focus_alpha_blending: false,
            vertical_padding: 2.0,
            canvas_overdrag: 40.0,
        }
    }
}

/// Size and margins of the host area.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub legend_width: f64,
    /// Horizontal fraction of the host area covered by the plot.
    pub domain_x: [f64; 2],
    /// Vertical fraction of the host area covered by the plot.
    pub domain_y: [f64; 2],
}

impl Layout {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Derives the plot and canvas geometry.
    pub fn geometry(&self, style: &LineStyle) -> Geometry {
        let span = |[lo, hi]: [f64; 2]| (hi - lo).clamp(0.0, 1.0);
        let layout_width = self.width * span(self.domain_x);
        let layout_height = self.height * span(self.domain_y);

        let width = (layout_width - 2.0 * self.padding - self.legend_width).max(0.0);
        let height = (layout_height - 2.0 * self.padding).max(0.0);
        let pixel_ratio = style.pixel_ratio;

        Geometry {
            width,
            height,
            canvas_width: width * pixel_ratio + 2.0 * style.canvas_overdrag * pixel_ratio,
            canvas_height: height * pixel_ratio,
            translate_x: self.width * self.domain_x[0] + self.padding,
            translate_y: self.height * (1.0 - self.domain_y[1]) + self.padding,
            pixel_ratio,
            overdrag: style.canvas_overdrag,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 450.0,
            padding: 80.0,
            legend_width: 80.0,
            domain_x: [0.0, 1.0],
            domain_y: [0.0, 1.0],
        }
    }
}

/// Derived geometry of the plot area and the canvases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Width of the plot area, in css pixels.
    pub width: f64,
    /// Height of the plot area, in css pixels.
    pub height: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Offset of the plot area within the host area.
    pub translate_x: f64,
    pub translate_y: f64,
    pub pixel_ratio: f64,
    /// Overdrag in css pixels.
    pub overdrag: f64,
}

impl Geometry {
    /// Inset of the unit interval of the lines, relative to the canvas height.
    pub fn unit_pad(&self, vertical_padding: f64) -> f64 {
        crate::packing::unit_pad(vertical_padding, self.canvas_height)
    }
}

/// Sizes of the brush capture areas.
pub struct FilterBar;

impl FilterBar {
    /// Width of the area around an axis that starts a brush.
    pub const CAPTURE_WIDTH: f64 = 20.0;
    /// Height of the resize handles on both ends of a brush.
    pub const HANDLE_HEIGHT: f64 = 16.0;
    /// Outward nudge applied to collapsed ordinal brushes.
    pub const ORDINAL_NUDGE: f64 = 0.05;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_of_the_default_layout() {
        let style = LineStyle {
            pixel_ratio: 2.0,
            ..Default::default()
        };
        let geometry = Layout::new(1000.0, 500.0).geometry(&style);

        assert_eq!(geometry.width, 1000.0 - 160.0 - 80.0);
        assert_eq!(geometry.height, 500.0 - 160.0);
        assert_eq!(geometry.canvas_width, 760.0 * 2.0 + 2.0 * 40.0 * 2.0);
        assert_eq!(geometry.canvas_height, 340.0 * 2.0);
        assert_eq!(geometry.translate_x, 80.0);
        assert_eq!(geometry.translate_y, 80.0);
    }

    #[test]
    fn line_padding_is_relative_to_canvas_pixels() {
        let style = LineStyle {
            pixel_ratio: 2.0,
            ..Default::default()
        };
        let geometry = Layout::new(1000.0, 500.0).geometry(&style);

        assert_eq!(geometry.unit_pad(2.0), 2.0 / 680.0);
        let unscaled = Layout::new(1000.0, 500.0).geometry(&LineStyle::default());
        assert_eq!(unscaled.unit_pad(2.0), 2.0 / 340.0);
    }

    #[test]
    fn sanitized_clamps_knobs() {
        let style = LineStyle {
            block_line_count: 0,
            pixel_ratio: 10.0,
            context_opacity: -1.0,
            vertical_padding: f64::NAN,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(style.block_line_count, 1);
        assert_eq!(style.pixel_ratio, LineStyle::MAX_PIXEL_RATIO);
        assert_eq!(style.context_opacity, 0.0);
        assert_eq!(style.vertical_padding, 0.0);
    }
}
