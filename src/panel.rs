//! Panels between adjacent axes and their per draw uniforms.
use crate::{
    packing::{GPU_DIMENSION_COUNT, VEC4_ATTRIBUTE_COUNT},
    wgsl::{self, HostSharable, Vec2, Vec4},
};

/// Padding of the filter bounds, keeps lines on the bounds visible.
pub const FILTER_EPSILON: f64 = 1e-3;

/// State of one axis, as seen by the line layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelView {
    /// Original index of the dimension, which is also its attribute slot.
    pub key: usize,
    /// Horizontal position of the axis, in canvas pixels.
    pub canvas_x: f64,
    /// Unit filter range of the dimension.
    pub filter: [f64; 2],
}

/// Canvas extents shared by all panels of a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Overdrag, in canvas pixels.
    pub overdrag: f64,
}

/// Rectangle of the canvas a panel may touch, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ScissorRect {
    fn clamped(x: f64, width: f64, geometry: &CanvasGeometry) -> Self {
        let canvas_width = geometry.canvas_width.max(0.0);
        let x0 = x.clamp(0.0, canvas_width);
        let x1 = (x + width).clamp(x0, canvas_width);

        Self {
            x: x0.round() as u32,
            y: 0,
            width: (x1.round() - x0.round()).max(0.0) as u32,
            height: geometry.canvas_height.max(0.0).round() as u32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Uniforms of one panel draw.
///
/// Mirrors the `Panel` struct of `lines.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelUniforms {
    /// One-hot selector of the slot of the left axis.
    pub dim_left: [Vec4<f32>; VEC4_ATTRIBUTE_COUNT],
    /// One-hot selector of the slot of the right axis.
    pub dim_right: [Vec4<f32>; VEC4_ATTRIBUTE_COUNT],
    pub lo: [Vec4<f32>; VEC4_ATTRIBUTE_COUNT],
    pub hi: [Vec4<f32>; VEC4_ATTRIBUTE_COUNT],
    pub resolution: Vec2<f32>,
    pub view_box_position: Vec2<f32>,
    pub view_box_size: Vec2<f32>,
    pub color_clamp: Vec2<f32>,
}

unsafe impl HostSharable for PanelUniforms {}

impl PanelUniforms {
    /// Reads back the value of one slot of a packed slot array.
    pub fn slot(values: &[Vec4<f32>; VEC4_ATTRIBUTE_COUNT], slot: usize) -> f32 {
        values[slot / 4].0[slot % 4]
    }
}

/// A region between two axes adjacent in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Key of the left axis.
    pub key: usize,
    /// Key of the right axis.
    pub next_key: usize,
    pub x: f64,
    pub next_x: f64,
    pub scissor: ScissorRect,
    pub uniforms: PanelUniforms,
}

/// Computes the panels of the axes in display order.
///
/// Filters are only applied if `apply_filters` is set, otherwise every
/// slot passes. Fewer than two axes produce no panels.
pub fn panels(
    views: &[PanelView],
    geometry: &CanvasGeometry,
    apply_filters: bool,
    color_clamp: [f64; 2],
) -> Vec<Panel> {
    let dimension_count = views.len();
    if dimension_count < 2 {
        return Vec::new();
    }
    let panel_count = dimension_count - 1;

    let mut leftmost = 0;
    let mut rightmost = 0;
    let (mut lowest_x, mut highest_x) = (f64::INFINITY, f64::NEG_INFINITY);
    for (i, view) in views[..panel_count].iter().enumerate() {
        if view.canvas_x > highest_x {
            highest_x = view.canvas_x;
            rightmost = i;
        }
        if view.canvas_x < lowest_x {
            lowest_x = view.canvas_x;
            leftmost = i;
        }
    }

    let mut lims = [[0.0f32; GPU_DIMENSION_COUNT]; 2];
    for (lo_hi, lim) in lims.iter_mut().enumerate() {
        let full = lo_hi as f64;
        let eps = (2.0 * full - 1.0) * FILTER_EPSILON;
        for (d, value) in lim.iter_mut().enumerate() {
            let bound = if apply_filters && d < dimension_count {
                views
                    .iter()
                    .find(|v| v.key == d)
                    .map_or(full, |v| v.filter[lo_hi])
            } else {
                full
            };
            *value = (bound + eps) as f32;
        }
    }
    let lo = wgsl::pack_vec4(lims[0]);
    let hi = wgsl::pack_vec4(lims[1]);

    let overdrag = geometry.overdrag;
    (0..panel_count)
        .map(|i| {
            let view = &views[i];
            let next = &views[(i + 1) % dimension_count];
            let x = view.canvas_x;
            let panel_size_x = next.canvas_x - x;

            let scissor_x = if i == leftmost { 0.0 } else { x + overdrag };
            let scissor_width = if i == rightmost {
                2.0 * panel_size_x + overdrag
            } else {
                panel_size_x + 1.0 + if i == leftmost { x + overdrag } else { 0.0 }
            };

            Panel {
                key: view.key,
                next_key: next.key,
                x,
                next_x: next.canvas_x,
                scissor: ScissorRect::clamped(scissor_x, scissor_width, geometry),
                uniforms: PanelUniforms {
                    dim_left: one_hot(view.key),
                    dim_right: one_hot(next.key),
                    lo,
                    hi,
                    resolution: Vec2([
                        geometry.canvas_width as f32,
                        geometry.canvas_height as f32,
                    ]),
                    view_box_position: Vec2([(x + overdrag) as f32, 0.0]),
                    view_box_size: Vec2([panel_size_x as f32, geometry.canvas_height as f32]),
                    color_clamp: Vec2(color_clamp.map(|c| c as f32)),
                },
            }
        })
        .collect()
}

fn one_hot(slot: usize) -> [Vec4<f32>; VEC4_ATTRIBUTE_COUNT] {
    let mut values = [0.0; GPU_DIMENSION_COUNT];
    if let Some(v) = values.get_mut(slot) {
        *v = 1.0;
    }
    wgsl::pack_vec4(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOMETRY: CanvasGeometry = CanvasGeometry {
        canvas_width: 680.0,
        canvas_height: 300.0,
        overdrag: 40.0,
    };

    fn views() -> Vec<PanelView> {
        vec![
            PanelView {
                key: 0,
                canvas_x: 0.0,
                filter: [0.0, 1.0],
            },
            PanelView {
                key: 2,
                canvas_x: 300.0,
                filter: [0.25, 0.5],
            },
            PanelView {
                key: 1,
                canvas_x: 600.0,
                filter: [0.0, 1.0],
            },
        ]
    }

    #[test]
    fn one_panel_per_adjacent_pair() {
        let panels = panels(&views(), &GEOMETRY, true, [0.0, 1.0]);
        assert_eq!(panels.len(), 2);
        assert_eq!((panels[0].key, panels[0].next_key), (0, 2));
        assert_eq!((panels[1].key, panels[1].next_key), (2, 1));

        let u = &panels[1].uniforms;
        assert_eq!(PanelUniforms::slot(&u.dim_left, 2), 1.0);
        assert_eq!(PanelUniforms::slot(&u.dim_right, 1), 1.0);
        assert_eq!(u.dim_left.iter().flat_map(|v| v.0).sum::<f32>(), 1.0);
        assert_eq!(u.view_box_position, Vec2([340.0, 0.0]));
        assert_eq!(u.view_box_size, Vec2([300.0, 300.0]));
    }

    #[test]
    fn filters_are_padded_by_epsilon() {
        let panels = panels(&views(), &GEOMETRY, true, [0.0, 1.0]);
        let u = &panels[0].uniforms;

        assert_eq!(PanelUniforms::slot(&u.lo, 2), (0.25 - FILTER_EPSILON) as f32);
        assert_eq!(PanelUniforms::slot(&u.hi, 2), (0.5 + FILTER_EPSILON) as f32);
        assert_eq!(PanelUniforms::slot(&u.lo, 0), -FILTER_EPSILON as f32);
        assert_eq!(PanelUniforms::slot(&u.hi, 63), (1.0 + FILTER_EPSILON) as f32);
    }

    #[test]
    fn context_panels_ignore_filters() {
        let panels = panels(&views(), &GEOMETRY, false, [0.0, 1.0]);
        let u = &panels[0].uniforms;
        assert_eq!(PanelUniforms::slot(&u.lo, 2), -FILTER_EPSILON as f32);
        assert_eq!(PanelUniforms::slot(&u.hi, 2), (1.0 + FILTER_EPSILON) as f32);
    }

    #[test]
    fn outer_panels_widen_their_scissors() {
        let panels = panels(&views(), &GEOMETRY, true, [0.0, 1.0]);
        assert_eq!(
            panels[0].scissor,
            ScissorRect {
                x: 0,
                y: 0,
                width: 341,
                height: 300
            }
        );
        // The rightmost panel is clamped to the canvas.
        assert_eq!(
            panels[1].scissor,
            ScissorRect {
                x: 340,
                y: 0,
                width: 340,
                height: 300
            }
        );
    }

    #[test]
    fn a_single_axis_has_no_panels() {
        assert!(panels(&views()[..1], &GEOMETRY, true, [0.0, 1.0]).is_empty());
    }
}
