//! Packing of the dataset into the static vertex payload of the line layers.
use crate::{
    color_scale::ColorMapping,
    colors::Rgba,
    dimension::{self, Dimension, MAX_DIMENSIONS, MIN_DIMENSIONS},
    error::{Error, Result},
    scale,
};

/// Number of attribute slots of every vertex.
pub const GPU_DIMENSION_COUNT: usize = 64;

/// Number of slots grouped into one `vec4` vertex attribute.
pub const VEC4_NUMBER_COUNT: usize = 4;

/// Number of `vec4` vertex attributes of every vertex.
pub const VEC4_ATTRIBUTE_COUNT: usize = GPU_DIMENSION_COUNT / VEC4_NUMBER_COUNT;

/// Vertices emitted for each sample, one per panel side.
pub const SECTION_VERTEX_COUNT: usize = 2;

/// Value of the slots that hold no dimension.
pub const SENTINEL: f32 = 0.5;

/// Distance kept from the near and far planes.
pub const DEPTH_LIMIT_EPSILON: f64 = 1e-6;

/// Number of entries of the color lookup table.
pub const PALETTE_SIZE: usize = 256;

/// Clamps a depth value into `[ε, 1 - ε]`.
pub fn adjust_depth(d: f64) -> f64 {
    d.clamp(DEPTH_LIMIT_EPSILON, 1.0 - DEPTH_LIMIT_EPSILON)
}

/// Inset of the unit interval that keeps lines off the panel borders.
pub fn unit_pad(vertical_padding: f64, canvas_height: f64) -> f64 {
    let pad = vertical_padding / canvas_height;
    if pad.is_finite() {
        pad.clamp(0.0, 0.5)
    } else {
        0.0
    }
}

/// Maps a unit value into the padded unit interval.
pub fn padded_unit(unit_pad: f64, u: f64) -> f64 {
    unit_pad + (1.0 - 2.0 * unit_pad) * u
}

/// Padded unit values of one dimension.
///
/// Non-finite values are drawn as `0`.
pub fn padded_unit_values(dimension: &Dimension, unit_pad: f64) -> Vec<f64> {
    let to_unit = scale::domain_to_unit_scale(dimension);
    dimension
        .values
        .iter()
        .map(|&v| padded_unit(unit_pad, to_unit.scale(scale::finite_or_zero(v))))
        .collect()
}

/// Builds the `sample_count × GPU_DIMENSION_COUNT` grid of slot values.
///
/// Slot `g` of a sample holds the value of dimension `g`, the last slot
/// holds the depth adjusted color, every other slot the sentinel.
pub fn make_points(
    sample_count: usize,
    dimensions: &[Vec<f64>],
    color: &[f64],
) -> Result<Vec<f32>> {
    if dimensions.len() >= GPU_DIMENSION_COUNT {
        return Err(Error::TooManyDimensions {
            found: dimensions.len(),
            max: GPU_DIMENSION_COUNT - 1,
        });
    }
    if let Some(short) = dimensions
        .iter()
        .map(Vec::len)
        .chain([color.len()])
        .find(|&len| len < sample_count)
    {
        return Err(Error::SampleCountMismatch {
            expected: sample_count,
            found: short,
        });
    }

    let mut points = Vec::with_capacity(sample_count * GPU_DIMENSION_COUNT);
    for j in 0..sample_count {
        for i in 0..GPU_DIMENSION_COUNT {
            let value = if i < dimensions.len() {
                dimensions[i][j] as f32
            } else if i == GPU_DIMENSION_COUNT - 1 {
                adjust_depth(color[j]) as f32
            } else {
                SENTINEL
            };
            points.push(value);
        }
    }

    Ok(points)
}

/// Interleaves the points into the vertex buffer contents.
///
/// Every sample is emitted [`SECTION_VERTEX_COUNT`] times. The first vertex
/// of each pair carries a negated depth slot, which marks it as the left
/// end of the segment.
pub fn make_vertex_attributes(sample_count: usize, points: &[f32]) -> Vec<f32> {
    let mut vertices =
        Vec::with_capacity(sample_count * SECTION_VERTEX_COUNT * GPU_DIMENSION_COUNT);
    for sample in points.chunks_exact(GPU_DIMENSION_COUNT).take(sample_count) {
        for k in 0..SECTION_VERTEX_COUNT {
            let start = vertices.len();
            vertices.extend_from_slice(sample);
            if k % 2 == 0 {
                vertices[start + GPU_DIMENSION_COUNT - 1] *= -1.0;
            }
        }
    }

    vertices
}

/// Which of the layers a palette is built for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaletteMode {
    /// Per line colors.
    Focus,
    /// One translucent color for every line.
    Context { color: [u8; 3], opacity: f64 },
}

/// Samples the lookup table of the line colors at `j / 255`.
pub fn palette(unit_to_color: impl Fn(f64) -> Rgba, mode: PaletteMode) -> Vec<[u8; 4]> {
    (0..PALETTE_SIZE)
        .map(|j| match mode {
            PaletteMode::Focus => {
                let c = unit_to_color(j as f64 / (PALETTE_SIZE - 1) as f64);
                let [r, g, b] = c.channels().map(|c| c.round().clamp(0.0, 255.0) as u8);
                [r, g, b, 255]
            }
            PaletteMode::Context { color, opacity } => {
                let [r, g, b] = color;
                [r, g, b, (opacity.clamp(0.0, 1.0) * 255.0).round() as u8]
            }
        })
        .collect()
}

/// Static payload of a line layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LineData {
    pub sample_count: usize,
    pub dimension_count: usize,
    /// Interleaved vertices, [`GPU_DIMENSION_COUNT`] slots each.
    pub vertices: Vec<f32>,
    pub palette: Vec<[u8; 4]>,
}

impl LineData {
    /// Packs the visible dimensions in their original order.
    pub fn new(
        dimensions: &[Dimension],
        colors: &ColorMapping,
        mode: PaletteMode,
        unit_pad: f64,
    ) -> Result<Self> {
        let mut dimensions = dimension::visible(dimensions).collect::<Vec<_>>();
        if dimensions.len() < MIN_DIMENSIONS {
            return Err(Error::NotEnoughDimensions {
                found: dimensions.len(),
            });
        }
        if dimensions.len() > MAX_DIMENSIONS {
            log::warn!(
                "only the first {MAX_DIMENSIONS} of {} dimensions are drawn",
                dimensions.len()
            );
            dimensions.truncate(MAX_DIMENSIONS);
        }

        let sample_count = dimensions[0].sample_count();
        for d in dimensions.iter().map(|d| d.sample_count()) {
            if d != sample_count {
                return Err(Error::SampleCountMismatch {
                    expected: sample_count,
                    found: d,
                });
            }
        }
        let color = colors.unit_values();
        if color.len() < sample_count {
            return Err(Error::SampleCountMismatch {
                expected: sample_count,
                found: color.len(),
            });
        }

        let padded = dimensions
            .iter()
            .map(|d| padded_unit_values(d, unit_pad))
            .collect::<Vec<_>>();
        let points = make_points(sample_count, &padded, color)?;
        let vertices = make_vertex_attributes(sample_count, &points);
        log::debug!(
            "packed {sample_count} samples of {} dimensions",
            dimensions.len()
        );

        Ok(Self {
            sample_count,
            dimension_count: dimensions.len(),
            vertices,
            palette: palette(|d| colors.unit_to_color(d), mode),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_scale::LineColor;

    fn dataset() -> (Vec<Vec<f64>>, Vec<f64>) {
        let dimensions = vec![
            vec![0.1, 0.2, 0.3],
            vec![0.9, 0.8, 0.7],
            vec![0.5, 0.0, 1.0],
        ];
        let color = vec![0.0, 0.25, 1.0];
        (dimensions, color)
    }

    #[test]
    fn unused_slots_hold_the_sentinel_and_depth() {
        let (dimensions, color) = dataset();
        let points = make_points(3, &dimensions, &color).unwrap();
        assert_eq!(points.len(), 3 * GPU_DIMENSION_COUNT);

        for (s, sample) in points.chunks_exact(GPU_DIMENSION_COUNT).enumerate() {
            for (d, dimension) in dimensions.iter().enumerate() {
                assert_eq!(sample[d], dimension[s] as f32);
            }
            assert!(sample[dimensions.len()..GPU_DIMENSION_COUNT - 1]
                .iter()
                .all(|&v| v == SENTINEL));

            let depth = sample[GPU_DIMENSION_COUNT - 1];
            assert_eq!(depth, adjust_depth(color[s]) as f32);
            assert!(depth as f64 >= DEPTH_LIMIT_EPSILON as f32 as f64);
            assert!(depth <= (1.0 - DEPTH_LIMIT_EPSILON) as f32);
        }
    }

    #[test]
    fn depth_is_kept_off_the_planes() {
        assert_eq!(adjust_depth(0.0), DEPTH_LIMIT_EPSILON);
        assert_eq!(adjust_depth(1.0), 1.0 - DEPTH_LIMIT_EPSILON);
        assert_eq!(adjust_depth(0.3), 0.3);
    }

    #[test]
    fn left_vertex_negates_the_depth_slot() {
        let (dimensions, color) = dataset();
        let points = make_points(3, &dimensions, &color).unwrap();
        let vertices = make_vertex_attributes(3, &points);
        assert_eq!(
            vertices.len(),
            3 * SECTION_VERTEX_COUNT * GPU_DIMENSION_COUNT
        );

        let mut vertex_chunks = vertices.chunks_exact(GPU_DIMENSION_COUNT);
        for sample in points.chunks_exact(GPU_DIMENSION_COUNT) {
            let left = vertex_chunks.next().unwrap();
            let right = vertex_chunks.next().unwrap();
            assert_eq!(right, sample);
            assert_eq!(left[..GPU_DIMENSION_COUNT - 1], sample[..GPU_DIMENSION_COUNT - 1]);
            assert_eq!(
                left[GPU_DIMENSION_COUNT - 1],
                -sample[GPU_DIMENSION_COUNT - 1]
            );
        }
    }

    #[test]
    fn padded_values_stay_inside_the_panel() {
        let pad = unit_pad(2.0, 100.0);
        assert_eq!(pad, 0.02);
        assert_eq!(padded_unit(pad, 0.0), 0.02);
        assert!((padded_unit(pad, 1.0) - 0.98).abs() < 1e-12);

        let d = Dimension::new("d", vec![10.0, 20.0, 15.0]);
        let values = padded_unit_values(&d, pad);
        assert_eq!(values[0], 0.02);
        assert!((values[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn non_finite_values_are_drawn_at_zero() {
        let d = Dimension::new("d", vec![0.0, 10.0, f64::NAN, f64::INFINITY]);
        let values = padded_unit_values(&d, 0.0);
        assert_eq!(values, vec![0.0, 1.0, 0.0, 0.0]);

        let d = Dimension::new("d", vec![-10.0, 10.0, f64::NEG_INFINITY]);
        assert_eq!(padded_unit_values(&d, 0.0)[2], 0.5);
    }

    #[test]
    fn points_reject_layouts_that_do_not_fit() {
        let dimensions = vec![vec![0.5]; GPU_DIMENSION_COUNT];
        assert!(matches!(
            make_points(1, &dimensions, &[0.5]),
            Err(Error::TooManyDimensions { found: 64, max: 63 })
        ));

        let (dimensions, _) = dataset();
        assert!(matches!(
            make_points(3, &dimensions, &[0.5]),
            Err(Error::SampleCountMismatch {
                expected: 3,
                found: 1
            })
        ));
    }

    #[test]
    fn context_palette_is_constant_and_translucent() {
        let p = palette(
            |t| Rgba::opaque(t * 255.0, 0.0, 0.0),
            PaletteMode::Context {
                color: [10, 20, 30],
                opacity: 0.025,
            },
        );
        assert_eq!(p.len(), PALETTE_SIZE);
        assert!(p.iter().all(|&c| c == [10, 20, 30, 6]));
    }

    #[test]
    fn focus_palette_samples_the_scale() {
        let p = palette(|t| Rgba::opaque(t * 255.0, 0.0, 0.0), PaletteMode::Focus);
        assert_eq!(p[0], [0, 0, 0, 255]);
        assert_eq!(p[128], [128, 0, 0, 255]);
        assert_eq!(p[255], [255, 0, 0, 255]);
    }

    #[test]
    fn line_data_packs_visible_dimensions() {
        let dimensions = vec![
            Dimension::new("a", vec![1.0, 2.0, 3.0]),
            Dimension::new("hidden", vec![9.0, 9.0, 9.0]).hidden(),
            Dimension::new("b", vec![3.0, 2.0, 1.0]),
        ];
        let colors = ColorMapping::new(&LineColor::Constant("red".into()), 3).unwrap();
        let data = LineData::new(&dimensions, &colors, PaletteMode::Focus, 0.0).unwrap();

        assert_eq!(data.sample_count, 3);
        assert_eq!(data.dimension_count, 2);
        assert_eq!(data.vertices.len(), 3 * SECTION_VERTEX_COUNT * GPU_DIMENSION_COUNT);
        assert_eq!(data.vertices[GPU_DIMENSION_COUNT], 0.0);
        assert_eq!(data.vertices[GPU_DIMENSION_COUNT + 1], 1.0);
        assert_eq!(data.vertices[GPU_DIMENSION_COUNT + 2], SENTINEL);
        assert_eq!(data.palette[0], [255, 0, 0, 255]);
    }

    #[test]
    fn line_data_needs_two_dimensions() {
        let dimensions = vec![Dimension::new("a", vec![1.0])];
        let colors = ColorMapping::new(&LineColor::Constant("red".into()), 1).unwrap();
        assert!(matches!(
            LineData::new(&dimensions, &colors, PaletteMode::Focus, 0.0),
            Err(Error::NotEnoughDimensions { found: 1 })
        ));
    }
}
