use std::{borrow::Cow, collections::BTreeMap};

use once_cell::sync::OnceCell;

use crate::{
    colors::Rgba,
    dimension::Dimension,
    error::{Error, Result},
    lerp::Lerp,
    scale::{self, LinearScale},
};

/// A descriptor for how to construct a color scale.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorScaleDescriptor<'a> {
    Named(Cow<'a, str>),
    Constant(Cow<'a, str>),
    Gradient(Vec<(f64, Cow<'a, str>)>),
}

impl ColorScaleDescriptor<'_> {
    pub fn to_color_scale(&self) -> Result<ColorScale> {
        match self {
            ColorScaleDescriptor::Named(name) => {
                let scales = Self::get_named_color_scales();
                match scales.get(&**name) {
                    Some(descriptor) => descriptor.to_color_scale(),
                    None => Err(Error::InvalidColorScale(format!(
                        "named color scale {name:?} does not exist"
                    ))),
                }
            }
            ColorScaleDescriptor::Constant(constant) => {
                let constant = Rgba::parse_css(constant)?;
                Ok(ColorScale {
                    scale: vec![(0.0, constant), (1.0, constant)],
                })
            }
            ColorScaleDescriptor::Gradient(gradient) => {
                let gradient = gradient
                    .iter()
                    .map(|(t, css)| Ok((*t, Rgba::parse_css(css)?)))
                    .collect::<Result<Vec<_>>>()?;

                if gradient.len() < 2 {
                    return Err(Error::InvalidColorScale(
                        "a gradient requires at least two stops".into(),
                    ));
                }
                if gradient.windows(2).any(|w| w[0].0 > w[1].0) {
                    return Err(Error::InvalidColorScale(
                        "the stops are not sorted in ascending order".into(),
                    ));
                }

                Ok(ColorScale { scale: gradient })
            }
        }
    }

    fn get_named_color_scales() -> &'static BTreeMap<&'static str, ColorScaleDescriptor<'static>> {
        static NAMED_SCALES: OnceCell<BTreeMap<&'static str, ColorScaleDescriptor<'static>>> =
            OnceCell::new();

        NAMED_SCALES.get_or_init(|| {
            let gradient = |stops: &[(f64, &'static str)]| {
                ColorScaleDescriptor::Gradient(
                    stops.iter().map(|&(t, c)| (t, Cow::Borrowed(c))).collect(),
                )
            };

            BTreeMap::from([
                (
                    "Greys",
                    gradient(&[(0.0, "rgb(0,0,0)"), (1.0, "rgb(255,255,255)")]),
                ),
                (
                    "Bluered",
                    gradient(&[(0.0, "rgb(0,0,255)"), (1.0, "rgb(255,0,0)")]),
                ),
                (
                    "RdBu",
                    gradient(&[
                        (0.0, "rgb(5,10,172)"),
                        (0.35, "rgb(106,137,247)"),
                        (0.5, "rgb(190,190,190)"),
                        (0.6, "rgb(220,170,132)"),
                        (0.7, "rgb(230,145,90)"),
                        (1.0, "rgb(178,10,28)"),
                    ]),
                ),
                (
                    "Jet",
                    gradient(&[
                        (0.0, "rgb(0,0,131)"),
                        (0.125, "rgb(0,60,170)"),
                        (0.375, "rgb(5,255,255)"),
                        (0.625, "rgb(255,255,0)"),
                        (0.875, "rgb(250,0,0)"),
                        (1.0, "rgb(128,0,0)"),
                    ]),
                ),
                (
                    "Hot",
                    gradient(&[
                        (0.0, "rgb(0,0,0)"),
                        (0.3, "rgb(230,0,0)"),
                        (0.6, "rgb(255,210,0)"),
                        (1.0, "rgb(255,255,255)"),
                    ]),
                ),
                (
                    "Viridis",
                    gradient(&[
                        (0.0, "#440154"),
                        (0.25, "#3b528b"),
                        (0.5, "#21918c"),
                        (0.75, "#5ec962"),
                        (1.0, "#fde725"),
                    ]),
                ),
            ])
        })
    }
}

/// A color scale that maps each value between `0` and `1` to a color value.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct ColorScale {
    scale: Vec<(f64, Rgba)>,
}

impl ColorScale {
    /// Mirrors the scale, so that `0` maps to the former end color.
    pub fn reversed(mut self) -> Self {
        self.scale.reverse();
        for (t, _) in self.scale.iter_mut() {
            *t = 1.0 - *t;
        }
        self
    }

    /// Samples the color scale at a specific `t` value.
    ///
    /// Values outside of the stops are clamped to the first or last color.
    /// The channels are interpolated separately, so non-uniform stop
    /// distances are honored.
    pub fn sample(&self, t: f64) -> Rgba {
        let (first_t, first) = self.scale[0];
        let (last_t, last) = self.scale[self.scale.len() - 1];
        if t.is_nan() || t <= first_t {
            return first;
        }
        if t >= last_t {
            return last;
        }

        let end_color_idx = self.scale.partition_point(|(x, _)| *x <= t);
        let (start_t, start_color) = self.scale[end_color_idx - 1];
        if start_t == t {
            return start_color;
        }

        let (end_t, end_color) = self.scale[end_color_idx];
        let t = (t - start_t) / (end_t - start_t);
        let [r, g, b] = start_color.channels().lerp(end_color.channels(), t);
        Rgba {
            r,
            g,
            b,
            a: start_color.a.lerp(end_color.a, t),
        }
    }
}

/// The `color` attribute of the lines.
#[derive(Debug, Clone, PartialEq)]
pub enum LineColor {
    /// One color for every line.
    Constant(String),
    /// One value per line, mapped through a color scale.
    Values {
        values: Vec<f64>,
        scale: ColorScaleDescriptor<'static>,
        reverse_scale: bool,
        cmin: Option<f64>,
        cmax: Option<f64>,
    },
}

/// Maps lines to colors: per line unit values plus the unit-to-color function.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapping {
    unit_values: Vec<f64>,
    scale: ColorScale,
    clamp: LinearScale,
}

impl ColorMapping {
    /// Resolves the line colors of `sample_count` lines.
    ///
    /// Value arrays are normalized over their own extent, with the
    /// `cmin`/`cmax` bounds defaulting to that extent.
    pub fn new(color: &LineColor, sample_count: usize) -> Result<Self> {
        match color {
            LineColor::Constant(css) => {
                let scale = ColorScaleDescriptor::Constant(Cow::Borrowed(css)).to_color_scale()?;
                Ok(Self {
                    unit_values: vec![0.5; sample_count],
                    scale,
                    clamp: LinearScale::new([0.0, 1.0], [0.0, 1.0]).clamped(),
                })
            }
            LineColor::Values {
                values,
                scale,
                reverse_scale,
                cmin,
                cmax,
            } => {
                if values.len() < sample_count {
                    return Err(Error::SampleCountMismatch {
                        expected: sample_count,
                        found: values.len(),
                    });
                }

                let values = Dimension::new("color", values[..sample_count].to_vec());
                let to_unit = scale::domain_to_unit_scale(&values);
                let [lo, hi] = to_unit.domain();
                let unit_min = to_unit.scale(cmin.unwrap_or(lo));
                let unit_max = to_unit.scale(cmax.unwrap_or(hi));

                let mut scale = scale.to_color_scale()?;
                if *reverse_scale {
                    scale = scale.reversed();
                }

                Ok(Self {
                    unit_values: values
                        .values
                        .iter()
                        .map(|&v| to_unit.scale(scale::finite_or_zero(v)))
                        .collect(),
                    scale,
                    clamp: LinearScale::new([unit_min, unit_max], [0.0, 1.0]).clamped(),
                })
            }
        }
    }

    /// The color value of each line, in unit space.
    pub fn unit_values(&self) -> &[f64] {
        &self.unit_values
    }

    /// Maps a unit color value to its color.
    pub fn unit_to_color(&self, d: f64) -> Rgba {
        self.scale.sample(self.clamp.scale(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(stops: &[(f64, &'static str)]) -> ColorScaleDescriptor<'static> {
        ColorScaleDescriptor::Gradient(stops.iter().map(|&(t, c)| (t, c.into())).collect())
    }

    #[test]
    fn samples_non_uniform_stops() {
        let scale = gradient(&[
            (0.0, "rgb(0, 0, 0)"),
            (0.2, "rgb(100, 0, 0)"),
            (1.0, "rgb(100, 200, 0)"),
        ])
        .to_color_scale()
        .unwrap();

        assert_eq!(scale.sample(0.1).channels(), [50.0, 0.0, 0.0]);
        assert_eq!(scale.sample(0.6).channels(), [100.0, 100.0, 0.0]);
        assert_eq!(scale.sample(-1.0).channels(), [0.0, 0.0, 0.0]);
        assert_eq!(scale.sample(2.0).channels(), [100.0, 200.0, 0.0]);
    }

    #[test]
    fn reversed_scale_swaps_ends() {
        let scale = ColorScaleDescriptor::Named("Bluered".into())
            .to_color_scale()
            .unwrap()
            .reversed();
        assert_eq!(scale.sample(0.0).channels(), [255.0, 0.0, 0.0]);
        assert_eq!(scale.sample(1.0).channels(), [0.0, 0.0, 255.0]);
    }

    #[test]
    fn unknown_named_scale_is_an_error() {
        assert!(ColorScaleDescriptor::Named("Nope".into())
            .to_color_scale()
            .is_err());
    }

    #[test]
    fn constant_color_uses_the_middle_of_the_scale() {
        let mapping = ColorMapping::new(&LineColor::Constant("#444".into()), 4).unwrap();
        assert_eq!(mapping.unit_values(), &[0.5; 4]);
        assert_eq!(mapping.unit_to_color(0.3).channels(), [68.0, 68.0, 68.0]);
    }

    #[test]
    fn values_are_normalized_and_clamped() {
        let color = LineColor::Values {
            values: vec![35.0, 63.0, 21.0, 42.0],
            scale: gradient(&[(0.0, "rgb(0,0,0)"), (1.0, "rgb(200,0,0)")]),
            reverse_scale: false,
            cmin: Some(28.0),
            cmax: None,
        };
        let mapping = ColorMapping::new(&color, 4).unwrap();

        assert_eq!(mapping.unit_values()[1], 1.0);
        assert_eq!(mapping.unit_values()[2], 0.0);
        assert_eq!(mapping.clamp.domain(), [1.0 / 6.0, 1.0]);
        // Below cmin everything maps to the first color.
        assert_eq!(mapping.unit_to_color(0.0).channels(), [0.0, 0.0, 0.0]);
        assert_eq!(mapping.unit_to_color(1.0).channels(), [200.0, 0.0, 0.0]);
    }

    #[test]
    fn non_finite_color_values_count_as_zero() {
        let color = LineColor::Values {
            values: vec![-4.0, f64::NAN, 4.0, f64::NEG_INFINITY],
            scale: ColorScaleDescriptor::Named("Greys".into()),
            reverse_scale: false,
            cmin: None,
            cmax: None,
        };
        let mapping = ColorMapping::new(&color, 4).unwrap();
        assert_eq!(mapping.unit_values(), &[0.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn too_few_color_values_is_an_error() {
        let color = LineColor::Values {
            values: vec![1.0],
            scale: ColorScaleDescriptor::Named("Greys".into()),
            reverse_scale: false,
            cmin: None,
            cmax: None,
        };
        assert!(matches!(
            ColorMapping::new(&color, 3),
            Err(Error::SampleCountMismatch { expected: 3, found: 1 })
        ));
    }
}
