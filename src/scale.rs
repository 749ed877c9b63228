//! Numeric scales used to map dimension values onto axes.
use crate::{
    dimension::Dimension,
    lerp::{InverseLerp, Lerp},
};

/// Returns the `[lo, hi]` extent of a dimension.
///
/// The explicit `range` wins over the extent of the values. Non-finite
/// values count as `0`. A zero-width extent is widened by `±1` if it lies
/// at zero and by `±10%` otherwise, which keeps the axis in the order of
/// magnitude of the data.
pub fn dimension_extent(dimension: &Dimension) -> [f64; 2] {
    let [mut lo, mut hi] = match dimension.range {
        Some([lo, hi]) => [finite_or_zero(lo), finite_or_zero(hi)],
        None => values_extent(&dimension.values),
    };

    if lo == hi {
        if lo == 0.0 {
            lo -= 1.0;
            hi += 1.0;
        } else {
            lo *= 0.9;
            hi *= 1.1;
        }
    }

    [lo, hi]
}

/// Replaces `NaN` and the infinities with `0`.
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn values_extent(values: &[f64]) -> [f64; 2] {
    let mut values = values.iter().copied().map(finite_or_zero);
    let first = match values.next() {
        Some(v) => v,
        None => return [0.0, 0.0],
    };

    values.fold([first, first], |[lo, hi], v| [lo.min(v), hi.max(v)])
}

/// An affine map from a domain interval to a range interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
    clamp: bool,
}

impl LinearScale {
    /// Constructs a new scale.
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    /// Clamps the mapped values to the range.
    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// Maps a domain value into the range.
    pub fn scale(&self, x: f64) -> f64 {
        let mut t = x.inv_lerp(self.domain[0], self.domain[1]);
        if !t.is_finite() {
            t = 0.5;
        }
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        self.range[0].lerp(self.range[1], t)
    }

    /// Maps a range value back into the domain.
    pub fn invert(&self, y: f64) -> f64 {
        let mut t = y.inv_lerp(self.range[0], self.range[1]);
        if !t.is_finite() {
            t = 0.5;
        }
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        self.domain[0].lerp(self.domain[1], t)
    }
}

/// A discrete scale mapping each domain entry onto a fixed range position.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalScale {
    domain: Box<[f64]>,
    range: Box<[f64]>,
}

impl OrdinalScale {
    /// Constructs a scale that spreads the domain evenly over `[start, stop]`,
    /// with the first entry at `start` and the last at `stop`.
    pub fn with_range_points(domain: impl Into<Box<[f64]>>, [start, stop]: [f64; 2]) -> Self {
        let domain = domain.into();
        let range = match domain.len() {
            0 => Box::default(),
            1 => [start.lerp(stop, 0.5)].into(),
            n => (0..n)
                .map(|i| start.lerp(stop, i as f64 / (n - 1) as f64))
                .collect(),
        };

        Self { domain, range }
    }

    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    pub fn range(&self) -> &[f64] {
        &self.range
    }

    /// Maps a domain entry to its position.
    pub fn scale(&self, v: f64) -> Option<f64> {
        self.domain
            .iter()
            .position(|&d| d == v)
            .map(|idx| self.range[idx])
    }
}

/// Scale from the raw domain of a dimension to vertical pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainScale {
    Linear(LinearScale),
    Ordinal(OrdinalScale),
}

impl DomainScale {
    /// Returns the raw domain values at the bottom and the top of the axis.
    pub fn domain_extent(&self) -> [f64; 2] {
        match self {
            DomainScale::Linear(s) => s.domain(),
            DomainScale::Ordinal(s) => {
                let domain = s.domain();
                match (domain.first(), domain.last()) {
                    (Some(&lo), Some(&hi)) => [lo, hi],
                    _ => [0.0, 0.0],
                }
            }
        }
    }

    /// Maps a raw value to a pixel position, if it is representable.
    pub fn scale(&self, v: f64) -> Option<f64> {
        match self {
            DomainScale::Linear(s) => Some(s.scale(v)),
            DomainScale::Ordinal(s) => s.scale(v),
        }
    }
}

/// Invertible map from the raw domain of a dimension to `[0, 1]`.
pub fn domain_to_unit_scale(dimension: &Dimension) -> LinearScale {
    LinearScale::new(dimension_extent(dimension), [0.0, 1.0])
}

/// Map from the unit interval to vertical pixels; larger values render higher.
pub fn unit_scale(height: f64, padding: f64) -> LinearScale {
    LinearScale::new([0.0, 1.0], [height - padding, padding])
}

/// Maps the raw domain to the vertical pixel range `[height - padding, padding]`.
///
/// Dimensions with tick values map each tick to the pixel position that its
/// relative position within the extent dictates.
pub fn domain_scale(height: f64, padding: f64, dimension: &Dimension) -> DomainScale {
    let extent = dimension_extent(dimension);
    let linear = LinearScale::new(extent, [height - padding, padding]);
    match tick_values(dimension) {
        Some(domain) => {
            let range = domain.iter().map(|&v| linear.scale(v)).collect();
            DomainScale::Ordinal(OrdinalScale { domain, range })
        }
        None => DomainScale::Linear(linear),
    }
}

fn tick_values(dimension: &Dimension) -> Option<Box<[f64]>> {
    let mut values = dimension
        .tick_vals
        .as_ref()?
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect::<Vec<_>>();
    values.sort_by(f64::total_cmp);
    values.dedup();
    Some(values.into())
}

/// Snapping of brushes on discrete axes, in unit space.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitSnap {
    /// Snaps to the positions of the tick values.
    Ticks(OrdinalScale),
    /// Snaps to the closest integer within `bounds`.
    Integer {
        to_unit: LinearScale,
        bounds: [f64; 2],
    },
}

impl UnitSnap {
    /// Snaps a unit value to the closest discrete position.
    pub fn snap(&self, v: f64) -> f64 {
        match self {
            UnitSnap::Ticks(scale) => ordinal_scale_snap(scale, v),
            UnitSnap::Integer {
                to_unit,
                bounds: [lo, hi],
            } => to_unit.scale(to_unit.invert(v).round().clamp(*lo, *hi)),
        }
    }
}

/// Discrete positions of a dimension in unit space, used to snap brushes of
/// ordinal axes. Continuous dimensions have none.
pub fn unit_snap(dimension: &Dimension) -> Option<UnitSnap> {
    if !dimension.is_ordinal() {
        return None;
    }

    let extent = dimension_extent(dimension);
    let to_unit = LinearScale::new(extent, [0.0, 1.0]);
    if let Some(domain) = tick_values(dimension) {
        let range = domain.iter().map(|&v| to_unit.scale(v)).collect();
        return Some(UnitSnap::Ticks(OrdinalScale { domain, range }));
    }

    if dimension.integer {
        let [a, b] = extent.map(f64::round);
        return Some(UnitSnap::Integer {
            to_unit,
            bounds: [a.min(b), a.max(b)],
        });
    }

    None
}

/// Snaps `v` to the closest entry of the range of a discrete scale.
///
/// The entries are scanned in order, stopping at the first one whose distance
/// to `v` increases, so the range is expected to be monotonic.
pub fn ordinal_scale_snap(scale: &OrdinalScale, v: f64) -> f64 {
    let range = scale.range();
    let mut prev_diff = f64::INFINITY;
    let mut prev_value = match range.first() {
        Some(&first) => first,
        None => return v,
    };

    for &value in range {
        let diff = (value - v).abs();
        if diff > prev_diff {
            return prev_value;
        }
        prev_diff = diff;
        prev_value = value;
    }

    prev_value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dimension(values: &[f64]) -> Dimension {
        Dimension::new("d", values.to_vec())
    }

    #[test]
    fn extent_of_values() {
        assert_eq!(dimension_extent(&dimension(&[3.0, -1.0, 7.5])), [-1.0, 7.5]);
    }

    #[test]
    fn explicit_range_wins() {
        let d = dimension(&[3.0, -1.0, 7.5]).with_range([0.0, 10.0]);
        assert_eq!(dimension_extent(&d), [0.0, 10.0]);
    }

    #[test]
    fn zero_width_extent_at_zero_widens_by_one() {
        assert_eq!(dimension_extent(&dimension(&[0.0, 0.0])), [-1.0, 1.0]);
        assert_eq!(dimension_extent(&dimension(&[])), [-1.0, 1.0]);
    }

    #[test]
    fn zero_width_extent_widens_by_ten_percent() {
        let [lo, hi] = dimension_extent(&dimension(&[5.0, 5.0]));
        assert!((lo - 4.5).abs() < 1e-12);
        assert!((hi - 5.5).abs() < 1e-12);

        // Sign preserving: a negative value still multiplies by 0.9 / 1.1.
        let [lo, hi] = dimension_extent(&dimension(&[-5.0]));
        assert!((lo + 4.5).abs() < 1e-12);
        assert!((hi + 5.5).abs() < 1e-12);
    }

    #[test]
    fn non_finite_values_count_as_zero() {
        let d = dimension(&[f64::NAN, 4.0, f64::INFINITY]);
        assert_eq!(dimension_extent(&d), [0.0, 4.0]);
    }

    #[test]
    fn unit_scale_is_invertible() {
        let d = dimension(&[-20.0, 13.0, 80.0]);
        let scale = domain_to_unit_scale(&d);
        for x in [-20.0, -3.3, 0.0, 13.0, 42.42, 80.0] {
            assert!((scale.invert(scale.scale(x)) - x).abs() < 1e-9);
        }
        assert_eq!(scale.scale(-20.0), 0.0);
        assert_eq!(scale.scale(80.0), 1.0);
    }

    #[test]
    fn domain_scale_is_inverted_vertically() {
        let d = dimension(&[0.0, 10.0]);
        let scale = domain_scale(100.0, 2.0, &d);
        assert_eq!(scale.scale(0.0), Some(98.0));
        assert_eq!(scale.scale(10.0), Some(2.0));
    }

    #[test]
    fn tick_values_make_an_ordinal_scale() {
        let d = dimension(&[0.0, 10.0]).with_tick_vals(vec![0.0, 2.5, 10.0]);
        let scale = domain_scale(100.0, 0.0, &d);
        let DomainScale::Ordinal(ordinal) = &scale else {
            panic!("expected an ordinal scale");
        };
        assert_eq!(ordinal.range(), &[100.0, 75.0, 0.0]);
        assert_eq!(scale.scale(2.5), Some(75.0));
        assert_eq!(scale.scale(3.0), None);
    }

    #[test]
    fn integer_dimensions_snap_to_integers() {
        let snap = unit_snap(&dimension(&[1.0, 2.0, 5.0]).integer()).unwrap();
        assert_eq!(snap.snap(0.3), 0.25);
        assert_eq!(snap.snap(0.45), 0.5);
        assert_eq!(snap.snap(-0.2), 0.0);
        assert_eq!(snap.snap(1.4), 1.0);
        assert!(unit_snap(&dimension(&[1.0, 2.0])).is_none());
    }

    #[test]
    fn wide_integer_extents_snap_without_enumerating() {
        let d = dimension(&[0.0, 1.0e9]).integer();
        let snap = unit_snap(&d).unwrap();
        assert!(matches!(snap, UnitSnap::Integer { .. }));

        let snapped = snap.snap(0.123_456_789_4);
        assert_eq!(snapped, 123_456_789.0 / 1.0e9);
        assert_eq!(snap.snap(2.0), 1.0);
        assert!(matches!(domain_scale(100.0, 0.0, &d), DomainScale::Linear(_)));
    }

    #[test]
    fn reversed_integer_ranges_keep_their_bounds() {
        let d = dimension(&[3.0]).integer().with_range([10.0, 0.0]);
        let snap = unit_snap(&d).unwrap();
        assert_eq!(snap.snap(0.26), 0.3);
        assert_eq!(snap.snap(-1.0), 0.0);
    }

    #[test]
    fn tick_values_snap_to_their_positions() {
        let d = dimension(&[0.0, 10.0]).with_tick_vals(vec![10.0, 0.0, f64::NAN, 2.5]);
        let UnitSnap::Ticks(scale) = unit_snap(&d).unwrap() else {
            panic!("expected tick snapping");
        };
        assert_eq!(scale.domain(), &[0.0, 2.5, 10.0]);
        assert_eq!(scale.range(), &[0.0, 0.25, 1.0]);
    }

    #[test]
    fn non_finite_values_map_like_zero() {
        let scale = domain_to_unit_scale(&dimension(&[-10.0, 10.0, f64::NAN]));
        assert_eq!(scale.scale(finite_or_zero(f64::NAN)), 0.5);
        assert_eq!(scale.scale(finite_or_zero(f64::INFINITY)), 0.5);

        let scale = domain_to_unit_scale(&dimension(&[0.0, 10.0, f64::NEG_INFINITY]));
        assert_eq!(scale.scale(finite_or_zero(f64::NEG_INFINITY)), 0.0);
    }

    #[test]
    fn snap_stops_at_first_increase() {
        let scale = OrdinalScale {
            domain: [0.0, 1.0, 2.0, 3.0, 4.0].into(),
            range: [0.0, 0.2, 0.5, 0.8, 1.0].into(),
        };
        assert_eq!(ordinal_scale_snap(&scale, 0.42), 0.5);
        assert_eq!(ordinal_scale_snap(&scale, 0.05), 0.0);
        assert_eq!(ordinal_scale_snap(&scale, 0.99), 1.0);
    }

    #[test]
    fn range_points_include_both_ends() {
        let scale = OrdinalScale::with_range_points(vec![0.0, 1.0, 2.0], [0.0, 300.0]);
        assert_eq!(scale.range(), &[0.0, 150.0, 300.0]);
        let single = OrdinalScale::with_range_points(vec![0.0], [0.0, 300.0]);
        assert_eq!(single.range(), &[150.0]);
    }
}
