/// Trait for linearly interpolating between two values.
pub trait Lerp {
    /// Creates a value between `self` and `other` by linearly interpolating
    /// them, according to a t value.
    fn lerp(self, other: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, other: Self, t: f64) -> Self {
        ((1.0 - t) * self) + (t * other)
    }
}

impl<T: Lerp + Copy, const N: usize> Lerp for [T; N] {
    fn lerp(self, other: Self, t: f64) -> Self {
        std::array::from_fn(|i| self[i].lerp(other[i], t))
    }
}

/// Trait for types that can invert a linear interpolation.
pub trait InverseLerp {
    /// Inverse of [`Lerp::lerp`].
    fn inv_lerp(self, start: Self, end: Self) -> f64;
}

impl InverseLerp for f64 {
    fn inv_lerp(self, start: Self, end: Self) -> f64 {
        (self - start) / (end - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_and_inverse_agree() {
        let v = 3.0_f64.lerp(7.0, 0.25);
        assert_eq!(v, 4.0);
        assert_eq!(v.inv_lerp(3.0, 7.0), 0.25);
    }

    #[test]
    fn lerp_arrays_per_channel() {
        let c = [0.0, 100.0, 200.0].lerp([100.0, 100.0, 0.0], 0.5);
        assert_eq!(c, [50.0, 100.0, 100.0]);
    }
}
