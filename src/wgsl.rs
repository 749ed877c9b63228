use std::fmt::Debug;

/// Marker for types that can be shared between the host and the gpu.
///
/// # Safety
///
/// See the wgsl specification to check if a type is host-sharable.
pub unsafe trait HostSharable: Copy {}

unsafe impl HostSharable for i32 {}
unsafe impl HostSharable for u32 {}
unsafe impl HostSharable for f32 {}
unsafe impl<T: HostSharable, const N: usize> HostSharable for [T; N] {}

/// A vector of two elements.
#[repr(C, align(8))]
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Vec2<T: VectorScalar>(pub [T; 2]);

unsafe impl HostSharable for Vec2<i32> {}
unsafe impl HostSharable for Vec2<u32> {}
unsafe impl HostSharable for Vec2<f32> {}

/// A vector of four elements.
#[repr(C, align(16))]
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Vec4<T: VectorScalar>(pub [T; 4]);

unsafe impl HostSharable for Vec4<i32> {}
unsafe impl HostSharable for Vec4<u32> {}
unsafe impl HostSharable for Vec4<f32> {}

/// Scalars usable as vector elements.
pub trait VectorScalar: Copy + Debug {}

impl VectorScalar for i32 {}
impl VectorScalar for u32 {}
impl VectorScalar for f32 {}

impl<T: VectorScalar> From<[T; 2]> for Vec2<T> {
    fn from(value: [T; 2]) -> Self {
        Self(value)
    }
}

impl<T: VectorScalar> From<[T; 4]> for Vec4<T> {
    fn from(value: [T; 4]) -> Self {
        Self(value)
    }
}

/// Packs a flat array into consecutive `vec4` groups.
pub fn pack_vec4<const N: usize, const M: usize>(values: [f32; N]) -> [Vec4<f32>; M] {
    assert_eq!(N, M * 4, "value count must fill the vectors exactly");
    std::array::from_fn(|i| Vec4([
        values[4 * i],
        values[4 * i + 1],
        values[4 * i + 2],
        values[4 * i + 3],
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_have_wgsl_alignment() {
        assert_eq!(std::mem::align_of::<Vec2<f32>>(), 8);
        assert_eq!(std::mem::size_of::<Vec2<f32>>(), 8);
        assert_eq!(std::mem::align_of::<Vec4<f32>>(), 16);
        assert_eq!(std::mem::size_of::<[Vec4<f32>; 16]>(), 256);
    }

    #[test]
    fn packs_groups_of_four() {
        let packed: [Vec4<f32>; 2] = pack_vec4([0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(packed[1], Vec4([4.0, 5.0, 6.0, 7.0]));
    }
}
