//! Packed single-precision vector path on [`Vec4`].
//!
//! `Vec4` is SIMD-backed by glam on SSE2 and NEON targets. The fourth lane is
//! homogeneous padding: 1 for points and 0 for directions. Every geometric
//! helper here masks it out, so results match the scalar [`crate::vector`]
//! functions up to single-precision rounding.

use glam::{DVec3, Vec4};
use rand::RngCore;

use crate::vector;

/// Keeps x, y and z while zeroing the padding lane.
pub const XYZ_MASK: Vec4 = Vec4::new(1.0, 1.0, 1.0, 0.0);

/// Pack a point (w = 1).
#[inline]
pub fn from_point(p: DVec3) -> Vec4 {
    p.as_vec3().extend(1.0)
}

/// Pack a direction (w = 0).
#[inline]
pub fn from_direction(d: DVec3) -> Vec4 {
    d.as_vec3().extend(0.0)
}

/// Unpack to double precision, dropping the padding lane.
#[inline]
pub fn to_dvec3(v: Vec4) -> DVec3 {
    v.truncate().as_dvec3()
}

/// Dot product over x, y and z only.
#[inline]
pub fn dot3(a: Vec4, b: Vec4) -> f32 {
    (a * b * XYZ_MASK).element_sum()
}

#[inline]
pub fn length_squared3(v: Vec4) -> f32 {
    dot3(v, v)
}

/// Normalize over x, y and z; the result has w = 0.
///
/// Same failure mode as [`vector::unit_vector`]: zero input is not finite.
#[inline]
pub fn normalize3(v: Vec4) -> Vec4 {
    let v = v * XYZ_MASK;
    v * length_squared3(v).sqrt().recip()
}

/// `a + b * t`
#[inline]
pub fn add_mul(a: Vec4, b: Vec4, t: f32) -> Vec4 {
    b.mul_add(Vec4::splat(t), a)
}

/// `a - b * t`
#[inline]
pub fn sub_mul(a: Vec4, b: Vec4, t: f32) -> Vec4 {
    a - b * Vec4::splat(t)
}

/// Reflect `v` about `n`. The padding lane of the result is zero.
#[inline]
pub fn reflect(v: Vec4, n: Vec4) -> Vec4 {
    sub_mul(v, n, 2.0 * dot3(v, n)) * XYZ_MASK
}

/// Random packed unit direction, drawn through the scalar sampler.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec4 {
    from_direction(vector::random_unit_vector(rng))
}

/// Random packed unit direction in the hemisphere around `normal`.
pub fn random_on_hemisphere(rng: &mut dyn RngCore, normal: Vec4) -> Vec4 {
    let on_unit_sphere = random_unit_vector(rng);
    if dot3(on_unit_sphere, normal) > 0.0 {
        on_unit_sphere
    } else {
        -on_unit_sphere
    }
}

/// Single-precision packed ray.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray4 {
    pub origin: Vec4,
    pub direction: Vec4,
}

impl Ray4 {
    #[inline]
    pub fn new(origin: Vec4, direction: Vec4) -> Self {
        Self { origin, direction }
    }

    /// origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec4 {
        add_mul(self.origin, self.direction, t)
    }
}
