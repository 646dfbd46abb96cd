//! Scalar vector algebra on [`DVec3`].
//!
//! Arithmetic, `dot`, `cross` and `length` come straight from glam. This module
//! adds the optics formulas and random sampling helpers the tracer needs.

use glam::DVec3;
use rand::{Rng, RngCore};

/// Positive infinity, used as the open upper bound for ray intervals.
pub const INFINITY: f64 = f64::INFINITY;

/// Upper bound on rejection-sampling draws before falling back.
///
/// The expected number of draws is below two, so this is only ever reached
/// with a broken random source.
pub const MAX_REJECTION_ATTEMPTS: usize = 64;

/// Normalize `v`.
///
/// A zero-length input yields non-finite components. Callers that can produce
/// degenerate vectors must check with [`near_zero`] first.
#[inline]
pub fn unit_vector(v: DVec3) -> DVec3 {
    v / v.length()
}

/// True if every component is within 1e-8 of zero.
#[inline]
pub fn near_zero(v: DVec3) -> bool {
    const S: f64 = 1e-8;
    v.x.abs() < S && v.y.abs() < S && v.z.abs() < S
}

/// Reflect `v` about the normal `n`.
#[inline]
pub fn reflect(v: DVec3, n: DVec3) -> DVec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `uv` through a surface with normal `n`.
///
/// `etai_over_etat` is the ratio of refractive indices (incident / transmitted).
/// The parallel term clamps its radicand to zero so grazing angles never
/// produce NaN.
#[inline]
pub fn refract(uv: DVec3, n: DVec3, etai_over_etat: f64) -> DVec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).max(0.0).sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Uniform random f64 in `[min, max)`.
#[inline]
pub fn random_in_range(rng: &mut dyn RngCore, min: f64, max: f64) -> f64 {
    min + (max - min) * rng.gen::<f64>()
}

/// Random vector with each component uniform in `[min, max)`.
pub fn random_vec3(rng: &mut dyn RngCore, min: f64, max: f64) -> DVec3 {
    DVec3::new(
        random_in_range(rng, min, max),
        random_in_range(rng, min, max),
        random_in_range(rng, min, max),
    )
}

/// Random point strictly inside the unit sphere.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> DVec3 {
    let mut p = DVec3::ZERO;
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        p = random_vec3(rng, -1.0, 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }

    // Pull the last cube sample just inside the sphere
    let len = p.length();
    if len > 0.0 {
        p * (0.999 / len)
    } else {
        DVec3::ZERO
    }
}

/// Random unit vector, uniformly distributed on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> DVec3 {
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        let v = random_vec3(rng, -1.0, 1.0);
        let len_sq = v.length_squared();
        if len_sq > 1e-160 && len_sq < 1.0 {
            return v / len_sq.sqrt();
        }
    }
    DVec3::Z
}

/// Random unit vector in the hemisphere around `normal`.
pub fn random_on_hemisphere(rng: &mut dyn RngCore, normal: DVec3) -> DVec3 {
    let on_unit_sphere = random_unit_vector(rng);
    if on_unit_sphere.dot(normal) > 0.0 {
        on_unit_sphere
    } else {
        -on_unit_sphere
    }
}
