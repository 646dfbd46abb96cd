//! Math types for the Prism path tracer.
//!
//! The scalar path works in double precision on [`DVec3`]. The packed path
//! works on SIMD-backed [`Vec4`] lanes in single precision and is kept
//! numerically equivalent to the scalar one within a loose tolerance.

// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;
pub mod packed;
pub mod vector;

pub use interval::Interval;
pub use packed::Ray4;
pub use ray::Ray;
pub use vector::{
    near_zero, random_in_range, random_in_unit_sphere, random_on_hemisphere, random_unit_vector,
    random_vec3, reflect, refract, unit_vector, INFINITY,
};

/// A point in 3D space.
pub type Point3 = DVec3;

/// Linear RGB color.
pub type Color = DVec3;
