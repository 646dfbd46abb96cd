//! Sphere primitive for ray tracing.

use std::sync::Arc;

use prism_math::packed::{self, Ray4};
use prism_math::{Interval, Point3, Ray};

use crate::hittable::HitRecord;
use crate::material::Material;

/// Rays with a squared direction length below this never hit.
const MIN_DIRECTION_LENGTH_SQUARED: f64 = 1e-12;

/// Smallest `t` the single-precision path accepts.
///
/// Hit points rounded to f32 can land just below the surface, so the packed
/// path needs a coarser self-intersection bound than the scalar one.
const PACKED_MIN_T: f64 = 1e-4;

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Point3,
    radius: f64,
    material: Arc<Material>,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// A radius of zero or below is kept as given and never reports a hit.
    pub fn new(center: Point3, radius: f64, material: Arc<Material>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if self.radius <= 0.0 {
            return false;
        }

        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        if a < MIN_DIRECTION_LENGTH_SQUARED {
            return false;
        }
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        rec.t = root;
        rec.p = ray.at(rec.t);
        let outward_normal = (rec.p - self.center) / self.radius;
        rec.set_face_normal(ray.direction(), outward_normal);
        rec.material = self.material.as_ref();

        true
    }

    /// Same root selection as [`Sphere::hit`], computed on packed f32 lanes.
    pub fn hit_packed<'a>(&'a self, ray: &Ray4, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if self.radius <= 0.0 {
            return false;
        }

        let radius = self.radius as f32;
        let center = packed::from_point(self.center);
        let oc = center - ray.origin;
        let a = packed::length_squared3(ray.direction);
        if (a as f64) < MIN_DIRECTION_LENGTH_SQUARED {
            return false;
        }
        let h = packed::dot3(ray.direction, oc);
        let c = packed::length_squared3(oc) - radius * radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();
        let ray_t = Interval::new(ray_t.min.max(PACKED_MIN_T), ray_t.max);

        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root as f64) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root as f64) {
                return false;
            }
        }

        let p = ray.at(root);
        let outward_normal = packed::normalize3(p - center);

        rec.t = root as f64;
        rec.p = packed::to_dvec3(p);
        rec.set_face_normal(
            packed::to_dvec3(ray.direction),
            packed::to_dvec3(outward_normal),
        );
        rec.material = self.material.as_ref();

        true
    }
}
