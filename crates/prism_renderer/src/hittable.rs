//! Hittable surfaces and HitRecord for ray-object intersection.

use prism_math::{Color, DVec3, Interval, Ray, Ray4};

use crate::material::{Lambertian, Material};
use crate::sphere::Sphere;

/// Placeholder material for an empty [`HitRecord`].
static DEFAULT_MATERIAL: Material = Material::Lambertian(Lambertian::new(Color::ZERO));

/// Record of a ray-object intersection.
///
/// The material is borrowed from the surface; the scene owns it.
#[derive(Debug, Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: DVec3,
    /// Unit surface normal at intersection (always points against ray)
    pub normal: DVec3,
    /// Material at the intersection point
    pub material: &'a Material,
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            p: DVec3::ZERO,
            normal: DVec3::ZERO,
            material: &DEFAULT_MATERIAL,
            t: 0.0,
            front_face: false,
        }
    }
}

impl<'a> HitRecord<'a> {
    /// Set the face normal based on ray direction and outward normal.
    ///
    /// `outward_normal` must be unit length. The stored normal always points
    /// against the ray, and `front_face` records which side was hit.
    pub fn set_face_normal(&mut self, ray_direction: DVec3, outward_normal: DVec3) {
        self.front_face = ray_direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// A surface that rays can intersect.
#[derive(Debug, Clone)]
pub enum Hittable {
    Sphere(Sphere),
    List(HittableList),
}

impl Hittable {
    /// Test if a ray hits this object within the given interval.
    ///
    /// Returns true if hit, and fills in the hit record. On a miss `rec` is
    /// left untouched.
    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match self {
            Hittable::Sphere(sphere) => sphere.hit(ray, ray_t, rec),
            Hittable::List(list) => list.hit(ray, ray_t, rec),
        }
    }

    /// Single-precision variant of [`Hittable::hit`] on a packed ray.
    pub fn hit_packed<'a>(&'a self, ray: &Ray4, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match self {
            Hittable::Sphere(sphere) => sphere.hit_packed(ray, ray_t, rec),
            Hittable::List(list) => list.hit_packed(ray, ray_t, rec),
        }
    }
}

impl From<Sphere> for Hittable {
    fn from(sphere: Sphere) -> Self {
        Hittable::Sphere(sphere)
    }
}

impl From<HittableList> for Hittable {
    fn from(list: HittableList) -> Self {
        Hittable::List(list)
    }
}

/// A list of hittable objects.
///
/// Iteration follows insertion order, which keeps seeded renders reproducible.
#[derive(Debug, Clone, Default)]
pub struct HittableList {
    objects: Vec<Hittable>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Into<Hittable>) {
        self.objects.push(object.into());
    }

    /// Clear all objects from the list.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Hittable] {
        &self.objects
    }

    /// Nearest hit over all members.
    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            let interval = ray_t.with_max(closest_so_far);
            if object.hit(ray, interval, rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    pub fn hit_packed<'a>(&'a self, ray: &Ray4, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            let interval = ray_t.with_max(closest_so_far);
            if object.hit_packed(ray, interval, rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }
}

impl FromIterator<Hittable> for HittableList {
    fn from_iter<I: IntoIterator<Item = Hittable>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}
