//! Prism Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer over spheres with diffuse, metal and glass
//! materials, optional next-event light sampling, and a brute-force
//! nearest-hit scan.
//!
//! The one entry point is [`render`], which takes the scene, the lights and a
//! [`RenderConfig`] and returns averaged linear-RGB pixels.

mod camera;
mod config;
mod error;
mod hittable;
mod image;
mod material;
mod renderer;
mod sphere;

pub use camera::Camera;
pub use config::{Background, LightSampling, RenderConfig, VectorPath};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use image::{color_to_rgb8, linear_to_gamma, Accumulator, ImageBuffer, INTENSITY};
pub use material::{Dielectric, Lambertian, Material, Metal, Scatter};
pub use renderer::{ray_color, render, render_with_rng, sky_gradient};
pub use sphere::Sphere;

/// Re-export common math types from prism_math
pub use prism_math::{Color, DVec3, Interval, Point3, Ray};
