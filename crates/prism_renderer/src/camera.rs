//! Pinhole camera for primary ray generation.

use prism_math::{DVec3, Point3, Ray};
use rand::{Rng, RngCore};

use crate::config::RenderConfig;

/// Distance from the eye to the viewport.
const FOCAL_LENGTH: f64 = 1.0;

/// Pinhole camera at the origin looking down -Z.
///
/// All viewport vectors are derived once in [`Camera::new`] and stay fixed
/// for the render call.
#[derive(Debug, Clone)]
pub struct Camera {
    pub screen_width: u32,
    pub screen_height: u32,
    jitter: bool,

    origin: Point3,
    horizontal: DVec3,
    vertical: DVec3,
    lower_left: Point3,
}

impl Camera {
    /// Derive the viewport from a config.
    ///
    /// The config is expected to have passed [`RenderConfig::validate`].
    pub fn new(config: &RenderConfig) -> Self {
        let screen_height = config.screen_height();
        let viewport_height = config.viewport_height;
        let viewport_width = config.aspect_ratio * viewport_height;

        let origin = Point3::ZERO;
        let horizontal = DVec3::new(viewport_width, 0.0, 0.0);
        let vertical = DVec3::new(0.0, viewport_height, 0.0);
        let lower_left =
            origin - horizontal / 2.0 - vertical / 2.0 - DVec3::new(0.0, 0.0, FOCAL_LENGTH);

        Self {
            screen_width: config.screen_width,
            screen_height,
            jitter: config.jitter,
            origin,
            horizontal,
            vertical,
            lower_left,
        }
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn lower_left(&self) -> Point3 {
        self.lower_left
    }

    /// Generate a ray through pixel column `i` and row `j`.
    ///
    /// `j` counts from the bottom row. Without jitter the ray passes through
    /// the pixel center; with jitter it lands anywhere in the pixel square.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let (di, dj) = if self.jitter {
            sample_square(rng)
        } else {
            (0.0, 0.0)
        };

        let u = (i as f64 + 0.5 + di) / self.screen_width as f64;
        let v = (j as f64 + 0.5 + dj) / self.screen_height as f64;

        Ray::new(
            self.origin,
            self.lower_left + u * self.horizontal + v * self.vertical - self.origin,
        )
    }
}

/// Random offset in the unit square [-0.5, 0.5) x [-0.5, 0.5).
fn sample_square(rng: &mut dyn RngCore) -> (f64, f64) {
    (rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(width: u32, jitter: bool) -> RenderConfig {
        RenderConfig {
            screen_width: width,
            aspect_ratio: 2.0,
            jitter,
            ..Default::default()
        }
    }

    #[test]
    fn test_camera_viewport() {
        let camera = Camera::new(&config(200, false));

        assert_eq!(camera.screen_height, 100);
        assert_eq!(camera.origin(), Point3::ZERO);
        assert_eq!(camera.lower_left(), Point3::new(-2.0, -1.0, -1.0));
    }

    #[test]
    fn test_camera_corner_pixels_hit_centers() {
        // 4 x 2 viewport over 200 x 100 pixels: each pixel is 0.02 wide
        let camera = Camera::new(&config(200, false));
        let mut rng = StdRng::seed_from_u64(42);

        let bottom_left = camera.get_ray(0, 0, &mut rng).direction();
        assert!((bottom_left - DVec3::new(-1.99, -0.99, -1.0)).length() < 1e-12);

        let top_right = camera.get_ray(199, 99, &mut rng).direction();
        assert!((top_right - DVec3::new(1.99, 0.99, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_camera_center_ray() {
        let camera = Camera::new(&config(101, false));
        let mut rng = StdRng::seed_from_u64(42);

        // Middle column looks straight down the view axis horizontally
        let ray = camera.get_ray(50, 0, &mut rng);
        assert!(ray.direction().x.abs() < 1e-12);
        assert!(ray.direction().z < 0.0);
    }

    #[test]
    fn test_jitter_stays_within_half_a_pixel() {
        let jitter_config = RenderConfig {
            screen_width: 11,
            aspect_ratio: 1.0,
            jitter: true,
            ..Default::default()
        };
        let camera = Camera::new(&jitter_config);
        let reference = Camera::new(&RenderConfig {
            jitter: false,
            ..jitter_config.clone()
        });
        let mut rng = StdRng::seed_from_u64(7);

        // 2 x 2 viewport, 11 pixels per axis
        let half_pixel = 0.5 * 2.0 / 11.0;
        for (i, j) in [(0, 0), (5, 5), (10, 10)] {
            let center = reference.get_ray(i, j, &mut rng).direction();
            for _ in 0..200 {
                let d = camera.get_ray(i, j, &mut rng).direction();
                assert!((d.x - center.x).abs() <= half_pixel + 1e-12);
                assert!((d.y - center.y).abs() <= half_pixel + 1e-12);
                assert!(d.x.abs() <= 1.0 && d.y.abs() <= 1.0, "{d} leaves the viewport");
            }
        }
    }

    #[test]
    fn test_single_pixel_image() {
        let config = RenderConfig {
            screen_width: 1,
            aspect_ratio: 1.0,
            jitter: false,
            ..Default::default()
        };
        let camera = Camera::new(&config);
        let mut rng = StdRng::seed_from_u64(1);

        let direction = camera.get_ray(0, 0, &mut rng).direction();
        assert!((direction - DVec3::NEG_Z).length() < 1e-12);
    }
}
