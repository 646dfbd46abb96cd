//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with configurable depth
//! - Optional next-event light sampling against a separate lights aggregate
//! - Anti-aliasing via jittered multi-sampling
//!
//! Rendering is single-threaded: sample passes run one after another, each
//! sweeping rows top to bottom into one [`Accumulator`].

use std::time::Instant;

use prism_math::{unit_vector, Color, Interval, Ray, INFINITY};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::camera::Camera;
use crate::config::{Background, LightSampling, RenderConfig, VectorPath};
use crate::error::RenderResult;
use crate::hittable::{HitRecord, Hittable};
use crate::image::{Accumulator, ImageBuffer};
use crate::material::Scatter;

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through the
/// scene, bouncing off surfaces and accumulating color, until it escapes, is
/// absorbed, or runs out of depth.
pub fn ray_color(
    ray: &Ray,
    depth: u32,
    scene: &Hittable,
    lights: &Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();
    let ray_t = Interval::new(config.hit_epsilon, INFINITY);

    if !hit_scene(scene, ray, ray_t, config.vector_path, &mut rec) {
        return background(ray, lights, config);
    }

    // Absorbed rays contribute nothing
    let Some(Scatter {
        attenuation,
        scattered,
    }) = rec.material.scatter(ray, &rec, rng)
    else {
        return Color::ZERO;
    };

    let mut indirect = ray_color(&scattered, depth - 1, scene, lights, config, rng);
    if config.foreshortening {
        let cosine = unit_vector(ray.direction())
            .dot(unit_vector(scattered.direction()));
        indirect *= cosine.abs();
    }

    match &config.light_sampling {
        None => attenuation * indirect,
        Some(light) => attenuation * sample_light(light, &rec, indirect, scene, config, rng),
    }
}

/// Blend a direct estimate from the designated light with the indirect bounce.
fn sample_light(
    light: &LightSampling,
    rec: &HitRecord,
    indirect: Color,
    scene: &Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let fallback = light.fallback_weight * indirect;

    let on_light = light.sample_point(rng);
    let to_light = on_light - rec.p;
    let distance_squared = to_light.length_squared();
    if distance_squared <= 0.0 {
        return fallback;
    }
    let to_light_dir = to_light / distance_squared.sqrt();

    // Light behind the surface
    let surface_cosine = to_light_dir.dot(rec.normal);
    if surface_cosine < 0.0 {
        return fallback;
    }

    // Light seen edge-on
    let light_cosine = to_light_dir.dot(light.normal()).abs();
    if light_cosine < light.cosine_epsilon {
        return fallback;
    }

    let pdf = distance_squared / (light_cosine * light.area());
    let mut direct = light.radiance * surface_cosine / pdf;

    let shadow_ray = Ray::new(rec.p, to_light);
    if occluded(scene, &shadow_ray, config) {
        direct *= light.shadow_occlusion_weight;
    }

    let light_ray = Ray::new(rec.p, light.center() - rec.p);
    if occluded(scene, &light_ray, config) {
        direct *= light.light_occlusion_weight;
    }

    light.direct_blend * direct + (1.0 - light.direct_blend) * indirect
}

/// True if anything in the scene lies strictly between the ray origin and
/// `origin + direction`.
fn occluded(scene: &Hittable, ray: &Ray, config: &RenderConfig) -> bool {
    let mut rec = HitRecord::default();
    hit_scene(
        scene,
        ray,
        Interval::new(config.hit_epsilon, 1.0),
        config.vector_path,
        &mut rec,
    )
}

fn hit_scene<'a>(
    scene: &'a Hittable,
    ray: &Ray,
    ray_t: Interval,
    path: VectorPath,
    rec: &mut HitRecord<'a>,
) -> bool {
    match path {
        VectorPath::Scalar => scene.hit(ray, ray_t, rec),
        VectorPath::Packed => scene.hit_packed(&ray.to_packed(), ray_t, rec),
    }
}

/// Radiance for a ray that escaped the scene.
fn background(ray: &Ray, lights: &Hittable, config: &RenderConfig) -> Color {
    match config.background {
        Background::Sky => sky_gradient(ray),
        Background::Lights => {
            let mut rec = HitRecord::default();
            let ray_t = Interval::new(config.hit_epsilon, INFINITY);
            if hit_scene(lights, ray, ray_t, config.vector_path, &mut rec) {
                config.emitted_radiance()
            } else {
                Color::ZERO
            }
        }
    }
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = unit_vector(ray.direction());
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    (1.0 - a) * white + a * blue
}

/// Render the scene to an averaged linear-RGB image.
///
/// Uses `config.seed` for the random source when set, entropy otherwise.
pub fn render(
    scene: &Hittable,
    lights: &Hittable,
    config: &RenderConfig,
) -> RenderResult<ImageBuffer> {
    config.validate()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    render_with_rng(scene, lights, config, &mut rng)
}

/// Render with a caller-supplied random source.
///
/// Rows of the returned image are stored top to bottom.
pub fn render_with_rng(
    scene: &Hittable,
    lights: &Hittable,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> RenderResult<ImageBuffer> {
    config.validate()?;

    let camera = Camera::new(config);
    let (width, height) = (camera.screen_width, camera.screen_height);
    log::info!(
        "Rendering {}x{} @ {} spp, max depth {} ({:?} path)",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth,
        config.vector_path
    );

    let start = Instant::now();
    let mut accumulator = Accumulator::new(width, height);

    for sample in 0..config.samples_per_pixel {
        for row in 0..height {
            // Camera rows count from the bottom
            let j = height - 1 - row;
            for i in 0..width {
                let ray = camera.get_ray(i, j, rng);
                let color = ray_color(&ray, config.max_depth, scene, lights, config, rng);
                accumulator.add(i, row, color);
            }
        }
        log::debug!(
            "Sample pass {}/{} done after {:?}",
            sample + 1,
            config.samples_per_pixel,
            start.elapsed()
        );
    }

    let image = accumulator.finalize(config.samples_per_pixel);
    log::info!("Rendered in {:?}", start.elapsed());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::material::{Dielectric, Lambertian, Material, Metal};
    use crate::{HittableList, Sphere};
    use prism_math::DVec3;
    use std::sync::Arc;

    fn empty() -> Hittable {
        HittableList::new().into()
    }

    fn small_config() -> RenderConfig {
        RenderConfig {
            screen_width: 16,
            aspect_ratio: 16.0 / 9.0,
            max_depth: 5,
            samples_per_pixel: 3,
            seed: Some(1234),
            ..Default::default()
        }
    }

    fn demo_scene() -> Hittable {
        let ground: Arc<Material> = Arc::new(Lambertian::new(Color::splat(0.5)).into());
        let shiny: Arc<Material> = Arc::new(Metal::new(Color::new(0.1, 0.7, 0.2), 0.3).into());
        let glass: Arc<Material> = Arc::new(Dielectric::new(1.5).into());

        let mut world = HittableList::new();
        world.add(Sphere::new(DVec3::new(-1.0, 0.0, -2.0), 0.5, shiny));
        world.add(Sphere::new(DVec3::new(0.0, 0.0, -1.5), 0.5, glass));
        world.add(Sphere::new(DVec3::new(1.0, 0.0, -2.0), 0.5, ground.clone()));
        world.add(Sphere::new(DVec3::new(0.0, -100.5, -1.0), 100.0, ground));
        world.into()
    }

    fn light_patch() -> Hittable {
        let emitter: Arc<Material> = Arc::new(Lambertian::new(Color::ONE).into());
        let mut lights = HittableList::new();
        lights.add(Sphere::new(DVec3::new(0.0, 3.0, -2.0), 1.0, emitter));
        lights.into()
    }

    #[test]
    fn test_sky_gradient() {
        // Ray pointing up should be more blue (less red than white)
        let up_color = sky_gradient(&Ray::new(DVec3::ZERO, DVec3::Y));
        let down_color = sky_gradient(&Ray::new(DVec3::ZERO, DVec3::NEG_Y));

        assert_eq!(up_color, Color::new(0.5, 0.7, 1.0));
        assert_eq!(down_color, Color::ONE);
    }

    #[test]
    fn test_miss_returns_background_without_recursion() {
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.3, 0.4, -1.0));

        let color = ray_color(&ray, 5, &demo_scene(), &empty(), &config, &mut rng);

        let t = 0.5 * (unit_vector(ray.direction()).y + 1.0);
        let expected = (1.0 - t) * Color::ONE + t * Color::new(0.5, 0.7, 1.0);
        assert_eq!(color, expected);
    }

    #[test]
    fn test_zero_depth_is_black() {
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(0);
        let scene = demo_scene();

        for dir in [DVec3::NEG_Z, DVec3::Y, DVec3::new(0.2, -0.3, -1.0)] {
            let ray = Ray::new(DVec3::ZERO, dir);
            let color = ray_color(&ray, 0, &scene, &empty(), &config, &mut rng);
            assert_eq!(color, Color::ZERO);
        }

        let config = RenderConfig {
            max_depth: 0,
            ..small_config()
        };
        let image = render(&scene, &empty(), &config).unwrap();
        assert!(image.pixels.iter().all(|&c| c == Color::ZERO));
    }

    #[test]
    fn test_absorbing_metal_is_black() {
        // A tangent ray meets the sphere with dot(dir, normal) == 0, so the
        // mirror direction never leaves the surface.
        let mirror: Arc<Material> = Arc::new(Metal::new(Color::ONE, 0.0).into());
        let scene: Hittable = Sphere::new(DVec3::new(0.0, 0.0, -5.0), 2.0, mirror).into();
        let ray = Ray::new(DVec3::new(0.0, 2.0, 0.0), DVec3::NEG_Z);
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(0);

        let color = ray_color(&ray, 5, &scene, &empty(), &config, &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_lambertian_attenuates_sky() {
        let grey: Arc<Material> = Arc::new(Lambertian::new(Color::splat(0.5)).into());
        let scene: Hittable = Sphere::new(DVec3::new(0.0, 0.0, -5.0), 2.0, grey).into();
        let ray = Ray::new(DVec3::ZERO, DVec3::NEG_Z);
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(0);

        // One bounce off a convex sphere always escapes to the sky
        let color = ray_color(&ray, 2, &scene, &empty(), &config, &mut rng);
        for c in color.to_array() {
            assert!(c > 0.25 && c <= 0.5, "component {c} out of range");
        }
    }

    #[test]
    fn test_foreshortening_scales_sky_bounce() {
        let grey = Material::from(Lambertian::new(Color::splat(0.5)));
        let sphere = Sphere::new(DVec3::new(0.0, 0.0, -5.0), 2.0, Arc::new(grey.clone()));
        let scene = Hittable::from(sphere);
        let ray = Ray::new(DVec3::ZERO, DVec3::NEG_Z);
        let config = RenderConfig {
            foreshortening: true,
            ..small_config()
        };

        // Replay the single scatter that ray_color draws from the same seed
        let mut rng = StdRng::seed_from_u64(5);
        let mut rec = HitRecord::default();
        assert!(scene.hit(&ray, Interval::new(config.hit_epsilon, INFINITY), &mut rec));
        let scatter = grey.scatter(&ray, &rec, &mut rng).unwrap();
        let cosine = unit_vector(ray.direction())
            .dot(unit_vector(scatter.scattered.direction()))
            .abs();
        let expected = scatter.attenuation * sky_gradient(&scatter.scattered) * cosine;

        let mut rng = StdRng::seed_from_u64(5);
        let color = ray_color(&ray, 2, &scene, &empty(), &config, &mut rng);
        assert!((color - expected).length() < 1e-12);

        let mut rng = StdRng::seed_from_u64(5);
        let plain = ray_color(&ray, 2, &scene, &empty(), &small_config(), &mut rng);
        let unscaled = scatter.attenuation * sky_gradient(&scatter.scattered);
        assert!((plain - unscaled).length() < 1e-12);
    }

    #[test]
    fn test_render_is_deterministic() {
        let config = small_config();
        let a = render(&demo_scene(), &empty(), &config).unwrap();
        let b = render(&demo_scene(), &empty(), &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.width, 16);
        assert_eq!(a.height, 9);
        assert_eq!(a.to_rgb8(), b.to_rgb8());
    }

    #[test]
    fn test_render_with_lights_is_deterministic() {
        let config = RenderConfig {
            background: Background::Lights,
            light_sampling: Some(LightSampling::default()),
            vector_path: VectorPath::Packed,
            ..small_config()
        };
        let a = render(&demo_scene(), &light_patch(), &config).unwrap();
        let b = render(&demo_scene(), &light_patch(), &config).unwrap();
        assert_eq!(a, b);
        assert!(a.pixels.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_rows_are_top_to_bottom() {
        let config = RenderConfig {
            jitter: false,
            ..small_config()
        };
        let image = render(&empty(), &empty(), &config).unwrap();

        // Sky gets bluer (less red) toward the top
        let top = image.get(0, 0);
        let bottom = image.get(0, image.height - 1);
        assert!(top.x < bottom.x);
    }

    #[test]
    fn test_render_rejects_invalid_config() {
        let config = RenderConfig {
            aspect_ratio: -1.0,
            ..small_config()
        };
        assert!(matches!(
            render(&empty(), &empty(), &config),
            Err(RenderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_lights_background() {
        let config = RenderConfig {
            background: Background::Lights,
            light_sampling: Some(LightSampling::default()),
            ..small_config()
        };
        let mut rng = StdRng::seed_from_u64(0);

        let toward_light = Ray::new(DVec3::ZERO, DVec3::new(0.0, 3.0, -2.0));
        let away = Ray::new(DVec3::ZERO, DVec3::NEG_Y);

        for vector_path in [VectorPath::Scalar, VectorPath::Packed] {
            let config = RenderConfig {
                vector_path,
                ..config.clone()
            };
            let lit = ray_color(&toward_light, 3, &empty(), &light_patch(), &config, &mut rng);
            let dark = ray_color(&away, 3, &empty(), &light_patch(), &config, &mut rng);
            assert_eq!(lit, LightSampling::default().radiance);
            assert_eq!(dark, Color::ZERO);
        }
    }

    #[test]
    fn test_packed_lights_background_uses_packed_bounds() {
        // The ray starts inside the emitter and leaves it at t = 5e-5: inside
        // the scalar window but below the packed path's minimum t.
        let emitter: Arc<Material> = Arc::new(Lambertian::new(Color::ONE).into());
        let lights = Hittable::from(Sphere::new(DVec3::new(0.0, 0.0, 0.99995), 1.0, emitter));
        let ray = Ray::new(DVec3::ZERO, DVec3::NEG_Z);
        let config = RenderConfig {
            background: Background::Lights,
            light_sampling: Some(LightSampling::default()),
            ..small_config()
        };
        let mut rng = StdRng::seed_from_u64(0);

        let scalar = ray_color(&ray, 1, &empty(), &lights, &config, &mut rng);
        assert_eq!(scalar, config.emitted_radiance());

        let config = RenderConfig {
            vector_path: VectorPath::Packed,
            ..config
        };
        let packed = ray_color(&ray, 1, &empty(), &lights, &config, &mut rng);
        assert_eq!(packed, Color::ZERO);
    }

    fn record_at(material: &Material, p: DVec3, normal: DVec3) -> HitRecord<'_> {
        HitRecord {
            p,
            normal,
            material,
            t: 1.0,
            front_face: true,
        }
    }

    #[test]
    fn test_light_behind_surface_falls_back() {
        let light = LightSampling::default();
        let mat = Material::from(Lambertian::new(Color::ONE));
        // Facing away from a light that sits above
        let rec = record_at(&mat, DVec3::new(0.0, 0.0, -2.0), DVec3::NEG_Y);
        let indirect = Color::new(0.2, 0.4, 0.8);
        let mut rng = StdRng::seed_from_u64(0);

        let color = sample_light(&light, &rec, indirect, &empty(), &small_config(), &mut rng);
        assert_eq!(color, light.fallback_weight * indirect);
    }

    #[test]
    fn test_light_edge_on_falls_back() {
        let light = LightSampling::default();
        let mat = Material::from(Lambertian::new(Color::ONE));
        // In the plane of the light, looking at it sideways
        let rec = record_at(&mat, DVec3::new(-5.0, 3.0, -2.0), DVec3::X);
        let indirect = Color::splat(0.5);
        let mut rng = StdRng::seed_from_u64(0);

        let color = sample_light(&light, &rec, indirect, &empty(), &small_config(), &mut rng);
        assert_eq!(color, light.fallback_weight * indirect);
    }

    #[test]
    fn test_occluded_light_is_discounted() {
        let light = LightSampling::default();
        let mat = Material::from(Lambertian::new(Color::ONE));
        let rec = record_at(&mat, DVec3::new(0.0, 0.0, -2.0), DVec3::Y);
        let config = small_config();

        let clear = {
            let mut rng = StdRng::seed_from_u64(99);
            sample_light(&light, &rec, Color::ZERO, &empty(), &config, &mut rng)
        };
        assert!(clear.min_element() > 0.0);

        // Unoccluded: blend * L * cos_surface * area * cos_light / d^2
        let on_light = light.sample_point(&mut StdRng::seed_from_u64(99));
        let to_light = on_light - rec.p;
        let distance_squared = to_light.length_squared();
        let dir = to_light / distance_squared.sqrt();
        let cos_surface = dir.dot(rec.normal);
        let cos_light = dir.dot(light.normal()).abs();
        let expected = light.direct_blend * light.radiance * cos_surface * light.area() * cos_light
            / distance_squared;
        assert!((clear - expected).length() < 1e-12);

        // Blocks every segment from the shading point to the light patch
        let blocker_mat: Arc<Material> = Arc::new(Lambertian::new(Color::ONE).into());
        let blocker = Hittable::from(Sphere::new(DVec3::new(0.0, 1.5, -2.0), 0.9, blocker_mat));
        let blocked = {
            let mut rng = StdRng::seed_from_u64(99);
            sample_light(&light, &rec, Color::ZERO, &blocker, &config, &mut rng)
        };

        let factor = light.shadow_occlusion_weight * light.light_occlusion_weight;
        assert!((blocked - clear * factor).length() < 1e-12);
    }
}
