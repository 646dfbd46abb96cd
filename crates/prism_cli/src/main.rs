use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use prism_renderer::{
    render, Background, Color, Dielectric, Hittable, HittableList, ImageBuffer, Lambertian,
    LightSampling, Material, Metal, Point3, RenderConfig, Sphere, VectorPath,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "prism", about = "Render the demo sphere scene with a CPU path tracer")]
struct Args {
    /// JSON render config; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (.ppm or .png)
    #[arg(short, long, default_value = "out.ppm")]
    output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Width over height
    #[arg(long)]
    aspect_ratio: Option<f64>,

    /// Maximum ray bounce depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Samples per pixel
    #[arg(short = 's', long)]
    samples_per_pixel: Option<u32>,

    /// Seed for reproducible renders
    #[arg(long)]
    seed: Option<u64>,

    /// Run intersection on the packed single-precision path
    #[arg(long)]
    packed: bool,

    /// Enable next-event sampling of the overhead light
    #[arg(long)]
    light_sampling: bool,

    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let config = build_config(&args)?;
    log::info!("Starting Prism");

    let start = std::time::Instant::now();
    let scene = build_scene();
    let lights = build_lights(&config);
    log::info!("Scene built in {:?}", start.elapsed());

    let start = std::time::Instant::now();
    let image = render(&scene, &lights, &config).context("render failed")?;
    log::info!("Render finished in {:?}", start.elapsed());

    save(&image, &args.output)?;
    log::info!("Saved to {}", args.output.display());

    Ok(())
}

fn build_config(args: &Args) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RenderConfig::default(),
    };

    if let Some(width) = args.width {
        config.screen_width = width;
    }
    if let Some(aspect_ratio) = args.aspect_ratio {
        config.aspect_ratio = aspect_ratio;
    }
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(samples) = args.samples_per_pixel {
        config.samples_per_pixel = samples;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.packed {
        config.vector_path = VectorPath::Packed;
    }
    if args.light_sampling && config.light_sampling.is_none() {
        config.light_sampling = Some(LightSampling::default());
        config.background = Background::Lights;
    }

    Ok(config)
}

fn build_scene() -> Hittable {
    let material_left = shared(Metal::new(Color::new(0.1, 0.7, 0.2), 0.0));
    let material_center = shared(Lambertian::new(Color::new(0.7, 0.2, 0.1)));
    let material_right = shared(Lambertian::new(Color::new(0.2, 0.1, 0.7)));
    let material_ground = shared(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    let material_glass = shared(Dielectric::new(1.5));

    let mut world = HittableList::new();
    world.add(Sphere::new(Point3::new(-2.0, 0.5, -2.0), 1.0, material_left));
    world.add(Sphere::new(Point3::new(0.0, 0.5, -2.0), 1.0, material_center));
    world.add(Sphere::new(Point3::new(-0.55, 0.0, -1.0), 0.25, material_right));
    world.add(Sphere::new(Point3::new(0.9, -0.2, -1.2), 0.3, material_glass));
    world.add(Sphere::new(Point3::new(0.0, -100.5, -1.0), 100.0, material_ground));

    log::info!("Created {} objects", world.len());
    world.into()
}

fn shared(material: impl Into<Material>) -> Arc<Material> {
    Arc::new(material.into())
}

/// Geometry standing in for the overhead light patch.
fn build_lights(config: &RenderConfig) -> Hittable {
    let light = config.light_sampling.clone().unwrap_or_default();
    let emitter = shared(Lambertian::new(light.radiance));

    let mut lights = HittableList::new();
    lights.add(Sphere::new(light.center(), 1.0, emitter));
    lights.into()
}

fn save(rendered: &ImageBuffer, path: &Path) -> Result<()> {
    let is_png = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

    if is_png {
        let pixels = rendered.to_rgb_bytes();
        let buffer = image::RgbImage::from_raw(rendered.width, rendered.height, pixels)
            .context("pixel buffer does not match image size")?;
        buffer
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        rendered
            .write_ppm(BufWriter::new(file))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}
