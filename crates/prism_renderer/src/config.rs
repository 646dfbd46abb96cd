//! Render configuration.
//!
//! All options are fixed for the duration of one render call. Configs can be
//! built in code or loaded from JSON; missing fields take their defaults.

use std::path::Path;

use prism_math::{Color, DVec3, Point3};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// Which vector implementation the scene queries run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorPath {
    /// Double-precision `DVec3` math.
    #[default]
    Scalar,
    /// Single-precision packed `Vec4` math.
    Packed,
}

/// What a ray that escapes the scene sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    /// Vertical white to sky-blue gradient.
    #[default]
    Sky,
    /// Emissive radiance if the ray hits the lights aggregate, black otherwise.
    Lights,
}

/// Next-event light sampling settings.
///
/// The designated light is the parallelogram `corner + s * edge_u + t * edge_v`
/// for `s, t` in `[0, 1)`. The weights are tuning constants, not derived from
/// a normalized pdf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSampling {
    pub corner: Point3,
    pub edge_u: DVec3,
    pub edge_v: DVec3,
    /// Radiance emitted by the lights.
    pub radiance: Color,
    /// Multiplier on the indirect bounce when the light is behind the surface
    /// or seen edge-on.
    pub fallback_weight: f64,
    /// Multiplier on the direct term when the shadow ray is blocked.
    pub shadow_occlusion_weight: f64,
    /// Multiplier on the direct term when the ray toward the light's center is blocked.
    pub light_occlusion_weight: f64,
    /// Share of the direct term in the direct/indirect blend.
    pub direct_blend: f64,
    /// Light cosines below this count as edge-on.
    pub cosine_epsilon: f64,
}

impl Default for LightSampling {
    fn default() -> Self {
        Self {
            corner: Point3::new(-1.0, 3.0, -3.0),
            edge_u: DVec3::new(2.0, 0.0, 0.0),
            edge_v: DVec3::new(0.0, 0.0, 2.0),
            radiance: Color::splat(4.0),
            fallback_weight: 0.6,
            shadow_occlusion_weight: 0.3,
            light_occlusion_weight: 0.5,
            direct_blend: 0.5,
            cosine_epsilon: 1e-6,
        }
    }
}

impl LightSampling {
    /// Area of the light patch.
    pub fn area(&self) -> f64 {
        self.edge_u.cross(self.edge_v).length()
    }

    /// Unit normal of the light patch.
    pub fn normal(&self) -> DVec3 {
        self.edge_u.cross(self.edge_v).normalize_or_zero()
    }

    /// Center of the light patch.
    pub fn center(&self) -> Point3 {
        self.corner + 0.5 * (self.edge_u + self.edge_v)
    }

    /// Uniform random point on the light patch.
    pub fn sample_point(&self, rng: &mut dyn RngCore) -> Point3 {
        self.corner + rng.gen::<f64>() * self.edge_u + rng.gen::<f64>() * self.edge_v
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub screen_width: u32,
    /// Width over height; the height is `floor(screen_width / aspect_ratio)`
    pub aspect_ratio: f64,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Height of the viewport at focal length 1
    pub viewport_height: f64,
    /// Sub-pixel jitter of primary rays
    pub jitter: bool,
    /// Seed for the random source; entropy when absent
    pub seed: Option<u64>,
    pub vector_path: VectorPath,
    /// Lower bound of the hit interval, to avoid self-intersection
    pub hit_epsilon: f64,
    pub background: Background,
    /// Scale each bounce by `|dot(incoming, scattered)|`
    pub foreshortening: bool,
    /// Enables next-event light sampling when present
    pub light_sampling: Option<LightSampling>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            screen_width: 800,
            aspect_ratio: 16.0 / 9.0,
            max_depth: 10,
            samples_per_pixel: 10,
            viewport_height: 2.0,
            jitter: true,
            seed: None,
            vector_path: VectorPath::Scalar,
            hit_epsilon: 1e-8,
            background: Background::Sky,
            foreshortening: false,
            light_sampling: None,
        }
    }
}

impl RenderConfig {
    /// Parse a config from a JSON string.
    pub fn from_json_str(json: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Image height derived from width and aspect ratio.
    pub fn screen_height(&self) -> u32 {
        (self.screen_width as f64 / self.aspect_ratio).floor() as u32
    }

    /// Radiance returned for rays that reach the lights aggregate.
    pub fn emitted_radiance(&self) -> Color {
        self.light_sampling
            .as_ref()
            .map_or_else(|| LightSampling::default().radiance, |light| light.radiance)
    }

    /// Check the config before rendering.
    pub fn validate(&self) -> RenderResult<()> {
        if self.screen_width == 0 {
            return Err(invalid("screen_width must be positive"));
        }
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Err(invalid(format!(
                "aspect_ratio must be a positive number, got {}",
                self.aspect_ratio
            )));
        }
        if self.screen_height() == 0 {
            return Err(invalid(format!(
                "screen_width {} with aspect_ratio {} gives a zero screen height",
                self.screen_width, self.aspect_ratio
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(invalid("samples_per_pixel must be positive"));
        }
        if !self.viewport_height.is_finite() || self.viewport_height <= 0.0 {
            return Err(invalid(format!(
                "viewport_height must be a positive number, got {}",
                self.viewport_height
            )));
        }
        if !self.hit_epsilon.is_finite() || self.hit_epsilon < 0.0 {
            return Err(invalid(format!(
                "hit_epsilon must be non-negative, got {}",
                self.hit_epsilon
            )));
        }
        if let Some(lights) = &self.light_sampling {
            if lights.area() <= 0.0 {
                return Err(invalid("light_sampling edges must span a non-zero area"));
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> RenderError {
    RenderError::InvalidConfig(message.into())
}
