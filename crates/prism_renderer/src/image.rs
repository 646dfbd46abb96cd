//! Sample accumulation, tone mapping and image output.

use std::io::Write;

use prism_math::{Color, Interval};

/// Range final gamma-space components are clamped to before scaling by 256.
///
/// The upper bound stays below 1 so no component rounds to 256.
pub const INTENSITY: Interval = Interval::new(0.000001, 0.9999999);

/// Apply gamma correction (gamma = 2.0).
///
/// Negative input, which can come out of numeric error, maps to 0.
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Map one linear component to an 8-bit value.
#[inline]
pub fn component_to_u8(linear: f64) -> u8 {
    (256.0 * INTENSITY.clamp(linear_to_gamma(linear))) as u8
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    [
        component_to_u8(color.x),
        component_to_u8(color.y),
        component_to_u8(color.z),
    ]
}

/// Running per-pixel sums of radiance samples.
#[derive(Debug, Clone)]
pub struct Accumulator {
    width: u32,
    height: u32,
    sums: Vec<Color>,
}

impl Accumulator {
    /// Create an accumulator with every sum at zero.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sums: vec![Color::ZERO; (width as usize) * (height as usize)],
        }
    }

    /// Add a sample to the pixel at (x, y), with y = 0 the top row.
    #[inline]
    pub fn add(&mut self, x: u32, y: u32, sample: Color) {
        let index = (y as usize) * (self.width as usize) + x as usize;
        self.sums[index] += sample;
    }

    /// Divide every sum by the sample count.
    pub fn finalize(self, samples: u32) -> ImageBuffer {
        let scale = 1.0 / samples.max(1) as f64;
        ImageBuffer {
            width: self.width,
            height: self.height,
            pixels: self.sums.into_iter().map(|sum| sum * scale).collect(),
        }
    }
}

/// Averaged linear-RGB pixels, rows stored top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width as usize) * (height as usize)],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = (y as usize) * (self.width as usize) + x as usize;
        self.pixels[index] = color;
    }

    /// Iterate over rows, top first.
    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        self.pixels.chunks(self.width.max(1) as usize)
    }

    /// Tone-map every pixel to gamma-corrected 8-bit RGB.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        self.pixels.iter().map(|&c| color_to_rgb8(c)).collect()
    }

    /// Tone-mapped pixels as a flat `RGBRGB...` byte buffer.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.to_rgb8()).to_vec()
    }

    /// Write the tone-mapped image as an ASCII PPM (P3).
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;

        for [r, g, b] in self.to_rgb8() {
            writeln!(writer, "{} {} {}", r, g, b)?;
        }

        writer.flush()
    }
}
