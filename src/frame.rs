//! RGB frame buffers - the unit moved through assembly and encoding.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One 8-bit RGB pixel, laid out exactly as it appears in a container.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize,
)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
#[repr(C)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `ratio` (clamped to 0..=1), rounding to nearest.
    pub fn scaled(self, ratio: f32) -> Self {
        let ratio = ratio.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * ratio).round() as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Immutable row-major grid of RGB pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl FrameBuffer {
    /// Build a frame from row-major pixels.
    ///
    /// Fails with `InvalidConfig` for a zero dimension and `TruncatedFrame`
    /// when the pixel count does not match `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(crate::schema::ConfigError::InvalidDimensions { width, height }.into());
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::TruncatedFrame {
                expected: expected.saturating_mul(3),
                found: pixels.len().saturating_mul(3),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a frame from packed `R,G,B` bytes.
    pub fn from_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        let expected = (width as usize * height as usize).saturating_mul(3);
        if bytes.len() != expected {
            return Err(Error::TruncatedFrame {
                expected,
                found: bytes.len(),
            });
        }
        Self::new(width, height, bytemuck::pod_collect_to_vec(bytes))
    }

    /// A frame filled with one color.
    ///
    /// Dimensions must be non-zero; callers derive them from an existing
    /// frame or a validated config.
    pub fn solid(width: u32, height: u32, color: Rgb) -> Self {
        debug_assert!(
            width > 0 && height > 0,
            "solid frame needs non-zero dimensions, got {}x{}",
            width,
            height
        );
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn black(width: u32, height: u32) -> Self {
        Self::solid(width, height, Rgb::BLACK)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size of this frame inside a container.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.pixels.len() * 3
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Packed row-major `R,G,B` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Pixel at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// True iff every pixel is exactly (0, 0, 0).
    pub fn is_black(&self) -> bool {
        self.pixels.iter().all(|p| *p == Rgb::BLACK)
    }

    /// Single color shared by every pixel, if any.
    pub fn solid_color(&self) -> Option<Rgb> {
        let first = *self.pixels.first()?;
        self.pixels.iter().all(|p| *p == first).then_some(first)
    }
}
