//! Decoded bitmaps handed to the engine (PNG only).

use corelib::{ResourceError, ResourceResult};
use image::ImageFormat;

/// RGBA8 pixels in row order, owned by whoever asked for them.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Image {
    const BYTES_PER_PIXEL: u32 = 4;

    /// Create a new image with given dimensions. `pixels` must be RGBA8.
    pub fn new_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> ResourceResult<Self> {
        let expected = Self::byte_len(width, height);
        if pixels.len() != expected {
            return Err(ResourceError::corrupt(
                "image",
                format!(
                    "{}x{} RGBA8 needs {} bytes, got {}",
                    width,
                    height,
                    expected,
                    pixels.len()
                ),
            ));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Size of a `width x height` RGBA8 buffer, computed in `usize`.
    fn byte_len(width: u32, height: u32) -> usize {
        (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(Self::BYTES_PER_PIXEL as usize)
    }

    /// Decode PNG bytes.
    pub fn decode_png(name: &str, bytes: &[u8]) -> ResourceResult<Self> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| ResourceError::corrupt(name, e))?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.into_raw();

        log::debug!("Decoded image '{}' {}x{}", name, width, height);

        Self::new_rgba8(width, height, pixels)
    }

    /// Checkerboard stand-in for callers that guard a missing image.
    pub fn placeholder(size: u32) -> Self {
        let mut pixels = Vec::with_capacity(Self::byte_len(size, size));

        for y in 0..size {
            for x in 0..size {
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    // Magenta
                    pixels.extend_from_slice(&[255, 0, 255, 255]);
                } else {
                    pixels.extend_from_slice(&[0, 0, 0, 255]);
                }
            }
        }

        Self {
            pixels,
            width: size,
            height: size,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize)
            .saturating_mul(Self::BYTES_PER_PIXEL as usize);
        self.pixels.get(i..i.saturating_add(4)).and_then(|p| p.try_into().ok())
    }

    pub fn is_valid(&self) -> bool {
        self.pixels.len() == Self::byte_len(self.width, self.height)
            && self.width > 0
            && self.height > 0
    }
}
