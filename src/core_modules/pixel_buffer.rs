// THEORY:
// `PixelBuffer` is a validated, read-only view over a caller-owned RGBA8 byte
// slice. All shape checks happen once, in `new`, so that every later index
// computation (`y * width + x`, then `* 4` for the byte offset) is known to stay
// in bounds. The vectorizer never mutates the pixels it reads.

use crate::core_modules::pixel::{CHANNELS, Pixel};
use crate::core_modules::region::Point;
use crate::error::{ConvertError, ConvertResult};

#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> PixelBuffer<'a> {
    /// Validates `data` as a `width * height` RGBA8 image.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> ConvertResult<Self> {
        if width == 0 || height == 0 {
            return Err(ConvertError::InvalidDimensions { width, height });
        }
        if data.is_empty() {
            return Err(ConvertError::MissingInput);
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(CHANNELS))
            .ok_or(ConvertError::DimensionsOverflow { width, height })?;

        if data.len() != expected {
            return Err(ConvertError::BufferLengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn from_rgba_image(image: &'a image::RgbaImage) -> ConvertResult<Self> {
        Self::new(image.as_raw(), image.width(), image.height())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major linear index of `(x, y)`.
    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn point_of(&self, index: usize) -> Point {
        let width = self.width as usize;
        Point {
            x: (index % width) as u32,
            y: (index / width) as u32,
        }
    }

    /// Reads the pixel at a linear index. `index` must be `< pixel_count()`.
    #[inline]
    pub fn pixel(&self, index: usize) -> Pixel {
        let offset = index * CHANNELS;
        Pixel::new(
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        )
    }
}
