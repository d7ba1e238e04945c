// THEORY:
// The `Pixel` module is the most fundamental unit of the vectorizer. It is a
// "dumb" data container for a single RGBA sample plus the one comparison the
// flood fill needs: how far apart two colors are.
//
// Key architectural principles:
// 1.  **Alpha is a gate, not a color**: Transparency decides whether a pixel may
//     join a region at all. It never takes part in the similarity comparison, so
//     `Color` carries only the three visible channels.
// 2.  **Integer distance**: Similarity is the sum of absolute per-channel
//     differences (a Manhattan distance in RGB). With the default threshold of 1
//     this is an exact-match test.
// 3.  **Rendering-ready**: A `Color` knows how to print itself as the `rgb(r,g,b)`
//     string used for the `fill` and `stroke` attributes of a path.

use serde::{Deserialize, Serialize};

pub type Byte = u8;
pub type Channel = Byte;
pub type Distance = u32;

/// Number of bytes per pixel in an RGBA8 buffer.
pub const CHANNELS: usize = 4;

/// The visible part of a pixel: red, green and blue, 8 bits each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub red: Channel,
    pub green: Channel,
    pub blue: Channel,
}

impl Color {
    pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
        Self { red, green, blue }
    }

    /// Sum of absolute per-channel differences.
    pub fn distance(&self, other: &Color) -> Distance {
        self.red.abs_diff(other.red) as Distance
            + self.green.abs_diff(other.green) as Distance
            + self.blue.abs_diff(other.blue) as Distance
    }

    /// CSS/SVG functional notation, e.g. `rgb(10,20,30)`.
    pub fn rgb(&self) -> String {
        format!("rgb({},{},{})", self.red, self.green, self.blue)
    }
}

impl From<[Channel; 3]> for Color {
    fn from(channels: [Channel; 3]) -> Self {
        Color::new(channels[0], channels[1], channels[2])
    }
}

impl From<Color> for [Channel; 3] {
    fn from(color: Color) -> Self {
        [color.red, color.green, color.blue]
    }
}

/// A single RGBA sample read out of a `PixelBuffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    /// The red channel value (0-255).
    pub red: Channel,
    /// The green channel value (0-255).
    pub green: Channel,
    /// The blue channel value (0-255).
    pub blue: Channel,
    /// The alpha (transparency) channel value (0-255).
    pub alpha: Channel,
}

impl Pixel {
    pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
        Pixel {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn color(&self) -> Color {
        Color::new(self.red, self.green, self.blue)
    }

    /// Fully transparent pixels never join a region.
    pub fn is_transparent(&self) -> bool {
        self.alpha == 0
    }
}

impl From<[Byte; CHANNELS]> for Pixel {
    fn from(bytes: [Byte; CHANNELS]) -> Self {
        Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

impl From<Pixel> for [Byte; CHANNELS] {
    fn from(pixel: Pixel) -> Self {
        [pixel.red, pixel.green, pixel.blue, pixel.alpha]
    }
}
