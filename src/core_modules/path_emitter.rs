// THEORY:
// The `PathEmitter` turns a `Region` into something a renderer can draw. The
// path data is a move to the seed followed by one line command per accepted
// coordinate (the seed is accepted too, so it appears twice) and a closing `Z`.
// Fill and stroke both use the seed color, and the stroke width is fixed per
// emitter. Emission is a pure function of the region.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::core_modules::region::Region;

pub const DEFAULT_STROKE_WIDTH: u32 = 2;

/// A rendering-ready path descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRegion {
    pub path_data: String,
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: u32,
}

impl PathRegion {
    /// Serializes the descriptor as a single SVG `<path>` element.
    pub fn markup(&self) -> String {
        format!(
            "<path d=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\" />",
            self.path_data, self.fill_color, self.stroke_color, self.stroke_width
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathEmitter {
    stroke_width: u32,
}

impl Default for PathEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_STROKE_WIDTH)
    }
}

impl PathEmitter {
    pub fn new(stroke_width: u32) -> Self {
        Self { stroke_width }
    }

    /// `M x0 y0 L x y ... Z` in acceptance order.
    pub fn path_data(&self, region: &Region) -> String {
        let seed = region.seed();
        // "L 9999 9999 " is 12 bytes; most coordinates are shorter.
        let mut data = String::with_capacity(12 * (region.len() + 1) + 2);
        let _ = write!(data, "M {} {}", seed.x, seed.y);
        for point in region.points() {
            let _ = write!(data, " L {} {}", point.x, point.y);
        }
        data.push_str(" Z");
        data
    }

    pub fn emit(&self, region: &Region) -> PathRegion {
        let color = region.color().rgb();
        PathRegion {
            path_data: self.path_data(region),
            fill_color: color.clone(),
            stroke_color: color,
            stroke_width: self.stroke_width,
        }
    }
}
