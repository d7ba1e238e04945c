// THEORY:
// A `Region` is the output of a single flood fill: the seed that started it, the
// seed's color, and every accepted coordinate in the order the fill popped it
// off its stack. That order is not a geometric outline. It is simply the visit
// order, and it is what ends up in the path data, so it must be reproduced
// exactly for the output to be stable.
//
// A `ResultSet` is the ordered list of regions for one conversion. Regions
// appear in the order their seeds were discovered by the row-major scan. Like
// `Region`, it is a plain data container that is built once and then only read.

use serde::{Deserialize, Serialize};

use crate::core_modules::path_emitter::{PathEmitter, PathRegion};
use crate::core_modules::pixel::Color;
use crate::svg;

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// One connected component of uniform color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    seed: Point,
    color: Color,
    points: Vec<Point>,
}

impl Region {
    pub(crate) fn new(seed: Point, color: Color, points: Vec<Point>) -> Self {
        Self {
            seed,
            color,
            points,
        }
    }

    pub fn seed(&self) -> Point {
        self.seed
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Accepted coordinates in acceptance order. The seed is always first.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The ordered regions produced by one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    width: u32,
    height: u32,
    regions: Vec<Region>,
    transparent_pixels: usize,
}

impl ResultSet {
    pub(crate) fn new(width: u32, height: u32, regions: Vec<Region>, transparent_pixels: usize) -> Self {
        Self {
            width,
            height,
            regions,
            transparent_pixels,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Total number of pixels absorbed into regions.
    pub fn accepted_pixels(&self) -> usize {
        self.regions.iter().map(Region::len).sum()
    }

    /// Fully transparent pixels that were marked and skipped.
    pub fn transparent_pixels(&self) -> usize {
        self.transparent_pixels
    }

    pub fn path_regions(&self, emitter: &PathEmitter) -> Vec<PathRegion> {
        self.regions.iter().map(|region| emitter.emit(region)).collect()
    }

    /// Newline-joined `<path>` elements, one per region.
    pub fn to_markup(&self, emitter: &PathEmitter) -> String {
        self.regions
            .iter()
            .map(|region| emitter.emit(region).markup())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_svg_document(&self, emitter: &PathEmitter) -> String {
        svg::wrap_document(self.width, self.height, &self.to_markup(emitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        let red = Region::new(
            Point::new(0, 0),
            Color::new(255, 0, 0),
            vec![Point::new(0, 0), Point::new(1, 0)],
        );
        let blue = Region::new(Point::new(0, 1), Color::new(0, 0, 255), vec![Point::new(0, 1)]);
        ResultSet::new(2, 2, vec![red, blue], 1)
    }

    #[test]
    fn counts_pixels() {
        let results = sample();
        assert_eq!(results.len(), 2);
        assert_eq!(results.accepted_pixels(), 3);
        assert_eq!(results.transparent_pixels(), 1);
    }

    #[test]
    fn markup_is_newline_joined_in_region_order() {
        let markup = sample().to_markup(&PathEmitter::default());
        let lines: Vec<&str> = markup.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("d=\"M 0 0 L 0 0 L 1 0 Z\""));
        assert!(lines[1].contains("fill=\"rgb(0,0,255)\""));
    }

    #[test]
    fn document_carries_dimensions() {
        let doc = sample().to_svg_document(&PathEmitter::default());
        assert!(doc.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"2\" height=\"2\">"));
        assert!(doc.ends_with("</svg>"));
    }
}
