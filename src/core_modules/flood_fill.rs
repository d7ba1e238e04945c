// THEORY:
// The `FloodFill` is the region-growing engine of the vectorizer. Starting from a
// seed pixel and the seed's color, it expands an 8-connected region of pixels
// whose color matches the seed closely enough.
//
// Key architectural principles & algorithm steps:
// 1.  **Explicit Stack**: Traversal is iterative depth-first search over a `Vec`
//     used as a stack. Images can be far larger than any recursion depth the call
//     stack would tolerate.
// 2.  **Check on Pop**: A popped coordinate that is already visited is dropped.
//     Neighbors are pushed without looking at their visited state, so the same
//     coordinate can sit on the stack several times. Only the first pop that finds
//     it unvisited does any work, which keeps each pixel in at most one region.
// 3.  **Transparency Gate**: A pixel with alpha 0 is marked visited and dropped.
//     It never joins a region and never becomes a seed later.
// 4.  **Similarity Test**: A pixel joins when the summed absolute RGB difference
//     to the seed color is below the threshold. Pixels that fail are left
//     unvisited so that a later seed from the scan can claim them.
// 5.  **Stepping**: `step` performs exactly one pop. Drivers that need to yield or
//     check for cancellation call it in a loop and count pops. `run` is the
//     plain drain-to-empty loop.

use crate::core_modules::pixel::{Color, Distance};
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::region::{Point, Region};
use crate::core_modules::visited_set::VisitedSet;

/// The threshold under which two colors count as the same region (exact match).
pub const DEFAULT_SIMILARITY_THRESHOLD: Distance = 1;

/// Neighbor offsets as `(dx, dy)`, x-offset outer and y-offset inner. The order
/// decides the visit order of the fill and therefore the emitted path data.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// What a single pop of the fill stack did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStep {
    /// The pixel joined the region and its neighbors were pushed.
    Accepted,
    /// The pixel was fully transparent; it is now visited and discarded.
    Transparent,
    /// The pixel was already visited or did not match the seed color.
    Skipped,
    /// The stack is empty; the region is complete.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct FloodFill {
    seed: Point,
    color: Color,
    threshold: Distance,
    stack: Vec<Point>,
    points: Vec<Point>,
}

impl FloodFill {
    pub fn new(seed: Point, color: Color, threshold: Distance) -> Self {
        Self {
            seed,
            color,
            threshold,
            stack: vec![seed],
            points: Vec::new(),
        }
    }

    /// Pops one coordinate and classifies it.
    pub fn step(&mut self, buffer: &PixelBuffer<'_>, visited: &mut VisitedSet) -> FillStep {
        let Some(current) = self.stack.pop() else {
            return FillStep::Exhausted;
        };

        let index = buffer.index_of(current.x, current.y);
        if visited.is_visited(index) {
            return FillStep::Skipped;
        }

        let pixel = buffer.pixel(index);
        if pixel.is_transparent() {
            visited.mark_visited(index);
            return FillStep::Transparent;
        }

        if pixel.color().distance(&self.color) >= self.threshold {
            return FillStep::Skipped;
        }

        visited.mark_visited(index);
        self.points.push(current);
        self.push_neighbors(current, buffer.width(), buffer.height());
        FillStep::Accepted
    }

    fn push_neighbors(&mut self, center: Point, width: u32, height: u32) {
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let nx = center.x as i64 + dx;
            let ny = center.y as i64 + dy;
            if nx >= 0 && nx < width as i64 && ny >= 0 && ny < height as i64 {
                self.stack.push(Point::new(nx as u32, ny as u32));
            }
        }
    }

    /// Drains the stack and returns the finished region.
    pub fn run(mut self, buffer: &PixelBuffer<'_>, visited: &mut VisitedSet) -> Region {
        while self.step(buffer, visited) != FillStep::Exhausted {}
        self.finish()
    }

    pub fn finish(self) -> Region {
        Region::new(self.seed, self.color, self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.repeat((width * height) as usize)
    }

    #[test]
    fn two_by_two_visit_order_is_pinned() {
        let data = solid(2, 2, [10, 20, 30, 255]);
        let buffer = PixelBuffer::new(&data, 2, 2).expect("valid buffer");
        let mut visited = VisitedSet::new(buffer.pixel_count());

        let region = FloodFill::new(Point::new(0, 0), Color::new(10, 20, 30), DEFAULT_SIMILARITY_THRESHOLD)
            .run(&buffer, &mut visited);

        assert_eq!(
            region.points(),
            &[Point::new(0, 0), Point::new(1, 1), Point::new(1, 0), Point::new(0, 1)]
        );
        assert_eq!(visited.visited_count(), 4);
    }

    #[test]
    fn mismatched_pixels_stay_unvisited() {
        // Left column red, right column green.
        let data = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            255, 0, 0, 255, 0, 255, 0, 255,
        ];
        let buffer = PixelBuffer::new(&data, 2, 2).expect("valid buffer");
        let mut visited = VisitedSet::new(buffer.pixel_count());

        let region = FloodFill::new(Point::new(0, 0), Color::new(255, 0, 0), DEFAULT_SIMILARITY_THRESHOLD)
            .run(&buffer, &mut visited);

        assert_eq!(region.len(), 2);
        assert!(visited.is_visited(0));
        assert!(!visited.is_visited(1));
        assert!(visited.is_visited(2));
        assert!(!visited.is_visited(3));
    }

    #[test]
    fn transparent_neighbors_are_marked_but_not_accepted() {
        let data = vec![
            5, 5, 5, 255, 0, 0, 0, 0, //
            0, 0, 0, 0, 0, 0, 0, 0,
        ];
        let buffer = PixelBuffer::new(&data, 2, 2).expect("valid buffer");
        let mut visited = VisitedSet::new(buffer.pixel_count());
        let mut fill = FloodFill::new(Point::new(0, 0), Color::new(5, 5, 5), DEFAULT_SIMILARITY_THRESHOLD);

        let mut transparent = 0;
        loop {
            match fill.step(&buffer, &mut visited) {
                FillStep::Exhausted => break,
                FillStep::Transparent => transparent += 1,
                _ => {}
            }
        }

        assert_eq!(transparent, 3);
        assert_eq!(fill.finish().points(), &[Point::new(0, 0)]);
        assert_eq!(visited.visited_count(), 4);
    }

    #[test]
    fn duplicate_pushes_are_filtered_on_pop() {
        let data = solid(3, 3, [1, 1, 1, 255]);
        let buffer = PixelBuffer::new(&data, 3, 3).expect("valid buffer");
        let mut visited = VisitedSet::new(buffer.pixel_count());
        let mut fill = FloodFill::new(Point::new(1, 1), Color::new(1, 1, 1), DEFAULT_SIMILARITY_THRESHOLD);

        let (mut accepted, mut skipped) = (0, 0);
        loop {
            match fill.step(&buffer, &mut visited) {
                FillStep::Accepted => accepted += 1,
                FillStep::Skipped => skipped += 1,
                FillStep::Transparent => unreachable!("image is opaque"),
                FillStep::Exhausted => break,
            }
        }

        assert_eq!(accepted, 9);
        assert!(skipped > 0);
        let region = fill.finish();
        let mut unique = region.points().to_vec();
        unique.sort_by_key(|p| (p.y, p.x));
        unique.dedup();
        assert_eq!(unique.len(), region.len());
    }

    #[test]
    fn wider_threshold_tolerates_small_differences() {
        let data = vec![100, 100, 100, 255, 101, 100, 100, 255];
        let buffer = PixelBuffer::new(&data, 2, 1).expect("valid buffer");

        let mut visited = VisitedSet::new(2);
        let exact = FloodFill::new(Point::new(0, 0), Color::new(100, 100, 100), 1).run(&buffer, &mut visited);
        assert_eq!(exact.len(), 1);

        let mut visited = VisitedSet::new(2);
        let loose = FloodFill::new(Point::new(0, 0), Color::new(100, 100, 100), 2).run(&buffer, &mut visited);
        assert_eq!(loose.len(), 2);
    }
}
