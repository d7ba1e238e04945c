// THEORY:
// The `ScanDriver` is the orchestrator of a single conversion. It owns the
// `VisitedSet`, walks every pixel index in row-major order (the same `y * width
// + x` order the visited set uses), and turns each unvisited, opaque pixel into
// the seed of a new `FloodFill`.
//
// Key architectural principles:
// 1.  **Exactly-once classification**: Every index is either absorbed into a
//     region or marked as transparent, once. The scan examines `width * height`
//     indices and stops, regardless of image content.
// 2.  **Ordered output**: Regions are appended in seed-discovery order, so the
//     result is deterministic for a given image.
// 3.  **Driver-agnostic**: `next_seed`, `fill_step` and `complete` expose the scan
//     one pop at a time, and `advance` runs it up to the next `PopCounter`
//     checkpoint. The synchronous `run`, the abortable `run_until` and the
//     cooperative pipeline all drive the same steps, so they cannot disagree on
//     visit order or on where they pause.

use tracing::trace;

use crate::core_modules::flood_fill::{FillStep, FloodFill};
use crate::core_modules::pixel::Distance;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::region::{Region, ResultSet};
use crate::core_modules::visited_set::VisitedSet;

/// Counts fill-stack pops across a whole scan and flags every `quantum`-th one.
#[derive(Debug, Clone)]
pub struct PopCounter {
    quantum: usize,
    pops: usize,
}

impl PopCounter {
    /// A `quantum` of 0 is treated as 1.
    pub fn new(quantum: usize) -> Self {
        Self {
            quantum: quantum.max(1),
            pops: 0,
        }
    }

    /// Records one pop. Returns `true` when it lands on a checkpoint.
    pub fn tick(&mut self) -> bool {
        self.pops += 1;
        self.pops % self.quantum == 0
    }

    pub fn pops(&self) -> usize {
        self.pops
    }
}

pub struct ScanDriver<'a> {
    buffer: PixelBuffer<'a>,
    visited: VisitedSet,
    threshold: Distance,
    cursor: usize,
    current: Option<FloodFill>,
    regions: Vec<Region>,
    transparent_pixels: usize,
}

impl<'a> ScanDriver<'a> {
    /// A `threshold` of 0 would reject every seed; it is raised to 1.
    pub fn new(buffer: PixelBuffer<'a>, threshold: Distance) -> Self {
        Self {
            visited: VisitedSet::new(buffer.pixel_count()),
            buffer,
            threshold: threshold.max(1),
            cursor: 0,
            current: None,
            regions: Vec::new(),
            transparent_pixels: 0,
        }
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Advances to the next unvisited opaque pixel and returns a fill seeded there.
    /// Transparent pixels met on the way are marked visited and skipped.
    pub fn next_seed(&mut self) -> Option<FloodFill> {
        while self.cursor < self.buffer.pixel_count() {
            let index = self.cursor;
            self.cursor += 1;

            if self.visited.is_visited(index) {
                continue;
            }

            let pixel = self.buffer.pixel(index);
            if pixel.is_transparent() {
                self.visited.mark_visited(index);
                self.transparent_pixels += 1;
                continue;
            }

            let seed = self.buffer.point_of(index);
            trace!(x = seed.x, y = seed.y, "seeding region");
            return Some(FloodFill::new(seed, pixel.color(), self.threshold));
        }
        None
    }

    /// One pop of `fill` against this scan's buffer and visited set.
    pub fn fill_step(&mut self, fill: &mut FloodFill) -> FillStep {
        let step = fill.step(&self.buffer, &mut self.visited);
        if step == FillStep::Transparent {
            self.transparent_pixels += 1;
        }
        step
    }

    /// Records a drained fill as the next region.
    pub fn complete(&mut self, fill: FloodFill) {
        let region = fill.finish();
        trace!(
            x = region.seed().x,
            y = region.seed().y,
            pixels = region.len(),
            "region complete"
        );
        self.regions.push(region);
    }

    /// Runs the whole scan on the current thread.
    pub fn run(mut self) -> ResultSet {
        while let Some(mut fill) = self.next_seed() {
            while self.fill_step(&mut fill) != FillStep::Exhausted {}
            self.complete(fill);
        }
        self.finish()
    }

    /// Pops until `counter` reaches its next checkpoint (`true`) or every pixel
    /// has been classified (`false`). A fill interrupted by a checkpoint resumes
    /// on the next call.
    pub fn advance(&mut self, counter: &mut PopCounter) -> bool {
        loop {
            let mut fill = match self.current.take() {
                Some(fill) => fill,
                None => match self.next_seed() {
                    Some(fill) => fill,
                    None => return false,
                },
            };

            if self.fill_step(&mut fill) == FillStep::Exhausted {
                self.complete(fill);
                continue;
            }

            self.current = Some(fill);
            if counter.tick() {
                return true;
            }
        }
    }

    /// Runs the whole scan, consulting `should_stop` after every `quantum` pops.
    /// Returns `None` if it asked to stop.
    pub fn run_until(mut self, quantum: usize, mut should_stop: impl FnMut() -> bool) -> Option<ResultSet> {
        let mut counter = PopCounter::new(quantum);
        while self.advance(&mut counter) {
            if should_stop() {
                return None;
            }
        }
        Some(self.finish())
    }

    pub fn finish(self) -> ResultSet {
        ResultSet::new(
            self.buffer.width(),
            self.buffer.height(),
            self.regions,
            self.transparent_pixels,
        )
    }
}
