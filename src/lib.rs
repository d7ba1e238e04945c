// THEORY:
// This file is the main entry point for the `pixel_vectorizer` library crate.
// It turns an RGBA raster image into an ordered list of filled SVG path regions,
// one per connected component of uniform color.
//
// The primary goal is to export the `Vectorizer` and its associated data
// structures (`ConverterConfig`, `ResultSet`, `ConversionRequest`, etc.) as the
// high-level interface. The algorithmic leaves (`core_modules`) stay public for
// callers that want to drive a scan step by step, but most users only need the
// pipeline.
//
// Data flow: pixel buffer -> ScanDriver -> (per seed) FloodFill + VisitedSet ->
// PathEmitter -> ordered regions -> SVG markup.

pub mod cancel;
pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod svg;
pub mod worker_pipeline;

pub use cancel::CancellationToken;
pub use core_modules::path_emitter::{PathEmitter, PathRegion};
pub use core_modules::pixel::Color;
pub use core_modules::pixel_buffer::PixelBuffer;
pub use core_modules::region::{Point, Region, ResultSet};
pub use error::{ConvertError, ConvertResult};
pub use pipeline::{ConversionOutcome, ConverterConfig, ExecutionStrategy, Vectorizer};
pub use worker_pipeline::{ConversionRequest, WorkerContext};
