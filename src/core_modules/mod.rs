pub mod flood_fill;
pub mod path_emitter;
pub mod pixel;
pub mod pixel_buffer;
pub mod region;
pub mod scan_driver;
pub mod visited_set;
