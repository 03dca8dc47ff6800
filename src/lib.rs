//! Stars drifting across a 2D integer grid with fixed velocities line up
//! into a legible message at exactly one instant. This crate parses a star
//! list, finds that instant by watching the spread of the field bottom out,
//! and rasterizes the aligned field into a black-and-white plate.

pub mod parse;
pub mod raster;
pub mod sky;

pub use parse::{parse_stars, ParseError};
pub use raster::{rasterize, Plate, PlateError};
pub use sky::{Alignment, AlignError, Sky};
