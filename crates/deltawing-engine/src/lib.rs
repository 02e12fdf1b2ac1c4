//! DeltaWing engine crate.
//!
//! A small 2D rendering core for a fixed-tick game loop (matrix stack,
//! format-specialised renderers, bitmap-font text) plus the platform and GPU
//! runtime that drives it.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod math;
pub mod render;
pub mod text;
pub mod time;
pub mod window;
