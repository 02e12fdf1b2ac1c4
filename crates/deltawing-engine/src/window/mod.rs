//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the game window, and wires them to the GPU
//! layer and the fixed-timestep clock.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
