//! Transform math shared by the renderers and the scene layer.
//!
//! Matrices are `glam::Mat4` (column-major, matching the WGSL `mat4x4<f32>` layout).

mod matrix_stack;

pub use matrix_stack::{MatrixStack, MatrixStackError, MATRIX_STACK_CAPACITY};
