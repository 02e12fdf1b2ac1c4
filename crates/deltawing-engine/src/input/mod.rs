//! Input types handed to the application.
//!
//! Public API is platform-agnostic; the runtime translates winit events
//! through [`platform`].

pub(crate) mod platform;
mod types;

pub use types::{ButtonAction, Key, KeyAction, MouseButton};
