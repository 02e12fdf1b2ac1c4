//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the game: the [`App`] callbacks and the state handed to them.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{Frame, Graphics};
