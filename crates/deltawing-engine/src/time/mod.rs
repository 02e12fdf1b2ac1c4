//! Fixed-timestep timing.
//!
//! The simulation advances in whole ticks of constant length; rendering runs
//! once per frame and interpolates with the leftover fraction of a tick.
//! Intended usage per frame:
//! - `clock.advance()` to learn how many ticks to run and the partial tick
//! - run `step.ticks` simulation ticks
//! - render with `step.partial_ticks`

mod tick_clock;

pub use tick_clock::{lerp, FrameStats, TickClock, TickStep};
