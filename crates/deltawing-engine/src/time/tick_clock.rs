use std::time::{Duration, Instant};

/// Result of advancing a [`TickClock`] by one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TickStep {
    /// Whole simulation ticks to run this frame.
    pub ticks: u32,
    /// Fraction of a tick left in the accumulator, in `[0, 1)`.
    pub partial_ticks: f32,
    /// Clamped wall-clock time of the frame, in seconds.
    pub frame_time: f32,
}

/// Accumulator-based fixed-timestep clock.
///
/// Frame time is clamped to `max_frame_time` so that a stall (debugger,
/// window drag) cannot trigger an unbounded burst of catch-up ticks.
#[derive(Debug, Clone)]
pub struct TickClock {
    tick: Duration,
    max_frame_time: Duration,
    accumulator: Duration,
    last: Instant,
}

impl TickClock {
    pub const DEFAULT_TICKS_PER_SECOND: u32 = 60;
    pub const DEFAULT_MAX_FRAME_TIME: Duration = Duration::from_millis(250);

    pub fn new(ticks_per_second: u32, max_frame_time: Duration) -> Self {
        let tick = Duration::from_secs_f64(1.0 / ticks_per_second.max(1) as f64);
        Self { tick, max_frame_time, accumulator: Duration::ZERO, last: Instant::now() }
    }

    /// Length of one simulation tick.
    #[inline]
    pub fn tick_duration(&self) -> Duration {
        self.tick
    }

    /// Restarts the baseline, e.g. after the loop was suspended.
    pub fn reset(&mut self) {
        self.last = Instant::now();
        self.accumulator = Duration::ZERO;
    }

    /// Advances by the wall-clock time since the previous call.
    pub fn advance(&mut self) -> TickStep {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        self.advance_by(elapsed)
    }

    /// Advances by `elapsed`, clamped to the maximum frame time.
    pub fn advance_by(&mut self, elapsed: Duration) -> TickStep {
        let frame = elapsed.min(self.max_frame_time);
        self.accumulator += frame;

        let mut ticks = 0;
        while self.accumulator >= self.tick {
            self.accumulator -= self.tick;
            ticks += 1;
        }

        TickStep {
            ticks,
            partial_ticks: self.accumulator.as_secs_f32() / self.tick.as_secs_f32(),
            frame_time: frame.as_secs_f32(),
        }
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TICKS_PER_SECOND, Self::DEFAULT_MAX_FRAME_TIME)
    }
}

/// Counts frames and ticks and logs the rates once per second.
#[derive(Debug, Clone)]
pub struct FrameStats {
    window_start: Instant,
    frames: u32,
    ticks: u32,
}

impl FrameStats {
    pub fn new() -> Self {
        Self { window_start: Instant::now(), frames: 0, ticks: 0 }
    }

    /// Records one frame that ran `ticks` ticks.
    pub fn record(&mut self, ticks: u32) {
        if let Some((fps, tps)) = self.record_at(Instant::now(), ticks) {
            log::debug!("FPS {fps} TPS {tps}");
        }
    }

    /// Returns `(frames, ticks)` of the last second once a second has passed.
    pub fn record_at(&mut self, now: Instant, ticks: u32) -> Option<(u32, u32)> {
        self.frames += 1;
        self.ticks += ticks;
        if now.saturating_duration_since(self.window_start) < Duration::from_secs(1) {
            return None;
        }
        let rates = (self.frames, self.ticks);
        self.window_start = now;
        self.frames = 0;
        self.ticks = 0;
        Some(rates)
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Linear interpolation between the previous and current tick's value.
#[inline]
pub fn lerp(prev: f32, current: f32, partial_ticks: f32) -> f32 {
    prev + (current - prev) * partial_ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn drains_whole_ticks_and_keeps_the_remainder() {
        let mut clock = TickClock::new(50, ms(250));

        let step = clock.advance_by(ms(40));
        assert_eq!(step.ticks, 2);
        assert!(step.partial_ticks.abs() < 1e-4);

        let step = clock.advance_by(ms(30));
        assert_eq!(step.ticks, 1);
        assert!((step.partial_ticks - 0.5).abs() < 1e-4);

        let step = clock.advance_by(ms(10));
        assert_eq!(step.ticks, 1);
        assert!(step.partial_ticks.abs() < 1e-4);
    }

    #[test]
    fn clamps_long_frames() {
        let mut clock = TickClock::new(100, ms(250));
        let step = clock.advance_by(Duration::from_secs(10));
        assert_eq!(step.ticks, 25);
        assert!((step.frame_time - 0.25).abs() < 1e-6);
    }

    #[test]
    fn partial_ticks_stay_below_one() {
        let mut clock = TickClock::default();
        for n in 0..200 {
            let step = clock.advance_by(Duration::from_micros(7_000 + n * 37));
            assert!((0.0..1.0).contains(&step.partial_ticks));
        }
    }

    #[test]
    fn stats_report_once_per_second() {
        let start = Instant::now();
        let mut stats = FrameStats { window_start: start, frames: 0, ticks: 0 };

        assert_eq!(stats.record_at(start + ms(500), 30), None);
        assert_eq!(stats.record_at(start + ms(1000), 30), Some((2, 60)));
        assert_eq!(stats.record_at(start + ms(1500), 1), None);
    }

    #[test]
    fn lerp_interpolates() {
        assert_eq!(lerp(10.0, 20.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 20.0, 0.25), 12.5);
        assert_eq!(lerp(10.0, 20.0, 1.0), 20.0);
    }
}
