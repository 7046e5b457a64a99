use std::time::{Duration, Instant};

use crate::xr::{XrDuration, XrTime};

/// One step of the display clock.
#[derive(Debug, Copy, Clone)]
pub struct DisplayTick {
    /// When the frame started now is expected to reach the display.
    pub predicted_display_time: XrTime,

    /// Display refresh period.
    pub period: XrDuration,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Fixed-refresh display clock producing `DisplayTick`s on a period grid.
///
/// Times are nanoseconds since the clock was created. A paced clock sleeps
/// until the next vsync deadline; an unpaced clock advances the grid without
/// sleeping, which keeps tests deterministic.
///
/// Missed deadlines are skipped rather than replayed, so a stall does not
/// cause a burst of back-to-back frames afterwards.
#[derive(Debug, Clone)]
pub struct DisplayClock {
    epoch: Instant,
    period: Duration,
    next_deadline: Instant,
    frame_index: u64,
    paced: bool,
}

impl DisplayClock {
    /// Creates a paced clock at `refresh_hz`.
    ///
    /// `refresh_hz` is clamped to `[1, 1000]`.
    pub fn new(refresh_hz: f32) -> Self {
        Self::with_pacing(refresh_hz, true)
    }

    pub fn with_pacing(refresh_hz: f32, paced: bool) -> Self {
        let hz = if refresh_hz.is_finite() { refresh_hz.clamp(1.0, 1000.0) } else { 72.0 };
        let period = Duration::from_secs_f64(1.0 / hz as f64);
        let epoch = Instant::now();
        Self {
            epoch,
            period,
            next_deadline: epoch + period,
            frame_index: 0,
            paced,
        }
    }

    pub fn period(&self) -> XrDuration {
        XrDuration::from_nanos(self.period.as_nanos() as i64)
    }

    /// Current time on the clock's timeline.
    pub fn now(&self) -> XrTime {
        self.to_xr_time(Instant::now())
    }

    /// Advances to the next deadline and predicts its display time one
    /// period ahead.
    pub fn wait_next(&mut self) -> DisplayTick {
        if self.paced {
            let now = Instant::now();
            if self.next_deadline > now {
                std::thread::sleep(self.next_deadline - now);
            } else {
                let behind = now.saturating_duration_since(self.next_deadline);
                let skipped = (behind.as_nanos() / self.period.as_nanos()).min(u32::MAX as u128);
                self.next_deadline += self.period * skipped as u32;
            }
        }

        let deadline = self.next_deadline;
        self.next_deadline += self.period;

        let tick = DisplayTick {
            predicted_display_time: self.to_xr_time(deadline + self.period),
            period: self.period(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        tick
    }

    fn to_xr_time(&self, at: Instant) -> XrTime {
        XrTime::from_nanos(at.saturating_duration_since(self.epoch).as_nanos() as i64)
    }
}

impl Default for DisplayClock {
    fn default() -> Self {
        Self::new(72.0)
    }
}
