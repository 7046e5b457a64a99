use std::collections::VecDeque;
use std::time::Duration;

/// Rolling per-frame durations of the three frame-loop stages.
///
/// A frame counts as missed when its total exceeds the display period the
/// runtime reported for it.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    wait_ms: VecDeque<f64>,
    render_ms: VecDeque<f64>,
    submit_ms: VecDeque<f64>,
    total_ms: VecDeque<f64>,
    window: usize,
    total_frames: u64,
    missed_frames: u64,
    log_every: u64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(600, 300)
    }
}

impl FrameTiming {
    /// `window` samples are kept per stage; stats are logged every
    /// `log_every` frames (0 disables logging).
    pub fn new(window: usize, log_every: u64) -> Self {
        let window = window.max(1);
        Self {
            wait_ms: VecDeque::with_capacity(window),
            render_ms: VecDeque::with_capacity(window),
            submit_ms: VecDeque::with_capacity(window),
            total_ms: VecDeque::with_capacity(window),
            window,
            total_frames: 0,
            missed_frames: 0,
            log_every,
        }
    }

    pub fn record(&mut self, wait: Duration, render: Duration, submit: Duration, budget: Duration) {
        let wait = wait.as_secs_f64() * 1000.0;
        let render = render.as_secs_f64() * 1000.0;
        let submit = submit.as_secs_f64() * 1000.0;
        let total = wait + render + submit;

        push(&mut self.wait_ms, wait, self.window);
        push(&mut self.render_ms, render, self.window);
        push(&mut self.submit_ms, submit, self.window);
        push(&mut self.total_ms, total, self.window);

        self.total_frames += 1;
        if !budget.is_zero() && total > budget.as_secs_f64() * 1000.0 {
            self.missed_frames += 1;
        }

        if self.log_every > 0 && self.total_frames % self.log_every == 0 {
            let s = self.stats();
            log::debug!(
                "frame timing: wait p50 {:.2}ms, render p50 {:.2}ms p99 {:.2}ms, submit p50 {:.2}ms, total p99 {:.2}ms, missed {}/{}",
                s.wait_p50,
                s.render_p50,
                s.render_p99,
                s.submit_p50,
                s.total_p99,
                s.missed_frames,
                s.total_frames
            );
        }
    }

    #[inline]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    #[inline]
    pub fn missed_frames(&self) -> u64 {
        self.missed_frames
    }

    /// Number of samples currently held per stage.
    #[inline]
    pub fn samples(&self) -> usize {
        self.total_ms.len()
    }

    pub fn stats(&self) -> FrameTimingStats {
        FrameTimingStats {
            wait_p50: percentile(&self.wait_ms, 50.0),
            wait_p99: percentile(&self.wait_ms, 99.0),
            render_p50: percentile(&self.render_ms, 50.0),
            render_p99: percentile(&self.render_ms, 99.0),
            submit_p50: percentile(&self.submit_ms, 50.0),
            submit_p99: percentile(&self.submit_ms, 99.0),
            total_p50: percentile(&self.total_ms, 50.0),
            total_p99: percentile(&self.total_ms, 99.0),
            total_frames: self.total_frames,
            missed_frames: self.missed_frames,
        }
    }
}

/// Percentile snapshot in milliseconds.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameTimingStats {
    pub wait_p50: f64,
    pub wait_p99: f64,
    pub render_p50: f64,
    pub render_p99: f64,
    pub submit_p50: f64,
    pub submit_p99: f64,
    pub total_p50: f64,
    pub total_p99: f64,
    pub total_frames: u64,
    pub missed_frames: u64,
}

impl FrameTimingStats {
    pub fn missed_pct(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.missed_frames as f64 / self.total_frames as f64 * 100.0
    }
}

fn push(samples: &mut VecDeque<f64>, value: f64, window: usize) {
    if samples.len() == window {
        samples.pop_front();
    }
    samples.push_back(value);
}

fn percentile(samples: &VecDeque<f64>, p: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = samples.iter().copied().collect();
    sorted.sort_by(f64::total_cmp);
    let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
