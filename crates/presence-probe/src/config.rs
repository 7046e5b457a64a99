use std::ffi::OsStr;

use presence_engine::device::GpuInit;
use presence_engine::session::SessionConfig;
use presence_engine::xr::HeadlessConfig;

/// Set to run without the companion window (no display needed).
pub const NO_WINDOW_ENV: &str = "PRESENCE_PROBE_NO_WINDOW";

/// Stop gracefully after this many rendered frames.
pub const FRAME_LIMIT_ENV: &str = "PRESENCE_PROBE_FRAMES";

/// Without a window there is no other way to quit, so headless runs are
/// bounded by default.
const HEADLESS_FRAME_LIMIT: u64 = 720;

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub window: bool,
    pub frame_limit: Option<u64>,
    pub session: SessionConfig,
    pub headless: HeadlessConfig,
    pub gpu: GpuInit,
    /// Lines kept in the on-panel log.
    pub journal_lines: usize,
    /// Where the simulated controller is held (z, meters).
    pub controller_z: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            window: true,
            frame_limit: None,
            session: SessionConfig::default(),
            headless: HeadlessConfig::default(),
            gpu: GpuInit::default(),
            journal_lines: 64,
            controller_z: -0.3,
        }
    }
}

impl ProbeConfig {
    pub fn from_env() -> Self {
        Self::default().apply_env(
            std::env::var_os(NO_WINDOW_ENV).as_deref(),
            std::env::var_os(FRAME_LIMIT_ENV).as_deref(),
        )
    }

    fn apply_env(mut self, no_window: Option<&OsStr>, frames: Option<&OsStr>) -> Self {
        if flag_set(no_window) {
            self.window = false;
            self.frame_limit = Some(HEADLESS_FRAME_LIMIT);
        }
        if let Some(limit) = frames.and_then(OsStr::to_str).and_then(|s| s.trim().parse().ok()) {
            self.frame_limit = (limit > 0).then_some(limit);
        }
        self
    }
}

fn flag_set(value: Option<&OsStr>) -> bool {
    match value.and_then(OsStr::to_str) {
        None => false,
        Some(v) => !matches!(v.trim(), "" | "0" | "false" | "no"),
    }
}
