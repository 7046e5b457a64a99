//! Per-frame protocol.
//!
//! `FrameLoop` owns the iteration order (platform pump, event drain,
//! wait/begin, input, render, layer submission, end) and the timing stats;
//! the panel content comes from a `RenderDelegate`.

mod delegate;
mod frame_loop;
mod timing;

pub use delegate::{AppControl, NullPlatform, PlatformEvents, RenderDelegate};
pub use frame_loop::{panel_layer, ExitReason, FrameLoop, FrameOutcome, StopHandle};
pub use timing::{FrameTiming, FrameTimingStats};
