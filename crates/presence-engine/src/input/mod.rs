//! Controller input subsystem.
//!
//! Reads the session's action set once per frame: trigger value with edge
//! detection, and the aim pose at the frame's predicted display time.

mod sampler;

pub use sampler::{AimSample, InputSampler, TriggerSample};
