//! Session lifecycle.
//!
//! `SessionMachine` turns runtime events into phase changes; `Session` owns
//! the runtime, the render target pool and the per-frame input state.

mod context;
mod machine;

pub use context::{Session, SessionConfig};
pub use machine::{SessionMachine, SessionPhase, Transition};
