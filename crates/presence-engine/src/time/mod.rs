//! Time subsystem.
//!
//! Provides the display-period grid the headless runtime paces frames on.
//! Intended usage:
//! - one `DisplayClock` per simulated display
//! - call `wait_next()` once per `wait_frame` to obtain a `DisplayTick`

mod display_clock;

pub use display_clock::{DisplayClock, DisplayTick};
