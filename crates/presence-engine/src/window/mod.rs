//! Desktop companion window.
//!
//! Mirrors the panel and turns mouse/keyboard input into simulated
//! controller state for the headless runtime.

mod companion;

pub use companion::{CompanionConfig, CompanionWindow, aim_angles, window_to_panel};
