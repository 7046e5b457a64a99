//! Presence engine crate.
//!
//! Compositor session core: runtime boundary, render target pool, pointer
//! projection, input sampling, the session state machine and the frame loop.
//! Also owns the wgpu pieces used to draw the panel and mirror it to a
//! desktop window.

pub mod device;
pub mod window;
pub mod input;
pub mod time;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;

pub mod xr;
pub mod swapchain;
pub mod pointer;
pub mod session;
pub mod frame;
