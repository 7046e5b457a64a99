//! Offscreen render target pool.
//!
//! A ring of runtime-owned color images plus one framebuffer object that is
//! rebound to whichever image is acquired for the current frame.

mod pool;

pub use pool::{RenderTarget, RenderTargetPool};
