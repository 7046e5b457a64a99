//! wgpu device management.
//!
//! - `GpuContext`: instance/adapter/device/queue, optionally compatible with
//!   a window surface
//! - `OffscreenGpu`: the `GraphicsBinding` that backs swapchain images with
//!   wgpu textures and binds them to framebuffers
//! - `MirrorSurface`: the desktop window's surface the panel is mirrored to

mod error;
mod gpu;
mod offscreen;
mod surface;

pub use error::SurfaceErrorAction;
pub use gpu::{GpuContext, GpuInit};
pub use offscreen::{BoundTarget, OffscreenGpu, texture_format, texture_usage};
pub use surface::{MirrorFrame, MirrorSurface};
