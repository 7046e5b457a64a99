//! Compositor runtime boundary.
//!
//! Everything the session needs from the device runtime goes through
//! `XrRuntime`; everything it needs from the graphics API goes through
//! `GraphicsBinding`. `HeadlessRuntime` implements the former without a
//! headset.

mod controller;
mod error;
mod graphics;
mod headless;
mod runtime;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{ControllerFeed, ControllerState, DeviceSignal};
pub use error::{XrError, XrResult};
pub use graphics::GraphicsBinding;
pub use headless::{HeadlessConfig, HeadlessRuntime, HeadlessStats};
pub use runtime::XrRuntime;
pub use types::{
    CompositionLayerQuad, EnvironmentBlendMode, EyeVisibility, FramePose, FrameState,
    FramebufferHandle, Hand, ImageHandle, ImageRect, LocationFlags, RuntimeEvent, SessionState,
    SpaceLocation, SwapchainCreateInfo, SwapchainFormat, SwapchainHandle, SwapchainUsage,
    ViewConfiguration, XrDuration, XrTime,
};
