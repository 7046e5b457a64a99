//! 2D geometry in panel pixel space.
//!
//! Origin top-left, +X right, +Y down. This is the space the pointer
//! projector reports in and the panel is laid out in.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
