//! GPU rendering.
//!
//! Renderers own their GPU resources and build them lazily on first use.
//!
//! Convention:
//! - CPU geometry is in panel pixels (top-left origin, +Y down).
//! - The vertex shader converts to NDC using a viewport uniform.
//! - Colors are linear premultiplied; targets are sRGB.

mod blit;
mod common;
mod ctx;
mod shapes;

pub use blit::BlitRenderer;
pub(crate) use blit::letterbox_scale;
pub use ctx::{DrawTarget, RenderCtx};
pub use shapes::ShapeRenderer;
