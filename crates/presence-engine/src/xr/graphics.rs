use super::error::XrError;
use super::types::{FramebufferHandle, ImageHandle, SwapchainCreateInfo};

/// Graphics API side of the session: owns the actual GPU images behind
/// swapchains and the framebuffer object that binds them for drawing.
///
/// Implemented over wgpu by `device::OffscreenGpu`; tests use counting mocks.
pub trait GraphicsBinding {
    /// Allocates one color image matching `info`.
    fn create_image(&mut self, info: &SwapchainCreateInfo) -> Result<ImageHandle, XrError>;

    fn destroy_image(&mut self, image: ImageHandle);

    /// Allocates a framebuffer object with no attachment.
    fn create_framebuffer(&mut self) -> Result<FramebufferHandle, XrError>;

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Largest supported image edge in pixels.
    fn max_image_dimension(&self) -> u32;
}
