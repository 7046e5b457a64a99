use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::xr::{
    FramebufferHandle, GraphicsBinding, ImageHandle, SwapchainCreateInfo, SwapchainFormat,
    SwapchainUsage, XrError,
};

use super::GpuContext;

/// wgpu format backing a swapchain format.
pub fn texture_format(format: SwapchainFormat) -> wgpu::TextureFormat {
    match format {
        SwapchainFormat::Srgb8Alpha8 => wgpu::TextureFormat::Rgba8UnormSrgb,
        SwapchainFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
    }
}

/// wgpu usages covering the requested swapchain usage bits.
///
/// Images can always be copied out so the mirror path can read them back.
pub fn texture_usage(usage: SwapchainUsage) -> wgpu::TextureUsages {
    let mut out = wgpu::TextureUsages::COPY_SRC;
    if usage.contains(SwapchainUsage::SAMPLED) {
        out |= wgpu::TextureUsages::TEXTURE_BINDING;
    }
    if usage.contains(SwapchainUsage::COLOR_ATTACHMENT)
        || usage.contains(SwapchainUsage::DEPTH_STENCIL_ATTACHMENT)
    {
        out |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }
    out
}

/// A framebuffer with its color attachment bound, ready to draw into.
#[derive(Debug, Clone)]
pub struct BoundTarget {
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
struct OffscreenImage {
    texture: wgpu::Texture,
    width: u32,
    height: u32,
}

#[derive(Debug, Default)]
struct Registry {
    next_image: u64,
    next_framebuffer: u32,
    images: HashMap<ImageHandle, OffscreenImage>,
    framebuffers: HashMap<FramebufferHandle, Option<ImageHandle>>,
}

/// `GraphicsBinding` over wgpu: swapchain images are offscreen textures,
/// framebuffers are attachment slots.
///
/// Clones share one registry, so the runtime (which allocates images) and
/// the session (which allocates the framebuffer) can each hold a copy.
#[derive(Debug, Clone)]
pub struct OffscreenGpu {
    ctx: GpuContext,
    registry: Arc<Mutex<Registry>>,
}

impl OffscreenGpu {
    pub fn new(ctx: GpuContext) -> Self {
        Self {
            ctx,
            registry: Arc::default(),
        }
    }

    #[inline]
    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    /// Attaches `image` as `framebuffer`'s color target and returns a view
    /// to draw through.
    pub fn bind_color_attachment(
        &self,
        framebuffer: FramebufferHandle,
        image: ImageHandle,
    ) -> Result<BoundTarget, XrError> {
        const CALL: &str = "bind_color_attachment";
        let mut reg = self.lock();

        let target = {
            let Some(img) = reg.images.get(&image) else {
                return Err(XrError::call_order(CALL, format!("unknown image {}", image.0)));
            };
            BoundTarget {
                view: img.texture.create_view(&wgpu::TextureViewDescriptor::default()),
                format: img.texture.format(),
                width: img.width,
                height: img.height,
            }
        };

        match reg.framebuffers.get_mut(&framebuffer) {
            Some(slot) => *slot = Some(image),
            None => {
                return Err(XrError::call_order(
                    CALL,
                    format!("unknown framebuffer {}", framebuffer.0),
                ));
            }
        }
        Ok(target)
    }

    /// Detaches whatever `framebuffer` currently draws into.
    pub fn unbind(&self, framebuffer: FramebufferHandle) {
        if let Some(slot) = self.lock().framebuffers.get_mut(&framebuffer) {
            *slot = None;
        }
    }

    /// Image currently attached to `framebuffer`.
    pub fn bound_image(&self, framebuffer: FramebufferHandle) -> Option<ImageHandle> {
        self.lock().framebuffers.get(&framebuffer).copied().flatten()
    }

    /// The texture behind `image`, e.g. for mirroring it elsewhere.
    pub fn texture(&self, image: ImageHandle) -> Option<wgpu::Texture> {
        self.lock().images.get(&image).map(|i| i.texture.clone())
    }

    pub fn live_images(&self) -> usize {
        self.lock().images.len()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl GraphicsBinding for OffscreenGpu {
    fn create_image(&mut self, info: &SwapchainCreateInfo) -> Result<ImageHandle, XrError> {
        let max = self.max_image_dimension();
        if info.width == 0 || info.height == 0 || info.width > max || info.height > max {
            return Err(XrError::ResourceCreation(format!(
                "image {}x{} outside supported range 1..={max}",
                info.width, info.height
            )));
        }
        if info.sample_count != 1 || info.face_count != 1 {
            return Err(XrError::ResourceCreation(format!(
                "unsupported image layout: {} samples, {} faces",
                info.sample_count, info.face_count
            )));
        }

        let texture = self.ctx.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("presence swapchain image"),
            size: wgpu::Extent3d {
                width: info.width,
                height: info.height,
                depth_or_array_layers: info.array_size.max(1),
            },
            mip_level_count: info.mip_count.max(1),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(info.format),
            usage: texture_usage(info.usage),
            view_formats: &[],
        });

        let mut reg = self.lock();
        reg.next_image += 1;
        let handle = ImageHandle(reg.next_image);
        reg.images.insert(
            handle,
            OffscreenImage {
                texture,
                width: info.width,
                height: info.height,
            },
        );
        log::trace!("offscreen image {} ({}x{})", handle.0, info.width, info.height);
        Ok(handle)
    }

    fn destroy_image(&mut self, image: ImageHandle) {
        let mut reg = self.lock();
        if let Some(img) = reg.images.remove(&image) {
            img.texture.destroy();
        }
        for slot in reg.framebuffers.values_mut() {
            if *slot == Some(image) {
                *slot = None;
            }
        }
    }

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle, XrError> {
        let mut reg = self.lock();
        reg.next_framebuffer = reg
            .next_framebuffer
            .checked_add(1)
            .ok_or_else(|| XrError::ResourceCreation("framebuffer ids exhausted".into()))?;
        let handle = FramebufferHandle(reg.next_framebuffer);
        reg.framebuffers.insert(handle, None);
        Ok(handle)
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.lock().framebuffers.remove(&framebuffer);
    }

    fn max_image_dimension(&self) -> u32 {
        self.ctx.device().limits().max_texture_dimension_2d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_map_to_rgba8() {
        assert_eq!(
            texture_format(SwapchainFormat::Srgb8Alpha8),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(texture_format(SwapchainFormat::Rgba8), wgpu::TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn color_usage_is_renderable_and_sampled() {
        let usage = texture_usage(SwapchainUsage::SAMPLED | SwapchainUsage::COLOR_ATTACHMENT);
        assert!(usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
        assert!(usage.contains(wgpu::TextureUsages::TEXTURE_BINDING));
        assert!(usage.contains(wgpu::TextureUsages::COPY_SRC));
    }

    #[test]
    fn transfer_only_is_not_renderable() {
        let usage = texture_usage(SwapchainUsage::TRANSFER_SRC);
        assert_eq!(usage, wgpu::TextureUsages::COPY_SRC);
    }
}
