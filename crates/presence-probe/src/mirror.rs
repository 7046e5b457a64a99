use std::sync::Arc;

use presence_engine::coords::Viewport;
use presence_engine::device::{GpuContext, MirrorSurface, OffscreenGpu, SurfaceErrorAction};
use presence_engine::paint::Color;
use presence_engine::render::{BlitRenderer, DrawTarget, RenderCtx};
use presence_engine::swapchain::RenderTarget;
use winit::window::Window;

/// Copies each rendered panel image into the companion window.
pub struct Mirror {
    window: Arc<Window>,
    surface: MirrorSurface,
    blit: BlitRenderer,
    background: Color,
    disabled: bool,
}

impl Mirror {
    pub fn new(window: Arc<Window>, surface: MirrorSurface) -> Self {
        Self {
            window,
            surface,
            blit: BlitRenderer::new(),
            background: Color::from_srgb_u8(24, 24, 28, 255),
            disabled: false,
        }
    }

    /// Blits `target` (still acquired, drawn this frame) to the window.
    pub fn present(&mut self, gpu: &OffscreenGpu, target: &RenderTarget) {
        if self.disabled {
            return;
        }
        let ctx = gpu.context();

        let size = self.window.inner_size();
        if size != self.surface.size() {
            self.surface.resize(ctx.device(), size);
        }
        if size.width == 0 || size.height == 0 {
            return;
        }

        let Some(texture) = gpu.texture(target.image) else {
            log::debug!("mirror: image {:?} has no texture", target.image);
            return;
        };
        let source = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut frame = match self.surface.acquire(ctx.device()) {
            Ok(frame) => frame,
            Err(e) => {
                self.on_error(ctx, e);
                return;
            }
        };

        {
            let render_ctx = RenderCtx::new(
                ctx.device(),
                ctx.queue(),
                self.surface.format(),
                Viewport::from_pixels(size.width, size.height),
            );
            let mut draw_target = DrawTarget::new(&mut frame.encoder, &frame.view);
            self.blit.blit(
                &render_ctx,
                &mut draw_target,
                &source,
                (target.width, target.height),
                self.background,
            );
        }

        self.window.pre_present_notify();
        self.surface.present(ctx.queue(), frame);
    }

    fn on_error(&mut self, ctx: &GpuContext, err: wgpu::SurfaceError) {
        if self.surface.handle_error(ctx.device(), err) == SurfaceErrorAction::Fatal {
            log::error!("mirror surface lost for good, mirroring disabled");
            self.disabled = true;
        }
    }
}
