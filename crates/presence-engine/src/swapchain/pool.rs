use crate::xr::{
    FramebufferHandle, GraphicsBinding, ImageHandle, SwapchainCreateInfo, SwapchainFormat,
    SwapchainHandle, XrDuration, XrError, XrRuntime,
};

/// One drawable image of the pool.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderTarget {
    pub image: ImageHandle,
    pub width: u32,
    pub height: u32,
}

/// Runtime-managed image ring plus the shared framebuffer.
///
/// Lifecycle: `create` → (`acquire` → `wait` → draw → `release`)* → `destroy`.
/// At most one image is acquired at a time, and it can only be released after
/// a successful wait. A failed wait leaves the image acquired so the wait can
/// be retried. A default pool holds nothing and `destroy` on it is a no-op.
#[derive(Debug, Default)]
pub struct RenderTargetPool {
    swapchain: SwapchainHandle,
    targets: Vec<RenderTarget>,
    framebuffer: FramebufferHandle,
    width: u32,
    height: u32,
    acquired: Option<u32>,
    waited: bool,
}

impl RenderTargetPool {
    /// Creates a `width`×`height` sRGB RGBA8 image ring and its framebuffer.
    ///
    /// Anything created before a failure is released again.
    pub fn create<R, G>(
        runtime: &mut R,
        graphics: &mut G,
        width: u32,
        height: u32,
    ) -> Result<Self, XrError>
    where
        R: XrRuntime + ?Sized,
        G: GraphicsBinding + ?Sized,
    {
        let info = SwapchainCreateInfo::color(SwapchainFormat::Srgb8Alpha8, width, height);

        let swapchain = runtime.create_swapchain(&info).map_err(|e| match e {
            XrError::ResourceCreation(_) => e,
            other => XrError::ResourceCreation(format!("swapchain rejected: {other}")),
        })?;

        let images = match runtime.enumerate_swapchain_images(swapchain) {
            Ok(images) if !images.is_empty() => images,
            Ok(_) => {
                discard_swapchain(runtime, swapchain);
                return Err(XrError::ResourceCreation(
                    "runtime returned no swapchain images".into(),
                ));
            }
            Err(e) => {
                discard_swapchain(runtime, swapchain);
                return Err(XrError::ResourceCreation(format!(
                    "swapchain image query failed: {e}"
                )));
            }
        };

        let framebuffer = match graphics.create_framebuffer() {
            Ok(fb) => fb,
            Err(e) => {
                discard_swapchain(runtime, swapchain);
                return Err(match e {
                    XrError::ResourceCreation(_) => e,
                    other => XrError::ResourceCreation(format!("framebuffer: {other}")),
                });
            }
        };

        let targets: Vec<RenderTarget> = images
            .into_iter()
            .map(|image| RenderTarget { image, width, height })
            .collect();

        log::info!(
            "render target pool: {} images of {}x{}, framebuffer {}",
            targets.len(),
            width,
            height,
            framebuffer.0
        );

        Ok(Self {
            swapchain,
            targets,
            framebuffer,
            width,
            height,
            acquired: None,
            waited: false,
        })
    }

    /// Acquires the next writable image and returns its index.
    pub fn acquire<R: XrRuntime + ?Sized>(&mut self, runtime: &mut R) -> Result<u32, XrError> {
        const CALL: &str = "acquire";
        if !self.is_created() {
            return Err(XrError::call_order(CALL, "pool was never created"));
        }
        if let Some(index) = self.acquired {
            return Err(XrError::call_order(CALL, format!("image {index} not yet released")));
        }

        let index = runtime.acquire_swapchain_image(self.swapchain)?;
        self.acquired = Some(index);
        self.waited = false;
        Ok(index)
    }

    /// Blocks until the acquired image may be written. A no-op once the
    /// current acquisition has been waited on.
    pub fn wait<R: XrRuntime + ?Sized>(
        &mut self,
        runtime: &mut R,
        timeout: XrDuration,
    ) -> Result<(), XrError> {
        if self.acquired.is_none() {
            return Err(XrError::call_order("wait", "no image is acquired"));
        }
        if !self.waited {
            runtime.wait_swapchain_image(self.swapchain, timeout)?;
            self.waited = true;
        }
        Ok(())
    }

    /// Hands the waited-on image back to the runtime.
    ///
    /// The acquisition is only forgotten once the runtime accepts the release.
    pub fn release<R: XrRuntime + ?Sized>(&mut self, runtime: &mut R) -> Result<(), XrError> {
        const CALL: &str = "release";
        if self.acquired.is_none() {
            return Err(XrError::call_order(CALL, "no image is acquired"));
        }
        if !self.waited {
            return Err(XrError::call_order(CALL, "the acquired image was never waited on"));
        }
        runtime.release_swapchain_image(self.swapchain)?;
        self.acquired = None;
        self.waited = false;
        Ok(())
    }

    /// Releases the image ring and the framebuffer. Safe to call repeatedly.
    pub fn destroy<R, G>(&mut self, runtime: &mut R, graphics: &mut G)
    where
        R: XrRuntime + ?Sized,
        G: GraphicsBinding + ?Sized,
    {
        if !self.swapchain.is_null() {
            discard_swapchain(runtime, self.swapchain);
        }
        if !self.framebuffer.is_null() {
            graphics.destroy_framebuffer(self.framebuffer);
        }
        if self.is_created() {
            log::debug!("render target pool destroyed");
        }
        *self = Self::default();
    }

    #[inline]
    pub fn target(&self, index: u32) -> Option<&RenderTarget> {
        self.targets.get(index as usize)
    }

    #[inline]
    pub fn acquired_index(&self) -> Option<u32> {
        self.acquired
    }

    /// Whether the acquired image has been waited on and may be drawn.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.acquired.is_some() && self.waited
    }

    #[inline]
    pub fn swapchain(&self) -> SwapchainHandle {
        self.swapchain
    }

    #[inline]
    pub fn framebuffer(&self) -> FramebufferHandle {
        self.framebuffer
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_created(&self) -> bool {
        !self.swapchain.is_null()
    }
}

fn discard_swapchain<R: XrRuntime + ?Sized>(runtime: &mut R, swapchain: SwapchainHandle) {
    if let Err(e) = runtime.destroy_swapchain(swapchain) {
        log::warn!("swapchain teardown: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xr::testing::{Call, CountingGraphics, ScriptedRuntime};

    fn created() -> (ScriptedRuntime, CountingGraphics, RenderTargetPool) {
        let mut rt = ScriptedRuntime::default();
        let mut gfx = CountingGraphics::default();
        let pool = RenderTargetPool::create(&mut rt, &mut gfx, 1024, 768).unwrap();
        (rt, gfx, pool)
    }

    // ── create ────────────────────────────────────────────────────────────

    #[test]
    fn create_wraps_every_image() {
        let (_, gfx, pool) = created();
        assert!(pool.is_created());
        assert_eq!(pool.image_count(), 3);
        assert_eq!((pool.width(), pool.height()), (1024, 768));
        assert!(!pool.framebuffer().is_null());
        assert_eq!(gfx.live_framebuffers(), 1);
        let t = pool.target(2).unwrap();
        assert_eq!(t.image, ImageHandle(102));
        assert_eq!((t.width, t.height), (1024, 768));
    }

    #[test]
    fn zero_images_is_fatal_and_cleans_up() {
        let mut rt = ScriptedRuntime { image_count: 0, ..Default::default() };
        let mut gfx = CountingGraphics::default();
        let err = RenderTargetPool::create(&mut rt, &mut gfx, 64, 64).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(rt.count(Call::DestroySwapchain), 1);
        assert_eq!(gfx.live_framebuffers(), 0);
    }

    #[test]
    fn rejected_swapchain_is_resource_creation() {
        let mut rt = ScriptedRuntime::default().fail("xrCreateSwapchain");
        let mut gfx = CountingGraphics::default();
        let err = RenderTargetPool::create(&mut rt, &mut gfx, 64, 64).unwrap_err();
        assert!(matches!(err, XrError::ResourceCreation(_)));
        assert_eq!(rt.count(Call::DestroySwapchain), 0);
    }

    #[test]
    fn framebuffer_failure_releases_swapchain() {
        let mut rt = ScriptedRuntime::default();
        let mut gfx = CountingGraphics::failing_framebuffer();
        let err = RenderTargetPool::create(&mut rt, &mut gfx, 64, 64).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(rt.count(Call::DestroySwapchain), 1);
    }

    // ── acquire / wait / release ──────────────────────────────────────────

    #[test]
    fn acquire_release_cycle() {
        let (mut rt, _, mut pool) = created();
        let index = pool.acquire(&mut rt).unwrap();
        assert_eq!(pool.acquired_index(), Some(index));
        assert!(!pool.is_writable());
        pool.wait(&mut rt, XrDuration::INFINITE).unwrap();
        assert!(pool.is_writable());
        pool.release(&mut rt).unwrap();
        assert_eq!(pool.acquired_index(), None);
        assert_eq!(rt.frame_calls()[2..], [Call::Acquire, Call::Wait, Call::Release]);
    }

    #[test]
    fn double_acquire_is_refused_locally() {
        let (mut rt, _, mut pool) = created();
        pool.acquire(&mut rt).unwrap();
        assert!(matches!(pool.acquire(&mut rt), Err(XrError::CallOrder { .. })));
        assert_eq!(rt.count(Call::Acquire), 1);
    }

    #[test]
    fn release_without_acquire_is_refused() {
        let (mut rt, _, mut pool) = created();
        assert!(pool.release(&mut rt).is_err());
        assert_eq!(rt.count(Call::Release), 0);
    }

    #[test]
    fn release_without_wait_is_refused_locally() {
        let (mut rt, _, mut pool) = created();
        pool.acquire(&mut rt).unwrap();
        assert!(matches!(pool.release(&mut rt), Err(XrError::CallOrder { .. })));
        assert_eq!(rt.count(Call::Release), 0);
        assert!(pool.acquired_index().is_some());
    }

    #[test]
    fn failed_wait_keeps_acquisition_for_retry() {
        let (rt, _, mut pool) = created();
        let mut rt = rt.fail("xrWaitSwapchainImage");
        let index = pool.acquire(&mut rt).unwrap();
        assert!(pool.wait(&mut rt, XrDuration::INFINITE).is_err());
        assert_eq!(pool.acquired_index(), Some(index));
        assert!(!pool.is_writable());

        rt.failing.clear();
        pool.wait(&mut rt, XrDuration::INFINITE).unwrap();
        pool.release(&mut rt).unwrap();
        assert_eq!(rt.count(Call::Acquire), 1);
        assert_eq!(rt.count(Call::Wait), 2);
        assert_eq!(pool.acquired_index(), None);
    }

    #[test]
    fn second_wait_does_not_reach_runtime() {
        let (mut rt, _, mut pool) = created();
        pool.acquire(&mut rt).unwrap();
        pool.wait(&mut rt, XrDuration::INFINITE).unwrap();
        pool.wait(&mut rt, XrDuration::INFINITE).unwrap();
        assert_eq!(rt.count(Call::Wait), 1);
    }

    #[test]
    fn failed_release_keeps_acquisition() {
        let (rt, _, mut pool) = created();
        let mut rt = rt.fail("xrReleaseSwapchainImage");
        let index = pool.acquire(&mut rt).unwrap();
        pool.wait(&mut rt, XrDuration::INFINITE).unwrap();
        assert!(pool.release(&mut rt).is_err());
        assert_eq!(pool.acquired_index(), Some(index));
        assert!(pool.acquire(&mut rt).is_err());

        rt.failing.clear();
        pool.release(&mut rt).unwrap();
        assert!(pool.acquire(&mut rt).is_ok());
    }

    #[test]
    fn acquire_on_default_pool_fails() {
        let mut rt = ScriptedRuntime::default();
        let mut pool = RenderTargetPool::default();
        assert!(pool.acquire(&mut rt).is_err());
        assert!(rt.calls.is_empty());
    }

    #[test]
    fn target_lookup_out_of_range_is_none() {
        let (_, _, pool) = created();
        assert!(pool.target(3).is_none());
    }

    // ── destroy ───────────────────────────────────────────────────────────

    #[test]
    fn destroy_twice_is_harmless() {
        let (mut rt, mut gfx, mut pool) = created();
        pool.destroy(&mut rt, &mut gfx);
        pool.destroy(&mut rt, &mut gfx);
        assert_eq!(rt.count(Call::DestroySwapchain), 1);
        assert_eq!(gfx.live_framebuffers(), 0);
        assert!(pool.swapchain().is_null());
        assert!(pool.framebuffer().is_null());
        assert_eq!(pool.image_count(), 0);
        assert_eq!((pool.width(), pool.height()), (0, 0));
    }

    #[test]
    fn destroy_never_created_pool_is_noop() {
        let mut rt = ScriptedRuntime::default();
        let mut gfx = CountingGraphics::default();
        let mut pool = RenderTargetPool::default();
        pool.destroy(&mut rt, &mut gfx);
        assert!(rt.calls.is_empty());
        assert!(!pool.is_created());
    }
}
