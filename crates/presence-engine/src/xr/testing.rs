use std::collections::HashSet;

use super::error::XrError;
use super::graphics::GraphicsBinding;
use super::types::{FramebufferHandle, ImageHandle, SwapchainCreateInfo};

/// Graphics binding that only hands out and tracks handles.
#[derive(Debug, Default)]
pub(crate) struct CountingGraphics {
    next: u64,
    images: HashSet<ImageHandle>,
    framebuffers: HashSet<FramebufferHandle>,
    /// Fail image creation once this many images are live.
    pub fail_image_after: Option<usize>,
    pub fail_framebuffer: bool,
}

impl CountingGraphics {
    pub fn failing_framebuffer() -> Self {
        Self {
            fail_framebuffer: true,
            ..Self::default()
        }
    }

    pub fn live_images(&self) -> usize {
        self.images.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.framebuffers.len()
    }
}

impl GraphicsBinding for CountingGraphics {
    fn create_image(&mut self, _info: &SwapchainCreateInfo) -> Result<ImageHandle, XrError> {
        if self.fail_image_after.is_some_and(|n| self.images.len() >= n) {
            return Err(XrError::ResourceCreation("out of image memory".into()));
        }
        self.next += 1;
        let image = ImageHandle(self.next);
        self.images.insert(image);
        Ok(image)
    }

    fn destroy_image(&mut self, image: ImageHandle) {
        self.images.remove(&image);
    }

    fn create_framebuffer(&mut self) -> Result<FramebufferHandle, XrError> {
        if self.fail_framebuffer {
            return Err(XrError::ResourceCreation("framebuffer allocation failed".into()));
        }
        self.next += 1;
        let fb = FramebufferHandle(self.next as u32);
        self.framebuffers.insert(fb);
        Ok(fb)
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.framebuffers.remove(&framebuffer);
    }

    fn max_image_dimension(&self) -> u32 {
        8192
    }
}

// ── scripted runtime ──────────────────────────────────────────────────────

use std::collections::VecDeque;

use super::runtime::XrRuntime;
use super::types::{
    CompositionLayerQuad, EnvironmentBlendMode, FramePose, FrameState, Hand, LocationFlags,
    RuntimeEvent, SpaceLocation, SwapchainHandle, ViewConfiguration, XrDuration, XrTime,
};
use super::XrResult;

/// Calls observed by `ScriptedRuntime`, in order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Call {
    PollEvent,
    BeginSession,
    EndSession,
    WaitFrame,
    BeginFrame,
    EndFrame { layers: usize },
    CreateSwapchain,
    EnumerateImages,
    Acquire,
    Wait,
    Release,
    DestroySwapchain,
    Attach,
    Sync,
    Trigger,
    LocateAim,
}

/// Runtime double that replays scripted answers and records every call.
///
/// Calls listed in `failing` (by runtime function name) return
/// `XR_ERROR_RUNTIME_FAILURE`.
#[derive(Debug)]
pub(crate) struct ScriptedRuntime {
    pub calls: Vec<Call>,
    pub events: VecDeque<RuntimeEvent>,
    pub failing: HashSet<&'static str>,
    pub image_count: usize,
    /// Trigger values handed out one per query; the last one repeats.
    pub triggers: VecDeque<f32>,
    pub aim: SpaceLocation,
    pub should_render: bool,
    pub end_frame_times: Vec<XrTime>,
    pub last_layers: Vec<CompositionLayerQuad>,
    pub frame: i64,
    pub next_image: u32,
}

impl Default for ScriptedRuntime {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            events: VecDeque::new(),
            failing: HashSet::new(),
            image_count: 3,
            triggers: VecDeque::new(),
            aim: SpaceLocation {
                flags: LocationFlags::TRACKED,
                pose: FramePose::new(glam::Vec3::new(0.0, 0.0, 1.0), glam::Quat::IDENTITY),
            },
            should_render: true,
            end_frame_times: Vec::new(),
            last_layers: Vec::new(),
            frame: 0,
            next_image: 0,
        }
    }
}

impl ScriptedRuntime {
    pub fn fail(mut self, call: &'static str) -> Self {
        self.failing.insert(call);
        self
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn count_end_frames(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::EndFrame { .. })).count()
    }

    /// Calls with event polling filtered out.
    pub fn frame_calls(&self) -> Vec<Call> {
        self.calls.iter().copied().filter(|c| *c != Call::PollEvent).collect()
    }

    fn enter(&mut self, call: Call, name: &'static str) -> Result<(), XrError> {
        self.calls.push(call);
        if self.failing.contains(name) {
            return Err(XrError::runtime(name, XrResult::RuntimeFailure));
        }
        Ok(())
    }
}

impl XrRuntime for ScriptedRuntime {
    fn poll_event(&mut self) -> Result<Option<RuntimeEvent>, XrError> {
        self.enter(Call::PollEvent, "xrPollEvent")?;
        Ok(self.events.pop_front())
    }

    fn begin_session(&mut self, _view: ViewConfiguration) -> Result<(), XrError> {
        self.enter(Call::BeginSession, "xrBeginSession")
    }

    fn end_session(&mut self) -> Result<(), XrError> {
        self.enter(Call::EndSession, "xrEndSession")
    }

    fn wait_frame(&mut self) -> Result<FrameState, XrError> {
        self.enter(Call::WaitFrame, "xrWaitFrame")?;
        self.frame += 1;
        Ok(FrameState {
            predicted_display_time: XrTime::from_nanos(self.frame * 1_000),
            predicted_display_period: XrDuration::from_nanos(1_000),
            should_render: self.should_render,
        })
    }

    fn begin_frame(&mut self) -> Result<(), XrError> {
        self.enter(Call::BeginFrame, "xrBeginFrame")
    }

    fn end_frame(
        &mut self,
        display_time: XrTime,
        _blend_mode: EnvironmentBlendMode,
        layers: &[CompositionLayerQuad],
    ) -> Result<(), XrError> {
        self.enter(Call::EndFrame { layers: layers.len() }, "xrEndFrame")?;
        self.end_frame_times.push(display_time);
        self.last_layers = layers.to_vec();
        Ok(())
    }

    fn create_swapchain(
        &mut self,
        _info: &super::types::SwapchainCreateInfo,
    ) -> Result<SwapchainHandle, XrError> {
        self.enter(Call::CreateSwapchain, "xrCreateSwapchain")?;
        Ok(SwapchainHandle(7))
    }

    fn enumerate_swapchain_images(
        &mut self,
        _swapchain: SwapchainHandle,
    ) -> Result<Vec<ImageHandle>, XrError> {
        self.enter(Call::EnumerateImages, "xrEnumerateSwapchainImages")?;
        Ok((0..self.image_count as u64).map(|i| ImageHandle(100 + i)).collect())
    }

    fn acquire_swapchain_image(&mut self, _swapchain: SwapchainHandle) -> Result<u32, XrError> {
        self.enter(Call::Acquire, "xrAcquireSwapchainImage")?;
        let index = self.next_image;
        self.next_image = (self.next_image + 1) % self.image_count.max(1) as u32;
        Ok(index)
    }

    fn wait_swapchain_image(
        &mut self,
        _swapchain: SwapchainHandle,
        _timeout: XrDuration,
    ) -> Result<(), XrError> {
        self.enter(Call::Wait, "xrWaitSwapchainImage")
    }

    fn release_swapchain_image(&mut self, _swapchain: SwapchainHandle) -> Result<(), XrError> {
        self.enter(Call::Release, "xrReleaseSwapchainImage")
    }

    fn destroy_swapchain(&mut self, _swapchain: SwapchainHandle) -> Result<(), XrError> {
        self.enter(Call::DestroySwapchain, "xrDestroySwapchain")
    }

    fn attach_action_sets(&mut self) -> Result<(), XrError> {
        self.enter(Call::Attach, "xrAttachSessionActionSets")
    }

    fn sync_actions(&mut self) -> Result<(), XrError> {
        self.enter(Call::Sync, "xrSyncActions")
    }

    fn trigger_value(&mut self, _hand: Hand) -> Result<f32, XrError> {
        self.enter(Call::Trigger, "xrGetActionStateFloat")?;
        let value = if self.triggers.len() > 1 {
            self.triggers.pop_front().unwrap_or(0.0)
        } else {
            self.triggers.front().copied().unwrap_or(0.0)
        };
        Ok(value)
    }

    fn locate_aim(&mut self, _hand: Hand, _time: XrTime) -> Result<SpaceLocation, XrError> {
        self.enter(Call::LocateAim, "xrLocateSpace")?;
        Ok(self.aim)
    }
}
