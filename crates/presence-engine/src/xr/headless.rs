use std::collections::{HashMap, VecDeque};

use super::controller::{ControllerFeed, DeviceSignal};
use super::error::{XrError, XrResult};
use super::graphics::GraphicsBinding;
use super::runtime::XrRuntime;
use super::types::{
    CompositionLayerQuad, EnvironmentBlendMode, FramePose, FrameState, Hand, ImageHandle,
    LocationFlags, RuntimeEvent, SessionState, SpaceLocation, SwapchainCreateInfo,
    SwapchainHandle, ViewConfiguration, XrDuration, XrTime,
};
use crate::time::DisplayClock;

/// Headless runtime configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Simulated display refresh rate.
    pub refresh_hz: f32,

    /// Sleep in `wait_frame` until the next vsync deadline.
    ///
    /// Disable for tests that drive many frames.
    pub paced: bool,

    /// Images allocated per swapchain.
    pub swapchain_image_count: u32,

    /// Maximum composition layers accepted by `end_frame`.
    pub max_layers: usize,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            refresh_hz: 72.0,
            paced: true,
            swapchain_image_count: 3,
            max_layers: 16,
        }
    }
}

impl HeadlessConfig {
    pub fn refresh_hz(mut self, hz: f32) -> Self {
        self.refresh_hz = hz;
        self
    }

    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    pub fn swapchain_image_count(mut self, count: u32) -> Self {
        self.swapchain_image_count = count;
        self
    }

    pub fn max_layers(mut self, max: usize) -> Self {
        self.max_layers = max;
        self
    }
}

/// Counters exposed for diagnostics and tests.
#[derive(Debug, Clone, Default)]
pub struct HeadlessStats {
    pub frames_waited: u64,
    pub frames_begun: u64,
    pub frames_ended: u64,
    pub frames_discarded: u64,
    pub layers_submitted: u64,
    pub images_acquired: u64,
    pub images_released: u64,
    /// Layers passed to the most recent successful `end_frame`.
    pub last_layers: Vec<CompositionLayerQuad>,
}

#[derive(Debug)]
struct HeadlessSwapchain {
    images: Vec<ImageHandle>,
    width: u32,
    height: u32,
    next: usize,
    acquired: Option<u32>,
    waited: bool,
}

#[derive(Debug, Default)]
struct FrameProtocol {
    /// Display time handed out by the last `wait_frame` not yet consumed by a begin.
    waited: Option<XrTime>,
    /// Display time of the frame between begin and end.
    begun: Option<XrTime>,
}

/// Simulated compositor runtime.
///
/// Runs the full session lifecycle and frame protocol without a headset:
/// events are queued the way a real runtime queues them, frame calls are
/// validated for ordering, swapchain images come from the supplied
/// `GraphicsBinding`, and controller input is read from a `ControllerFeed`.
pub struct HeadlessRuntime<G: GraphicsBinding> {
    config: HeadlessConfig,
    graphics: G,
    controllers: ControllerFeed,
    clock: DisplayClock,

    events: VecDeque<RuntimeEvent>,
    state: SessionState,
    running: bool,
    exit_requested: bool,
    lost: bool,

    frame: FrameProtocol,

    swapchains: HashMap<SwapchainHandle, HeadlessSwapchain>,
    next_swapchain: u64,

    actions_attached: bool,
    actions_synced: bool,

    stalled_waits: u32,

    stats: HeadlessStats,
}

impl<G: GraphicsBinding> HeadlessRuntime<G> {
    pub fn new(config: HeadlessConfig, graphics: G, controllers: ControllerFeed) -> Self {
        let clock = DisplayClock::with_pacing(config.refresh_hz, config.paced);
        log::info!(
            "headless runtime: {:.0} Hz, {} images per swapchain{}",
            config.refresh_hz,
            config.swapchain_image_count,
            if config.paced { "" } else { ", unpaced" }
        );

        let mut rt = Self {
            config,
            graphics,
            controllers,
            clock,
            events: VecDeque::new(),
            state: SessionState::Idle,
            running: false,
            exit_requested: false,
            lost: false,
            frame: FrameProtocol::default(),
            swapchains: HashMap::new(),
            next_swapchain: 1,
            actions_attached: false,
            actions_synced: false,
            stalled_waits: 0,
            stats: HeadlessStats::default(),
        };

        // A fresh session reports Idle, then Ready once the "display" is up.
        rt.enter(SessionState::Idle);
        rt.enter(SessionState::Ready);
        rt
    }

    /// Runtime-side session state (the last state queued).
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stats(&self) -> &HeadlessStats {
        &self.stats
    }

    pub fn graphics(&self) -> &G {
        &self.graphics
    }

    pub fn graphics_mut(&mut self) -> &mut G {
        &mut self.graphics
    }

    pub fn controllers(&self) -> &ControllerFeed {
        &self.controllers
    }

    /// Asks the session to wind down: queues `Stopping` if running.
    pub fn request_exit(&mut self) {
        if !self.running || self.exit_requested || self.lost {
            return;
        }
        log::info!("headless runtime: exit requested");
        self.exit_requested = true;
        self.enter(SessionState::Stopping);
    }

    /// Simulates the runtime disappearing.
    pub fn lose_instance(&mut self) {
        if self.lost {
            return;
        }
        log::warn!("headless runtime: instance loss pending");
        self.lost = true;
        self.events.push_back(RuntimeEvent::InstanceLossPending);
    }

    /// Makes the next `count` image waits time out, as if the compositor
    /// were still reading the image. The image stays acquired.
    pub fn stall_image_waits(&mut self, count: u32) {
        self.stalled_waits = count;
    }

    fn enter(&mut self, state: SessionState) {
        log::debug!("headless runtime: {} -> {}", self.state.as_str(), state.as_str());
        self.state = state;
        self.events.push_back(RuntimeEvent::SessionStateChanged(state));
    }

    fn check_alive(&self, call: &'static str) -> Result<(), XrError> {
        if self.lost {
            return Err(XrError::runtime(call, XrResult::InstanceLost));
        }
        Ok(())
    }

    fn check_running(&self, call: &'static str) -> Result<(), XrError> {
        self.check_alive(call)?;
        if !self.running {
            return Err(XrError::SessionNotRunning);
        }
        Ok(())
    }

    fn swapchain_mut(
        &mut self,
        call: &'static str,
        handle: SwapchainHandle,
    ) -> Result<&mut HeadlessSwapchain, XrError> {
        self.swapchains
            .get_mut(&handle)
            .ok_or(XrError::runtime(call, XrResult::HandleInvalid))
    }

    fn validate_layer(&self, layer: &CompositionLayerQuad) -> Result<(), XrError> {
        const CALL: &str = "xrEndFrame";
        let Some(sc) = self.swapchains.get(&layer.swapchain) else {
            return Err(XrError::runtime(CALL, XrResult::HandleInvalid));
        };
        let r = layer.image_rect;
        let inside = r.x >= 0
            && r.y >= 0
            && r.width > 0
            && r.height > 0
            && (r.x + r.width) as u32 <= sc.width
            && (r.y + r.height) as u32 <= sc.height;
        if !inside {
            return Err(XrError::runtime(CALL, XrResult::SwapchainRectInvalid));
        }
        if sc.acquired.is_some() {
            return Err(XrError::call_order(CALL, "layer swapchain image is still acquired"));
        }
        if !(layer.size.0 > 0.0 && layer.size.1 > 0.0) {
            return Err(XrError::runtime(CALL, XrResult::ValidationFailure));
        }
        Ok(())
    }
}

impl<G: GraphicsBinding> XrRuntime for HeadlessRuntime<G> {
    fn poll_event(&mut self) -> Result<Option<RuntimeEvent>, XrError> {
        for signal in self.controllers.take_signals() {
            match signal {
                DeviceSignal::RequestExit => self.request_exit(),
                DeviceSignal::LoseInstance => self.lose_instance(),
            }
        }
        Ok(self.events.pop_front())
    }

    fn begin_session(&mut self, view: ViewConfiguration) -> Result<(), XrError> {
        const CALL: &str = "xrBeginSession";
        self.check_alive(CALL)?;
        if self.running {
            return Err(XrError::runtime(CALL, XrResult::SessionRunning));
        }
        if self.state != SessionState::Ready {
            return Err(XrError::runtime(CALL, XrResult::SessionNotReady));
        }

        log::debug!("headless runtime: session begun ({view:?})");
        self.running = true;
        self.frame = FrameProtocol::default();
        self.enter(SessionState::Synchronized);
        self.enter(SessionState::Visible);
        self.enter(SessionState::Focused);
        Ok(())
    }

    fn end_session(&mut self) -> Result<(), XrError> {
        const CALL: &str = "xrEndSession";
        self.check_alive(CALL)?;
        if !self.running {
            return Err(XrError::SessionNotRunning);
        }
        if self.state != SessionState::Stopping {
            return Err(XrError::runtime(CALL, XrResult::SessionNotStopping));
        }

        self.running = false;
        self.frame = FrameProtocol::default();
        self.enter(SessionState::Idle);
        self.enter(SessionState::Exiting);
        Ok(())
    }

    fn wait_frame(&mut self) -> Result<FrameState, XrError> {
        self.check_running("xrWaitFrame")?;

        let tick = self.clock.wait_next();
        self.frame.waited = Some(tick.predicted_display_time);
        self.stats.frames_waited += 1;

        Ok(FrameState {
            predicted_display_time: tick.predicted_display_time,
            predicted_display_period: tick.period,
            should_render: matches!(self.state, SessionState::Visible | SessionState::Focused),
        })
    }

    fn begin_frame(&mut self) -> Result<(), XrError> {
        const CALL: &str = "xrBeginFrame";
        self.check_running(CALL)?;

        let Some(time) = self.frame.waited.take() else {
            return Err(XrError::call_order(CALL, "no xrWaitFrame since the last begin"));
        };

        if self.frame.begun.is_some() {
            // The previous frame never ended; the runtime discards it.
            log::debug!("headless runtime: discarding unfinished frame");
            self.stats.frames_discarded += 1;
        }

        self.frame.begun = Some(time);
        self.stats.frames_begun += 1;
        Ok(())
    }

    fn end_frame(
        &mut self,
        display_time: XrTime,
        blend_mode: EnvironmentBlendMode,
        layers: &[CompositionLayerQuad],
    ) -> Result<(), XrError> {
        const CALL: &str = "xrEndFrame";
        self.check_running(CALL)?;

        let Some(begun) = self.frame.begun else {
            return Err(XrError::call_order(CALL, "no frame in progress"));
        };
        if display_time != begun {
            return Err(XrError::call_order(
                CALL,
                format!(
                    "display time {} does not match the waited frame {}",
                    display_time.as_nanos(),
                    begun.as_nanos()
                ),
            ));
        }
        if blend_mode != EnvironmentBlendMode::Opaque {
            return Err(XrError::runtime(CALL, XrResult::EnvironmentBlendModeUnsupported));
        }
        if layers.len() > self.config.max_layers {
            return Err(XrError::runtime(CALL, XrResult::LayerLimitExceeded));
        }
        for layer in layers {
            self.validate_layer(layer)?;
        }

        self.frame.begun = None;
        self.stats.frames_ended += 1;
        self.stats.layers_submitted += layers.len() as u64;
        self.stats.last_layers = layers.to_vec();
        log::trace!(
            "headless runtime: frame {} ended with {} layer(s)",
            self.stats.frames_ended,
            layers.len()
        );
        Ok(())
    }

    fn create_swapchain(&mut self, info: &SwapchainCreateInfo) -> Result<SwapchainHandle, XrError> {
        self.check_alive("xrCreateSwapchain")?;

        let max = self.graphics.max_image_dimension();
        if info.width == 0 || info.height == 0 || info.width > max || info.height > max {
            return Err(XrError::ResourceCreation(format!(
                "swapchain {}x{} outside supported range 1..={max}",
                info.width, info.height
            )));
        }

        let mut images = Vec::with_capacity(self.config.swapchain_image_count as usize);
        for _ in 0..self.config.swapchain_image_count {
            match self.graphics.create_image(info) {
                Ok(image) => images.push(image),
                Err(e) => {
                    for image in images {
                        self.graphics.destroy_image(image);
                    }
                    return Err(e);
                }
            }
        }

        let handle = SwapchainHandle(self.next_swapchain);
        self.next_swapchain += 1;
        self.swapchains.insert(
            handle,
            HeadlessSwapchain {
                images,
                width: info.width,
                height: info.height,
                next: 0,
                acquired: None,
                waited: false,
            },
        );
        Ok(handle)
    }

    fn enumerate_swapchain_images(
        &mut self,
        swapchain: SwapchainHandle,
    ) -> Result<Vec<ImageHandle>, XrError> {
        let sc = self.swapchain_mut("xrEnumerateSwapchainImages", swapchain)?;
        Ok(sc.images.clone())
    }

    fn acquire_swapchain_image(&mut self, swapchain: SwapchainHandle) -> Result<u32, XrError> {
        const CALL: &str = "xrAcquireSwapchainImage";
        self.check_alive(CALL)?;
        let sc = self.swapchain_mut(CALL, swapchain)?;

        if let Some(index) = sc.acquired {
            return Err(XrError::call_order(CALL, format!("image {index} is already acquired")));
        }
        if sc.images.is_empty() {
            return Err(XrError::runtime(CALL, XrResult::RuntimeFailure));
        }

        let index = sc.next as u32;
        sc.next = (sc.next + 1) % sc.images.len();
        sc.acquired = Some(index);
        sc.waited = false;
        self.stats.images_acquired += 1;
        Ok(index)
    }

    fn wait_swapchain_image(
        &mut self,
        swapchain: SwapchainHandle,
        _timeout: XrDuration,
    ) -> Result<(), XrError> {
        const CALL: &str = "xrWaitSwapchainImage";
        self.check_alive(CALL)?;
        if self.swapchain_mut(CALL, swapchain)?.acquired.is_none() {
            return Err(XrError::call_order(CALL, "no image is acquired"));
        }
        if self.stalled_waits > 0 {
            self.stalled_waits -= 1;
            return Err(XrError::runtime(CALL, XrResult::TimeoutExpired));
        }
        // Simulated images are otherwise never in use by a compositor, so they are ready at once.
        self.swapchain_mut(CALL, swapchain)?.waited = true;
        Ok(())
    }

    fn release_swapchain_image(&mut self, swapchain: SwapchainHandle) -> Result<(), XrError> {
        const CALL: &str = "xrReleaseSwapchainImage";
        self.check_alive(CALL)?;
        let sc = self.swapchain_mut(CALL, swapchain)?;

        if sc.acquired.is_none() {
            return Err(XrError::call_order(CALL, "no image is acquired"));
        }
        if !sc.waited {
            return Err(XrError::call_order(CALL, "the acquired image was never waited on"));
        }

        sc.acquired = None;
        sc.waited = false;
        self.stats.images_released += 1;
        Ok(())
    }

    fn destroy_swapchain(&mut self, swapchain: SwapchainHandle) -> Result<(), XrError> {
        let Some(sc) = self.swapchains.remove(&swapchain) else {
            return Err(XrError::runtime("xrDestroySwapchain", XrResult::HandleInvalid));
        };
        for image in sc.images {
            self.graphics.destroy_image(image);
        }
        Ok(())
    }

    fn attach_action_sets(&mut self) -> Result<(), XrError> {
        self.check_alive("xrAttachSessionActionSets")?;
        if self.actions_attached {
            return Err(XrError::AlreadyAttached);
        }
        self.actions_attached = true;
        Ok(())
    }

    fn sync_actions(&mut self) -> Result<(), XrError> {
        const CALL: &str = "xrSyncActions";
        self.check_running(CALL)?;
        if !self.actions_attached {
            return Err(XrError::runtime(CALL, XrResult::ActionSetNotAttached));
        }
        self.actions_synced = true;
        Ok(())
    }

    fn trigger_value(&mut self, hand: Hand) -> Result<f32, XrError> {
        const CALL: &str = "xrGetActionStateFloat";
        self.check_alive(CALL)?;
        if !self.actions_attached {
            return Err(XrError::runtime(CALL, XrResult::ActionSetNotAttached));
        }
        if !self.actions_synced {
            return Err(XrError::call_order(CALL, "actions were never synced"));
        }
        Ok(self.controllers.state(hand).trigger)
    }

    fn locate_aim(&mut self, hand: Hand, time: XrTime) -> Result<SpaceLocation, XrError> {
        const CALL: &str = "xrLocateSpace";
        self.check_alive(CALL)?;
        if time.as_nanos() <= 0 {
            return Err(XrError::runtime(CALL, XrResult::TimeInvalid));
        }
        if !self.actions_attached {
            return Err(XrError::runtime(CALL, XrResult::ActionSetNotAttached));
        }

        let state = self.controllers.state(hand);
        if !state.tracked {
            return Ok(SpaceLocation {
                flags: LocationFlags::default(),
                pose: FramePose::IDENTITY,
            });
        }
        Ok(SpaceLocation {
            flags: LocationFlags::TRACKED,
            pose: state.aim,
        })
    }
}
