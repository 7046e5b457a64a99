use super::error::XrError;
use super::types::{
    CompositionLayerQuad, EnvironmentBlendMode, FrameState, Hand, ImageHandle, RuntimeEvent,
    SpaceLocation, SwapchainCreateInfo, SwapchainHandle, ViewConfiguration, XrDuration, XrTime,
};

/// The compositor runtime as seen by the session.
///
/// Instance/system creation, graphics binding and action-set definition happen
/// before a value of this type exists; what remains is the per-session call
/// surface. Every call is fallible and returns the runtime's verdict unchanged.
///
/// Frame protocol (enforced by the runtime, honoured by `FrameLoop`):
/// `wait_frame` → `begin_frame` → `end_frame`, strictly alternating.
pub trait XrRuntime {
    // ── events + session lifecycle ────────────────────────────────────────

    /// Pops the next queued event, or `None` when the queue is empty.
    fn poll_event(&mut self) -> Result<Option<RuntimeEvent>, XrError>;

    fn begin_session(&mut self, view: ViewConfiguration) -> Result<(), XrError>;

    fn end_session(&mut self) -> Result<(), XrError>;

    // ── frame timing ──────────────────────────────────────────────────────

    /// Blocks until the runtime wants the next frame.
    fn wait_frame(&mut self) -> Result<FrameState, XrError>;

    fn begin_frame(&mut self) -> Result<(), XrError>;

    fn end_frame(
        &mut self,
        display_time: XrTime,
        blend_mode: EnvironmentBlendMode,
        layers: &[CompositionLayerQuad],
    ) -> Result<(), XrError>;

    // ── swapchains ────────────────────────────────────────────────────────

    fn create_swapchain(&mut self, info: &SwapchainCreateInfo) -> Result<SwapchainHandle, XrError>;

    fn enumerate_swapchain_images(
        &mut self,
        swapchain: SwapchainHandle,
    ) -> Result<Vec<ImageHandle>, XrError>;

    fn acquire_swapchain_image(&mut self, swapchain: SwapchainHandle) -> Result<u32, XrError>;

    fn wait_swapchain_image(
        &mut self,
        swapchain: SwapchainHandle,
        timeout: XrDuration,
    ) -> Result<(), XrError>;

    fn release_swapchain_image(&mut self, swapchain: SwapchainHandle) -> Result<(), XrError>;

    fn destroy_swapchain(&mut self, swapchain: SwapchainHandle) -> Result<(), XrError>;

    // ── actions ───────────────────────────────────────────────────────────

    /// Attaches the application's action set to the session. Allowed once.
    fn attach_action_sets(&mut self) -> Result<(), XrError>;

    /// Submits the active action set for this frame.
    fn sync_actions(&mut self) -> Result<(), XrError>;

    /// Current analog trigger value in `[0, 1]`.
    fn trigger_value(&mut self, hand: Hand) -> Result<f32, XrError>;

    /// Locates the aim pose of `hand` in the reference space at `time`.
    fn locate_aim(&mut self, hand: Hand, time: XrTime) -> Result<SpaceLocation, XrError>;
}
