use crate::input::{AimSample, InputSampler};
use crate::pointer::{self, PanelGeometry, PointerSample, PointerState, ProjectorParams};
use crate::swapchain::RenderTargetPool;
use crate::xr::{GraphicsBinding, Hand, RuntimeEvent, XrDuration, XrError, XrRuntime, XrTime};

use super::machine::{SessionMachine, SessionPhase, Transition};

/// Session-wide configuration. Fixed once the session is created.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SessionConfig {
    pub geometry: PanelGeometry,
    pub projector: ProjectorParams,
    /// Hand whose trigger and aim drive the pointer.
    pub hand: Hand,
    pub trigger_threshold: f32,
    /// Timeout for the per-frame image wait.
    pub image_wait_timeout: XrDuration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            geometry: PanelGeometry::default(),
            projector: ProjectorParams::default(),
            hand: Hand::Right,
            trigger_threshold: 0.5,
            image_wait_timeout: XrDuration::INFINITE,
        }
    }
}

impl SessionConfig {
    pub fn geometry(mut self, geometry: PanelGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn projector(mut self, params: ProjectorParams) -> Self {
        self.projector = params;
        self
    }

    pub fn hand(mut self, hand: Hand) -> Self {
        self.hand = hand;
        self
    }

    pub fn trigger_threshold(mut self, threshold: f32) -> Self {
        self.trigger_threshold = threshold;
        self
    }

    pub fn image_wait_timeout(mut self, timeout: XrDuration) -> Self {
        self.image_wait_timeout = timeout;
        self
    }
}

/// One compositor session and everything it owns.
///
/// The frame loop borrows it mutably for each iteration; nothing else writes
/// to the pool, the machine, or the pointer.
pub struct Session<R: XrRuntime, G: GraphicsBinding> {
    pub(crate) runtime: R,
    pub(crate) graphics: G,
    pub(crate) machine: SessionMachine,
    pub(crate) pool: RenderTargetPool,
    pub(crate) input: InputSampler,
    pub(crate) pointer: PointerState,
    pub(crate) config: SessionConfig,
}

impl<R: XrRuntime, G: GraphicsBinding> Session<R, G> {
    /// Creates the render target pool at the panel resolution.
    ///
    /// Fails only with `XrError::ResourceCreation`.
    pub fn create(mut runtime: R, mut graphics: G, config: SessionConfig) -> Result<Self, XrError> {
        let geometry = &config.geometry;
        let pool = RenderTargetPool::create(
            &mut runtime,
            &mut graphics,
            geometry.pixel_width,
            geometry.pixel_height,
        )?;

        log::info!(
            "session created: panel {:.2}m x {:.2}m at z {:.2}, {} hand",
            geometry.width_m,
            geometry.height_m,
            geometry.plane_z(),
            config.hand.as_str()
        );

        Ok(Self {
            runtime,
            graphics,
            machine: SessionMachine::new(),
            pool,
            input: InputSampler::new(config.trigger_threshold),
            pointer: PointerState::default(),
            config,
        })
    }

    /// Feeds one runtime event through the state machine.
    pub fn handle_event(&mut self, event: &RuntimeEvent) -> Transition {
        self.machine.handle(event, &mut self.runtime, &mut self.input)
    }

    /// Polls and applies runtime events until the queue is empty or the
    /// session turns terminal.
    pub fn drain_events(&mut self) -> Vec<Transition> {
        let mut transitions = Vec::new();
        while !self.machine.is_terminal() {
            match self.runtime.poll_event() {
                Ok(Some(event)) => transitions.push(self.handle_event(&event)),
                Ok(None) => break,
                Err(e) => {
                    log::error!("poll event: {e}");
                    break;
                }
            }
        }
        transitions
    }

    /// Samples input for the frame displayed at `time` and updates the
    /// pointer.
    pub(crate) fn sample_pointer(&mut self, time: XrTime) -> PointerState {
        let hand = self.config.hand;

        // The sampler logs failures; queries still run and read as released.
        let _ = self.input.sync(&mut self.runtime);

        let trigger = self.input.poll_trigger(&mut self.runtime, hand);
        let hit = match self.input.poll_aim_pose(&mut self.runtime, hand, time) {
            AimSample::Tracked(pose) => {
                pointer::project(&pose, &self.config.geometry, &self.config.projector)
            }
            AimSample::Unavailable => None,
        };

        self.pointer.apply(PointerSample {
            hit,
            pressed: trigger.pressed,
            just_pressed: trigger.just_pressed,
        });
        log::trace!(
            "pointer ({:.1}, {:.1}) pressed={} hit={}",
            self.pointer.x,
            self.pointer.y,
            self.pointer.pressed,
            hit.is_some()
        );
        self.pointer
    }

    /// Releases the render target pool. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.pool.destroy(&mut self.runtime, &mut self.graphics);
    }

    #[inline]
    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    #[inline]
    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    #[inline]
    pub fn pool(&self) -> &RenderTargetPool {
        &self.pool
    }

    #[inline]
    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    #[inline]
    pub fn input(&self) -> &InputSampler {
        &self.input
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    #[inline]
    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    #[inline]
    pub fn graphics(&self) -> &G {
        &self.graphics
    }
}

impl<R: XrRuntime, G: GraphicsBinding> Drop for Session<R, G> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
