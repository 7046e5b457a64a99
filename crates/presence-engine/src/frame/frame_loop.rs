use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::pointer::{PanelGeometry, PointerState};
use crate::session::Session;
use crate::swapchain::RenderTargetPool;
use crate::xr::{
    CompositionLayerQuad, EnvironmentBlendMode, EyeVisibility, GraphicsBinding, ImageRect,
    XrRuntime,
};

use super::delegate::{AppControl, PlatformEvents, RenderDelegate};
use super::timing::FrameTiming;

/// Why `FrameLoop::run` returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExitReason {
    /// The platform asked to quit.
    PlatformExit,
    /// The session reached its terminal phase.
    Terminal,
    /// `StopHandle::stop` was called.
    Stopped,
}

/// What a single `FrameLoop::iterate` did.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// The platform asked to quit; nothing else ran.
    Exit,
    /// The session is terminal; no frame was started.
    Terminal,
    /// The session is not active; no frame was started.
    Idle,
    /// `wait_frame` or `begin_frame` failed; no frame was submitted.
    Skipped,
    /// A frame was begun and ended with this many layers.
    Submitted { layers: usize },
}

/// Cloneable handle that stops a running `FrameLoop` before its next
/// iteration.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one session through the per-frame protocol.
#[derive(Debug)]
pub struct FrameLoop {
    running: Arc<AtomicBool>,
    timing: FrameTiming,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::with_timing(FrameTiming::default())
    }

    pub fn with_timing(timing: FrameTiming) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            timing,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.running.clone())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    #[inline]
    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    /// Iterates until the platform exits, the session turns terminal, or the
    /// loop is stopped.
    pub fn run<R, G, P, D>(
        &mut self,
        session: &mut Session<R, G>,
        platform: &mut P,
        delegate: &mut D,
    ) -> ExitReason
    where
        R: XrRuntime,
        G: GraphicsBinding,
        P: PlatformEvents + ?Sized,
        D: RenderDelegate + ?Sized,
    {
        log::info!("frame loop started");
        let reason = loop {
            if !self.is_running() {
                break ExitReason::Stopped;
            }
            match self.iterate(session, platform, delegate) {
                FrameOutcome::Exit => break ExitReason::PlatformExit,
                FrameOutcome::Terminal => break ExitReason::Terminal,
                _ => {}
            }
        };
        log::info!(
            "frame loop finished ({reason:?}) after {} frames",
            self.timing.total_frames()
        );
        reason
    }

    /// Runs one loop iteration.
    ///
    /// Every successful `begin_frame` is matched by exactly one `end_frame`,
    /// and every successful acquire by exactly one release.
    pub fn iterate<R, G, P, D>(
        &mut self,
        session: &mut Session<R, G>,
        platform: &mut P,
        delegate: &mut D,
    ) -> FrameOutcome
    where
        R: XrRuntime,
        G: GraphicsBinding,
        P: PlatformEvents + ?Sized,
        D: RenderDelegate + ?Sized,
    {
        if session.machine.is_terminal() {
            self.stop();
            return FrameOutcome::Terminal;
        }

        let block = !session.machine.is_active() && platform.is_backgrounded();
        if platform.pump(block) == AppControl::Exit {
            log::info!("platform requested exit");
            self.stop();
            return FrameOutcome::Exit;
        }

        for transition in session.drain_events() {
            delegate.on_transition(&transition);
        }

        if session.machine.is_terminal() {
            self.stop();
            return FrameOutcome::Terminal;
        }
        if !session.machine.is_active() {
            return FrameOutcome::Idle;
        }

        let started = Instant::now();
        let frame = match session.runtime.wait_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("wait frame: {e}");
                return FrameOutcome::Skipped;
            }
        };
        let waited = started.elapsed();

        if let Err(e) = session.runtime.begin_frame() {
            log::error!("begin frame: {e}");
            return FrameOutcome::Skipped;
        }

        let render_started = Instant::now();
        let pointer = session.sample_pointer(frame.predicted_display_time);
        let rendered = render_panel(session, delegate, &pointer);
        let rendered_in = render_started.elapsed();

        let layer;
        let layers: &[CompositionLayerQuad] = if frame.should_render && rendered {
            layer = panel_layer(&session.config.geometry, &session.pool);
            std::slice::from_ref(&layer)
        } else {
            &[]
        };

        let submit_started = Instant::now();
        if let Err(e) = session.runtime.end_frame(
            frame.predicted_display_time,
            EnvironmentBlendMode::Opaque,
            layers,
        ) {
            log::error!("end frame: {e}");
        }
        let submitted_in = submit_started.elapsed();

        let budget = Duration::from_nanos(frame.predicted_display_period.0.max(0) as u64);
        self.timing.record(waited, rendered_in, submitted_in, budget);
        log::trace!(
            "frame at {} ns: {} layer(s), should_render={}",
            frame.predicted_display_time.as_nanos(),
            layers.len(),
            frame.should_render
        );

        FrameOutcome::Submitted { layers: layers.len() }
    }
}

/// Acquire → wait → render → release. Returns whether the image was drawn.
///
/// An image whose wait failed stays acquired and is waited on again next
/// frame instead of acquiring another one.
fn render_panel<R, G, D>(session: &mut Session<R, G>, delegate: &mut D, pointer: &PointerState) -> bool
where
    R: XrRuntime,
    G: GraphicsBinding,
    D: RenderDelegate + ?Sized,
{
    let runtime = &mut session.runtime;
    let pool = &mut session.pool;

    let index = match pool.acquired_index() {
        Some(index) => {
            log::debug!("resuming image {index} held from an earlier frame");
            index
        }
        None => match pool.acquire(runtime) {
            Ok(index) => index,
            Err(e) => {
                log::error!("acquire image: {e}");
                return false;
            }
        },
    };

    if let Err(e) = pool.wait(runtime, session.config.image_wait_timeout) {
        log::error!("wait image: {e}");
        return false;
    }

    let rendered = match pool.target(index).copied() {
        Some(target) => {
            delegate.render(&target, pool.framebuffer(), pointer);
            true
        }
        None => {
            log::error!("runtime handed out image {index} outside the pool");
            false
        }
    };

    if let Err(e) = pool.release(runtime) {
        log::error!("release image: {e}");
        return false;
    }
    rendered
}

/// The single quad layer showing the panel.
pub fn panel_layer(geometry: &PanelGeometry, pool: &RenderTargetPool) -> CompositionLayerQuad {
    CompositionLayerQuad {
        swapchain: pool.swapchain(),
        image_rect: ImageRect::full(pool.width(), pool.height()),
        image_array_index: 0,
        eye_visibility: EyeVisibility::Both,
        blend_source_alpha: true,
        pose: geometry.pose,
        size: (geometry.width_m, geometry.height_m),
    }
}
