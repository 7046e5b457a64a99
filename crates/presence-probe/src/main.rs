//! Desktop probe for the presence panel.
//!
//! Runs a session against the headless runtime, drives the simulated
//! controller from a companion window and mirrors the panel into it.
//! Set `PRESENCE_PROBE_NO_WINDOW=1` to run without a display.

mod config;
mod mirror;

use anyhow::{Context, Result};
use presence_engine::device::{GpuContext, MirrorSurface, OffscreenGpu};
use presence_engine::frame::{FrameLoop, NullPlatform, PlatformEvents, RenderDelegate};
use presence_engine::logging::{LogJournal, LoggingConfig, init_logging};
use presence_engine::pointer::PointerState;
use presence_engine::session::{Session, Transition};
use presence_engine::swapchain::RenderTarget;
use presence_engine::window::{CompanionConfig, CompanionWindow};
use presence_engine::xr::{ControllerFeed, DeviceSignal, FramebufferHandle, HeadlessRuntime};
use presence_ui::{MockPresence, PanelDelegate, PanelModel, startup_banner};

use config::ProbeConfig;
use mirror::Mirror;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    let config = ProbeConfig::from_env();
    log::info!(
        "presence probe starting (window: {}, frame limit: {:?})",
        config.window,
        config.frame_limit
    );

    let feed = ControllerFeed::new();
    let hand = config.session.hand;
    let mut aim = feed.state(hand).aim;
    aim.position.z = config.controller_z;
    feed.set_aim(hand, aim);

    if config.window {
        let companion = CompanionConfig::for_panel(&config.session.geometry, config.controller_z)
            .hand(hand);
        let window = CompanionWindow::open(companion, feed.clone())?;
        let handle = window.window().context("companion window did not open")?;

        let instance = GpuContext::create_instance();
        let surface = instance
            .create_surface(handle.clone())
            .context("failed to create mirror surface")?;
        let ctx = pollster::block_on(GpuContext::new(instance, &config.gpu, Some(&surface)))?;
        let surface = MirrorSurface::new(&ctx, surface, handle.inner_size(), &config.gpu)?;

        run(&config, ctx, feed, Some(Mirror::new(handle, surface)), window)
    } else {
        let ctx = pollster::block_on(GpuContext::headless(&config.gpu))?;
        run(&config, ctx, feed, None, NullPlatform)
    }
}

fn run<P: PlatformEvents>(
    config: &ProbeConfig,
    ctx: GpuContext,
    feed: ControllerFeed,
    mirror: Option<Mirror>,
    mut platform: P,
) -> Result<()> {
    let gpu = OffscreenGpu::new(ctx);
    let runtime = HeadlessRuntime::new(config.headless.clone(), gpu.clone(), feed.clone());
    let mut session =
        Session::create(runtime, gpu.clone(), config.session).context("failed to create session")?;

    let mut journal = LogJournal::new(config.journal_lines);
    startup_banner(&mut journal);
    let panel = PanelDelegate::new(gpu, PanelModel::new(MockPresence::new(), journal));

    let mut delegate = ProbeDelegate {
        panel,
        mirror,
        feed,
        frames: 0,
        frame_limit: config.frame_limit,
    };

    let mut frame_loop = FrameLoop::new();
    let reason = frame_loop.run(&mut session, &mut platform, &mut delegate);

    let stats = frame_loop.timing().stats();
    log::info!(
        "loop exited: {reason:?} after {} frames (p50 {:.2} ms, p99 {:.2} ms, missed {:.1}%)",
        stats.total_frames,
        stats.total_p50,
        stats.total_p99,
        stats.missed_pct()
    );
    let runtime_stats = session.runtime().stats();
    log::debug!("runtime: {runtime_stats:?}");

    session.shutdown();
    Ok(())
}

/// Panel renderer plus the probe's extras: mirroring and the frame limit.
struct ProbeDelegate {
    panel: PanelDelegate<MockPresence>,
    mirror: Option<Mirror>,
    feed: ControllerFeed,
    frames: u64,
    frame_limit: Option<u64>,
}

impl RenderDelegate for ProbeDelegate {
    fn render(&mut self, target: &RenderTarget, framebuffer: FramebufferHandle, pointer: &PointerState) {
        self.panel.render(target, framebuffer, pointer);

        if let Some(mirror) = self.mirror.as_mut() {
            mirror.present(self.panel.gpu(), target);
        }

        self.frames += 1;
        if self.frame_limit == Some(self.frames) {
            log::info!("frame limit reached, requesting exit");
            self.feed.signal(DeviceSignal::RequestExit);
        }
    }

    fn on_transition(&mut self, transition: &Transition) {
        self.panel.on_transition(transition);
    }
}
