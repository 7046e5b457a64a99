use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::frame::{AppControl, PlatformEvents};
use crate::pointer::PanelGeometry;
use crate::render::letterbox_scale;
use crate::xr::{ControllerFeed, DeviceSignal, Hand};

const BLOCKING_PUMP: Duration = Duration::from_millis(100);

/// Companion window configuration.
#[derive(Debug, Clone)]
pub struct CompanionConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Controller the mouse drives.
    pub hand: Hand,
    /// Panel extent in meters, used to turn cursor positions into aim angles.
    pub panel_size_m: (f32, f32),
    /// Panel resolution; the mirror keeps this aspect.
    pub panel_pixels: (u32, u32),
    /// Distance from the controller to the panel plane.
    pub aim_distance_m: f32,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self::for_panel(&PanelGeometry::default(), -0.3)
    }
}

impl CompanionConfig {
    /// Config matching `geometry`, for a controller held at `controller_z`.
    pub fn for_panel(geometry: &PanelGeometry, controller_z: f32) -> Self {
        Self {
            title: "presence probe".to_string(),
            initial_size: LogicalSize::new(1024.0, 768.0),
            hand: Hand::Right,
            panel_size_m: (geometry.width_m, geometry.height_m),
            panel_pixels: (geometry.pixel_width, geometry.pixel_height),
            aim_distance_m: (controller_z - geometry.plane_z()).abs(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn hand(mut self, hand: Hand) -> Self {
        self.hand = hand;
        self
    }
}

/// Yaw/pitch (radians) that aim a controller `distance` meters in front of a
/// `panel_w` x `panel_h` panel at normalized panel point (`nx`, `ny`).
///
/// Inverse of the pointer projection, so the pointer lands under the cursor.
pub fn aim_angles(nx: f32, ny: f32, panel_w: f32, panel_h: f32, distance: f32) -> (f32, f32) {
    let yaw = -(((nx - 0.5) * panel_w) / distance).atan();
    let pitch = -(((ny - 0.5) * panel_h) / distance).atan();
    (yaw, pitch)
}

/// Normalized panel coordinates of a cursor position in a window that shows
/// the panel letterboxed. Values outside `0..=1` are off the panel.
pub fn window_to_panel(
    cursor: PhysicalPosition<f64>,
    window: PhysicalSize<u32>,
    panel: (u32, u32),
) -> Option<(f32, f32)> {
    if window.width == 0 || window.height == 0 {
        return None;
    }
    let [sx, sy] = letterbox_scale(panel, Viewport::from_pixels(window.width, window.height));
    let u = cursor.x as f32 / window.width as f32 - 0.5;
    let v = cursor.y as f32 / window.height as f32 - 0.5;
    Some((u / sx + 0.5, v / sy + 0.5))
}

/// Desktop window driven by pumping its event loop once per frame.
pub struct CompanionWindow {
    event_loop: EventLoop<()>,
    state: CompanionState,
}

impl CompanionWindow {
    /// Creates the event loop and pumps it until the window exists.
    pub fn open(config: CompanionConfig, controllers: ControllerFeed) -> Result<Self> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut this = Self {
            event_loop,
            state: CompanionState::new(config, controllers),
        };

        for _ in 0..50 {
            if let PumpStatus::Exit(code) =
                this.event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut this.state)
            {
                anyhow::bail!("event loop exited during startup (code {code})");
            }
            if let Some(err) = this.state.create_error.take() {
                anyhow::bail!("failed to create companion window: {err}");
            }
            if this.state.window.is_some() {
                return Ok(this);
            }
        }
        anyhow::bail!("companion window was not created")
    }

    pub fn window(&self) -> Option<Arc<Window>> {
        self.state.window.clone()
    }

    /// Latest size change since the last call.
    pub fn take_resize(&mut self) -> Option<PhysicalSize<u32>> {
        self.state.resized.take()
    }

    #[inline]
    pub fn is_focused(&self) -> bool {
        self.state.focused
    }

    /// False while the window is minimized or fully covered.
    #[inline]
    pub fn is_visible(&self) -> bool {
        !self.state.occluded
    }
}

impl PlatformEvents for CompanionWindow {
    fn pump(&mut self, block: bool) -> AppControl {
        let timeout = if block { BLOCKING_PUMP } else { Duration::ZERO };
        match self.event_loop.pump_app_events(Some(timeout), &mut self.state) {
            PumpStatus::Exit(_) => AppControl::Exit,
            PumpStatus::Continue if self.state.exit_requested => AppControl::Exit,
            PumpStatus::Continue => AppControl::Continue,
        }
    }

    fn is_backgrounded(&self) -> bool {
        self.state.is_backgrounded()
    }
}

struct CompanionState {
    config: CompanionConfig,
    controllers: ControllerFeed,

    window: Option<Arc<Window>>,
    create_error: Option<String>,

    resized: Option<PhysicalSize<u32>>,
    focused: bool,
    occluded: bool,
    exit_requested: bool,
}

impl CompanionState {
    fn new(config: CompanionConfig, controllers: ControllerFeed) -> Self {
        Self {
            config,
            controllers,
            window: None,
            create_error: None,
            resized: None,
            focused: true,
            occluded: false,
            exit_requested: false,
        }
    }

    /// Unfocused or occluded windows count as backgrounded.
    fn is_backgrounded(&self) -> bool {
        !self.focused || self.occluded
    }

    fn on_cursor(&mut self, position: PhysicalPosition<f64>) {
        let Some(window) = self.window.as_ref() else { return };
        let Some((nx, ny)) = window_to_panel(position, window.inner_size(), self.config.panel_pixels)
        else {
            return;
        };
        let (w, h) = self.config.panel_size_m;
        let (yaw, pitch) = aim_angles(nx, ny, w, h, self.config.aim_distance_m);
        self.controllers.set_aim_angles(self.config.hand, yaw, pitch);
    }

    fn on_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => self.exit_requested = true,
            PhysicalKey::Code(KeyCode::Space) => {
                log::info!("companion: requesting session exit");
                self.controllers.signal(DeviceSignal::RequestExit);
            }
            PhysicalKey::Code(KeyCode::KeyL) => {
                log::warn!("companion: simulating instance loss");
                self.controllers.signal(DeviceSignal::LoseInstance);
            }
            PhysicalKey::Code(KeyCode::KeyT) => {
                let hand = self.config.hand;
                let tracked = !self.controllers.state(hand).tracked;
                log::info!("companion: {} controller tracked={tracked}", hand.as_str());
                self.controllers.set_tracked(hand, tracked);
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for CompanionState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                log::debug!("companion window {:?} created", window.id());
                self.window = Some(Arc::new(window));
            }
            Err(e) => self.create_error = Some(e.to_string()),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.exit_requested = true;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resized = Some(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = self.window.as_ref() {
                    self.resized = Some(window.inner_size());
                }
            }
            WindowEvent::Focused(focused) => self.focused = focused,
            WindowEvent::Occluded(occluded) => self.occluded = occluded,
            WindowEvent::CursorMoved { position, .. } => self.on_cursor(position),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let value = if state == ElementState::Pressed { 1.0 } else { 0.0 };
                self.controllers.set_trigger(self.config.hand, value);
            }
            WindowEvent::KeyboardInput { event, .. } => self.on_key(&event),
            _ => {}
        }
    }
}
