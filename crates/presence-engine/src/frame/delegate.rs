use std::time::Duration;

use crate::pointer::PointerState;
use crate::session::Transition;
use crate::swapchain::RenderTarget;
use crate::xr::FramebufferHandle;

/// Control directive returned by the platform pump.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Producer of the panel pixels, implemented by higher layers.
pub trait RenderDelegate {
    /// Draws one frame into `target` through `framebuffer`.
    ///
    /// The image is acquired and writable for the duration of the call.
    fn render(&mut self, target: &RenderTarget, framebuffer: FramebufferHandle, pointer: &PointerState);

    /// Called for every session event the machine processed.
    fn on_transition(&mut self, transition: &Transition) {
        let _ = transition;
    }
}

/// Desktop/OS event source polled once per loop iteration.
pub trait PlatformEvents {
    /// Processes pending platform events.
    ///
    /// With `block` set the call may idle until something happens; the loop
    /// only asks for that while backgrounded with an inactive session.
    fn pump(&mut self, block: bool) -> AppControl;

    /// Whether the app is out of view or lost focus.
    fn is_backgrounded(&self) -> bool {
        false
    }
}

/// Platform with no events. Blocking pumps sleep briefly.
#[derive(Debug, Copy, Clone, Default)]
pub struct NullPlatform;

impl PlatformEvents for NullPlatform {
    fn pump(&mut self, block: bool) -> AppControl {
        if block {
            std::thread::sleep(Duration::from_millis(5));
        }
        AppControl::Continue
    }
}
