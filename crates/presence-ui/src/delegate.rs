use presence_engine::coords::Viewport;
use presence_engine::device::OffscreenGpu;
use presence_engine::frame::RenderDelegate;
use presence_engine::logging::LogJournal;
use presence_engine::paint::Color;
use presence_engine::pointer::PointerState;
use presence_engine::render::{DrawTarget, RenderCtx, ShapeRenderer};
use presence_engine::scene::DrawList;
use presence_engine::session::Transition;
use presence_engine::swapchain::RenderTarget;
use presence_engine::xr::{FramebufferHandle, ImageHandle, XrError};

use crate::panel::{Panel, PanelAction};
use crate::presence::{MockPresence, PresenceService};

/// Panel, presence and journal: the part of the delegate that needs no GPU.
#[derive(Debug)]
pub struct PanelModel<P: PresenceService = MockPresence> {
    pub panel: Panel,
    pub presence: P,
    pub journal: LogJournal,
}

impl<P: PresenceService> PanelModel<P> {
    pub fn new(presence: P, journal: LogJournal) -> Self {
        Self {
            panel: Panel::default(),
            presence,
            journal,
        }
    }

    /// Routes the frame's pointer to the panel and runs a clicked action.
    pub fn handle_pointer(&mut self, pointer: &PointerState) -> Option<PanelAction> {
        let action = self.panel.update(pointer)?;
        log::debug!("panel click: {}", action.label());
        action.apply(&mut self.presence, &mut self.journal);
        Some(action)
    }

    /// Journals session lifecycle changes.
    pub fn handle_transition(&mut self, transition: &Transition) {
        match transition {
            Transition::Began => self.journal.push("VR Session started!"),
            Transition::Ended => self.journal.push("VR Session stopped"),
            Transition::Terminated => log::warn!("session terminated"),
            Transition::Observed(_) | Transition::Ignored => {}
        }
    }

    pub fn paint(&self, list: &mut DrawList, pointer: &PointerState) {
        self.panel
            .paint(list, self.presence.state(), &self.journal, pointer);
    }
}

/// Draws the panel into the acquired swapchain image with wgpu.
pub struct PanelDelegate<P: PresenceService = MockPresence> {
    model: PanelModel<P>,
    gpu: OffscreenGpu,
    shapes: ShapeRenderer,
    list: DrawList,
    background: Color,
    last_image: Option<ImageHandle>,
}

impl<P: PresenceService> PanelDelegate<P> {
    pub fn new(gpu: OffscreenGpu, model: PanelModel<P>) -> Self {
        Self {
            model,
            gpu,
            shapes: ShapeRenderer::new(),
            list: DrawList::new(),
            background: Color::TRANSPARENT,
            last_image: None,
        }
    }

    #[inline]
    pub fn model(&self) -> &PanelModel<P> {
        &self.model
    }

    #[inline]
    pub fn model_mut(&mut self) -> &mut PanelModel<P> {
        &mut self.model
    }

    #[inline]
    pub fn gpu(&self) -> &OffscreenGpu {
        &self.gpu
    }

    /// Image the most recent frame was drawn into.
    #[inline]
    pub fn last_image(&self) -> Option<ImageHandle> {
        self.last_image
    }

    fn draw(
        &mut self,
        target: &RenderTarget,
        framebuffer: FramebufferHandle,
        pointer: &PointerState,
    ) -> Result<(), XrError> {
        let bound = self.gpu.bind_color_attachment(framebuffer, target.image)?;
        self.model.paint(&mut self.list, pointer);

        let gpu = self.gpu.context();
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("presence panel encoder"),
            });
        {
            let ctx = RenderCtx::new(
                gpu.device(),
                gpu.queue(),
                bound.format,
                Viewport::from_pixels(bound.width, bound.height),
            );
            let mut draw_target = DrawTarget::new(&mut encoder, &bound.view);
            draw_target.clear(self.background);
            self.shapes.render(&ctx, &mut draw_target, &mut self.list);
        }
        gpu.queue().submit(std::iter::once(encoder.finish()));

        self.gpu.unbind(framebuffer);
        self.last_image = Some(target.image);
        Ok(())
    }
}

impl<P: PresenceService> RenderDelegate for PanelDelegate<P> {
    fn render(&mut self, target: &RenderTarget, framebuffer: FramebufferHandle, pointer: &PointerState) {
        self.model.handle_pointer(pointer);
        if let Err(e) = self.draw(target, framebuffer, pointer) {
            log::error!("panel draw: {e}");
        }
    }

    fn on_transition(&mut self, transition: &Transition) {
        self.model.handle_transition(transition);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presence_engine::xr::SessionState;

    fn model() -> PanelModel<MockPresence> {
        PanelModel::new(MockPresence::seeded(11), LogJournal::new(32))
    }

    fn click(model: &PanelModel<MockPresence>, action: PanelAction) -> PointerState {
        let c = model.panel.layout().button(action).unwrap().center();
        PointerState { x: c.x, y: c.y, pressed: true, just_pressed: true }
    }

    #[test]
    fn click_runs_presence_action() {
        let mut m = model();
        let p = click(&m, PanelAction::CorrectFlow);
        assert_eq!(m.handle_pointer(&p), Some(PanelAction::CorrectFlow));
        assert!(m.presence.state().is_inviteable());
        assert_eq!(m.journal.lines().next(), Some("=== CORRECT FLOW ==="));
    }

    #[test]
    fn holding_trigger_does_not_repeat_action() {
        let mut m = model();
        let p = click(&m, PanelAction::GenerateLobby);
        m.handle_pointer(&p);
        let held = PointerState { just_pressed: false, ..p };
        assert_eq!(m.handle_pointer(&held), None);
        assert_eq!(m.journal.len(), 1);
    }

    #[test]
    fn transitions_are_journaled() {
        let mut m = model();
        m.handle_transition(&Transition::Observed(SessionState::Idle));
        m.handle_transition(&Transition::Began);
        m.handle_transition(&Transition::Ended);
        m.handle_transition(&Transition::Terminated);
        let lines: Vec<&str> = m.journal.lines().collect();
        assert_eq!(lines, vec!["VR Session started!", "VR Session stopped"]);
    }

    #[test]
    fn paint_fills_draw_list() {
        let m = model();
        let mut list = DrawList::new();
        m.paint(&mut list, &PointerState::default());
        assert!(!list.is_empty());
    }
}
