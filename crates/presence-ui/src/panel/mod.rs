//! The presence test panel.
//!
//! Immediate mode: every frame the pointer is hit-tested against the fixed
//! layout, at most one button fires, and the whole panel is repainted.

mod layout;
mod painter;

pub use layout::{ButtonSlot, PanelAction, PanelLayout};
pub use painter::{ButtonVisual, Painter, Palette, PanelView, paint_panel};

use presence_engine::coords::Vec2;
use presence_engine::logging::LogJournal;
use presence_engine::pointer::PointerState;
use presence_engine::scene::DrawList;

use crate::presence::PresenceState;

#[derive(Debug, Clone, Default)]
pub struct Panel {
    layout: PanelLayout,
    palette: Palette,
    hovered: Option<PanelAction>,
    pressed: Option<PanelAction>,
}

impl Panel {
    pub fn new(layout: PanelLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Applies this frame's pointer. Returns the button clicked this frame:
    /// the one under the pointer when the trigger was just pressed.
    pub fn update(&mut self, pointer: &PointerState) -> Option<PanelAction> {
        self.hovered = self.layout.hit_test(Vec2::new(pointer.x, pointer.y));
        self.pressed = if pointer.pressed { self.hovered } else { None };
        if pointer.just_pressed { self.hovered } else { None }
    }

    pub fn visual(&self, action: PanelAction) -> ButtonVisual {
        if self.pressed == Some(action) {
            ButtonVisual::Pressed
        } else if self.hovered == Some(action) {
            ButtonVisual::Hovered
        } else {
            ButtonVisual::Idle
        }
    }

    /// Records the panel into `list`, replacing its contents.
    pub fn paint(
        &self,
        list: &mut DrawList,
        presence: &PresenceState,
        journal: &LogJournal,
        pointer: &PointerState,
    ) {
        list.clear();
        let visual = |action: PanelAction| self.visual(action);
        let view = PanelView {
            layout: &self.layout,
            palette: &self.palette,
            presence,
            journal,
            pointer,
            visual: &visual,
        };
        paint_panel(&mut Painter::new(list), &view);
    }

    #[inline]
    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    #[inline]
    pub fn hovered(&self) -> Option<PanelAction> {
        self.hovered
    }
}
