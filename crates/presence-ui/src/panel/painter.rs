use presence_engine::coords::{Rect, Vec2};
use presence_engine::logging::LogJournal;
use presence_engine::paint::Color;
use presence_engine::pointer::PointerState;
use presence_engine::scene::{Border, DrawList, ZIndex};

use super::layout::{PanelAction, PanelLayout};
use crate::presence::PresenceState;

/// Thin drawing API over a `DrawList` that hands out increasing z values, so
/// later calls paint on top of earlier ones.
pub struct Painter<'a> {
    list: &'a mut DrawList,
    z: i32,
}

impl<'a> Painter<'a> {
    pub fn new(list: &'a mut DrawList) -> Self {
        Self { list, z: 0 }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let z = self.next_z();
        self.list.fill_rect(z, rect, color);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color, border: Option<Border>) {
        let z = self.next_z();
        self.list.circle(z, center, radius, color, border);
    }

    pub fn ring(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        let z = self.next_z();
        self.list.ring(z, center, radius, width, color);
    }

    #[inline]
    fn next_z(&mut self) -> ZIndex {
        let z = ZIndex(self.z);
        self.z += 1;
        z
    }
}

/// Colors of the panel. Values follow the dark theme of the desktop tool.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Palette {
    pub window: Color,
    pub title: Color,
    pub button: Color,
    pub button_hover: Color,
    pub button_active: Color,
    pub correct: Color,
    pub buggy: Color,
    pub ok: Color,
    pub warn: Color,
    pub log_background: Color,
    pub log_text: Color,
    pub cursor: Color,
    pub cursor_pressed: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            window: Color::from_srgb_u8(15, 15, 15, 240),
            title: Color::from_srgb_u8(77, 204, 255, 255),
            button: Color::from_srgb_u8(51, 102, 204, 255),
            button_hover: Color::from_srgb_u8(77, 128, 230, 255),
            button_active: Color::from_srgb_u8(38, 77, 153, 255),
            correct: Color::from_srgb_u8(26, 153, 26, 255),
            buggy: Color::from_srgb_u8(179, 51, 26, 255),
            ok: Color::from_srgb_u8(51, 255, 51, 255),
            warn: Color::from_srgb_u8(255, 204, 51, 255),
            log_background: Color::from_srgb_u8(8, 8, 10, 255),
            log_text: Color::from_srgb_u8(200, 200, 200, 255),
            cursor: Color::from_srgb_u8(100, 255, 100, 255),
            cursor_pressed: Color::from_srgb_u8(255, 100, 100, 255),
        }
    }
}

/// Interaction state of one button.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonVisual {
    Idle,
    Hovered,
    Pressed,
}

/// Everything one paint pass reads.
pub struct PanelView<'a> {
    pub layout: &'a PanelLayout,
    pub palette: &'a Palette,
    pub presence: &'a PresenceState,
    pub journal: &'a LogJournal,
    pub pointer: &'a PointerState,
    pub visual: &'a dyn Fn(PanelAction) -> ButtonVisual,
}

const LOG_GLYPH_WIDTH: f32 = 7.0;
const LOG_BAR_HEIGHT: f32 = 10.0;

const CURSOR_ARM: f32 = 20.0;
const CURSOR_THICKNESS: f32 = 3.0;
const CURSOR_RING: f32 = 15.0;

/// Paints the whole panel back to front.
pub fn paint_panel(painter: &mut Painter<'_>, view: &PanelView<'_>) {
    let layout = view.layout;
    let palette = view.palette;

    painter.fill_rect(layout.frame, palette.window);
    painter.fill_rect(layout.title_bar, palette.title.with_alpha(0.35));

    paint_status(painter, view);

    for slot in &layout.buttons {
        let base = match slot.action {
            PanelAction::CorrectFlow => palette.correct,
            PanelAction::BuggyFlow => palette.buggy,
            _ => palette.button,
        };
        let color = match (view.visual)(slot.action) {
            ButtonVisual::Idle => base,
            ButtonVisual::Hovered if base == palette.button => palette.button_hover,
            ButtonVisual::Hovered => base.lerp(Color::WHITE, 0.15),
            ButtonVisual::Pressed if base == palette.button => palette.button_active,
            ButtonVisual::Pressed => base.lerp(Color::BLACK, 0.3),
        };
        painter.fill_rect(slot.rect, color);
    }

    paint_log(painter, view);
    paint_cursor(painter, view.pointer, palette);
}

fn paint_status(painter: &mut Painter<'_>, view: &PanelView<'_>) {
    let layout = view.layout;
    let palette = view.palette;
    let presence = view.presence;

    let lamp = |on: bool| if on { palette.ok } else { palette.warn };
    let off = Border::new(2.0 * layout.scale(), palette.warn);

    painter.fill_circle(
        layout.presence_lamp,
        layout.lamp_radius,
        lamp(presence.presence_set),
        (!presence.presence_set).then_some(off),
    );
    painter.fill_circle(
        layout.joinable_lamp,
        layout.lamp_radius,
        lamp(presence.joinable),
        (!presence.joinable).then_some(off),
    );

    let status = if presence.is_inviteable() { palette.ok } else { palette.warn };
    painter.fill_rect(layout.status_bar, status.with_alpha(0.8));

    if presence.lobby_id.is_some() {
        painter.fill_rect(layout.lobby_bar, palette.title.with_alpha(0.6));
    }
}

fn paint_log(painter: &mut Painter<'_>, view: &PanelView<'_>) {
    let layout = view.layout;
    let region = layout.log_region;
    painter.fill_rect(region, view.palette.log_background);

    let pad = 8.0 * layout.scale();
    let max_width = (region.size.x - 2.0 * pad).max(0.0);
    let glyph = LOG_GLYPH_WIDTH * layout.scale();
    let bar_h = LOG_BAR_HEIGHT * layout.scale();

    // Newest lines stay visible, like a log view pinned to the bottom.
    for (i, line) in view.journal.tail(layout.visible_log_lines()).enumerate() {
        let width = (line.chars().count() as f32 * glyph).min(max_width);
        let y = region.origin.y + pad + i as f32 * layout.log_line_height;
        if y + bar_h > region.max().y {
            break;
        }
        let indent = line.chars().take_while(|c| *c == ' ').count() as f32 * glyph;
        painter.fill_rect(
            Rect::new(region.origin.x + pad + indent, y, (width - indent).max(0.0), bar_h),
            view.palette.log_text,
        );
    }
}

fn paint_cursor(painter: &mut Painter<'_>, pointer: &PointerState, palette: &Palette) {
    let color = if pointer.pressed {
        palette.cursor_pressed
    } else {
        palette.cursor
    };
    let (cx, cy) = (pointer.x, pointer.y);
    let half = CURSOR_THICKNESS * 0.5;

    painter.fill_rect(
        Rect::new(cx - CURSOR_ARM, cy - half, CURSOR_ARM * 2.0, CURSOR_THICKNESS),
        color,
    );
    painter.fill_rect(
        Rect::new(cx - half, cy - CURSOR_ARM, CURSOR_THICKNESS, CURSOR_ARM * 2.0),
        color,
    );
    painter.ring(Vec2::new(cx, cy), CURSOR_RING, CURSOR_THICKNESS, color);
}
