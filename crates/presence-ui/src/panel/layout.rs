use presence_engine::coords::{Rect, Vec2};
use presence_engine::logging::LogJournal;

use crate::presence::PresenceService;

/// Something a panel button does.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PanelAction {
    GenerateLobby,
    SetPresence,
    ClearPresence,
    OpenInvitePanel,
    CorrectFlow,
    BuggyFlow,
    ClearLog,
}

impl PanelAction {
    pub const ALL: [PanelAction; 7] = [
        PanelAction::GenerateLobby,
        PanelAction::SetPresence,
        PanelAction::ClearPresence,
        PanelAction::OpenInvitePanel,
        PanelAction::CorrectFlow,
        PanelAction::BuggyFlow,
        PanelAction::ClearLog,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::GenerateLobby => "Generate Lobby",
            Self::SetPresence => "Set Presence",
            Self::ClearPresence => "Clear Presence",
            Self::OpenInvitePanel => "Open Invite Panel",
            Self::CorrectFlow => "CORRECT Flow",
            Self::BuggyFlow => "BUGGY Flow",
            Self::ClearLog => "Clear Log",
        }
    }

    /// Runs the action against `presence`, logging into `log`.
    pub fn apply<P: PresenceService + ?Sized>(self, presence: &mut P, log: &mut LogJournal) {
        match self {
            Self::GenerateLobby => presence.generate_lobby(log),
            Self::SetPresence => presence.set_presence(log),
            Self::ClearPresence => presence.clear_presence(log),
            Self::OpenInvitePanel => presence.open_invite_panel(log),
            Self::CorrectFlow => presence.correct_flow(log),
            Self::BuggyFlow => presence.buggy_flow(log),
            Self::ClearLog => log.clear(),
        }
    }
}

/// A button's action and where it sits.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ButtonSlot {
    pub action: PanelAction,
    pub rect: Rect,
}

const BASE_W: f32 = 1024.0;
const BASE_H: f32 = 768.0;

const BUTTON_W: f32 = 280.0;
const BUTTON_H: f32 = 60.0;
const COLUMN_GAP: f32 = 16.0;

/// Fixed panel layout in panel pixels.
///
/// Designed for 1024×768 and scaled for other resolutions.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pub frame: Rect,
    pub title_bar: Rect,
    pub presence_lamp: Vec2,
    pub joinable_lamp: Vec2,
    pub lamp_radius: f32,
    pub status_bar: Rect,
    pub lobby_bar: Rect,
    pub buttons: [ButtonSlot; 7],
    pub log_region: Rect,
    pub log_line_height: f32,
    scale: f32,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::for_size(BASE_W as u32, BASE_H as u32)
    }
}

impl PanelLayout {
    pub fn for_size(width: u32, height: u32) -> Self {
        let sx = width as f32 / BASE_W;
        let sy = height as f32 / BASE_H;
        let r = |x: f32, y: f32, w: f32, h: f32| Rect::new(x * sx, y * sy, w * sx, h * sy);
        let p = |x: f32, y: f32| Vec2::new(x * sx, y * sy);

        let left = 40.0;
        let right = left + BUTTON_W + COLUMN_GAP;
        let button = |action, x, y| ButtonSlot {
            action,
            rect: r(x, y, BUTTON_W, BUTTON_H),
        };

        Self {
            frame: r(20.0, 20.0, 984.0, 728.0),
            title_bar: r(20.0, 20.0, 984.0, 40.0),
            presence_lamp: p(60.0, 90.0),
            joinable_lamp: p(100.0, 90.0),
            lamp_radius: 12.0 * sx.min(sy),
            status_bar: r(130.0, 78.0, 420.0, 24.0),
            lobby_bar: r(130.0, 110.0, 300.0, 10.0),
            buttons: [
                button(PanelAction::GenerateLobby, left, 140.0),
                button(PanelAction::SetPresence, right, 140.0),
                button(PanelAction::ClearPresence, left, 212.0),
                button(PanelAction::OpenInvitePanel, right, 212.0),
                button(PanelAction::CorrectFlow, left, 304.0),
                button(PanelAction::BuggyFlow, right, 304.0),
                ButtonSlot {
                    action: PanelAction::ClearLog,
                    rect: r(left, 584.0, 140.0, 40.0),
                },
            ],
            log_region: r(left, 392.0, 944.0, 180.0),
            log_line_height: 18.0 * sy,
            scale: sx.min(sy),
        }
    }

    /// Uniform scale relative to the 1024×768 design.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The button under `p`, if any.
    pub fn hit_test(&self, p: Vec2) -> Option<PanelAction> {
        self.buttons
            .iter()
            .find(|slot| slot.rect.contains(p))
            .map(|slot| slot.action)
    }

    pub fn button(&self, action: PanelAction) -> Option<Rect> {
        self.buttons
            .iter()
            .find(|slot| slot.action == action)
            .map(|slot| slot.rect)
    }

    /// Log lines that fit in the log region.
    pub fn visible_log_lines(&self) -> usize {
        if self.log_line_height <= 0.0 {
            return 0;
        }
        (self.log_region.size.y / self.log_line_height).floor() as usize
    }
}
