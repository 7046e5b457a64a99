use std::time::{SystemTime, UNIX_EPOCH};

use presence_engine::logging::LogJournal;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Application id registered with the platform.
pub const APP_ID: &str = "33969008956076849";

/// Destination API name presence is advertised under.
pub const DESTINATION: &str = "test-location";

/// Flags and labels a presence implementation exposes to the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceState {
    pub presence_set: bool,
    pub joinable: bool,
    pub lobby_id: Option<String>,
    pub status: String,
}

impl Default for PresenceState {
    fn default() -> Self {
        Self {
            presence_set: false,
            joinable: false,
            lobby_id: None,
            status: "Ready".to_string(),
        }
    }
}

impl PresenceState {
    /// Presence is advertised and others can join.
    #[inline]
    pub fn is_inviteable(&self) -> bool {
        self.presence_set && self.joinable
    }
}

/// Group presence operations the panel buttons invoke.
///
/// Every operation reports what it did through `log`.
pub trait PresenceService {
    fn state(&self) -> &PresenceState;

    fn generate_lobby(&mut self, log: &mut LogJournal);

    /// Advertises presence, generating a lobby first if there is none.
    fn set_presence(&mut self, log: &mut LogJournal);

    fn clear_presence(&mut self, log: &mut LogJournal);

    fn open_invite_panel(&mut self, log: &mut LogJournal);

    /// Lobby, then presence, then the panel is safe to open.
    fn correct_flow(&mut self, log: &mut LogJournal) {
        log.push("=== CORRECT FLOW ===");
        log.push("Order: Lobby -> Presence -> Panel");
        self.generate_lobby(log);
        self.set_presence(log);
        log.push("Now safe to open invite panel!");
    }

    /// Opens the panel before presence exists, reproducing the close-at-once bug.
    fn buggy_flow(&mut self, log: &mut LogJournal) {
        log.push("=== BUGGY FLOW (Developer's Issue) ===");
        log.push("Order: Panel -> Presence (WRONG!)");
        log.push("Result: Panel closes immediately");
        self.open_invite_panel(log);
        self.set_presence(log);
    }
}

/// Writes the startup lines shown before the first interaction.
pub fn startup_banner(log: &mut LogJournal) {
    log.push("XrPresenceTest initialized!");
    log.push(format!("App ID: {APP_ID}"));
    log.push(format!("Destination: {DESTINATION}"));
    log.push("");
    log.push("Point controller at buttons");
    log.push("Pull trigger to click");
}

/// Presence without a platform SDK: state changes are local and every call
/// is logged as mocked.
#[derive(Debug)]
pub struct MockPresence {
    state: PresenceState,
    rng: StdRng,
}

impl Default for MockPresence {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPresence {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic lobby numbers.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: PresenceState::default(),
            rng,
        }
    }

    fn next_lobby_id(&mut self) -> String {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("lobby_{}_{secs}", self.rng.random_range(0..10000u32))
    }
}

impl PresenceService for MockPresence {
    fn state(&self) -> &PresenceState {
        &self.state
    }

    fn generate_lobby(&mut self, log: &mut LogJournal) {
        let id = self.next_lobby_id();
        log.push(format!("Generated lobby ID: {id}"));
        self.state.lobby_id = Some(id);
    }

    fn set_presence(&mut self, log: &mut LogJournal) {
        if self.state.lobby_id.is_none() {
            self.generate_lobby(log);
        }
        let lobby = self.state.lobby_id.as_deref().unwrap_or_default();

        log.push("Setting group presence...");
        log.push(format!("  Destination: {DESTINATION}"));
        log.push(format!("  LobbyId: {lobby}"));
        log.push("  IsJoinable: true");

        self.state.presence_set = true;
        self.state.joinable = true;
        self.state.status = "Presence SET - Ready to invite!".to_string();
        log.push("Presence set successfully (MOCKED)");
    }

    fn clear_presence(&mut self, log: &mut LogJournal) {
        log.push("Clearing group presence...");
        self.state.presence_set = false;
        self.state.joinable = false;
        self.state.lobby_id = None;
        self.state.status = "Presence cleared".to_string();
        log.push("Presence cleared (MOCKED)");
    }

    fn open_invite_panel(&mut self, log: &mut LogJournal) {
        if !self.state.is_inviteable() {
            log.push("!! WARNING: Launching invite panel but:");
            if !self.state.presence_set {
                log.push("   - Presence NOT set!");
            }
            if !self.state.joinable {
                log.push("   - User NOT joinable!");
            }
            log.push("   This will cause panel to close immediately!");
        }

        log.push("Launching invite panel...");
        self.state.status = "Invite panel launched (MOCKED)".to_string();
        log.push("In real implementation, system panel would appear");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journal() -> LogJournal {
        LogJournal::new(64)
    }

    fn lines(log: &LogJournal) -> Vec<&str> {
        log.lines().collect()
    }

    // ── lobby ─────────────────────────────────────────────────────────────

    #[test]
    fn lobby_id_has_number_and_timestamp() {
        let mut p = MockPresence::seeded(7);
        let mut log = journal();
        p.generate_lobby(&mut log);

        let id = p.state().lobby_id.clone().unwrap();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "lobby");
        assert!(parts[1].parse::<u32>().unwrap() < 10000);
        assert!(parts[2].parse::<u64>().unwrap() > 0);
        assert_eq!(lines(&log), vec![format!("Generated lobby ID: {id}").as_str()]);
    }

    // ── presence ──────────────────────────────────────────────────────────

    #[test]
    fn set_presence_generates_missing_lobby() {
        let mut p = MockPresence::seeded(1);
        let mut log = journal();
        p.set_presence(&mut log);

        let s = p.state();
        assert!(s.is_inviteable());
        assert!(s.lobby_id.is_some());
        assert_eq!(s.status, "Presence SET - Ready to invite!");
        assert!(lines(&log)[0].starts_with("Generated lobby ID: lobby_"));
        assert!(lines(&log).contains(&"  Destination: test-location"));
    }

    #[test]
    fn set_presence_keeps_existing_lobby() {
        let mut p = MockPresence::seeded(1);
        let mut log = journal();
        p.generate_lobby(&mut log);
        let before = p.state().lobby_id.clone();
        p.set_presence(&mut log);
        assert_eq!(p.state().lobby_id, before);
        assert_eq!(
            lines(&log).iter().filter(|l| l.starts_with("Generated")).count(),
            1
        );
    }

    #[test]
    fn clear_resets_everything() {
        let mut p = MockPresence::seeded(1);
        let mut log = journal();
        p.set_presence(&mut log);
        p.clear_presence(&mut log);

        let s = p.state();
        assert!(!s.presence_set && !s.joinable);
        assert_eq!(s.lobby_id, None);
        assert_eq!(s.status, "Presence cleared");
    }

    #[test]
    fn invite_without_presence_warns() {
        let mut p = MockPresence::seeded(1);
        let mut log = journal();
        p.open_invite_panel(&mut log);

        assert_eq!(
            lines(&log)[..4],
            [
                "!! WARNING: Launching invite panel but:",
                "   - Presence NOT set!",
                "   - User NOT joinable!",
                "   This will cause panel to close immediately!",
            ]
        );
        assert_eq!(p.state().status, "Invite panel launched (MOCKED)");
    }

    #[test]
    fn invite_with_presence_does_not_warn() {
        let mut p = MockPresence::seeded(1);
        let mut log = journal();
        p.set_presence(&mut log);
        log.clear();
        p.open_invite_panel(&mut log);
        assert_eq!(lines(&log)[0], "Launching invite panel...");
    }

    // ── flows ─────────────────────────────────────────────────────────────

    #[test]
    fn correct_flow_ends_inviteable() {
        let mut p = MockPresence::seeded(3);
        let mut log = journal();
        p.correct_flow(&mut log);
        assert!(p.state().is_inviteable());
        assert_eq!(lines(&log).last(), Some(&"Now safe to open invite panel!"));
    }

    #[test]
    fn buggy_flow_warns_before_presence() {
        let mut p = MockPresence::seeded(3);
        let mut log = journal();
        p.buggy_flow(&mut log);

        let all = lines(&log);
        let warn = all.iter().position(|l| l.starts_with("!! WARNING")).unwrap();
        let set = all.iter().position(|l| *l == "Setting group presence...").unwrap();
        assert!(warn < set);
        assert!(p.state().is_inviteable());
    }

    #[test]
    fn banner_lines_in_order() {
        let mut log = journal();
        startup_banner(&mut log);
        assert_eq!(
            lines(&log),
            vec![
                "XrPresenceTest initialized!",
                "App ID: 33969008956076849",
                "Destination: test-location",
                "",
                "Point controller at buttons",
                "Pull trigger to click",
            ]
        );
    }
}
