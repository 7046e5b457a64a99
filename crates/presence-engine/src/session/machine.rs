use crate::input::InputSampler;
use crate::xr::{RuntimeEvent, SessionState, ViewConfiguration, XrRuntime};

/// Coarse lifecycle phase the frame loop keys off.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum SessionPhase {
    #[default]
    Idle,
    Active,
    Terminal,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Terminal => "terminal",
        }
    }
}

/// What one `SessionMachine::handle` step did.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Idle → Active. The session was begun.
    Began,
    /// Active → Idle. The session was ended.
    Ended,
    /// Entered Terminal. No further events or frames.
    Terminated,
    /// Runtime state recorded; phase unchanged.
    Observed(SessionState),
    /// Event had no effect.
    Ignored,
}

/// Session lifecycle driven by runtime events.
///
/// The only writer of `SessionPhase`.
#[derive(Debug, Default)]
pub struct SessionMachine {
    phase: SessionPhase,
    runtime_state: Option<SessionState>,
    transitions: u32,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.phase == SessionPhase::Terminal
    }

    /// Last session state the runtime reported.
    #[inline]
    pub fn runtime_state(&self) -> Option<SessionState> {
        self.runtime_state
    }

    /// Number of phase changes so far.
    #[inline]
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    /// Applies one runtime event.
    ///
    /// On the first `Ready` the action set is attached through `input`, after
    /// the session has begun and before any frame syncs actions. Failed
    /// begin/end calls are logged and the phase changes anyway.
    pub fn handle<R: XrRuntime + ?Sized>(
        &mut self,
        event: &RuntimeEvent,
        runtime: &mut R,
        input: &mut InputSampler,
    ) -> Transition {
        if self.is_terminal() {
            return Transition::Ignored;
        }

        let state = match event {
            RuntimeEvent::SessionStateChanged(state) => *state,
            RuntimeEvent::InstanceLossPending => {
                log::warn!("runtime instance loss pending");
                return self.enter(SessionPhase::Terminal, Transition::Terminated);
            }
            RuntimeEvent::Other(name) => {
                log::trace!("ignoring runtime event {name}");
                return Transition::Ignored;
            }
        };

        self.runtime_state = Some(state);
        log::debug!("runtime session state: {}", state.as_str());

        match (self.phase, state) {
            (SessionPhase::Idle, SessionState::Ready) => {
                if let Err(e) = runtime.begin_session(ViewConfiguration::PrimaryStereo) {
                    log::error!("begin session: {e}");
                }
                if !input.is_attached() {
                    if let Err(e) = input.attach(runtime) {
                        log::error!("attach action set: {e}");
                    }
                }
                self.enter(SessionPhase::Active, Transition::Began)
            }
            (SessionPhase::Active, SessionState::Stopping) => {
                if let Err(e) = runtime.end_session() {
                    log::error!("end session: {e}");
                }
                self.enter(SessionPhase::Idle, Transition::Ended)
            }
            (_, SessionState::Exiting | SessionState::LossPending) => {
                self.enter(SessionPhase::Terminal, Transition::Terminated)
            }
            (_, state) => Transition::Observed(state),
        }
    }

    fn enter(&mut self, phase: SessionPhase, transition: Transition) -> Transition {
        log::info!("session {} -> {}", self.phase.as_str(), phase.as_str());
        self.phase = phase;
        self.transitions += 1;
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xr::testing::{Call, ScriptedRuntime};

    fn state(s: SessionState) -> RuntimeEvent {
        RuntimeEvent::SessionStateChanged(s)
    }

    fn drive(events: &[RuntimeEvent]) -> (SessionMachine, ScriptedRuntime, Vec<Transition>) {
        let mut machine = SessionMachine::new();
        let mut rt = ScriptedRuntime::default();
        let mut input = InputSampler::default();
        let transitions = events
            .iter()
            .map(|e| machine.handle(e, &mut rt, &mut input))
            .collect();
        (machine, rt, transitions)
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn ready_stopping_ready_exiting() {
        let (machine, rt, transitions) = drive(&[
            state(SessionState::Ready),
            state(SessionState::Stopping),
            state(SessionState::Ready),
            state(SessionState::Exiting),
        ]);

        assert_eq!(
            transitions,
            vec![
                Transition::Began,
                Transition::Ended,
                Transition::Began,
                Transition::Terminated
            ]
        );
        assert_eq!(machine.phase(), SessionPhase::Terminal);
        assert_eq!(machine.transitions(), 4);
        assert_eq!(rt.count(Call::Attach), 1);
        assert_eq!(rt.count(Call::BeginSession), 2);
        assert_eq!(rt.count(Call::EndSession), 1);
    }

    #[test]
    fn attach_follows_first_begin() {
        let (_, rt, _) = drive(&[state(SessionState::Ready)]);
        assert_eq!(rt.calls, vec![Call::BeginSession, Call::Attach]);
    }

    #[test]
    fn intermediate_states_are_observed() {
        let (machine, _, transitions) = drive(&[
            state(SessionState::Idle),
            state(SessionState::Ready),
            state(SessionState::Synchronized),
            state(SessionState::Visible),
            state(SessionState::Focused),
        ]);
        assert_eq!(transitions[0], Transition::Observed(SessionState::Idle));
        assert_eq!(transitions[4], Transition::Observed(SessionState::Focused));
        assert!(machine.is_active());
        assert_eq!(machine.runtime_state(), Some(SessionState::Focused));
    }

    #[test]
    fn ready_while_active_does_not_begin_again() {
        let (_, rt, transitions) =
            drive(&[state(SessionState::Ready), state(SessionState::Ready)]);
        assert_eq!(transitions[1], Transition::Observed(SessionState::Ready));
        assert_eq!(rt.count(Call::BeginSession), 1);
    }

    #[test]
    fn stopping_while_idle_does_not_end() {
        let (machine, rt, transitions) = drive(&[state(SessionState::Stopping)]);
        assert_eq!(transitions[0], Transition::Observed(SessionState::Stopping));
        assert_eq!(machine.phase(), SessionPhase::Idle);
        assert_eq!(rt.count(Call::EndSession), 0);
    }

    // ── termination ───────────────────────────────────────────────────────

    #[test]
    fn loss_pending_state_terminates_from_idle() {
        let (machine, _, transitions) = drive(&[state(SessionState::LossPending)]);
        assert_eq!(transitions, vec![Transition::Terminated]);
        assert!(machine.is_terminal());
    }

    #[test]
    fn instance_loss_event_terminates_from_active() {
        let (machine, rt, transitions) =
            drive(&[state(SessionState::Ready), RuntimeEvent::InstanceLossPending]);
        assert_eq!(transitions[1], Transition::Terminated);
        assert!(machine.is_terminal());
        assert_eq!(rt.count(Call::EndSession), 0);
    }

    #[test]
    fn terminal_ignores_everything() {
        let (machine, rt, transitions) = drive(&[
            state(SessionState::Exiting),
            state(SessionState::Ready),
            RuntimeEvent::InstanceLossPending,
        ]);
        assert_eq!(transitions[1..], [Transition::Ignored, Transition::Ignored]);
        assert_eq!(machine.transitions(), 1);
        assert!(rt.calls.is_empty());
    }

    #[test]
    fn unknown_events_are_ignored() {
        let (machine, _, transitions) =
            drive(&[RuntimeEvent::Other("interaction profile changed".into())]);
        assert_eq!(transitions, vec![Transition::Ignored]);
        assert_eq!(machine.runtime_state(), None);
    }

    // ── runtime failures ──────────────────────────────────────────────────

    #[test]
    fn failed_begin_still_activates() {
        let mut machine = SessionMachine::new();
        let mut rt = ScriptedRuntime::default().fail("xrBeginSession");
        let mut input = InputSampler::default();
        let t = machine.handle(&state(SessionState::Ready), &mut rt, &mut input);
        assert_eq!(t, Transition::Began);
        assert!(machine.is_active());
        assert!(input.is_attached());
    }

    #[test]
    fn failed_end_still_idles() {
        let mut machine = SessionMachine::new();
        let mut rt = ScriptedRuntime::default().fail("xrEndSession");
        let mut input = InputSampler::default();
        machine.handle(&state(SessionState::Ready), &mut rt, &mut input);
        let t = machine.handle(&state(SessionState::Stopping), &mut rt, &mut input);
        assert_eq!(t, Transition::Ended);
        assert_eq!(machine.phase(), SessionPhase::Idle);
        assert_eq!(rt.count(Call::EndSession), 1);
    }
}
