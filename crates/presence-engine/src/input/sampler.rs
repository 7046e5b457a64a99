use crate::xr::{FramePose, Hand, XrError, XrRuntime, XrTime};

/// Trigger reading for one frame.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TriggerSample {
    pub value: f32,
    pub pressed: bool,
    /// Pressed this frame but not the previous one.
    pub just_pressed: bool,
}

/// Aim pose reading for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AimSample {
    Tracked(FramePose),
    Unavailable,
}

impl AimSample {
    #[inline]
    pub fn pose(&self) -> Option<FramePose> {
        match self {
            AimSample::Tracked(pose) => Some(*pose),
            AimSample::Unavailable => None,
        }
    }
}

/// Per-frame action sampling.
///
/// Owns the one-time action-set attachment and the previous trigger state
/// per hand, which is all the input history the session keeps.
#[derive(Debug, Clone)]
pub struct InputSampler {
    threshold: f32,
    attached: bool,
    previous_pressed: [bool; 2],
    sync_failures: u32,
    trigger_failures: [u32; 2],
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl InputSampler {
    /// Trigger values strictly above `threshold` count as pressed.
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            attached: false,
            previous_pressed: [false; 2],
            sync_failures: 0,
            trigger_failures: [0; 2],
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Attaches the action set to the session.
    ///
    /// The attempt counts even when the runtime rejects it: a second call
    /// always fails with `AlreadyAttached`.
    pub fn attach<R: XrRuntime + ?Sized>(&mut self, runtime: &mut R) -> Result<(), XrError> {
        if self.attached {
            return Err(XrError::AlreadyAttached);
        }
        self.attached = true;
        runtime.attach_action_sets()
    }

    /// Frames in a row whose action sync failed.
    #[inline]
    pub fn sync_failures(&self) -> u32 {
        self.sync_failures
    }

    /// Submits the active action set for this frame.
    ///
    /// Failures are logged at error level once per run of failed frames,
    /// then at debug level until a sync succeeds again.
    pub fn sync<R: XrRuntime + ?Sized>(&mut self, runtime: &mut R) -> Result<(), XrError> {
        let result = runtime.sync_actions();
        note_result(&mut self.sync_failures, &result, "sync actions");
        result
    }

    /// Reads the trigger of `hand`. A failed query reads as released.
    pub fn poll_trigger<R: XrRuntime + ?Sized>(&mut self, runtime: &mut R, hand: Hand) -> TriggerSample {
        let what = match hand {
            Hand::Left => "left trigger query",
            Hand::Right => "right trigger query",
        };
        let result = runtime.trigger_value(hand);
        note_result(&mut self.trigger_failures[hand_slot(hand)], &result, what);
        let value = result.unwrap_or(0.0);

        let pressed = value > self.threshold;
        let previous = &mut self.previous_pressed[hand_slot(hand)];
        let just_pressed = pressed && !*previous;
        *previous = pressed;

        TriggerSample {
            value,
            pressed,
            just_pressed,
        }
    }

    /// Locates the aim pose of `hand` at `time`.
    pub fn poll_aim_pose<R: XrRuntime + ?Sized>(
        &mut self,
        runtime: &mut R,
        hand: Hand,
        time: XrTime,
    ) -> AimSample {
        match runtime.locate_aim(hand, time) {
            Ok(location) if location.flags.position_valid => AimSample::Tracked(location.pose),
            Ok(_) => AimSample::Unavailable,
            Err(e) => {
                log::debug!("{} aim locate: {e}", hand.as_str());
                AimSample::Unavailable
            }
        }
    }
}

/// Logs a failed per-frame call without flooding: the first failure of a
/// streak at error level, the rest at debug, and the recovery at info.
fn note_result<T>(streak: &mut u32, result: &Result<T, XrError>, what: &str) {
    match result {
        Ok(_) => {
            if *streak > 0 {
                log::info!("{what}: recovered after {streak} failed frame(s)");
            }
            *streak = 0;
        }
        Err(e) => {
            *streak += 1;
            if *streak == 1 {
                log::error!("{what}: {e}");
            } else {
                log::debug!("{what}: {e} ({streak} in a row)");
            }
        }
    }
}

#[inline]
fn hand_slot(hand: Hand) -> usize {
    match hand {
        Hand::Left => 0,
        Hand::Right => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xr::testing::{Call, ScriptedRuntime};
    use crate::xr::{LocationFlags, SpaceLocation};

    fn with_triggers(values: &[f32]) -> ScriptedRuntime {
        ScriptedRuntime {
            triggers: values.iter().copied().collect(),
            ..Default::default()
        }
    }

    // ── trigger ───────────────────────────────────────────────────────────

    #[test]
    fn trigger_edges_follow_threshold() {
        let mut rt = with_triggers(&[0.2, 0.6, 0.6, 0.1, 0.7]);
        let mut sampler = InputSampler::default();

        let samples: Vec<TriggerSample> =
            (0..5).map(|_| sampler.poll_trigger(&mut rt, Hand::Right)).collect();

        let pressed: Vec<bool> = samples.iter().map(|s| s.pressed).collect();
        let just: Vec<bool> = samples.iter().map(|s| s.just_pressed).collect();
        assert_eq!(pressed, vec![false, true, true, false, true]);
        assert_eq!(just, vec![false, true, false, false, true]);
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut rt = with_triggers(&[0.5]);
        let mut sampler = InputSampler::default();
        assert!(!sampler.poll_trigger(&mut rt, Hand::Right).pressed);
    }

    #[test]
    fn failed_query_reads_as_zero() {
        let mut rt = with_triggers(&[0.9]).fail("xrGetActionStateFloat");
        let mut sampler = InputSampler::default();
        let s = sampler.poll_trigger(&mut rt, Hand::Right);
        assert_eq!(s, TriggerSample::default());
    }

    #[test]
    fn hands_track_edges_separately() {
        let mut rt = with_triggers(&[1.0]);
        let mut sampler = InputSampler::default();
        assert!(sampler.poll_trigger(&mut rt, Hand::Right).just_pressed);
        assert!(sampler.poll_trigger(&mut rt, Hand::Left).just_pressed);
        assert!(!sampler.poll_trigger(&mut rt, Hand::Right).just_pressed);
    }

    // ── aim ───────────────────────────────────────────────────────────────

    #[test]
    fn valid_location_is_tracked() {
        let mut rt = ScriptedRuntime::default();
        let expected = rt.aim.pose;
        let mut sampler = InputSampler::default();
        let aim = sampler.poll_aim_pose(&mut rt, Hand::Right, XrTime::from_nanos(1));
        assert_eq!(aim, AimSample::Tracked(expected));
    }

    #[test]
    fn invalid_position_is_unavailable() {
        let mut rt = ScriptedRuntime {
            aim: SpaceLocation {
                flags: LocationFlags { orientation_valid: true, ..Default::default() },
                pose: FramePose::IDENTITY,
            },
            ..Default::default()
        };
        let mut sampler = InputSampler::default();
        let aim = sampler.poll_aim_pose(&mut rt, Hand::Right, XrTime::from_nanos(1));
        assert_eq!(aim, AimSample::Unavailable);
    }

    #[test]
    fn failed_locate_is_unavailable() {
        let mut rt = ScriptedRuntime::default().fail("xrLocateSpace");
        let mut sampler = InputSampler::default();
        assert_eq!(
            sampler.poll_aim_pose(&mut rt, Hand::Right, XrTime::from_nanos(1)),
            AimSample::Unavailable
        );
    }

    // ── attach ────────────────────────────────────────────────────────────

    #[test]
    fn attach_is_once_only() {
        let mut rt = ScriptedRuntime::default();
        let mut sampler = InputSampler::default();
        sampler.attach(&mut rt).unwrap();
        assert_eq!(sampler.attach(&mut rt), Err(XrError::AlreadyAttached));
        assert_eq!(rt.count(Call::Attach), 1);
    }

    #[test]
    fn sync_failures_count_until_recovery() {
        let mut rt = ScriptedRuntime::default().fail("xrSyncActions");
        let mut sampler = InputSampler::default();
        for _ in 0..3 {
            assert!(sampler.sync(&mut rt).is_err());
        }
        assert_eq!(sampler.sync_failures(), 3);

        rt.failing.clear();
        sampler.sync(&mut rt).unwrap();
        assert_eq!(sampler.sync_failures(), 0);
        assert_eq!(rt.count(Call::Sync), 4);
    }

    #[test]
    fn failure_streak_tracks_consecutive_errors() {
        let mut streak = 0;
        let err: Result<(), XrError> = Err(XrError::SessionNotRunning);
        note_result(&mut streak, &err, "sync actions");
        note_result(&mut streak, &err, "sync actions");
        assert_eq!(streak, 2);
        note_result(&mut streak, &Ok::<_, XrError>(()), "sync actions");
        assert_eq!(streak, 0);
    }

    #[test]
    fn rejected_attach_still_counts() {
        let mut rt = ScriptedRuntime::default().fail("xrAttachSessionActionSets");
        let mut sampler = InputSampler::default();
        assert!(sampler.attach(&mut rt).is_err());
        assert!(sampler.is_attached());
        assert_eq!(sampler.attach(&mut rt), Err(XrError::AlreadyAttached));
    }
}
