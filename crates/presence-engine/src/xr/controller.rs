use std::sync::{Arc, Mutex, MutexGuard};

use glam::{Quat, Vec3};

use super::types::{FramePose, Hand};

/// Simulated state of one motion controller.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControllerState {
    pub trigger: f32,
    pub aim: FramePose,
    pub tracked: bool,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            trigger: 0.0,
            // Held at chest height, pointing forward.
            aim: FramePose::new(Vec3::new(0.0, 0.0, -0.3), Quat::IDENTITY),
            tracked: true,
        }
    }
}

/// Device-level requests the platform layer forwards to the headless runtime.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DeviceSignal {
    /// The user asked the "system" to leave the app (graceful stop).
    RequestExit,
    /// The runtime went away underneath the app.
    LoseInstance,
}

#[derive(Debug, Default)]
struct Controllers {
    left: ControllerState,
    right: ControllerState,
    signals: Vec<DeviceSignal>,
}

impl Controllers {
    fn get(&self, hand: Hand) -> &ControllerState {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    fn get_mut(&mut self, hand: Hand) -> &mut ControllerState {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }
}

/// Shared handle to simulated controller state.
///
/// The platform layer writes (mouse, keys); the headless runtime reads when
/// actions are queried and drains signals when events are polled. Cloning
/// shares the same state.
#[derive(Debug, Clone, Default)]
pub struct ControllerFeed {
    inner: Arc<Mutex<Controllers>>,
}

impl ControllerFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, hand: Hand) -> ControllerState {
        *self.lock().get(hand)
    }

    pub fn set_trigger(&self, hand: Hand, value: f32) {
        self.lock().get_mut(hand).trigger = value.clamp(0.0, 1.0);
    }

    pub fn set_aim(&self, hand: Hand, aim: FramePose) {
        self.lock().get_mut(hand).aim = aim;
    }

    /// Points `hand` along the given yaw/pitch (radians) from its current position.
    pub fn set_aim_angles(&self, hand: Hand, yaw: f32, pitch: f32) {
        let orientation = Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch);
        self.lock().get_mut(hand).aim.orientation = orientation;
    }

    pub fn set_tracked(&self, hand: Hand, tracked: bool) {
        self.lock().get_mut(hand).tracked = tracked;
    }

    pub fn signal(&self, signal: DeviceSignal) {
        self.lock().signals.push(signal);
    }

    /// Takes all pending signals in the order they were raised.
    pub fn take_signals(&self) -> Vec<DeviceSignal> {
        std::mem::take(&mut self.lock().signals)
    }

    fn lock(&self) -> MutexGuard<'_, Controllers> {
        // State stays usable even if a writer panicked mid-update.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let feed = ControllerFeed::new();
        let writer = feed.clone();
        writer.set_trigger(Hand::Right, 0.75);
        assert_eq!(feed.state(Hand::Right).trigger, 0.75);
        assert_eq!(feed.state(Hand::Left).trigger, 0.0);
    }

    #[test]
    fn trigger_is_clamped() {
        let feed = ControllerFeed::new();
        feed.set_trigger(Hand::Left, 3.0);
        assert_eq!(feed.state(Hand::Left).trigger, 1.0);
        feed.set_trigger(Hand::Left, -1.0);
        assert_eq!(feed.state(Hand::Left).trigger, 0.0);
    }

    #[test]
    fn zero_angles_point_forward() {
        let feed = ControllerFeed::new();
        feed.set_aim_angles(Hand::Right, 0.0, 0.0);
        let forward = feed.state(Hand::Right).aim.orientation * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn positive_yaw_turns_left() {
        let feed = ControllerFeed::new();
        feed.set_aim_angles(Hand::Right, 0.3, 0.0);
        let forward = feed.state(Hand::Right).aim.orientation * Vec3::NEG_Z;
        assert!(forward.x < 0.0);
        assert!(forward.z < 0.0);
    }

    #[test]
    fn signals_drain_in_order() {
        let feed = ControllerFeed::new();
        feed.clone().signal(DeviceSignal::RequestExit);
        feed.signal(DeviceSignal::LoseInstance);
        assert_eq!(
            feed.take_signals(),
            vec![DeviceSignal::RequestExit, DeviceSignal::LoseInstance]
        );
        assert!(feed.take_signals().is_empty());
    }
}
