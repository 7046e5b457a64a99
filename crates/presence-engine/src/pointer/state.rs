/// One frame's pointer input before it is folded into `PointerState`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PointerSample {
    /// Projected panel position; `None` on a projector miss or lost tracking.
    pub hit: Option<(f32, f32)>,
    pub pressed: bool,
    pub just_pressed: bool,
}

/// Pointer as seen by the panel: position in panel pixels plus trigger state.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub pressed: bool,
    pub just_pressed: bool,
}

impl PointerState {
    /// Folds in a new sample.
    ///
    /// Position keeps its last known good value when the sample has no hit;
    /// button state always follows the sample.
    pub fn apply(&mut self, sample: PointerSample) {
        if let Some((x, y)) = sample.hit {
            self.x = x;
            self.y = y;
        }
        self.pressed = sample.pressed;
        self.just_pressed = sample.just_pressed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_updates_position() {
        let mut p = PointerState::default();
        p.apply(PointerSample { hit: Some((10.0, 20.0)), ..Default::default() });
        assert_eq!((p.x, p.y), (10.0, 20.0));
    }

    #[test]
    fn miss_keeps_last_known_position() {
        let mut p = PointerState::default();
        p.apply(PointerSample { hit: Some((300.0, 200.0)), ..Default::default() });
        p.apply(PointerSample { hit: None, pressed: true, just_pressed: true });
        assert_eq!((p.x, p.y), (300.0, 200.0));
        assert!(p.pressed);
        assert!(p.just_pressed);
    }

    #[test]
    fn miss_still_releases_buttons() {
        let mut p = PointerState::default();
        p.apply(PointerSample { hit: Some((1.0, 1.0)), pressed: true, just_pressed: true });
        p.apply(PointerSample::default());
        assert!(!p.pressed);
        assert!(!p.just_pressed);
        assert_eq!((p.x, p.y), (1.0, 1.0));
    }
}
