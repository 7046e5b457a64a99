use glam::{Quat, Vec3};

use crate::xr::FramePose;

/// Placement and resolution of the UI panel.
///
/// Constant for the lifetime of a session.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PanelGeometry {
    /// Panel width in meters.
    pub width_m: f32,
    /// Panel height in meters.
    pub height_m: f32,
    /// Panel center in the reference space.
    pub pose: FramePose,
    /// Texture width in pixels.
    pub pixel_width: u32,
    /// Texture height in pixels.
    pub pixel_height: u32,
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self {
            width_m: 1.6,
            height_m: 1.2,
            pose: FramePose::new(Vec3::new(0.0, 0.0, -2.0), Quat::IDENTITY),
            pixel_width: 1024,
            pixel_height: 768,
        }
    }
}

impl PanelGeometry {
    pub fn size_m(mut self, width: f32, height: f32) -> Self {
        self.width_m = width;
        self.height_m = height;
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.pose.position = position;
        self
    }

    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.pixel_width = width;
        self.pixel_height = height;
        self
    }

    /// Plane the panel lies in (z of its center).
    #[inline]
    pub fn plane_z(&self) -> f32 {
        self.pose.position.z
    }
}

/// Tunables for `project`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectorParams {
    /// Rays whose forward z is not below `-epsilon` are treated as parallel
    /// to (or facing away from) the panel.
    pub epsilon: f32,
    /// Hits farther than this many meters along the ray are ignored.
    pub max_distance: f32,
}

impl Default for ProjectorParams {
    fn default() -> Self {
        Self {
            epsilon: 0.001,
            max_distance: 100.0,
        }
    }
}

impl ProjectorParams {
    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn max_distance(mut self, meters: f32) -> Self {
        self.max_distance = meters;
        self
    }
}
