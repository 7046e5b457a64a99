use glam::{Quat, Vec3};

use super::{PanelGeometry, ProjectorParams};
use crate::xr::FramePose;

/// Aim direction for a controller orientation.
///
/// Closed form of the aim axis used throughout the panel mapping; x and y are
/// mirrored relative to a plain `q * -Z` rotation, and `project` mirrors its
/// pixel mapping to match.
#[inline]
pub fn forward(q: Quat) -> Vec3 {
    Vec3::new(
        -2.0 * (q.x * q.z - q.w * q.y),
        -2.0 * (q.y * q.z + q.w * q.x),
        -(1.0 - 2.0 * (q.x * q.x + q.y * q.y)),
    )
}

/// Intersects the controller ray with the panel plane.
///
/// Returns panel pixel coordinates clamped to `[0, W] × [0, H]`, or `None`
/// when the ray does not point into the panel plane within range.
pub fn project(
    pose: &FramePose,
    geometry: &PanelGeometry,
    params: &ProjectorParams,
) -> Option<(f32, f32)> {
    let dir = forward(pose.orientation);

    // Written so NaN also lands on "no hit".
    if !(dir.z < -params.epsilon) {
        return None;
    }

    let t = (geometry.plane_z() - pose.position.z) / dir.z;
    if !(t > 0.0 && t < params.max_distance) {
        return None;
    }

    let hit = pose.position + dir * t;
    let local_x = hit.x - geometry.pose.position.x;
    let local_y = hit.y - geometry.pose.position.y;

    let w = geometry.pixel_width as f32;
    let h = geometry.pixel_height as f32;
    let x = ((0.5 - local_x / geometry.width_m) * w).clamp(0.0, w);
    let y = ((local_y / geometry.height_m + 0.5) * h).clamp(0.0, h);
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32, z: f32) -> FramePose {
        FramePose::new(Vec3::new(x, y, z), Quat::IDENTITY)
    }

    fn project_default(pose: FramePose) -> Option<(f32, f32)> {
        project(&pose, &PanelGeometry::default(), &ProjectorParams::default())
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    // ── forward ───────────────────────────────────────────────────────────

    #[test]
    fn identity_points_down_negative_z() {
        assert_eq!(forward(Quat::IDENTITY), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn half_turn_points_away_from_panel() {
        let q = Quat::from_rotation_y(std::f32::consts::PI);
        assert!(forward(q).z > 0.99);
    }

    // ── hits ──────────────────────────────────────────────────────────────

    #[test]
    fn centered_ray_hits_panel_center() {
        let (x, y) = project_default(at(0.0, 0.0, 1.0)).unwrap();
        assert!(approx(x, 512.0));
        assert!(approx(y, 384.0));
    }

    #[test]
    fn right_edge_offset_maps_to_pixel_zero() {
        let (x, _) = project_default(at(0.8, 0.0, 1.0)).unwrap();
        assert_eq!(x, 0.0);
    }

    #[test]
    fn hits_outside_panel_are_clamped() {
        let (x, y) = project_default(at(-5.0, 5.0, 1.0)).unwrap();
        assert_eq!(x, 1024.0);
        assert_eq!(y, 768.0);
    }

    #[test]
    fn tilted_rays_stay_in_bounds() {
        for i in -8..=8 {
            for j in -8..=8 {
                let q = Quat::from_rotation_y(i as f32 * 0.15) * Quat::from_rotation_x(j as f32 * 0.15);
                let pose = FramePose::new(Vec3::new(0.1, -0.2, 0.0), q);
                if let Some((x, y)) = project_default(pose) {
                    assert!((0.0..=1024.0).contains(&x), "x={x}");
                    assert!((0.0..=768.0).contains(&y), "y={y}");
                }
            }
        }
    }

    #[test]
    fn panel_offset_is_respected() {
        let geometry = PanelGeometry::default().position(Vec3::new(1.0, 0.5, -2.0));
        let (x, y) =
            project(&at(1.0, 0.5, 0.0), &geometry, &ProjectorParams::default()).unwrap();
        assert!(approx(x, 512.0));
        assert!(approx(y, 384.0));
    }

    // ── misses ────────────────────────────────────────────────────────────

    #[test]
    fn ray_facing_away_misses() {
        let pose = FramePose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::PI));
        assert!(project_default(pose).is_none());
    }

    #[test]
    fn ray_parallel_to_panel_misses() {
        let pose = FramePose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!(project_default(pose).is_none());
    }

    #[test]
    fn grazing_at_epsilon_is_a_miss() {
        // forward z == -epsilon exactly: not strictly below the threshold.
        let params = ProjectorParams::default().epsilon(1.0);
        assert!(project(&at(0.0, 0.0, 1.0), &PanelGeometry::default(), &params).is_none());
    }

    #[test]
    fn controller_behind_panel_plane_misses() {
        // Pointing -Z from beyond the panel gives t < 0.
        assert!(project_default(at(0.0, 0.0, -3.0)).is_none());
    }

    #[test]
    fn controller_on_panel_plane_misses() {
        assert!(project_default(at(0.0, 0.0, -2.0)).is_none());
    }

    #[test]
    fn hits_beyond_max_distance_miss() {
        assert!(project_default(at(0.0, 0.0, 97.0)).is_some());
        // t == max_distance exactly is outside the open interval.
        assert!(project_default(at(0.0, 0.0, 98.0)).is_none());
    }
}
