//! Orbit camera looking at the patch center.

use glam::{Mat4, Vec3};

use crate::params::{RenderConfig, ViewParams};

/// Camera state derived from the view parameters each frame.
pub struct Camera {
    pub eye: Vec3,
    pub view_proj: Mat4,
}

impl Camera {
    /// Compute the orbit camera for the given view parameters.
    ///
    /// The camera sits at `distance_factor * scale` meters from the
    /// origin, at `pitch_deg` above the horizon, spun by `yaw_deg`, and
    /// always looks at the patch center.
    pub fn from_params(view: &ViewParams, config: &RenderConfig, scale: f32) -> Self {
        let eye = Self::eye_position(view, scale);
        let view_matrix = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(
            view.fov_deg.to_radians(),
            config.aspect_ratio(),
            config.near_plane_m,
            config.far_plane_m,
        );
        Self {
            eye,
            view_proj: proj * view_matrix,
        }
    }

    fn eye_position(view: &ViewParams, scale: f32) -> Vec3 {
        let pitch = view.pitch_deg.to_radians();
        let yaw = view.yaw_deg.to_radians();
        let distance = view.distance_factor * scale;
        Vec3::new(
            distance * pitch.cos() * yaw.cos(),
            distance * pitch.sin(),
            distance * pitch.cos() * yaw.sin(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_eye_distance_and_height() {
        let view = ViewParams::default();
        let camera = Camera::from_params(&view, &RenderConfig::default(), 150.0);
        let distance = view.distance_factor * 150.0;
        assert!((camera.eye.length() - distance).abs() < 1e-3);
        // positive pitch keeps the camera above the surface
        assert!(camera.eye.y > 0.0);
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let view = ViewParams::default();
        let camera = Camera::from_params(&view, &RenderConfig::default(), 150.0);
        let clip = camera.view_proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.w > 0.0, "look-at target must be in front of the camera");
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z), "depth must be in wgpu range");
    }

    #[test]
    fn test_yaw_spins_around_vertical_axis() {
        let mut view = ViewParams::default();
        let a = Camera::from_params(&view, &RenderConfig::default(), 100.0);
        view.step_yaw(90.0);
        let b = Camera::from_params(&view, &RenderConfig::default(), 100.0);
        assert!((a.eye.y - b.eye.y).abs() < 1e-3, "yaw must not change height");
        assert!((a.eye.length() - b.eye.length()).abs() < 1e-3);
        assert!(a.eye.distance(b.eye) > 1.0);
    }
}
