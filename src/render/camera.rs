use crate::render::Viewport;
use crate::scene::{Aabb, CameraView};
use glam::{Mat4, Vec3, Vec4};

/// World-space ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// Look-at camera driven by named views.
#[derive(Debug, Clone, Copy)]
pub struct ViewerCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ViewerCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 5.0),
            target: Vec3::ZERO,
            fov_deg: 45.0,
            near: 0.05,
            far: 500.0,
        }
    }
}

impl ViewerCamera {
    /// Frame a bounding box from a raised three-quarter angle.
    pub fn from_bounds(bounds: &Aabb) -> Self {
        let center = bounds.center();
        let extent = bounds.extent();
        let radius = extent.max_element();
        let distance = if radius > 0.0 { radius * 3.0 } else { 3.0 };
        Self {
            position: center + Vec3::new(distance, distance * 0.4, distance),
            target: center,
            ..Self::default()
        }
    }

    pub fn view(&self) -> CameraView {
        CameraView {
            position: self.position,
            target: self.target,
            fov_deg: self.fov_deg,
        }
    }

    pub fn set_view(&mut self, view: &CameraView) {
        self.position = view.position;
        self.target = view.target;
        self.fov_deg = view.fov_deg;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_deg.to_radians().clamp(0.01, 3.1),
            aspect.max(1e-3),
            self.near,
            self.far,
        )
    }

    /// Ray through a cursor position given in physical pixels, top-left origin.
    pub fn ray_from_screen(&self, screen_x: f32, screen_y: f32, viewport: &Viewport) -> Ray {
        let width = viewport.width.max(1) as f32;
        let height = viewport.height.max(1) as f32;
        let ndc_x = (screen_x / width) * 2.0 - 1.0;
        let ndc_y = 1.0 - (screen_y / height) * 2.0;

        let inverse = (self.projection_matrix(width / height) * self.view_matrix()).inverse();
        let near = inverse * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inverse * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        Ray {
            origin: self.position,
            dir: (far - near).normalize_or_zero(),
        }
    }
}
