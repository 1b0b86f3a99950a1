//! Orbit camera producing the frame uniforms

use glam::{Mat4, Quat, Vec2, Vec3};
use line_geometry::FrameUniforms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Orthographic,
    Perspective,
}

impl Projection {
    pub fn toggled(self) -> Self {
        match self {
            Projection::Orthographic => Projection::Perspective,
            Projection::Perspective => Projection::Orthographic,
        }
    }
}

/// Camera orbiting `target` at `distance`
pub struct Camera {
    pub distance: f32,
    pub rotation: Quat,
    pub target: Vec3,
    pub projection: Projection,
    pub viewport: Vec2,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            distance: 7.0,
            rotation: Quat::IDENTITY,
            target: Vec3::ZERO,
            projection: Projection::default(),
            viewport: Self::viewport_from(width, height),
            fovy: 60.0_f32.to_radians(),
            znear: 0.1,
            zfar: 100.0,
        }
    }

    fn viewport_from(width: u32, height: u32) -> Vec2 {
        Vec2::new(width.max(1) as f32, height.max(1) as f32)
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    pub fn position(&self) -> Vec3 {
        let offset = self.rotation * Vec3::new(0.0, 0.0, self.distance);
        self.target + offset
    }

    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        let up = self.rotation * Vec3::Y;
        let yaw_rotation = Quat::from_axis_angle(up, delta_x);

        let right = self.rotation * Vec3::X;
        let pitch_rotation = Quat::from_axis_angle(right, -delta_y);

        self.rotation = yaw_rotation * pitch_rotation * self.rotation;
        self.rotation = self.rotation.normalize();
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(0.5, 50.0);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Self::viewport_from(width, height);
    }

    pub fn build_view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position());
        rotation_matrix * translation_matrix
    }

    /// The orthographic volume matches the perspective frustum's extent at
    /// the target, so toggling keeps the scene roughly the same size.
    pub fn build_projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective => Mat4::perspective_rh(self.fovy, self.aspect(), self.znear, self.zfar),
            Projection::Orthographic => {
                let half_height = self.distance * (self.fovy * 0.5).tan();
                let half_width = half_height * self.aspect();
                Mat4::orthographic_rh(-half_width, half_width, -half_height, half_height, self.znear, self.zfar)
            }
        }
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.build_projection_matrix() * self.build_view_matrix()
    }

    pub fn to_frame_uniforms(&self, aa_radius: Vec2) -> FrameUniforms {
        FrameUniforms::new(self.build_view_projection_matrix(), self.viewport, aa_radius)
    }
}
