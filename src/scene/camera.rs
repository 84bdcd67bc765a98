use glam::Mat4;

/// A perspective camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view, degrees.
    pub yfov: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    #[must_use]
    pub fn perspective(yfov: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            yfov,
            aspect,
            znear,
            zfar,
        }
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.yfov.to_radians(), self.aspect, self.znear, self.zfar)
    }
}
