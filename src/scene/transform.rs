use glam::{Affine3A, Mat4, Quat, Vec3};

/// TRS transform component with matrix caches and dirty checking.
///
/// The public `position` / `rotation` / `scale` fields are compared against
/// shadow copies on update, so the local matrix is only rebuilt when one of
/// them actually changed. When `matrix_auto_update` is false the cached
/// local matrix is authoritative and is never rebuilt from the TRS
/// components (used for nodes that carry an explicit matrix).
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    /// When false, `local_matrix` is kept verbatim instead of being rebuilt
    /// from position/rotation/scale.
    pub matrix_auto_update: bool,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            matrix_auto_update: true,

            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,

            last_position: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    /// Rebuilds the local matrix from TRS if anything changed.
    /// Returns whether a rebuild happened.
    pub fn update_local_matrix(&mut self) -> bool {
        if !self.matrix_auto_update {
            return false;
        }

        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local_matrix = Affine3A::from_scale_rotation_translation(
                self.scale,
                self.rotation,
                self.position,
            );

            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    /// Applies an explicit local matrix and decomposes it back into the TRS
    /// components. Shear, if present, is lost in the decomposition.
    pub fn apply_local_matrix(&mut self, mat: Affine3A) {
        self.local_matrix = mat;

        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.position = translation;

        self.last_scale = scale;
        self.last_rotation = rotation;
        self.last_position = translation;
    }

    /// Helper for 16-element column-major input.
    pub fn apply_local_matrix_from_mat4(&mut self, mat: Mat4) {
        self.apply_local_matrix(Affine3A::from_mat4(mat));
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    /// World matrix as a `Mat4`, for uploading to a renderer.
    #[inline]
    #[must_use]
    pub fn world_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.world_matrix)
    }

    pub(crate) fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    /// Forces a rebuild on the next update.
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
