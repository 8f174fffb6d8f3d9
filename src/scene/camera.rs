use glam::{Mat4, Vec3};

/// Perspective camera described by a look-at pose.
///
/// `projection()` is API-independent: clip-space z spans [-1, 1] and the render
/// backend folds in the depth convention of the active graphics API (see
/// `RenderBackend::convert_projection`).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Position of the camera used for level-of-detail selection, when it is
    /// decoupled from the rendering camera (e.g. frozen for debugging).
    pub lod_eye: Option<Vec3>,
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, self.aspect, self.near, self.far)
    }

    pub fn position(&self) -> Vec3 {
        self.eye
    }

    pub fn lod_position(&self) -> Vec3 {
        self.lod_eye.unwrap_or(self.eye)
    }

    pub fn direction(&self) -> Vec3 {
        (self.target - self.eye).normalize()
    }

    /// Unit vector pointing to the camera's right.
    pub fn side(&self) -> Vec3 {
        self.direction().cross(self.up).normalize()
    }

    /// The up vector of the view basis (orthogonal to `direction`, unlike the
    /// raw `up` hint).
    pub fn derived_up(&self) -> Vec3 {
        self.side().cross(self.direction()).normalize()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_radians: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            lod_eye: None,
        }
    }
}
