use glam::{Mat3, Mat4, Vec3};

/// A camera-like projective volume positioned in the world, used for projective
/// texturing and shadow projection. Unlike `Camera` it carries no look-at
/// target; its view basis is derived from the facing direction alone.
#[derive(Clone, Copy, Debug)]
pub struct Projector {
    pub position: Vec3,
    pub direction: Vec3,
    pub fov_y_radians: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projector {
    pub fn view(&self) -> Mat4 {
        stable_view(self.position, self.direction)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, self.aspect, self.near, self.far)
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            fov_y_radians: 90f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 100_000.0,
        }
    }
}

/// World-from-view rotation for a frustum facing `direction`, built without any
/// caller-supplied up hint. Up starts as +Y and falls back to +Z when the
/// direction is (anti)parallel to it; two cross products re-orthogonalize so
/// the result is exactly orthonormal even for nearly-degenerate inputs.
pub fn stable_basis(direction: Vec3) -> Mat3 {
    // View space looks down -Z, so the basis z axis points opposite the facing
    // direction.
    let z = (-direction).normalize();
    let mut up = Vec3::Y;
    if up.dot(z).abs() >= 1.0 {
        up = Vec3::Z;
    }
    let x = z.cross(up).normalize();
    let y = z.cross(x).normalize();
    Mat3::from_cols(x, y, z)
}

/// View matrix for a frustum at `position` facing `direction`.
pub fn stable_view(position: Vec3, direction: Vec3) -> Mat4 {
    let rotation = stable_basis(direction).transpose();
    Mat4::from_mat3(rotation) * Mat4::from_translation(-position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(m: Mat3) {
        let (x, y, z) = (m.x_axis, m.y_axis, m.z_axis);
        assert!(x.dot(y).abs() < 1e-6, "x.y = {}", x.dot(y));
        assert!(x.dot(z).abs() < 1e-6, "x.z = {}", x.dot(z));
        assert!(y.dot(z).abs() < 1e-6, "y.z = {}", y.dot(z));
        assert!((x.length() - 1.0).abs() < 1e-6);
        assert!((y.length() - 1.0).abs() < 1e-6);
        assert!((z.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn basis_is_orthonormal_for_arbitrary_direction() {
        assert_orthonormal(stable_basis(Vec3::new(0.3, -0.7, 0.2)));
        assert_orthonormal(stable_basis(Vec3::new(-5.0, 0.01, 0.0)));
    }

    #[test]
    fn basis_stays_orthonormal_when_direction_is_vertical() {
        assert_orthonormal(stable_basis(Vec3::Y));
        assert_orthonormal(stable_basis(Vec3::NEG_Y));
    }

    #[test]
    fn view_places_points_ahead_on_negative_z() {
        let view = stable_view(Vec3::new(1.0, 2.0, 3.0), Vec3::NEG_Z);
        let ahead = view.transform_point3(Vec3::new(1.0, 2.0, -7.0));
        assert!(ahead.z < 0.0, "point ahead of the frustum must have -z, got {ahead:?}");
        assert!((ahead.z + 10.0).abs() < 1e-5);
    }

    #[test]
    fn projection_matches_square_aspect_default() {
        let p = Projector::default();
        assert_eq!(p.aspect, 1.0);
        let m = p.projection();
        // Square aspect: x and y scales agree
        assert!((m.x_axis.x - m.y_axis.y).abs() < 1e-6);
    }
}
