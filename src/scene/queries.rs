use crate::scene::camera::Camera;
use crate::scene::colour::Colour;
use crate::scene::projector::Projector;

/// The frustum a depth query is keyed by: the rendering camera for the scene
/// range, a texture projector for per-shadow-map ranges.
#[derive(Clone, Copy)]
pub enum DepthQuery<'a> {
    Camera(&'a Camera),
    Projector(&'a Projector),
}

/// Queries answered by the scene manager about currently visible content.
pub trait SceneQueries {
    /// Minimum and maximum depth of visible geometry for the given frustum.
    /// `None` when nothing is visible (the resolver substitutes a safe range).
    fn min_max_depth(&self, query: DepthQuery<'_>) -> Option<(f32, f32)>;

    fn shadow_colour(&self) -> Colour {
        Colour::new(0.25, 0.25, 0.25, 1.0)
    }
}
