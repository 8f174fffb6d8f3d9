pub mod camera;
pub mod colour;
pub mod light;
pub mod projector;
pub mod queries;
pub mod renderable;
pub mod shadow;
pub mod transform;

pub use camera::Camera;
pub use colour::Colour;
pub use light::{AmbientLight, Attenuation, Light, LightKind};
pub use projector::{stable_basis, stable_view, Projector};
pub use queries::{DepthQuery, SceneQueries};
pub use renderable::RenderableState;
pub use shadow::{CascadeData, ShadowNode, StaticShadowNode};
pub use transform::Transform;
