pub mod backend;
pub mod pass;
pub mod viewport;

pub use backend::{
    ClipRange, DepthMode, OrientationMode, RenderBackend, RenderTargetDesc, TargetKind,
};
pub use pass::{ComputeJob, Pass, TextureUnit};
pub use viewport::Viewport;
