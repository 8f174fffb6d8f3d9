pub mod params;
pub mod render;
pub mod scene;
pub mod settings;
pub mod time;

pub use params::{GpuLightArray, ParamSource, MAX_SIMULTANEOUS_LIGHTS};
pub use render::{RenderBackend, TargetKind, Viewport};
pub use scene::{
    AmbientLight, Attenuation, Camera, Colour, Light, LightKind, Projector, RenderableState,
};
pub use settings::PipelineSettings;
pub use time::{FrameClock, TimeSource};

pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
