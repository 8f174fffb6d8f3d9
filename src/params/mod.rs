pub mod dirty;
pub mod lights;
pub mod packed;
pub mod periodic;
pub mod source;

pub use dirty::{ContextBits, Dirty, SlotDirty};
pub use lights::{spotlight_view_proj, CLIP_SPACE_TO_IMAGE_SPACE};
pub use packed::{GpuLight, GpuLightArray};
pub use periodic::{packed_trig, wrapped_time};
pub use source::{FogState, ParamSource, MAX_SIMULTANEOUS_LIGHTS};
