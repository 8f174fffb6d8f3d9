use bytemuck::{Pod, Zeroable};

use crate::params::source::{ParamSource, MAX_SIMULTANEOUS_LIGHTS};

/// One light as shaders consume it, std140-compatible.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuLight {
    /// Position with w = 1, or for directional lights the vector towards the
    /// light with w = 0.
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// (range, constant, linear, quadratic).
    pub attenuation: [f32; 4],
    /// (cos inner/2, cos outer/2, falloff, is_spot); (1, 0, 0, 0) for
    /// non-spotlights.
    pub spot_params: [f32; 4],
}

/// The full light array bound to a draw. Every slot is written — slots past
/// the bound list carry the blank light — so shaders may index freely up to
/// `MAX_SIMULTANEOUS_LIGHTS`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuLightArray {
    pub counts: [u32; 4],
    pub lights: [GpuLight; MAX_SIMULTANEOUS_LIGHTS],
}

impl GpuLightArray {
    pub fn gather(source: &ParamSource<'_>) -> Self {
        let mut array = Self::zeroed();
        array.counts[0] = (source.light_count() as usize).min(MAX_SIMULTANEOUS_LIGHTS) as u32;
        for (slot, light) in array.lights.iter_mut().enumerate() {
            *light = GpuLight {
                position: source.light_as_4d_vector(slot).to_array(),
                direction: source.light_direction(slot).extend(0.0).to_array(),
                diffuse: source.light_diffuse_colour_with_power(slot).to_array(),
                specular: source.light_specular_colour_with_power(slot).to_array(),
                attenuation: source.light_attenuation(slot).to_array(),
                spot_params: source.spotlight_params(slot).to_array(),
            };
        }
        array
    }
}
