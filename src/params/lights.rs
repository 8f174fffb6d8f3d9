use glam::{Mat4, Vec3, Vec4};

use crate::params::dirty::SlotDirty;
use crate::params::source::{depth_range_vec, ParamSource, MAX_SIMULTANEOUS_LIGHTS};
use crate::render::backend::RenderBackend;
use crate::scene::colour::Colour;
use crate::scene::light::{Light, LightKind};
use crate::scene::projector::Projector;
use crate::scene::queries::DepthQuery;

/// Maps clip space onto image space for projective texture reads: x/y from
/// [-1, 1] to [0, 1] with y flipped, z and w untouched.
pub const CLIP_SPACE_TO_IMAGE_SPACE: Mat4 = Mat4::from_cols(
    Vec4::new(0.5, 0.0, 0.0, 0.0),
    Vec4::new(0.0, -0.5, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 1.0, 0.0),
    Vec4::new(0.5, 0.5, 0.0, 1.0),
);

const NULL_PSSM_SPLITS: [f32; 4] = [0.0; 4];
const NULL_PSSM_BLENDS: [f32; 2] = [0.0; 2];

/// Image-space view-projection of a frustum synthesized at a spotlight:
/// positioned at the light, facing its direction, square aspect, field of view
/// covering the outer cone. The near clip is taken from the rendering camera
/// since both frustums see the same scene scale.
pub fn spotlight_view_proj(
    backend: &RenderBackend,
    position: Vec3,
    direction: Vec3,
    fov_y_radians: f32,
    aspect: f32,
    near: f32,
) -> Mat4 {
    let frustum = Projector {
        position,
        direction,
        fov_y_radians,
        aspect,
        near,
        ..Projector::default()
    };
    CLIP_SPACE_TO_IMAGE_SPACE * backend.convert_projection(frustum.projection()) * frustum.view()
}

impl<'s> ParamSource<'s> {
    /// The `index`-th light of the bound list, or the blank sentinel for any
    /// index at or past its end. Callers never need a bounds check.
    pub fn light(&self, index: usize) -> Light {
        self.lights
            .and_then(|lights| lights.get(index))
            .map_or(Light::BLANK, |light| **light)
    }

    pub fn light_count(&self) -> f32 {
        self.lights.map_or(0.0, |lights| lights.len() as f32)
    }

    pub fn light_casts_shadows(&self, index: usize) -> f32 {
        if self.light(index).casts_shadows {
            1.0
        } else {
            0.0
        }
    }

    pub fn light_diffuse_colour(&self, index: usize) -> Colour {
        self.light(index).diffuse
    }

    pub fn light_specular_colour(&self, index: usize) -> Colour {
        self.light(index).specular
    }

    pub fn light_diffuse_colour_with_power(&self, index: usize) -> Colour {
        let light = self.light(index);
        light.diffuse.scaled_rgb(light.power_scale)
    }

    pub fn light_specular_colour_with_power(&self, index: usize) -> Colour {
        let light = self.light(index);
        light.specular.scaled_rgb(light.power_scale)
    }

    pub fn light_position(&self, index: usize) -> Vec3 {
        self.light(index).position
    }

    pub fn light_direction(&self, index: usize) -> Vec3 {
        self.light(index).direction
    }

    pub fn light_power_scale(&self, index: usize) -> f32 {
        self.light(index).power_scale
    }

    pub fn light_as_4d_vector(&self, index: usize) -> Vec4 {
        self.light(index).as_4d_vector()
    }

    /// (range, constant, linear, quadratic).
    pub fn light_attenuation(&self, index: usize) -> Vec4 {
        let a = self.light(index).attenuation;
        Vec4::new(a.range, a.constant, a.linear, a.quadratic)
    }

    /// Spotlight factors packed for the shared shading formula
    /// `pow(clamp((dot - y) / (x - y)), z)`: spotlights yield
    /// (cos inner/2, cos outer/2, falloff, 1). Other lights yield (1, 0, 0, 0)
    /// so the pow degenerates to exactly 1 and the divisor never vanishes.
    pub fn spotlight_params(&self, index: usize) -> Vec4 {
        let light = self.light(index);
        if light.kind == LightKind::Spot {
            Vec4::new(
                (light.inner_cone_angle * 0.5).cos(),
                (light.outer_cone_angle * 0.5).cos(),
                light.spot_falloff,
                1.0,
            )
        } else {
            Vec4::new(1.0, 0.0, 0.0, 0.0)
        }
    }

    // ---- texture projector slots ----------------------------------------

    /// Image-space view-projection of the projector bound at `slot`; identity
    /// while the slot is empty or out of range.
    pub fn texture_view_proj_matrix(&mut self, slot: usize) -> Mat4 {
        if slot >= MAX_SIMULTANEOUS_LIGHTS {
            return Mat4::IDENTITY;
        }
        if self.slot_dirty[slot].contains(SlotDirty::TEXTURE_VIEW_PROJ) {
            if let Some(projector) = self.projectors[slot] {
                self.texture_view_proj[slot] = CLIP_SPACE_TO_IMAGE_SPACE
                    * self.backend.convert_projection(projector.projection())
                    * projector.view();
                self.slot_dirty[slot].remove(SlotDirty::TEXTURE_VIEW_PROJ);
            }
        }
        self.texture_view_proj[slot]
    }

    pub fn texture_world_view_proj_matrix(&mut self, slot: usize) -> Mat4 {
        if slot >= MAX_SIMULTANEOUS_LIGHTS {
            return Mat4::IDENTITY;
        }
        if self.slot_dirty[slot].contains(SlotDirty::TEXTURE_WORLD_VIEW_PROJ)
            && self.projectors[slot].is_some()
        {
            self.texture_world_view_proj[slot] =
                self.texture_view_proj_matrix(slot) * self.world_matrix();
            self.slot_dirty[slot].remove(SlotDirty::TEXTURE_WORLD_VIEW_PROJ);
        }
        self.texture_world_view_proj[slot]
    }

    // ---- spotlight frustum slots ----------------------------------------

    /// Image-space view-projection of the frustum synthesized at the `slot`-th
    /// light. Only spotlights populate this; for other lights (and slots past
    /// the list) the last value, initially identity, is returned untouched.
    pub fn spotlight_view_proj_matrix(&mut self, slot: usize) -> Mat4 {
        if slot >= MAX_SIMULTANEOUS_LIGHTS {
            return Mat4::IDENTITY;
        }
        if self.lights.is_some_and(|lights| slot < lights.len()) {
            let light = self.light(slot);
            if light.kind == LightKind::Spot
                && self.slot_dirty[slot].contains(SlotDirty::SPOTLIGHT_VIEW_PROJ)
            {
                let near = self.bound_camera().near;
                self.spotlight_view_proj[slot] = spotlight_view_proj(
                    self.backend,
                    light.position,
                    light.direction,
                    light.outer_cone_angle,
                    1.0,
                    near,
                );
                self.slot_dirty[slot].remove(SlotDirty::SPOTLIGHT_VIEW_PROJ);
            }
        }
        self.spotlight_view_proj[slot]
    }

    pub fn spotlight_world_view_proj_matrix(&mut self, slot: usize) -> Mat4 {
        if slot >= MAX_SIMULTANEOUS_LIGHTS {
            return Mat4::IDENTITY;
        }
        if self.lights.is_some_and(|lights| slot < lights.len())
            && self.light(slot).kind == LightKind::Spot
            && self.slot_dirty[slot].contains(SlotDirty::SPOTLIGHT_WORLD_VIEW_PROJ)
        {
            self.spotlight_world_view_proj[slot] =
                self.spotlight_view_proj_matrix(slot) * self.world_matrix();
            self.slot_dirty[slot].remove(SlotDirty::SPOTLIGHT_WORLD_VIEW_PROJ);
        }
        self.spotlight_world_view_proj[slot]
    }

    // ---- shadow cascades and depth ranges -------------------------------

    pub fn pssm_splits(&self, shadow_map_idx: usize) -> &[f32] {
        self.shadow_node
            .and_then(|node| node.pssm_splits(shadow_map_idx))
            .unwrap_or(&NULL_PSSM_SPLITS)
    }

    pub fn pssm_blends(&self, shadow_map_idx: usize) -> &[f32] {
        self.shadow_node
            .and_then(|node| node.pssm_blends(shadow_map_idx))
            .unwrap_or(&NULL_PSSM_BLENDS)
    }

    pub fn pssm_fade(&self, shadow_map_idx: usize) -> f32 {
        self.shadow_node
            .and_then(|node| node.pssm_fade(shadow_map_idx))
            .unwrap_or(0.0)
    }

    /// Min/max depth of visible geometry for the projector bound at `slot`,
    /// as (near, far, far - near, 1 / (far - near)).
    pub fn shadow_scene_depth_range(&mut self, slot: usize) -> Vec4 {
        if slot >= MAX_SIMULTANEOUS_LIGHTS {
            return crate::params::source::DEPTH_RANGE_FALLBACK;
        }
        if self.slot_dirty[slot].contains(SlotDirty::SHADOW_DEPTH_RANGE) {
            if let Some(projector) = self.projectors[slot] {
                let scene = self
                    .scene
                    .expect("scene queries must be bound before reading depth ranges");
                self.shadow_depth_range[slot] =
                    depth_range_vec(scene.min_max_depth(DepthQuery::Projector(projector)));
                self.slot_dirty[slot].remove(SlotDirty::SHADOW_DEPTH_RANGE);
            }
        }
        self.shadow_depth_range[slot]
    }

    pub fn shadow_colour(&self) -> Colour {
        self.scene
            .expect("scene queries must be bound before reading the shadow colour")
            .shadow_colour()
    }

    /// How far shadow volumes are extruded for the shadow-casting light
    /// (always light 0 while a shadow pass renders): the configured constant
    /// for directional lights, the remaining attenuation range in object
    /// space otherwise.
    pub fn shadow_extrusion_distance(&mut self) -> f32 {
        let light = self.light(0);
        match light.kind {
            LightKind::Directional => self.dir_light_extrusion_distance,
            LightKind::Point | LightKind::Spot => {
                let object_space_pos = self.inverse_world_matrix().transform_point3(light.position);
                light.attenuation.range - object_space_pos.length()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::RenderBackend;
    use crate::scene::camera::Camera;
    use crate::scene::light::Attenuation;
    use crate::scene::renderable::RenderableState;
    use crate::scene::shadow::{CascadeData, StaticShadowNode};

    fn spot() -> Light {
        Light::spot(
            Vec3::new(2.0, 6.0, -1.0),
            Vec3::new(0.0, -1.0, 0.2),
            Colour::WHITE,
            30f32.to_radians(),
            45f32.to_radians(),
            1.0,
        )
    }

    #[test]
    fn out_of_range_indices_resolve_to_the_blank_light() {
        let backend = RenderBackend::default();
        let point = Light::point(Vec3::ONE, Colour::WHITE, Colour::WHITE, Attenuation::NONE);
        let storage = [&point];

        for len in 0..=MAX_SIMULTANEOUS_LIGHTS {
            let list: Vec<&Light> = storage.iter().copied().cycle().take(len).collect();
            let mut source = ParamSource::new(&backend);
            source.set_light_list(&list);
            for index in len..=MAX_SIMULTANEOUS_LIGHTS {
                let diffuse = source.light_diffuse_colour(index);
                assert_eq!([diffuse.r, diffuse.g, diffuse.b], [0.0; 3]);
                let specular = source.light_specular_colour(index);
                assert_eq!([specular.r, specular.g, specular.b], [0.0; 3]);
                assert_eq!(source.light_attenuation(index), Vec4::ZERO);
            }
        }
    }

    #[test]
    fn non_spotlights_pack_to_safe_unit_params() {
        let backend = RenderBackend::default();
        let directional = Light::directional(Vec3::NEG_Y, Colour::WHITE, Colour::WHITE);
        let point = Light::point(Vec3::ONE, Colour::WHITE, Colour::WHITE, Attenuation::NONE);
        let list: [&Light; 2] = [&directional, &point];
        let mut source = ParamSource::new(&backend);
        source.set_light_list(&list);

        assert_eq!(source.spotlight_params(0), Vec4::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(source.spotlight_params(1), Vec4::new(1.0, 0.0, 0.0, 0.0));
        // past the list: the blank light is a point light
        assert_eq!(source.spotlight_params(2), Vec4::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn spotlight_params_use_half_cone_angles() {
        let backend = RenderBackend::default();
        let light = spot();
        let list = [&light];
        let mut source = ParamSource::new(&backend);
        source.set_light_list(&list);

        let params = source.spotlight_params(0);
        assert!((params.x - (15f32.to_radians()).cos()).abs() < 1e-6);
        assert!((params.y - (22.5f32.to_radians()).cos()).abs() < 1e-6);
        assert_eq!(params.z, 1.0);
        assert_eq!(params.w, 1.0);
    }

    #[test]
    fn power_scaling_leaves_alpha_alone() {
        let backend = RenderBackend::default();
        let mut light = Light::point(
            Vec3::ZERO,
            Colour::new(0.5, 0.5, 0.5, 0.25),
            Colour::WHITE,
            Attenuation::NONE,
        );
        light.power_scale = 4.0;
        let list = [&light];
        let mut source = ParamSource::new(&backend);
        source.set_light_list(&list);

        let c = source.light_diffuse_colour_with_power(0);
        assert_eq!(c, Colour::new(2.0, 2.0, 2.0, 0.25));
    }

    #[test]
    fn only_spotlights_populate_the_spotlight_matrix_slot() {
        let backend = RenderBackend::default();
        let camera = Camera::default();
        let renderable = RenderableState::default();
        let directional = Light::directional(Vec3::NEG_Y, Colour::WHITE, Colour::WHITE);
        let spot_light = spot();
        let list: [&Light; 2] = [&directional, &spot_light];

        let mut source = ParamSource::new(&backend);
        source.set_camera(&camera);
        source.set_renderable(&renderable);
        source.set_light_list(&list);

        assert_eq!(source.spotlight_view_proj_matrix(0), Mat4::IDENTITY);
        let vp = source.spotlight_view_proj_matrix(1);
        assert_ne!(vp, Mat4::IDENTITY);

        let expected = spotlight_view_proj(
            &backend,
            spot_light.position,
            spot_light.direction,
            spot_light.outer_cone_angle,
            1.0,
            camera.near,
        );
        assert!(vp.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn vertical_spotlight_yields_a_finite_well_formed_matrix() {
        let backend = RenderBackend::default();
        let vp = spotlight_view_proj(
            &backend,
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::Y,
            60f32.to_radians(),
            1.0,
            0.1,
        );
        assert!(vp.is_finite());
        assert!(vp.determinant().abs() > 1e-12);
    }

    #[test]
    fn missing_shadow_node_yields_zeroed_cascade_data() {
        let backend = RenderBackend::default();
        let source = ParamSource::new(&backend);
        assert_eq!(source.pssm_splits(0), &[0.0; 4][..]);
        assert_eq!(source.pssm_blends(3), &[0.0; 2][..]);
        assert_eq!(source.pssm_fade(0), 0.0);
    }

    #[test]
    fn shadow_node_data_passes_through_and_gaps_fall_back() {
        let backend = RenderBackend::default();
        let node = StaticShadowNode::new(vec![CascadeData {
            splits: vec![0.1, 5.0, 20.0, 80.0],
            blends: vec![4.0, 18.0],
            fade: 0.65,
        }]);
        let mut source = ParamSource::new(&backend);
        source.set_shadow_node(Some(&node));

        assert_eq!(source.pssm_splits(0), &[0.1, 5.0, 20.0, 80.0][..]);
        assert_eq!(source.pssm_fade(0), 0.65);
        assert_eq!(source.pssm_splits(1), &[0.0; 4][..]);
        assert_eq!(source.pssm_fade(1), 0.0);
    }

    #[test]
    fn extrusion_distance_uses_remaining_attenuation_for_point_lights() {
        let backend = RenderBackend::default();
        let camera = Camera::default();
        let renderable = RenderableState::default();
        let light = Light::point(
            Vec3::new(0.0, 3.0, 4.0),
            Colour::WHITE,
            Colour::WHITE,
            Attenuation {
                range: 20.0,
                constant: 1.0,
                linear: 0.0,
                quadratic: 0.0,
            },
        );
        let list = [&light];

        let mut source = ParamSource::new(&backend);
        source.set_camera(&camera);
        source.set_renderable(&renderable);
        source.set_light_list(&list);

        // identity world matrix: object space distance is 5
        assert!((source.shadow_extrusion_distance() - 15.0).abs() < 1e-5);
    }

    #[test]
    fn extrusion_distance_is_constant_for_directional_lights() {
        let backend = RenderBackend::default();
        let light = Light::directional(Vec3::NEG_Y, Colour::WHITE, Colour::WHITE);
        let list = [&light];
        let mut source = ParamSource::new(&backend);
        source.set_light_list(&list);
        source.set_shadow_extrusion_distance(123.0);
        assert_eq!(source.shadow_extrusion_distance(), 123.0);
    }
}
