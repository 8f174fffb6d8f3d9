use std::ptr;

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::params::dirty::{invalidated_by, slot_invalidated_by, ContextBits, Dirty, SlotDirty};
use crate::render::backend::{negate_row, OrientationMode, RenderBackend, RenderTargetDesc};
use crate::render::pass::{ComputeJob, Pass};
use crate::render::viewport::Viewport;
use crate::scene::camera::Camera;
use crate::scene::colour::Colour;
use crate::scene::light::{AmbientLight, Light};
use crate::scene::projector::Projector;
use crate::scene::queries::{DepthQuery, SceneQueries};
use crate::scene::renderable::RenderableState;
use crate::scene::shadow::ShadowNode;
use crate::time::TimeSource;

/// Upper bound on lights bound to a single draw, and equally on texture
/// projector slots. Shader-side arrays are sized to this.
pub const MAX_SIMULTANEOUS_LIGHTS: usize = 8;

/// Substituted wherever a visible depth range would be empty or is not yet
/// known: a huge range whose reciprocal is still finite.
pub(crate) const DEPTH_RANGE_FALLBACK: Vec4 = Vec4::new(0.0, 100_000.0, 100_000.0, 1.0 / 100_000.0);

/// Fog curve inputs packed for shaders: (exp density, linear start, linear
/// end, 1 / (end - start)).
#[derive(Clone, Copy, Debug, Default)]
pub struct FogState {
    pub colour: Colour,
    pub params: Vec4,
}

/// Resolves the values of automatically supplied shader parameters for the
/// draw currently being processed.
///
/// The renderer binds context (camera, renderable, lights, pass, viewport,
/// projectors) at whatever granularity each changes; the shader binder then
/// queries named quantities in any order and any repetition. Derived matrices
/// are cached and recomputed lazily, with staleness derived from the
/// dependency tables in [`crate::params::dirty`].
///
/// Contract: a quantity may only be queried after the context it is derived
/// from has been bound. Querying earlier is a bug in the caller and panics
/// with the name of the missing binding.
///
/// One `ParamSource` serves one thread; create one per thread when draws are
/// resolved in parallel.
pub struct ParamSource<'s> {
    pub(crate) backend: &'s RenderBackend,

    // context register
    pub(crate) camera: Option<&'s Camera>,
    pub(crate) renderable: Option<&'s RenderableState>,
    pub(crate) lights: Option<&'s [&'s Light]>,
    pub(crate) pass: Option<&'s Pass>,
    pub(crate) job: Option<&'s ComputeJob>,
    pub(crate) viewport: Option<&'s Viewport>,
    pub(crate) target_desc: Option<RenderTargetDesc>,
    pub(crate) scene: Option<&'s dyn SceneQueries>,
    pub(crate) shadow_node: Option<&'s dyn ShadowNode>,
    pub(crate) projectors: [Option<&'s Projector>; MAX_SIMULTANEOUS_LIGHTS],
    pub(crate) time: Option<&'s dyn TimeSource>,
    pub(crate) ambient: AmbientLight,
    pub(crate) fog: FogState,
    pub(crate) dir_light_extrusion_distance: f32,
    pub(crate) pass_number: i32,

    // lazily refreshed caches
    pub(crate) dirty: Dirty,
    pub(crate) slot_dirty: [SlotDirty; MAX_SIMULTANEOUS_LIGHTS],
    pub(crate) world: Option<&'s [Mat4]>,
    pub(crate) view: Mat4,
    pub(crate) proj: Mat4,
    pub(crate) world_view: Mat4,
    pub(crate) view_proj: Mat4,
    pub(crate) world_view_proj: Mat4,
    pub(crate) inverse_world: Mat4,
    pub(crate) inverse_view: Mat4,
    pub(crate) inverse_world_view: Mat4,
    pub(crate) inverse_transpose_world: Mat4,
    pub(crate) inverse_transpose_world_view: Mat4,
    pub(crate) camera_position: Vec4,
    pub(crate) camera_position_object_space: Vec4,
    pub(crate) lod_camera_position: Vec4,
    pub(crate) lod_camera_position_object_space: Vec4,
    pub(crate) scene_depth_range: Vec4,
    pub(crate) texture_view_proj: [Mat4; MAX_SIMULTANEOUS_LIGHTS],
    pub(crate) texture_world_view_proj: [Mat4; MAX_SIMULTANEOUS_LIGHTS],
    pub(crate) spotlight_view_proj: [Mat4; MAX_SIMULTANEOUS_LIGHTS],
    pub(crate) spotlight_world_view_proj: [Mat4; MAX_SIMULTANEOUS_LIGHTS],
    pub(crate) shadow_depth_range: [Vec4; MAX_SIMULTANEOUS_LIGHTS],
}

impl<'s> ParamSource<'s> {
    pub fn new(backend: &'s RenderBackend) -> Self {
        Self {
            backend,
            camera: None,
            renderable: None,
            lights: None,
            pass: None,
            job: None,
            viewport: None,
            target_desc: None,
            scene: None,
            shadow_node: None,
            projectors: [None; MAX_SIMULTANEOUS_LIGHTS],
            time: None,
            ambient: AmbientLight::default(),
            fog: FogState::default(),
            dir_light_extrusion_distance: 10_000.0,
            pass_number: 0,
            dirty: Dirty::all(),
            slot_dirty: [SlotDirty::all(); MAX_SIMULTANEOUS_LIGHTS],
            world: None,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            world_view: Mat4::IDENTITY,
            view_proj: Mat4::IDENTITY,
            world_view_proj: Mat4::IDENTITY,
            inverse_world: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            inverse_world_view: Mat4::IDENTITY,
            inverse_transpose_world: Mat4::IDENTITY,
            inverse_transpose_world_view: Mat4::IDENTITY,
            camera_position: Vec4::W,
            camera_position_object_space: Vec4::W,
            lod_camera_position: Vec4::W,
            lod_camera_position_object_space: Vec4::W,
            scene_depth_range: DEPTH_RANGE_FALLBACK,
            texture_view_proj: [Mat4::IDENTITY; MAX_SIMULTANEOUS_LIGHTS],
            texture_world_view_proj: [Mat4::IDENTITY; MAX_SIMULTANEOUS_LIGHTS],
            spotlight_view_proj: [Mat4::IDENTITY; MAX_SIMULTANEOUS_LIGHTS],
            spotlight_world_view_proj: [Mat4::IDENTITY; MAX_SIMULTANEOUS_LIGHTS],
            shadow_depth_range: [DEPTH_RANGE_FALLBACK; MAX_SIMULTANEOUS_LIGHTS],
        }
    }

    fn invalidate(&mut self, field: ContextBits) {
        self.dirty |= invalidated_by(field);
        let slot = slot_invalidated_by(field);
        if !slot.is_empty() {
            for flags in &mut self.slot_dirty {
                *flags |= slot;
            }
        }
    }

    // ---- context setters -------------------------------------------------

    pub fn set_renderable(&mut self, renderable: &'s RenderableState) {
        if self.renderable.is_some_and(|prev| ptr::eq(prev, renderable)) {
            return;
        }
        self.renderable = Some(renderable);
        self.invalidate(ContextBits::RENDERABLE);
    }

    pub fn set_camera(&mut self, camera: &'s Camera) {
        if self.camera.is_some_and(|prev| ptr::eq(prev, camera)) {
            return;
        }
        self.camera = Some(camera);
        self.invalidate(ContextBits::CAMERA);
    }

    /// Binds the ordered list of lights affecting this draw. Slot indices used
    /// by the light getters follow this list's order. Only slots covered by
    /// the new list are invalidated; the light occupying a covered slot may
    /// have changed even when the length did not.
    pub fn set_light_list(&mut self, lights: &'s [&'s Light]) {
        if self.lights.is_some_and(|prev| ptr::eq(prev, lights)) {
            return;
        }
        self.lights = Some(lights);
        self.dirty |= invalidated_by(ContextBits::LIGHT_LIST);
        let slot = slot_invalidated_by(ContextBits::LIGHT_LIST);
        let covered = lights.len().min(MAX_SIMULTANEOUS_LIGHTS);
        for flags in self.slot_dirty.iter_mut().take(covered) {
            *flags |= slot;
        }
    }

    /// Binds the pass being rendered. A pass and a compute job are mutually
    /// exclusive render contexts, so any bound job is cleared.
    pub fn set_pass(&mut self, pass: &'s Pass) {
        self.pass = Some(pass);
        self.job = None;
    }

    pub fn set_job(&mut self, job: &'s ComputeJob) {
        self.job = Some(job);
    }

    /// Binds the viewport and re-derives the descriptor of its render target
    /// from the back end. Caches are only invalidated when the descriptor
    /// actually changed.
    pub fn set_viewport(&mut self, viewport: &'s Viewport) {
        if self.viewport.is_some_and(|prev| ptr::eq(prev, viewport)) {
            return;
        }
        self.viewport = Some(viewport);
        let desc = self.backend.target_descriptor(viewport.target);
        if self.target_desc != Some(desc) {
            log::trace!("render target descriptor changed: {desc:?}");
            self.target_desc = Some(desc);
            self.invalidate(ContextBits::TARGET);
        }
    }

    pub fn set_scene(&mut self, scene: &'s dyn SceneQueries) {
        if self
            .scene
            .is_some_and(|prev| ptr::addr_eq(prev as *const _, scene as *const _))
        {
            return;
        }
        self.scene = Some(scene);
        self.invalidate(ContextBits::SCENE);
    }

    pub fn set_shadow_node(&mut self, node: Option<&'s dyn ShadowNode>) {
        self.shadow_node = node;
    }

    /// Binds or clears one texture projector slot. Rebinding the same
    /// projector is a no-op so repeated binding never invalidates.
    pub fn set_texture_projector(&mut self, slot: usize, projector: Option<&'s Projector>) {
        if slot >= MAX_SIMULTANEOUS_LIGHTS {
            return;
        }
        let unchanged = match (self.projectors[slot], projector) {
            (None, None) => true,
            (Some(prev), Some(next)) => ptr::eq(prev, next),
            _ => false,
        };
        if unchanged {
            return;
        }
        self.projectors[slot] = projector;
        self.slot_dirty[slot] |= slot_invalidated_by(ContextBits::PROJECTOR);
    }

    pub fn set_time_source(&mut self, time: &'s dyn TimeSource) {
        self.time = Some(time);
    }

    pub fn set_ambient_light(&mut self, hemispheres: [Colour; 2], hemisphere_dir: Vec3) {
        self.ambient = AmbientLight {
            hemispheres,
            hemisphere_dir,
        };
    }

    pub fn set_fog(&mut self, colour: Colour, exp_density: f32, linear_start: f32, linear_end: f32) {
        let scale = if linear_end != linear_start {
            1.0 / (linear_end - linear_start)
        } else {
            0.0
        };
        self.fog = FogState {
            colour,
            params: Vec4::new(exp_density, linear_start, linear_end, scale),
        };
    }

    /// Extrusion distance used for directional-light shadow volumes; see
    /// `shadow_extrusion_distance()`.
    pub fn set_shadow_extrusion_distance(&mut self, distance: f32) {
        self.dir_light_extrusion_distance = distance;
    }

    /// Overrides the world matrix array for draws whose transforms are
    /// produced outside the renderable (instancing paths). The override is
    /// already up to date, so the world matrix is marked fresh, not stale.
    pub fn set_world_matrices(&mut self, matrices: &'s [Mat4]) {
        debug_assert!(!matrices.is_empty(), "world matrix override must not be empty");
        self.world = Some(matrices);
        self.dirty.remove(Dirty::WORLD);
    }

    pub fn set_pass_number(&mut self, pass_number: i32) {
        self.pass_number = pass_number;
    }

    pub fn increment_pass_number(&mut self) {
        self.pass_number += 1;
    }

    // ---- context accessors ----------------------------------------------

    pub fn current_camera(&self) -> Option<&'s Camera> {
        self.camera
    }

    pub fn current_renderable(&self) -> Option<&'s RenderableState> {
        self.renderable
    }

    pub fn current_pass(&self) -> Option<&'s Pass> {
        self.pass
    }

    pub fn current_job(&self) -> Option<&'s ComputeJob> {
        self.job
    }

    pub fn current_viewport(&self) -> Option<&'s Viewport> {
        self.viewport
    }

    pub fn render_target_desc(&self) -> Option<RenderTargetDesc> {
        self.target_desc
    }

    pub fn pass_number(&self) -> i32 {
        self.pass_number
    }

    pub(crate) fn bound_camera(&self) -> &'s Camera {
        self.camera
            .expect("camera must be bound before this query")
    }

    pub(crate) fn bound_pass(&self) -> &'s Pass {
        self.pass.expect("pass must be bound before this query")
    }

    fn bound_viewport(&self) -> &'s Viewport {
        self.viewport
            .expect("viewport must be bound before this query")
    }

    // ---- world / view / projection --------------------------------------

    pub fn world_matrix_array(&mut self) -> &'s [Mat4] {
        if self.dirty.contains(Dirty::WORLD) {
            let renderable = self
                .renderable
                .expect("renderable must be bound before reading the world matrix");
            self.world = Some(renderable.world_transforms());
            self.dirty.remove(Dirty::WORLD);
        }
        self.world
            .expect("renderable must be bound before reading the world matrix")
    }

    pub fn world_matrix(&mut self) -> Mat4 {
        self.world_matrix_array()[0]
    }

    pub fn world_matrix_count(&mut self) -> usize {
        self.world_matrix_array().len()
    }

    pub fn view_matrix(&mut self) -> Mat4 {
        if self.dirty.contains(Dirty::VIEW) {
            self.view = match self.renderable {
                Some(r) if r.use_identity_view => Mat4::IDENTITY,
                _ => self.bound_camera().view(),
            };
            self.dirty.remove(Dirty::VIEW);
        }
        self.view
    }

    pub fn projection_matrix(&mut self) -> Mat4 {
        if self.dirty.contains(Dirty::PROJ) {
            let identity_projection = self
                .renderable
                .is_some_and(|r| r.use_identity_projection);
            let mut proj = if identity_projection {
                // Clip-space draws still honour the back end's depth
                // convention and the display orientation.
                let mut m = self.backend.convert_projection(Mat4::IDENTITY);
                let orientation = self.backend.orientation();
                if orientation != OrientationMode::Natural {
                    m *= Mat4::from_quat(Quat::from_rotation_z(orientation.angle_radians()));
                }
                m
            } else {
                self.backend
                    .convert_projection(self.bound_camera().projection())
            };
            if self
                .target_desc
                .is_some_and(|t| t.requires_texture_flipping)
            {
                proj = negate_row(proj, 1);
            }
            self.proj = proj;
            self.dirty.remove(Dirty::PROJ);
        }
        self.proj
    }

    pub fn world_view_matrix(&mut self) -> Mat4 {
        if self.dirty.contains(Dirty::WORLD_VIEW) {
            self.world_view = self.view_matrix() * self.world_matrix();
            self.dirty.remove(Dirty::WORLD_VIEW);
        }
        self.world_view
    }

    pub fn view_projection_matrix(&mut self) -> Mat4 {
        if self.dirty.contains(Dirty::VIEW_PROJ) {
            self.view_proj = self.projection_matrix() * self.view_matrix();
            self.dirty.remove(Dirty::VIEW_PROJ);
        }
        self.view_proj
    }

    pub fn world_view_projection_matrix(&mut self) -> Mat4 {
        if self.dirty.contains(Dirty::WORLD_VIEW_PROJ) {
            self.world_view_proj = self.projection_matrix() * self.world_view_matrix();
            self.dirty.remove(Dirty::WORLD_VIEW_PROJ);
        }
        self.world_view_proj
    }

    // ---- inverse and transpose variants ---------------------------------

    pub fn inverse_world_matrix(&mut self) -> Mat4 {
        if self.dirty.contains(Dirty::INVERSE_WORLD) {
            self.inverse_world = inverse_affine(self.world_matrix());
            self.dirty.remove(Dirty::INVERSE_WORLD);
        }
        self.inverse_world
    }

    pub fn inverse_view_matrix(&mut self) -> Mat4 {
        if self.dirty.contains(Dirty::INVERSE_VIEW) {
            self.inverse_view = inverse_affine(self.view_matrix());
            self.dirty.remove(Dirty::INVERSE_VIEW);
        }
        self.inverse_view
    }

    pub fn inverse_world_view_matrix(&mut self) -> Mat4 {
        if self.dirty.contains(Dirty::INVERSE_WORLD_VIEW) {
            self.inverse_world_view = inverse_affine(self.world_view_matrix());
            self.dirty.remove(Dirty::INVERSE_WORLD_VIEW);
        }
        self.inverse_world_view
    }

    pub fn inverse_transpose_world_matrix(&mut self) -> Mat4 {
        if self.dirty.contains(Dirty::INVERSE_TRANSPOSE_WORLD) {
            self.inverse_transpose_world = self.inverse_world_matrix().transpose();
            self.dirty.remove(Dirty::INVERSE_TRANSPOSE_WORLD);
        }
        self.inverse_transpose_world
    }

    pub fn inverse_transpose_world_view_matrix(&mut self) -> Mat4 {
        if self.dirty.contains(Dirty::INVERSE_TRANSPOSE_WORLD_VIEW) {
            self.inverse_transpose_world_view = self.inverse_world_view_matrix().transpose();
            self.dirty.remove(Dirty::INVERSE_TRANSPOSE_WORLD_VIEW);
        }
        self.inverse_transpose_world_view
    }

    pub fn transpose_world_matrix(&mut self) -> Mat4 {
        self.world_matrix().transpose()
    }

    pub fn transpose_view_matrix(&mut self) -> Mat4 {
        self.view_matrix().transpose()
    }

    pub fn transpose_projection_matrix(&mut self) -> Mat4 {
        self.projection_matrix().transpose()
    }

    pub fn transpose_world_view_matrix(&mut self) -> Mat4 {
        self.world_view_matrix().transpose()
    }

    pub fn transpose_view_projection_matrix(&mut self) -> Mat4 {
        self.view_projection_matrix().transpose()
    }

    pub fn transpose_world_view_projection_matrix(&mut self) -> Mat4 {
        self.world_view_projection_matrix().transpose()
    }

    pub fn inverse_projection_matrix(&mut self) -> Mat4 {
        self.projection_matrix().inverse()
    }

    pub fn inverse_transpose_projection_matrix(&mut self) -> Mat4 {
        self.inverse_projection_matrix().transpose()
    }

    pub fn inverse_view_projection_matrix(&mut self) -> Mat4 {
        self.view_projection_matrix().inverse()
    }

    pub fn inverse_transpose_view_projection_matrix(&mut self) -> Mat4 {
        self.inverse_view_projection_matrix().transpose()
    }

    pub fn inverse_transpose_view_matrix(&mut self) -> Mat4 {
        self.inverse_view_matrix().transpose()
    }

    /// Full inverse, not affine: the world-view-projection product carries a
    /// perspective row whenever the projection is not the identity.
    pub fn inverse_world_view_projection_matrix(&mut self) -> Mat4 {
        self.world_view_projection_matrix().inverse()
    }

    pub fn inverse_transpose_world_view_projection_matrix(&mut self) -> Mat4 {
        self.inverse_world_view_projection_matrix().transpose()
    }

    // ---- camera-derived quantities --------------------------------------

    pub fn camera_position(&mut self) -> Vec4 {
        if self.dirty.contains(Dirty::CAMERA_POSITION) {
            self.camera_position = self.bound_camera().position().extend(1.0);
            self.dirty.remove(Dirty::CAMERA_POSITION);
        }
        self.camera_position
    }

    pub fn camera_position_object_space(&mut self) -> Vec4 {
        if self.dirty.contains(Dirty::CAMERA_POSITION_OBJECT_SPACE) {
            let eye = self.bound_camera().position();
            self.camera_position_object_space = self
                .inverse_world_matrix()
                .transform_point3(eye)
                .extend(1.0);
            self.dirty.remove(Dirty::CAMERA_POSITION_OBJECT_SPACE);
        }
        self.camera_position_object_space
    }

    pub fn lod_camera_position(&mut self) -> Vec4 {
        if self.dirty.contains(Dirty::LOD_CAMERA_POSITION) {
            self.lod_camera_position = self.bound_camera().lod_position().extend(1.0);
            self.dirty.remove(Dirty::LOD_CAMERA_POSITION);
        }
        self.lod_camera_position
    }

    pub fn lod_camera_position_object_space(&mut self) -> Vec4 {
        if self.dirty.contains(Dirty::LOD_CAMERA_POSITION_OBJECT_SPACE) {
            let eye = self.bound_camera().lod_position();
            self.lod_camera_position_object_space = self
                .inverse_world_matrix()
                .transform_point3(eye)
                .extend(1.0);
            self.dirty.remove(Dirty::LOD_CAMERA_POSITION_OBJECT_SPACE);
        }
        self.lod_camera_position_object_space
    }

    pub fn view_direction(&self) -> Vec3 {
        self.bound_camera().direction()
    }

    pub fn view_side_vector(&self) -> Vec3 {
        self.bound_camera().side()
    }

    pub fn view_up_vector(&self) -> Vec3 {
        self.bound_camera().derived_up()
    }

    pub fn fov(&self) -> f32 {
        self.bound_camera().fov_y_radians
    }

    pub fn near_clip_distance(&self) -> f32 {
        self.bound_camera().near
    }

    pub fn far_clip_distance(&self) -> f32 {
        self.bound_camera().far
    }

    // ---- viewport and depth conventions ---------------------------------

    pub fn viewport_width(&self) -> f32 {
        self.bound_viewport().width_f()
    }

    pub fn viewport_height(&self) -> f32 {
        self.bound_viewport().height_f()
    }

    pub fn inverse_viewport_width(&self) -> f32 {
        self.bound_viewport().inverse_width()
    }

    pub fn inverse_viewport_height(&self) -> f32 {
        self.bound_viewport().inverse_height()
    }

    /// (near, far) ends of the clip-space depth interval shaders will see.
    pub fn depth_range_convention(&self) -> Vec2 {
        self.backend.depth_range()
    }

    /// Min/max depth of visible geometry for the bound camera, as
    /// (near, far, far - near, 1 / (far - near)).
    pub fn scene_depth_range(&mut self) -> Vec4 {
        if self.dirty.contains(Dirty::SCENE_DEPTH_RANGE) {
            let scene = self
                .scene
                .expect("scene queries must be bound before reading depth ranges");
            let camera = self.bound_camera();
            self.scene_depth_range = depth_range_vec(scene.min_max_depth(DepthQuery::Camera(camera)));
            self.dirty.remove(Dirty::SCENE_DEPTH_RANGE);
        }
        self.scene_depth_range
    }

    // ---- fog and ambient -------------------------------------------------

    pub fn fog_colour(&self) -> Colour {
        self.fog.colour
    }

    pub fn fog_params(&self) -> Vec4 {
        self.fog.params
    }

    pub fn ambient_light_colour(&self) -> Colour {
        self.ambient.hemispheres[0]
    }

    pub fn ambient_hemispheres(&self) -> [Colour; 2] {
        self.ambient.hemispheres
    }

    pub fn ambient_hemisphere_dir(&self) -> Vec3 {
        self.ambient.hemisphere_dir
    }

    // ---- surface (pass) state -------------------------------------------

    pub fn surface_ambient_colour(&self) -> Colour {
        self.bound_pass().ambient
    }

    pub fn surface_diffuse_colour(&self) -> Colour {
        self.bound_pass().diffuse
    }

    pub fn surface_specular_colour(&self) -> Colour {
        self.bound_pass().specular
    }

    pub fn surface_emissive_colour(&self) -> Colour {
        self.bound_pass().emissive
    }

    pub fn surface_shininess(&self) -> f32 {
        self.bound_pass().shininess
    }

    pub fn surface_alpha_rejection_value(&self) -> f32 {
        f32::from(self.bound_pass().alpha_reject) / 255.0
    }

    pub fn derived_ambient_light_colour(&self) -> Colour {
        self.ambient_light_colour() * self.surface_ambient_colour()
    }

    /// Ambient-plus-emissive base colour of the surface, with the surface's
    /// diffuse alpha so blending behaves as authored.
    pub fn derived_scene_colour(&self) -> Colour {
        let c = self.derived_ambient_light_colour() + self.surface_emissive_colour();
        c.with_alpha(self.surface_diffuse_colour().a)
    }

    pub fn texture_transform_matrix(&self, index: usize) -> Mat4 {
        self.bound_pass()
            .texture_unit(index)
            .map_or(Mat4::IDENTITY, |unit| unit.transform)
    }

    // ---- texture / UAV sizes --------------------------------------------

    /// Dimensions of the texture bound at `index` — of the compute job when
    /// one is bound, of the pass otherwise — as (w, h, depth, max dimension).
    /// Unbound slots report unit size.
    pub fn texture_size(&self, index: usize) -> Vec4 {
        let size = if let Some(job) = self.job {
            job.texture_size(index)
        } else {
            self.pass
                .and_then(|pass| pass.texture_unit(index))
                .and_then(|unit| unit.size)
        };
        size_vec(size)
    }

    pub fn inverse_texture_size(&self, index: usize) -> Vec4 {
        let size = self.texture_size(index);
        Vec4::new(
            safe_recip(size.x),
            safe_recip(size.y),
            safe_recip(size.z),
            safe_recip(size.w),
        )
    }

    pub fn packed_texture_size(&self, index: usize) -> Vec4 {
        let size = self.texture_size(index);
        Vec4::new(size.x, size.y, safe_recip(size.x), safe_recip(size.y))
    }

    pub fn uav_size(&self, index: usize) -> Vec4 {
        size_vec(self.job.and_then(|job| job.uav_size(index)))
    }

    pub fn inverse_uav_size(&self, index: usize) -> Vec4 {
        let size = self.uav_size(index);
        Vec4::new(
            safe_recip(size.x),
            safe_recip(size.y),
            safe_recip(size.z),
            safe_recip(size.w),
        )
    }

    pub fn packed_uav_size(&self, index: usize) -> Vec4 {
        let size = self.uav_size(index);
        Vec4::new(size.x, size.y, safe_recip(size.x), safe_recip(size.y))
    }
}

pub(crate) fn inverse_affine(m: Mat4) -> Mat4 {
    Mat4::from(glam::Affine3A::from_mat4(m).inverse())
}

pub(crate) fn depth_range_vec(range: Option<(f32, f32)>) -> Vec4 {
    match range {
        Some((near, far)) if far - near > f32::EPSILON => {
            Vec4::new(near, far, far - near, 1.0 / (far - near))
        }
        _ => DEPTH_RANGE_FALLBACK,
    }
}

fn size_vec(size: Option<[u32; 3]>) -> Vec4 {
    let [w, h, d] = size.unwrap_or([1, 1, 1]);
    let (x, y, z) = (w as f32, h as f32, d as f32);
    Vec4::new(x, y, z, x.max(y).max(z))
}

fn safe_recip(v: f32) -> f32 {
    if v > 0.0 {
        1.0 / v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::TargetKind;
    use crate::scene::transform::Transform;
    use crate::settings::PipelineSettings;
    use glam::Quat;

    fn fixture() -> (RenderBackend, Camera, RenderableState) {
        let backend = RenderBackend::from_settings(&PipelineSettings::default());
        let camera = Camera {
            eye: Vec3::new(4.0, 3.0, 8.0),
            target: Vec3::new(0.0, 1.0, 0.0),
            ..Camera::default()
        };
        let renderable = RenderableState::new(
            Transform::from_trs(
                Vec3::new(1.0, -2.0, 0.5),
                Quat::from_rotation_y(0.7),
                Vec3::splat(1.5),
            )
            .matrix(),
        );
        (backend, camera, renderable)
    }

    #[test]
    fn world_view_projection_is_the_product_of_its_factors() {
        let (backend, camera, renderable) = fixture();
        let mut source = ParamSource::new(&backend);
        source.set_camera(&camera);
        source.set_renderable(&renderable);

        let expected = source.projection_matrix() * source.view_matrix() * source.world_matrix();
        assert!(source
            .world_view_projection_matrix()
            .abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn identity_view_and_projection_flags_bypass_the_camera() {
        let (backend, camera, _) = fixture();
        let screen_space = RenderableState::default().screen_space();
        let mut source = ParamSource::new(&backend);
        source.set_camera(&camera);
        source.set_renderable(&screen_space);

        assert_eq!(source.view_matrix(), Mat4::IDENTITY);
        // Default backend convention is zero-to-one, so the identity is still
        // depth-corrected.
        let expected = backend.convert_projection(Mat4::IDENTITY);
        assert!(source.projection_matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn flipped_target_negates_the_projection_y_row() {
        let (backend_plain, camera, renderable) = fixture();
        let backend_flip = RenderBackend::from_settings(&PipelineSettings {
            flip_offscreen_targets: true,
            ..PipelineSettings::default()
        });
        let offscreen = Viewport::new(512, 512, TargetKind::Offscreen);

        let mut plain = ParamSource::new(&backend_plain);
        plain.set_camera(&camera);
        plain.set_renderable(&renderable);

        let mut flipped = ParamSource::new(&backend_flip);
        flipped.set_camera(&camera);
        flipped.set_renderable(&renderable);
        flipped.set_viewport(&offscreen);

        let a = plain.projection_matrix();
        let b = flipped.projection_matrix();
        assert!(b.row(1).abs_diff_eq(-a.row(1), 1e-6));
        assert!(b.row(0).abs_diff_eq(a.row(0), 1e-6));
        assert!(b.row(2).abs_diff_eq(a.row(2), 1e-6));
    }

    #[test]
    fn inverse_world_matrix_round_trips_points() {
        let (backend, camera, renderable) = fixture();
        let mut source = ParamSource::new(&backend);
        source.set_camera(&camera);
        source.set_renderable(&renderable);

        let p = Vec3::new(0.3, 4.0, -2.0);
        let world = source.world_matrix();
        let back = source
            .inverse_world_matrix()
            .transform_point3(world.transform_point3(p));
        assert!(back.abs_diff_eq(p, 1e-4));
    }

    #[test]
    fn world_matrix_override_is_taken_as_fresh() {
        let (backend, camera, renderable) = fixture();
        let mut source = ParamSource::new(&backend);
        source.set_camera(&camera);
        source.set_renderable(&renderable);

        let forced = [Mat4::from_translation(Vec3::splat(7.0))];
        source.set_world_matrices(&forced);
        assert_eq!(source.world_matrix(), forced[0]);
        assert_eq!(source.world_matrix_count(), 1);
    }

    #[test]
    fn rebinding_the_same_camera_keeps_caches_fresh() {
        let (backend, camera, renderable) = fixture();
        let mut source = ParamSource::new(&backend);
        source.set_camera(&camera);
        source.set_renderable(&renderable);
        let _ = source.world_view_projection_matrix();
        assert!(source.dirty.is_empty() || !source.dirty.contains(Dirty::WORLD_VIEW_PROJ));

        source.set_camera(&camera);
        assert!(!source.dirty.contains(Dirty::WORLD_VIEW_PROJ));
        assert!(!source.dirty.contains(Dirty::VIEW));
    }

    #[test]
    #[should_panic(expected = "camera must be bound")]
    fn querying_the_view_before_binding_a_camera_panics() {
        let backend = RenderBackend::default();
        let mut source = ParamSource::new(&backend);
        let _ = source.view_matrix();
    }

    #[test]
    fn missing_texture_sizes_default_to_unit() {
        let backend = RenderBackend::default();
        let source = ParamSource::new(&backend);
        assert_eq!(source.texture_size(3), Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(source.inverse_texture_size(3), Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(source.uav_size(0), Vec4::new(1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn fog_scale_guards_equal_start_and_end() {
        let backend = RenderBackend::default();
        let mut source = ParamSource::new(&backend);
        source.set_fog(Colour::WHITE, 0.1, 5.0, 5.0);
        assert_eq!(source.fog_params().w, 0.0);

        source.set_fog(Colour::WHITE, 0.1, 5.0, 25.0);
        assert!((source.fog_params().w - 0.05).abs() < 1e-6);
    }

    #[test]
    fn degenerate_scene_depth_range_falls_back_to_safe_values() {
        assert_eq!(depth_range_vec(None), DEPTH_RANGE_FALLBACK);
        assert_eq!(depth_range_vec(Some((5.0, 5.0))), DEPTH_RANGE_FALLBACK);
        let v = depth_range_vec(Some((2.0, 10.0)));
        assert_eq!(v, Vec4::new(2.0, 10.0, 8.0, 0.125));
    }
}
