//! Drives one frame of parameter resolution against a small hand-built scene
//! and logs the resolved values.

use autoparams::params::GpuLightArray;
use autoparams::scene::{Attenuation, Transform};
use autoparams::{
    Camera, Colour, FrameClock, Light, ParamSource, PipelineSettings, Projector, RenderBackend,
    RenderableState, TargetKind, Viewport,
};
use glam::{Quat, Vec3};

fn main() {
    autoparams::init_logging();

    let settings = PipelineSettings::load();
    let backend = RenderBackend::from_settings(&settings);

    let camera = Camera {
        eye: Vec3::new(6.0, 4.0, 10.0),
        target: Vec3::ZERO,
        ..Camera::default()
    };
    let renderable = RenderableState::new(
        Transform::from_trs(
            Vec3::new(0.0, 1.0, 0.0),
            Quat::from_rotation_y(0.6),
            Vec3::splat(2.0),
        )
        .matrix(),
    );
    let sun = Light::directional(
        Vec3::new(-0.3, -1.0, -0.2),
        Colour::new(1.0, 0.96, 0.88, 1.0),
        Colour::WHITE,
    );
    let lamp = Light::spot(
        Vec3::new(2.0, 6.0, 2.0),
        Vec3::new(-0.2, -1.0, -0.2),
        Colour::new(1.0, 0.85, 0.6, 1.0),
        25f32.to_radians(),
        40f32.to_radians(),
        1.0,
    );
    let fill = Light::point(
        Vec3::new(-4.0, 2.0, 1.0),
        Colour::new(0.4, 0.45, 0.6, 1.0),
        Colour::BLACK,
        Attenuation {
            range: 12.0,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        },
    );
    let lights: Vec<&Light> = vec![&sun, &lamp, &fill];
    let viewport = Viewport::new(1280, 720, TargetKind::Backbuffer);
    let shadow_projector = Projector {
        position: lamp.position,
        direction: lamp.direction,
        fov_y_radians: lamp.outer_cone_angle,
        aspect: 1.0,
        near: camera.near,
        far: 60.0,
    };
    let mut clock = FrameClock::new();
    clock.tick();

    let mut source = ParamSource::new(&backend);
    source.set_camera(&camera);
    source.set_viewport(&viewport);
    source.set_renderable(&renderable);
    source.set_light_list(&lights);
    source.set_texture_projector(1, Some(&shadow_projector));
    source.set_time_source(&clock);
    source.set_ambient_light(
        [Colour::new(0.3, 0.35, 0.45, 1.0), Colour::new(0.1, 0.09, 0.08, 1.0)],
        Vec3::Y,
    );
    source.set_fog(Colour::grey(0.6), 0.0, 20.0, 90.0);
    source.set_shadow_extrusion_distance(settings.shadow_extrusion_distance);

    log::info!("world-view-proj: {:?}", source.world_view_projection_matrix());
    log::info!("camera position: {:?}", source.camera_position());
    log::info!(
        "camera position (object space): {:?}",
        source.camera_position_object_space()
    );
    log::info!("light count: {}", source.light_count());
    log::info!("spotlight params[1]: {:?}", source.spotlight_params(1));
    log::info!(
        "spotlight view-proj[1]: {:?}",
        source.spotlight_view_proj_matrix(1)
    );
    log::info!(
        "texture view-proj[1]: {:?}",
        source.texture_view_proj_matrix(1)
    );
    log::info!("fog params: {:?}", source.fog_params());
    log::info!("time packed (period 4s): {:?}", source.time_0_x_packed(4.0));

    let light_array = GpuLightArray::gather(&source);
    log::info!(
        "packed light array: {} active of {} slots",
        light_array.counts[0],
        light_array.lights.len()
    );
}
