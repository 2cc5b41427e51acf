//! Scene demo application
//!
//! Builds a small scene (a textured model, a few lights, an environment and
//! two views), renders a few frames through the headless renderer and logs
//! what each frame submitted.
//!
//! Usage: `scene_demo [config.toml|config.ron]`

use scene_core::config::{Config, ConfigError, SceneConfig};
use scene_core::foundation::logging;
use scene_core::foundation::math::{affine_translation, Quat, Trs, Vec3};
use scene_core::geometry::{MeshData, Model};
use scene_core::lighting::ConeAngles;
use scene_core::material::{LitParameters, Material, TextureChannel};
use scene_core::render::{Camera, HeadlessRenderer};
use scene_core::resources::{share, ResourceError, ResourceManager};
use scene_core::scene::{Scene, SceneError};
use thiserror::Error;

#[derive(Debug, Error)]
enum DemoError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("scene: {0}")]
    Scene(#[from] SceneError),
    #[error("resources: {0}")]
    Resource(#[from] ResourceError),
}

fn load_config() -> Result<SceneConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading scene config from {}", path);
            SceneConfig::load_from_file(&path)
        }
        None => Ok(SceneConfig::default()),
    }
}

fn build_scene(scene: &mut Scene) -> Result<(), SceneError> {
    let mut model = Model::new();
    let painted = model.add_material(
        Material::lit(LitParameters {
            metallic: 0.8,
            roughness: 0.3,
            ..Default::default()
        })
        .with_name("painted")
        .with_texture(TextureChannel::Albedo, "paint")
        .with_texture(TextureChannel::Normal, "paint_normal"),
    );
    let glass = model.add_material(Material::unlit(Default::default()).with_name("glass"));
    model.add_mesh("body", MeshData::cube(2.0), painted);
    model.add_mesh("cabin", MeshData::cube(1.0), glass);
    scene.add_model("car", &model)?;
    scene.set_geometry_transform("car", &affine_translation(Vec3::new(0.0, 1.0, 0.0)));

    scene.add_geometry("ground", &MeshData::cube(20.0), &Material::default())?;
    scene.set_geometry_transform(
        "ground",
        &Trs::from_position(Vec3::new(0.0, -10.0, 0.0)).to_affine(),
    );
    scene.geometry_shadows("ground", false, true);

    scene.add_point_light(
        "fill",
        Vec3::new(1.0, 0.9, 0.8),
        Vec3::new(3.0, 4.0, 3.0),
        20_000.0,
        15.0,
        false,
    )?;
    scene.add_spot_light(
        "headlight",
        Vec3::new(1.0, 1.0, 0.9),
        Vec3::new(0.0, 1.0, 1.5),
        Vec3::new(0.0, -0.2, 1.0),
        50_000.0,
        25.0,
        ConeAngles::from_degrees(15.0, 30.0),
        true,
    )?;
    scene.set_indirect_light("studio")?;
    scene.show_skybox(true);

    scene.add_view(0, 0, 1280, 720);
    let overlay = scene.add_view(960, 540, 320, 180);
    if let Some(view) = scene.view_mut(overlay) {
        view.shadowing = false;
    }

    let mut main = Camera::perspective(Vec3::new(6.0, 4.0, 8.0), 60.0, 16.0 / 9.0, 0.1, 200.0);
    main.look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
    scene.add_camera("main", main)?;
    let top = Camera::orthographic(
        Vec3::new(0.0, 20.0, 0.01),
        -10.0,
        10.0,
        -10.0,
        10.0,
        0.1,
        50.0,
    );
    scene.add_camera("top", top)?;
    scene.set_active_camera("main")?;
    Ok(())
}

fn log_frame(renderer: &HeadlessRenderer) {
    let Some(frame) = renderer.last_frame() else {
        log::warn!("No frame recorded");
        return;
    };
    for view in frame {
        let snapshot = &view.snapshot;
        log::info!(
            "view {:?} ({}x{}) via '{}': {} renderables {:?}, lights {:?}, sun {}, ibl {}, skybox {}",
            view.handle,
            view.viewport.width,
            view.viewport.height,
            view.camera_name,
            snapshot.renderables.len(),
            snapshot.renderable_names(),
            snapshot.light_names(),
            snapshot.sun.is_some(),
            snapshot.indirect_light.is_some(),
            snapshot.skybox.is_some(),
        );
    }
}

fn run() -> Result<(), DemoError> {
    let config = load_config()?;
    let resources = share(ResourceManager::with_config(config.resources.clone()));
    {
        let mut table = resources.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        table.register_texture("paint")?;
        table.register_texture("paint_normal")?;
        table.register_indirect_light("studio")?;
        table.register_skybox("studio")?;
    }

    let mut scene = Scene::with_config(resources.clone(), config);
    build_scene(&mut scene)?;
    log::info!("Scene ready: {:?}", scene);

    let mut renderer = HeadlessRenderer::new();
    for frame in 0..3u8 {
        let angle = f32::from(frame) * 0.5;
        scene.set_geometry_transform(
            "car",
            &Trs::from_position_rotation(
                Vec3::new(0.0, 1.0, 0.0),
                Quat::from_axis_angle(&Vec3::y_axis(), angle),
            )
            .to_affine(),
        );
        scene.draw(&mut renderer);
        log_frame(&renderer);
    }

    log::info!("Switching every geometry to the normals shader");
    scene.override_material_all(&Material::normals(), true);
    scene.show_geometry("car:cabin", false);
    scene.enable_directional_light(false);
    scene.draw(&mut renderer);
    log_frame(&renderer);

    let captured = scene.render_to_image(&mut renderer, 320, 180, |image| {
        log::info!("Captured {}x{} image", image.width(), image.height());
    });
    if !captured {
        log::warn!("Offscreen capture skipped");
    }

    let bounds = scene.geometry_bounding_box("car")?;
    log::info!("Car bounds: center {:?}, extents {:?}", bounds.center(), bounds.extents());

    scene.remove_geometry("car");
    log::info!("Remaining geometry: {:?}", scene.query_geometry());
    Ok(())
}

fn main() {
    logging::init();
    if let Err(e) = run() {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}
