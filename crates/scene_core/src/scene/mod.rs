//! Scene facade
//!
//! [`Scene`] owns every registry of a scene and is the only public entry
//! point for mutating it.
//!
//! ```text
//! Scene (names, validation)
//!   ├─ GeometryRegistry ── material binding ──┐
//!   ├─ LightRegistry + sun                    ├─ ResourceTable (shared)
//!   ├─ Environment (weak IBL/skybox relation) ┘
//!   ├─ ViewManager (views, cameras)
//!   └─ NativeScene (backend entities, transform nodes)
//! ```
//!
//! Name lookups that must produce a value return [`SceneResult`]. Calls that
//! only mutate (remove, show, shadows, transform writes) log a warning for
//! unknown names and do nothing.

mod environment;
mod error;
mod geometry;
mod lights;
mod views;


pub use environment::Environment;
pub use error::{SceneError, SceneResult};
pub use geometry::{
    GeometryBuffers, GeometryId, GeometryRegistry, RenderableGeometry, MODEL_PART_SEPARATOR,
};
pub use lights::{LightEntity, LightId, LightRegistry, SUN_LIGHT_NAME};
pub use views::ViewManager;

use crate::config::SceneConfig;
use crate::foundation::bounds::Aabb;
use crate::foundation::math::{Affine3, Vec3};
use crate::geometry::{MeshData, Model};
use crate::lighting::{ConeAngles, DirectionalLight, Light};
use crate::material::{GeometryMaterialInstance, Material};
use crate::render::{
    Camera, DrawItem, FrameSnapshot, LightItem, NativeScene, Renderer, View, ViewFrame, ViewHandle,
    Viewport,
};
use crate::resources::{lock_table, SharedResources};
use image::RgbaImage;

/// A renderable scene: geometry, lights, environment, views and cameras
pub struct Scene {
    resources: SharedResources,
    native: NativeScene,
    geometries: GeometryRegistry,
    lights: LightRegistry,
    sun: DirectionalLight,
    environment: Environment,
    views: ViewManager,
    config: SceneConfig,
}

impl Scene {
    /// Create a scene with default configuration
    pub fn new(resources: SharedResources) -> Self {
        Self::with_config(resources, SceneConfig::default())
    }

    /// Create a scene with custom configuration
    pub fn with_config(resources: SharedResources, config: SceneConfig) -> Self {
        log::debug!("Creating Scene with config: {:?}", config);
        Self {
            resources,
            native: NativeScene::new(),
            geometries: GeometryRegistry::new(),
            lights: LightRegistry::new(),
            sun: Self::create_sun_directional_light(&config),
            environment: Environment::new(&config.environment),
            views: ViewManager::new(config.views.clone()),
            config,
        }
    }

    fn create_sun_directional_light(config: &SceneConfig) -> DirectionalLight {
        let sun = DirectionalLight::from(&config.sun);
        log::debug!("Created sun light: direction {:?}", sun.direction);
        sun
    }

    /// Configuration the scene was created with
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Resource table the scene acquires from
    pub fn resources(&self) -> &SharedResources {
        &self.resources
    }

    /// Backend-side entity and transform state
    pub fn native_scene(&self) -> &NativeScene {
        &self.native
    }

    // ===== Views and cameras =====

    /// Create an active view over the given viewport rectangle
    pub fn add_view(&mut self, x: i32, y: i32, width: u32, height: u32) -> ViewHandle {
        self.views.add_view(x, y, width, height)
    }

    /// View behind `handle`; `None` for unknown handles
    pub fn view(&self, handle: ViewHandle) -> Option<&View> {
        self.views.view(handle)
    }

    /// Mutable view behind `handle`
    pub fn view_mut(&mut self, handle: ViewHandle) -> Option<&mut View> {
        self.views.view_mut(handle)
    }

    /// Activate or deactivate a view
    pub fn set_view_active(&mut self, handle: ViewHandle, active: bool) {
        if !self.views.set_view_active(handle, active) {
            log::warn!("SetViewActive: unknown view {:?}", handle);
        }
    }

    /// Whether a view is active; `None` for unknown handles
    pub fn is_view_active(&self, handle: ViewHandle) -> Option<bool> {
        self.views.is_view_active(handle)
    }

    /// Remove a view
    pub fn remove_view(&mut self, handle: ViewHandle) {
        if !self.views.remove_view(handle) {
            log::warn!("RemoveView: unknown view {:?}", handle);
        }
    }

    /// Number of views
    pub fn view_count(&self) -> usize {
        self.views.view_count()
    }

    /// Register a camera
    pub fn add_camera(&mut self, name: &str, camera: Camera) -> SceneResult<()> {
        self.views.add_camera(name, camera)
    }

    /// Remove a camera
    pub fn remove_camera(&mut self, name: &str) {
        if !self.views.remove_camera(name) {
            log::warn!("RemoveCamera: camera '{}' not found", name);
        }
    }

    /// Make `name` the active camera; unknown names are an error
    pub fn set_active_camera(&mut self, name: &str) -> SceneResult<()> {
        self.views.set_active_camera(name)
    }

    /// The active camera
    pub fn active_camera(&self) -> Option<&Camera> {
        self.views.active_camera().map(|(_, camera)| camera)
    }

    /// Name of the active camera
    pub fn active_camera_name(&self) -> Option<&str> {
        self.views.active_camera().map(|(name, _)| name)
    }

    /// Camera registered under `name`
    pub fn camera(&self, name: &str) -> Option<&Camera> {
        self.views.camera(name)
    }

    /// Mutable camera registered under `name`
    pub fn camera_mut(&mut self, name: &str) -> Option<&mut Camera> {
        self.views.camera_mut(name)
    }

    // ===== Geometry =====

    /// Add a geometry; fails if `name` is taken
    pub fn add_geometry(
        &mut self,
        name: &str,
        mesh: &MeshData,
        material: &Material,
    ) -> SceneResult<()> {
        self.geometries
            .add(&mut self.native, &self.resources, name, mesh, material)
            .map(|_| ())
            .map_err(|e| {
                log::warn!("AddGeometry '{}': {}", name, e);
                e
            })
    }

    /// Add every mesh of `model` as `<name>:<mesh>`, grouped under `name`
    ///
    /// Returns the part names. Group-level calls (remove, show, shadows,
    /// transform, material override) apply to every part.
    pub fn add_model(&mut self, name: &str, model: &Model) -> SceneResult<Vec<String>> {
        self.geometries
            .add_model(&mut self.native, &self.resources, name, model)
            .map_err(|e| {
                log::warn!("AddModel '{}': {}", name, e);
                e
            })
    }

    /// Remove a geometry or model group, releasing everything it owns
    pub fn remove_geometry(&mut self, name: &str) {
        if !self.geometries.remove(&mut self.native, name) {
            log::warn!("RemoveGeometry: geometry '{}' not found", name);
        }
    }

    /// Show or hide a geometry
    pub fn show_geometry(&mut self, name: &str, show: bool) {
        if !self.geometries.show(&mut self.native, name, show) {
            log::warn!("ShowGeometry: geometry '{}' not found", name);
        }
    }

    /// Set shadow casting and receiving
    pub fn geometry_shadows(&mut self, name: &str, cast_shadows: bool, receive_shadows: bool) {
        if !self
            .geometries
            .set_shadows(&mut self.native, name, cast_shadows, receive_shadows)
        {
            log::warn!("GeometryShadows: geometry '{}' not found", name);
        }
    }

    /// Write the placement transform
    pub fn set_geometry_transform(&mut self, name: &str, transform: &Affine3) {
        if !self.geometries.set_transform(&mut self.native, name, transform) {
            log::warn!("SetGeometryTransform: geometry '{}' not found", name);
        }
    }

    /// Read the placement transform
    pub fn geometry_transform(&self, name: &str) -> SceneResult<Affine3> {
        self.geometries.transform(&self.native, name)
    }

    /// World-space bounding box under the current transform
    pub fn geometry_bounding_box(&self, name: &str) -> SceneResult<Aabb> {
        self.geometries.bounding_box(&self.native, name)
    }

    /// Rebind the material of a geometry or model group
    ///
    /// With `shader_only` the texture maps are kept and only the shader
    /// and its parameters change.
    pub fn override_material(
        &mut self,
        name: &str,
        material: &Material,
        shader_only: bool,
    ) -> SceneResult<()> {
        self.geometries
            .override_material(&mut self.native, &self.resources, name, material, shader_only)
    }

    /// Rebind the material of every geometry
    ///
    /// Each geometry is rebound independently; failures are logged and the
    /// remaining geometries are still processed.
    pub fn override_material_all(&mut self, material: &Material, shader_only: bool) {
        let failures = self.geometries.override_material_all(
            &mut self.native,
            &self.resources,
            material,
            shader_only,
        );
        if failures > 0 {
            log::warn!(
                "OverrideMaterialAll: {} of {} geometries failed",
                failures,
                self.geometries.len()
            );
        }
    }

    /// Names of all geometries
    pub fn query_geometry(&self) -> Vec<String> {
        self.geometries.names()
    }

    /// True if `name` is a geometry or a model group
    pub fn has_geometry(&self, name: &str) -> bool {
        self.geometries.contains(name)
    }

    /// Part names of a model group
    pub fn model_parts(&self, name: &str) -> Option<Vec<String>> {
        self.geometries.group_parts(name)
    }

    /// Bound material of a geometry
    pub fn geometry_material(&self, name: &str) -> Option<&GeometryMaterialInstance> {
        self.geometries.get(name).map(|g| &g.material)
    }

    /// Mesh buffers of a geometry
    pub fn geometry_buffers(&self, name: &str) -> Option<GeometryBuffers> {
        self.geometries.buffers(name)
    }

    /// Whether a geometry is shown
    pub fn is_geometry_visible(&self, name: &str) -> Option<bool> {
        self.geometries.get(name).map(|g| g.visible)
    }

    /// Cast and receive shadow flags of a geometry
    pub fn geometry_shadow_flags(&self, name: &str) -> Option<(bool, bool)> {
        self.geometries
            .get(name)
            .map(|g| (g.cast_shadows, g.receive_shadows))
    }

    // ===== Named lights =====

    /// Add a point or spot light
    pub fn add_light(&mut self, name: &str, light: Light) -> SceneResult<()> {
        self.lights.add(&mut self.native, name, light).map_err(|e| {
            log::warn!("AddLight '{}': {}", name, e);
            e
        })
    }

    /// Add a point light
    pub fn add_point_light(
        &mut self,
        name: &str,
        color: Vec3,
        position: Vec3,
        intensity: f32,
        falloff: f32,
        cast_shadows: bool,
    ) -> SceneResult<()> {
        let light = Light::point(position, color, intensity, falloff).with_shadows(cast_shadows);
        self.add_light(name, light)
    }

    /// Add a spot light; `cone` must satisfy `0 <= inner <= outer`
    pub fn add_spot_light(
        &mut self,
        name: &str,
        color: Vec3,
        position: Vec3,
        direction: Vec3,
        intensity: f32,
        falloff: f32,
        cone: ConeAngles,
        cast_shadows: bool,
    ) -> SceneResult<()> {
        let light = Light::spot(position, direction, color, intensity, falloff, cone)
            .with_shadows(cast_shadows);
        self.add_light(name, light)
    }

    /// Parameters of a named light
    pub fn get_light(&self, name: &str) -> SceneResult<Light> {
        self.lights.get(&self.native, name)
    }

    /// Remove a named light
    pub fn remove_light(&mut self, name: &str) {
        if name == SUN_LIGHT_NAME {
            log::warn!("RemoveLight: the sun cannot be removed, disable it instead");
            return;
        }
        if !self.lights.remove(&mut self.native, name) {
            log::warn!("RemoveLight: light '{}' not found", name);
        }
    }

    /// Replace every parameter of a named light
    pub fn update_light(&mut self, name: &str, light: &Light) {
        self.lights.update(&mut self.native, name, light);
    }

    /// Set the color of a named light
    pub fn update_light_color(&mut self, name: &str, color: Vec3) {
        self.lights.update_color(&mut self.native, name, color);
    }

    /// Set the position of a named light
    pub fn update_light_position(&mut self, name: &str, position: Vec3) {
        self.lights.update_position(&mut self.native, name, position);
    }

    /// Set the direction of a spot light
    pub fn update_light_direction(&mut self, name: &str, direction: Vec3) {
        self.lights.update_direction(&mut self.native, name, direction);
    }

    /// Set the intensity of a named light
    pub fn update_light_intensity(&mut self, name: &str, intensity: f32) {
        self.lights.update_intensity(&mut self.native, name, intensity);
    }

    /// Set the falloff distance of a named light
    pub fn update_light_falloff(&mut self, name: &str, falloff: f32) {
        self.lights.update_falloff(&mut self.native, name, falloff);
    }

    /// Set the cone angles of a spot light
    pub fn update_light_cone_angles(&mut self, name: &str, cone: ConeAngles) {
        self.lights.update_cone_angles(&mut self.native, name, cone);
    }

    /// Toggle shadow casting of a named light
    pub fn enable_light_shadow(&mut self, name: &str, cast_shadows: bool) {
        self.lights.set_cast_shadows(&mut self.native, name, cast_shadows);
    }

    /// Enable or disable a named light without removing it
    pub fn enable_light(&mut self, name: &str, enable: bool) {
        if !self.lights.set_enabled(name, enable) {
            log::warn!("EnableLight: light '{}' not found", name);
        }
    }

    /// Whether a named light is enabled
    pub fn is_light_enabled(&self, name: &str) -> Option<bool> {
        self.lights.is_enabled(name)
    }

    /// Names of all named lights; the sun is not included
    pub fn light_names(&self) -> Vec<String> {
        self.lights.names()
    }

    // ===== Sun =====

    /// Set direction, color and intensity of the sun
    pub fn set_directional_light(&mut self, direction: Vec3, color: Vec3, intensity: f32) {
        self.sun.set_direction(direction);
        self.sun.color = color;
        self.sun.intensity = intensity;
    }

    /// Enable or disable the sun
    pub fn enable_directional_light(&mut self, enable: bool) {
        self.sun.enabled = enable;
    }

    /// Toggle sun shadows
    pub fn enable_directional_light_shadows(&mut self, enable: bool) {
        self.sun.cast_shadows = enable;
    }

    /// Point the sun along `direction`
    pub fn set_directional_light_direction(&mut self, direction: Vec3) {
        self.sun.set_direction(direction);
    }

    /// Direction the sun light travels in
    pub fn directional_light_direction(&self) -> Vec3 {
        self.sun.direction
    }

    /// The sun
    pub fn directional_light(&self) -> &DirectionalLight {
        &self.sun
    }

    // ===== Environment =====

    /// Bind the indirect light registered as `name`
    pub fn set_indirect_light(&mut self, name: &str) -> SceneResult<()> {
        self.environment
            .set_indirect_light(&self.resources, name)
            .map_err(|e| {
                log::warn!("SetIndirectLight: {}", e);
                e
            })
    }

    /// Name of the bound indirect light; empty when none is bound
    pub fn indirect_light(&self) -> &str {
        self.environment.indirect_light()
    }

    /// Enable or disable the bound indirect light
    pub fn enable_indirect_light(&mut self, enable: bool) {
        self.environment.enable_indirect_light(enable);
    }

    /// Set the intensity of the bound indirect light
    pub fn set_indirect_light_intensity(&mut self, intensity: f32) {
        self.environment.set_intensity(intensity);
    }

    /// Intensity of the indirect light
    pub fn indirect_light_intensity(&self) -> f32 {
        self.environment.intensity()
    }

    /// Set the rotation of the bound indirect light
    pub fn set_indirect_light_rotation(&mut self, rotation: &Affine3) {
        self.environment.set_rotation(*rotation);
    }

    /// Rotation of the indirect light
    pub fn indirect_light_rotation(&self) -> Affine3 {
        self.environment.rotation()
    }

    /// Show or hide the skybox
    pub fn show_skybox(&mut self, show: bool) {
        self.environment.show_skybox(show);
    }

    /// Environment state
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    // ===== Frame submission =====

    /// Snapshot of what a frame would draw right now
    pub fn snapshot(&self) -> FrameSnapshot {
        let renderables = self
            .geometries
            .iter()
            .filter_map(|g| {
                let instance = self.native.renderable(g.entity)?;
                instance.visible.then(|| DrawItem {
                    name: g.name.clone(),
                    vertex_buffer: instance.vertex_buffer,
                    index_buffer: instance.index_buffer,
                    material: instance.material,
                    shading_model: g.material.properties.shading_model(),
                    world_transform: g.world_transform(&self.native),
                    world_bounds: g.world_bounds(&self.native),
                    cast_shadows: instance.cast_shadows,
                    receive_shadows: instance.receive_shadows,
                })
            })
            .collect();

        let lights = self
            .lights
            .iter()
            .filter(|l| l.enabled)
            .filter_map(|l| {
                self.native.light(l.entity).map(|light| LightItem {
                    name: l.name.clone(),
                    light: light.clone(),
                })
            })
            .collect();

        let (indirect_light, skybox) = {
            let table = lock_table(&self.resources);
            (
                self.environment.resolve_indirect_light(&*table),
                self.environment.resolve_skybox(&*table),
            )
        };

        FrameSnapshot {
            renderables,
            lights,
            sun: self.sun.enabled.then(|| self.sun.clone()),
            indirect_light,
            skybox,
        }
    }

    /// Submit the current scene to `renderer`, once per active view
    ///
    /// Reads state only. The frame is skipped when no camera is active or
    /// the renderer declines it.
    pub fn draw(&self, renderer: &mut dyn Renderer) {
        let Some((camera_name, camera)) = self.views.active_camera() else {
            log::warn!("Draw: no active camera, skipping frame");
            return;
        };
        if !renderer.begin_frame() {
            log::trace!("Renderer skipped frame");
            return;
        }

        let snapshot = self.snapshot();
        for (handle, view) in self.views.active_views() {
            renderer.render(&ViewFrame {
                handle,
                view,
                camera_name,
                camera,
                snapshot: &snapshot,
            });
        }
        renderer.end_frame();
    }

    /// Draw one frame offscreen at `width` x `height` and pass the pixels to
    /// `callback`
    ///
    /// The frame goes through a temporary view with the configured view
    /// defaults, seen by the active camera at the image's aspect ratio.
    /// Returns false, without calling `callback`, when no camera is active,
    /// the size is empty, the renderer skips the frame or it cannot read
    /// pixels back.
    pub fn render_to_image<F>(
        &self,
        renderer: &mut dyn Renderer,
        width: u32,
        height: u32,
        callback: F,
    ) -> bool
    where
        F: FnOnce(RgbaImage),
    {
        let Some((camera_name, camera)) = self.views.active_camera() else {
            log::warn!("RenderToImage: no active camera");
            return false;
        };
        if width == 0 || height == 0 {
            log::warn!("RenderToImage: empty image size {}x{}", width, height);
            return false;
        }
        if !renderer.begin_frame() {
            log::trace!("Renderer skipped offscreen frame");
            return false;
        }

        let view = View::new(Viewport::new(0, 0, width, height), &self.config.views);
        let mut camera = camera.clone();
        camera.set_aspect_ratio(view.viewport.aspect_ratio());
        let snapshot = self.snapshot();
        renderer.render(&ViewFrame {
            handle: ViewHandle::default(),
            view: &view,
            camera_name,
            camera: &camera,
            snapshot: &snapshot,
        });
        renderer.end_frame();

        match renderer.read_pixels(view.viewport) {
            Some(image) => {
                callback(image);
                true
            }
            None => {
                log::warn!("RenderToImage: renderer returned no pixels");
                false
            }
        }
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("geometries", &self.geometries.len())
            .field("lights", &self.lights.len())
            .field("views", &self.views.view_count())
            .field("indirect_light", &self.environment.indirect_light())
            .finish()
    }
}
