//! Frame submission
//!
//! The scene never rasterizes. Each frame it builds one immutable
//! [`FrameSnapshot`] of what is currently visible and hands it to a
//! [`Renderer`] once per active view.
//!
//! ```text
//! Scene::draw
//!   ├─ begin_frame()        (false = skip this frame)
//!   ├─ render(ViewFrame)    (once per active view)
//!   └─ end_frame()
//! ```
//!
//! [`Scene::render_to_image`](crate::scene::Scene::render_to_image) runs the
//! same sequence for a single offscreen view, then asks the backend for the
//! pixels with [`Renderer::read_pixels`].

mod camera;
mod headless;
mod native;
mod view;

pub use camera::{Camera, Projection};
pub use headless::{HeadlessRenderer, RecordedView};
pub use native::{EntityId, NativeScene, RenderableInstance, TransformManager, TransformNode};
pub use view::{View, ViewHandle, Viewport};

pub use image::RgbaImage;

use crate::foundation::bounds::Aabb;
use crate::foundation::math::Affine3;
use crate::lighting::{DirectionalLight, Light};
use crate::material::ShadingModel;
use crate::resources::ResourceHandle;

/// Renderable included in a frame
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    /// Geometry name
    pub name: String,
    /// Vertex buffer
    pub vertex_buffer: ResourceHandle,
    /// Index buffer
    pub index_buffer: ResourceHandle,
    /// Bound material instance
    pub material: ResourceHandle,
    /// Shader of the material instance
    pub shading_model: ShadingModel,
    /// Mesh-to-world transform
    pub world_transform: Affine3,
    /// World-space bounding box
    pub world_bounds: Aabb,
    /// Whether the renderable casts shadows
    pub cast_shadows: bool,
    /// Whether the renderable receives shadows
    pub receive_shadows: bool,
}

/// Named light included in a frame
#[derive(Debug, Clone, PartialEq)]
pub struct LightItem {
    /// Light name
    pub name: String,
    /// Light parameters
    pub light: Light,
}

/// Image-based light included in a frame
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectLightItem {
    /// Bound indirect light resource
    pub handle: ResourceHandle,
    /// Intensity
    pub intensity: f32,
    /// Environment rotation
    pub rotation: Affine3,
}

/// Everything a backend needs to draw one frame of the scene
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameSnapshot {
    /// Visible renderables
    pub renderables: Vec<DrawItem>,
    /// Enabled named lights
    pub lights: Vec<LightItem>,
    /// The sun, when enabled
    pub sun: Option<DirectionalLight>,
    /// Indirect light, when bound, enabled and resolvable
    pub indirect_light: Option<IndirectLightItem>,
    /// Skybox, when shown and resolvable
    pub skybox: Option<ResourceHandle>,
}

impl FrameSnapshot {
    /// Names of the renderables in submission order
    pub fn renderable_names(&self) -> Vec<&str> {
        self.renderables.iter().map(|r| r.name.as_str()).collect()
    }

    /// Names of the named lights in submission order
    pub fn light_names(&self) -> Vec<&str> {
        self.lights.iter().map(|l| l.name.as_str()).collect()
    }
}

/// One view's worth of work for the backend
#[derive(Debug, Clone, Copy)]
pub struct ViewFrame<'a> {
    /// Handle of the view being drawn
    pub handle: ViewHandle,
    /// View settings
    pub view: &'a View,
    /// Name of the camera the view looks through
    pub camera_name: &'a str,
    /// Camera the view looks through
    pub camera: &'a Camera,
    /// Scene contents, shared by every view of the frame
    pub snapshot: &'a FrameSnapshot,
}

/// Rendering backend consuming scene frames
pub trait Renderer {
    /// Start a frame; returning false skips it
    fn begin_frame(&mut self) -> bool;

    /// Draw one view of the current frame
    fn render(&mut self, frame: &ViewFrame<'_>);

    /// Finish the frame
    fn end_frame(&mut self);

    /// Read back the pixels of `viewport` from the last finished frame
    ///
    /// Backends without readback return `None`.
    fn read_pixels(&mut self, viewport: Viewport) -> Option<RgbaImage> {
        log::debug!("Renderer has no readback for {:?}", viewport);
        None
    }
}
