//! # Scene Core
//!
//! Named-entity scene graph manager for a real-time 3D renderer.
//!
//! Keeps the mapping between the objects an application refers to by name
//! (geometry, lights, cameras, views, environment lighting) and the
//! reference-counted backend resources a renderer consumes each frame.
//!
//! ## Features
//!
//! - **Named registries**: geometry, model groups, point/spot lights, cameras
//! - **Material binding**: lit, unlit, normal and depth shaders with per-channel texture maps
//! - **Scope-guarded resources**: every acquired handle is released exactly once
//! - **Frame snapshots**: one immutable snapshot per frame, submitted per active view
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_core::prelude::*;
//!
//! let resources = share(ResourceManager::new());
//! let mut scene = Scene::new(resources);
//!
//! scene.add_geometry("cube", &MeshData::cube(1.0), &Material::default())?;
//! scene.set_geometry_transform("cube", &affine_translation(Vec3::new(5.0, 0.0, 0.0)));
//! assert_eq!(scene.query_geometry(), vec!["cube".to_string()]);
//!
//! scene.add_view(0, 0, 1280, 720);
//! scene.add_camera("main", Camera::default())?;
//! scene.set_active_camera("main")?;
//!
//! let mut renderer = HeadlessRenderer::new();
//! scene.draw(&mut renderer);
//! assert_eq!(renderer.frame_count(), 1);
//! # Ok::<(), SceneError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod geometry;
pub mod lighting;
pub mod material;
pub mod render;
pub mod resources;
pub mod scene;

/// Common imports for scene users
pub mod prelude {
    pub use crate::{
        config::{Config, SceneConfig},
        foundation::{
            bounds::Aabb,
            math::{affine_translation, Affine3, Quat, Trs, Vec3, Vec4},
        },
        geometry::{MeshData, Model, PrimitiveType, Vertex},
        lighting::{ConeAngles, DirectionalLight, Light, LightKind},
        material::{Material, Shader, ShadingModel, TextureChannel},
        render::{Camera, FrameSnapshot, HeadlessRenderer, Renderer, ViewFrame, ViewHandle},
        resources::{share, ResourceManager, ResourceTable, SharedResources},
        scene::{Scene, SceneError, SceneResult},
    };
}
