//! Resource handle table
//!
//! The scene never touches GPU objects directly. Buffers, textures, material
//! instances and environment maps are requested from a shared
//! [`ResourceTable`] and referred to by opaque [`ResourceHandle`]s.
//!
//! ```text
//! Scene registries
//!      ↓  acquire / retain / release
//! ResourceTable (shared, reference counted)
//!      ↓
//! GPU allocator (external)
//! ```
//!
//! Every handle the scene acquires is wrapped in an [`OwnedHandle`] so that
//! each removal path releases it exactly once.

mod manager;
mod owned;

pub use manager::{ResourceManager, ResourceTable};
pub use owned::OwnedHandle;

use crate::foundation::math::{Vec3, Vec4};
use crate::material::ShadingModel;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Resource table errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResourceError {
    /// Handle is not (or no longer) present in the table
    #[error("Unknown resource handle: {0}")]
    UnknownHandle(ResourceHandle),

    /// Handle refers to a different kind of resource than expected
    #[error("Resource {handle} is not a {expected:?}")]
    KindMismatch {
        /// Offending handle
        handle: ResourceHandle,
        /// Kind the operation requires
        expected: ResourceKind,
    },

    /// A named resource of the same kind already exists
    #[error("{kind:?} named '{name}' already exists")]
    DuplicateName {
        /// Resource kind
        kind: ResourceKind,
        /// Conflicting name
        name: String,
    },

    /// The table refuses to grow any further
    #[error("Resource capacity exhausted: {max} live resources")]
    CapacityExhausted {
        /// Configured limit
        max: usize,
    },
}

/// Result type for resource table operations
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Category of resource a handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Vertex attribute buffer
    VertexBuffer,
    /// Index buffer
    IndexBuffer,
    /// Sampled texture
    Texture,
    /// Material instance bound to a shader
    MaterialInstance,
    /// Image-based (indirect) light
    IndirectLight,
    /// Skybox cubemap
    Skybox,
}

/// Opaque handle issued by the resource table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    kind: ResourceKind,
    id: u32,
}

impl ResourceHandle {
    pub(crate) const fn new(kind: ResourceKind, id: u32) -> Self {
        Self { kind, id }
    }

    /// Kind of resource this handle refers to
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Raw numeric id, unique within the issuing table
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.kind, self.id)
    }
}

/// Always-valid white texture substituted for unbound channels
pub const DEFAULT_TEXTURE: ResourceHandle = ResourceHandle::new(ResourceKind::Texture, 1);

/// Always-valid flat normal map substituted for an unbound normal channel
pub const DEFAULT_NORMAL_MAP: ResourceHandle = ResourceHandle::new(ResourceKind::Texture, 2);

/// True for the well-known placeholder handles
pub fn is_placeholder(handle: ResourceHandle) -> bool {
    handle == DEFAULT_TEXTURE || handle == DEFAULT_NORMAL_MAP
}

/// Description of a resource to create
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceDescriptor {
    /// Vertex buffer holding `vertex_count` vertices
    VertexBuffer {
        /// Number of vertices
        vertex_count: usize,
    },
    /// Index buffer holding `index_count` indices
    IndexBuffer {
        /// Number of indices
        index_count: usize,
    },
    /// Texture, optionally registered under a lookup name
    Texture {
        /// Lookup name
        name: Option<String>,
    },
    /// Material instance of the given shader
    MaterialInstance {
        /// Shader the instance is created from
        shading_model: ShadingModel,
    },
    /// Named indirect light
    IndirectLight {
        /// Lookup name
        name: String,
    },
    /// Named skybox
    Skybox {
        /// Lookup name
        name: String,
    },
}

impl ResourceDescriptor {
    /// Kind of the resource this descriptor creates
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::VertexBuffer { .. } => ResourceKind::VertexBuffer,
            Self::IndexBuffer { .. } => ResourceKind::IndexBuffer,
            Self::Texture { .. } => ResourceKind::Texture,
            Self::MaterialInstance { .. } => ResourceKind::MaterialInstance,
            Self::IndirectLight { .. } => ResourceKind::IndirectLight,
            Self::Skybox { .. } => ResourceKind::Skybox,
        }
    }

    /// Lookup name, if the resource is named
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Texture { name } => name.as_deref(),
            Self::IndirectLight { name } | Self::Skybox { name } => Some(name),
            _ => None,
        }
    }
}

/// Value pushed into a material instance parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    /// Scalar parameter
    Float(f32),
    /// RGB or direction parameter
    Float3(Vec3),
    /// RGBA parameter
    Float4(Vec4),
    /// Texture sampler parameter
    Texture(ResourceHandle),
}

/// Resource table shared between the scene and other consumers
pub type SharedResources = Arc<Mutex<dyn ResourceTable>>;

/// Lock the shared table, recovering the data from a poisoned mutex
pub fn lock_table(table: &SharedResources) -> MutexGuard<'_, dyn ResourceTable + 'static> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Wrap a concrete table for sharing with a scene
pub fn share<T: ResourceTable + 'static>(table: T) -> Arc<Mutex<T>> {
    Arc::new(Mutex::new(table))
}
