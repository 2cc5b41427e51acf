use crate::geometry::MeshError;
use crate::resources::ResourceError;
use thiserror::Error;

/// Scene errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    /// An entity with this name already exists
    #[error("{kind} '{name}' already exists")]
    DuplicateName {
        /// Entity kind ("geometry", "light", "camera")
        kind: &'static str,
        /// Conflicting name
        name: String,
    },

    /// The name is reserved by the scene
    #[error("'{0}' is a reserved name")]
    ReservedName(String),

    /// No geometry or model group with this name
    #[error("Geometry '{0}' not found")]
    GeometryNotFound(String),

    /// No named light with this name
    #[error("Light '{0}' not found")]
    LightNotFound(String),

    /// No camera with this name
    #[error("Camera '{0}' not found")]
    CameraNotFound(String),

    /// Geometry data cannot be uploaded
    #[error("Invalid geometry '{name}': {source}")]
    InvalidGeometry {
        /// Geometry name
        name: String,
        /// Validation failure
        source: MeshError,
    },

    /// Spot cone angles are negative, non-finite or inner > outer
    #[error("Invalid cone angles for '{name}': inner {inner}, outer {outer}")]
    InvalidConeAngles {
        /// Light name
        name: String,
        /// Inner angle in radians
        inner: f32,
        /// Outer angle in radians
        outer: f32,
    },

    /// No indirect light resource with this name
    #[error("Indirect light '{0}' not found")]
    UnknownIndirectLight(String),

    /// Resource table failure
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
