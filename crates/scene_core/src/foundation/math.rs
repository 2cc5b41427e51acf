//! Math utilities and types
//!
//! Provides the fundamental math types shared by the scene registries.
//! Placement state is stored as a full 3D affine transform so that
//! rotation, translation and non-uniform scale round-trip exactly.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// 3D affine transform (rotation, translation, non-uniform scale)
pub type Affine3 = nalgebra::Affine3<f32>;

/// Build an affine transform from a raw homogeneous matrix.
///
/// The last row is forced to `[0, 0, 0, 1]`.
pub fn affine_from_matrix(mut matrix: Mat4) -> Affine3 {
    matrix[(3, 0)] = 0.0;
    matrix[(3, 1)] = 0.0;
    matrix[(3, 2)] = 0.0;
    matrix[(3, 3)] = 1.0;
    Affine3::from_matrix_unchecked(matrix)
}

/// Translation-only affine transform
pub fn affine_translation(offset: Vec3) -> Affine3 {
    affine_from_matrix(Mat4::new_translation(&offset))
}

/// Transform described as position, rotation, and scale
///
/// Convenience builder for placement transforms; the scene itself stores
/// the resulting [`Affine3`].
#[derive(Debug, Clone, PartialEq)]
pub struct Trs {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Trs {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Set the scale factors
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Convert to an affine transform
    pub fn to_affine(&self) -> Affine3 {
        affine_from_matrix(self.to_matrix())
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}
