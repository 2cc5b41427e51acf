//! # Scene Camera
//!
//! Look-at placement plus a perspective or orthographic projection.
//!
//! ## Conventions
//! - Right-handed, Y-up world space
//! - View and projection matrices are computed on demand; nothing is cached

use crate::foundation::math::{utils, Mat4, Point3, Vec3};
use nalgebra::{Orthographic3, Perspective3};

/// Projection model of a camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in radians
        fov: f32,
        /// Aspect ratio (width / height)
        aspect: f32,
        /// Distance to near clipping plane
        near: f32,
        /// Distance to far clipping plane
        far: f32,
    },
    /// Orthographic projection
    Orthographic {
        /// Left edge of the view volume
        left: f32,
        /// Right edge of the view volume
        right: f32,
        /// Bottom edge of the view volume
        bottom: f32,
        /// Top edge of the view volume
        top: f32,
        /// Distance to near clipping plane
        near: f32,
        /// Distance to far clipping plane
        far: f32,
    },
}

/// Camera placed in the scene with [`Camera::look_at`]
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Projection model
    pub projection: Projection,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            projection: Projection::Perspective {
                fov: utils::deg_to_rad(fov_degrees),
                aspect,
                near,
                far,
            },
        }
    }

    /// Create an orthographic camera looking at the origin
    pub fn orthographic(
        position: Vec3,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            projection: Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            },
        }
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Look at `target` with the given `up` vector
    ///
    /// The up vector does not need to be perpendicular to the view
    /// direction; the view matrix orthonormalizes it.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Update the aspect ratio of a perspective camera
    ///
    /// Orthographic cameras keep their explicit extents.
    pub fn set_aspect_ratio(&mut self, new_aspect: f32) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            if (*aspect - new_aspect).abs() > 0.01 {
                log::debug!("Camera aspect ratio changed: {:.3} -> {:.3}", aspect, new_aspect);
            }
            *aspect = new_aspect;
        }
    }

    /// Unit vector from the camera towards its target
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Vec3::new(0.0, 0.0, -1.0))
    }

    /// World-to-camera transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            &Point3::from(self.position),
            &Point3::from(self.target),
            &self.up,
        )
    }

    /// Camera-to-clip transform
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov, aspect, near, far } => {
                Perspective3::new(aspect, fov, near, far).to_homogeneous()
            }
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                Orthographic3::new(left, right, bottom, top, near, far).to_homogeneous()
            }
        }
    }

    /// Combined projection × view transform
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    /// Perspective camera above and behind the origin, 45° field of view
    fn default() -> Self {
        Self::perspective(Vec3::new(0.0, 3.0, 3.0), 45.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::Vec4;

    #[test]
    fn test_view_matrix_moves_target_onto_negative_z() {
        let camera = Camera::perspective(Vec3::new(0.0, 0.0, 5.0), 60.0, 1.0, 0.1, 100.0);
        let target = camera.view_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(target, Vec4::new(0.0, 0.0, -5.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_forward() {
        let camera = Camera::perspective(Vec3::new(0.0, 0.0, 5.0), 60.0, 1.0, 0.1, 100.0);
        assert_relative_eq!(camera.forward(), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_orthographic_maps_extents_to_ndc() {
        let camera =
            Camera::orthographic(Vec3::new(0.0, 0.0, 1.0), -2.0, 2.0, -1.0, 1.0, 0.1, 10.0);
        let corner = camera.projection_matrix() * Vec4::new(2.0, 1.0, -1.0, 1.0);
        assert_relative_eq!(corner.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_aspect_only_affects_perspective() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(2.0);
        assert!(matches!(
            camera.projection,
            Projection::Perspective { aspect, .. } if aspect == 2.0
        ));

        let mut ortho = Camera::orthographic(Vec3::zeros(), -1.0, 1.0, -1.0, 1.0, 0.1, 10.0);
        let before = ortho.projection;
        ortho.set_aspect_ratio(3.0);
        assert_eq!(ortho.projection, before);
    }
}
