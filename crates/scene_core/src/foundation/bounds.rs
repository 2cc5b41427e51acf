//! Axis-aligned bounding boxes
//!
//! Geometry keeps its mesh-space box; world-space boxes are derived on
//! demand by pushing the eight corners through the current transform.

use crate::foundation::math::{Affine3, Point3, Vec3};

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The empty box; merging anything into it yields that thing
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Smallest box enclosing all `points`; empty when there are none
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        points.into_iter().fold(Self::empty(), |mut aabb, p| {
            aabb.min = aabb.min.inf(p);
            aabb.max = aabb.max.sup(p);
            aabb
        })
    }

    /// True if the box encloses no point
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Union of two boxes
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..3).all(|i| self.min[i] <= point[i] && point[i] <= self.max[i])
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Box enclosing this box after applying `transform`
    pub fn transformed(&self, transform: &Affine3) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let corners = self
            .corners()
            .map(|c| (transform * Point3::from(c)).coords);
        Aabb::from_points(corners.iter())
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{affine_translation, Quat, Trs};
    use approx::assert_relative_eq;

    fn unit_cube() -> Aabb {
        Aabb::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_aabb_contains_point() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        assert!(aabb.contains_point(Vec3::zeros()));
        assert!(aabb.contains_point(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_from_points() {
        let points = [Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 3.0, 4.0)];
        let aabb = Aabb::from_points(points.iter());
        assert_relative_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_relative_eq!(aabb.max, Vec3::new(1.0, 3.0, 4.0));
        assert!(Aabb::from_points(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_translated_box_moves_center() {
        let moved = unit_cube().transformed(&affine_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert_relative_eq!(moved.center(), Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(moved.extents(), Vec3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_rotated_box_grows() {
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_4);
        let transform = Trs::from_position_rotation(Vec3::zeros(), rotation).to_affine();
        let rotated = unit_cube().transformed(&transform);
        let half_diagonal = 0.5 * std::f32::consts::SQRT_2;
        assert_relative_eq!(rotated.max.x, half_diagonal, epsilon = 1e-5);
        assert_relative_eq!(rotated.max.z, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_merge() {
        let a = unit_cube();
        let b = Aabb::new(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0));
        let merged = a.merge(&b);
        assert_relative_eq!(merged.min, a.min);
        assert_relative_eq!(merged.max, b.max);
        assert_eq!(Aabb::empty().merge(&a), a);
    }
}
