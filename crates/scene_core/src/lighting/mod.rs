//! Lighting system
//!
//! Light descriptions shared by the named light registry, the sun and the
//! per-frame snapshot handed to the renderer.

use crate::config::SunConfig;
use crate::foundation::math::{utils, Vec3};

/// Inner and outer cone angles of a spot light, in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeAngles {
    /// Angle of full intensity
    pub inner: f32,
    /// Angle where the light falls off to zero
    pub outer: f32,
}

impl ConeAngles {
    /// Cone angles in radians
    pub fn new(inner: f32, outer: f32) -> Self {
        Self { inner, outer }
    }

    /// Cone angles given in degrees
    pub fn from_degrees(inner: f32, outer: f32) -> Self {
        Self::new(utils::deg_to_rad(inner), utils::deg_to_rad(outer))
    }

    /// Finite, non-negative and `inner <= outer`
    pub fn is_valid(&self) -> bool {
        self.inner.is_finite()
            && self.outer.is_finite()
            && self.inner >= 0.0
            && self.inner <= self.outer
    }
}

/// Type-specific light parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Omnidirectional light
    Point,
    /// Cone-shaped light
    Spot {
        /// Direction the cone points at
        direction: Vec3,
        /// Cone angles
        cone: ConeAngles,
    },
}

/// Point or spot light
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Type and type-specific parameters
    pub kind: LightKind,
    /// Light position
    pub position: Vec3,
    /// Light color
    pub color: Vec3,
    /// Luminous intensity
    pub intensity: f32,
    /// Distance at which the light no longer has any effect
    pub falloff: f32,
    /// Whether the light casts shadows
    pub cast_shadows: bool,
}

impl Light {
    /// Create a point light
    pub fn point(position: Vec3, color: Vec3, intensity: f32, falloff: f32) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            color,
            intensity,
            falloff,
            cast_shadows: false,
        }
    }

    /// Create a spot light
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        color: Vec3,
        intensity: f32,
        falloff: f32,
        cone: ConeAngles,
    ) -> Self {
        Self {
            kind: LightKind::Spot {
                direction: normalize_or(direction, Vec3::new(0.0, 0.0, -1.0)),
                cone,
            },
            position,
            color,
            intensity,
            falloff,
            cast_shadows: false,
        }
    }

    /// Enable or disable shadow casting
    pub fn with_shadows(mut self, cast_shadows: bool) -> Self {
        self.cast_shadows = cast_shadows;
        self
    }

    /// True for spot lights
    pub fn is_spot(&self) -> bool {
        matches!(self.kind, LightKind::Spot { .. })
    }

    /// Spot direction; `None` for point lights
    pub fn direction(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Spot { direction, .. } => Some(direction),
            LightKind::Point => None,
        }
    }

    /// Spot cone angles; `None` for point lights
    pub fn cone(&self) -> Option<ConeAngles> {
        match self.kind {
            LightKind::Spot { cone, .. } => Some(cone),
            LightKind::Point => None,
        }
    }
}

/// The scene's single directional light
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Direction light travels in (normalized)
    pub direction: Vec3,
    /// Light color
    pub color: Vec3,
    /// Illuminance
    pub intensity: f32,
    /// Whether the light contributes to the frame
    pub enabled: bool,
    /// Whether the light casts shadows
    pub cast_shadows: bool,
}

impl DirectionalLight {
    /// Create a directional light
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: normalize_or(direction, Vec3::new(0.0, -1.0, 0.0)),
            color,
            intensity,
            enabled: true,
            cast_shadows: true,
        }
    }

    /// Point the light along `direction`; a zero vector is ignored
    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = normalize_or(direction, self.direction);
    }
}

impl From<&SunConfig> for DirectionalLight {
    fn from(config: &SunConfig) -> Self {
        let mut sun = Self::new(
            Vec3::from(config.direction),
            Vec3::from(config.color),
            config.intensity,
        );
        sun.enabled = config.enabled;
        sun.cast_shadows = config.cast_shadows;
        sun
    }
}

fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize(f32::EPSILON).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cone_validation() {
        assert!(ConeAngles::from_degrees(5.0, 10.0).is_valid());
        assert!(ConeAngles::from_degrees(10.0, 10.0).is_valid());
        assert!(!ConeAngles::from_degrees(10.0, 5.0).is_valid());
        assert!(!ConeAngles::new(-0.1, 0.5).is_valid());
        assert!(!ConeAngles::new(0.1, f32::NAN).is_valid());
    }

    #[test]
    fn test_point_has_no_direction() {
        let light = Light::point(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), 1000.0, 5.0);
        assert_eq!(light.direction(), None);
        assert_eq!(light.cone(), None);
        assert!(!light.is_spot());
    }

    #[test]
    fn test_spot_normalizes_direction() {
        let light = Light::spot(
            Vec3::zeros(),
            Vec3::new(0.0, -4.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            1000.0,
            5.0,
            ConeAngles::from_degrees(5.0, 10.0),
        );
        assert_relative_eq!(light.direction().unwrap(), Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_sun_from_config() {
        let config = SunConfig {
            direction: [0.0, 0.0, -2.0],
            enabled: false,
            ..Default::default()
        };
        let sun = DirectionalLight::from(&config);
        assert_relative_eq!(sun.direction, Vec3::new(0.0, 0.0, -1.0));
        assert!(!sun.enabled);
    }

    #[test]
    fn test_sun_ignores_zero_direction() {
        let mut sun =
            DirectionalLight::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 1.0);
        sun.set_direction(Vec3::zeros());
        assert_relative_eq!(sun.direction, Vec3::new(1.0, 0.0, 0.0));
    }
}
