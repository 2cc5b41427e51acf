//! Named light registry
//!
//! Light parameters live on the backend light entity; the registry only
//! maps names to entities and keeps the enabled flag. Fine-grained updates
//! touch a single field of the entity.

use super::{SceneError, SceneResult};
use crate::foundation::math::Vec3;
use crate::lighting::{ConeAngles, Light, LightKind};
use crate::render::{EntityId, NativeScene};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;

new_key_type! {
    /// Arena id of a named light
    pub struct LightId;
}

/// Name reserved for the scene's directional light
pub const SUN_LIGHT_NAME: &str = "sun";

/// A named light
#[derive(Debug, Clone, PartialEq)]
pub struct LightEntity {
    /// Unique name
    pub name: String,
    /// Whether the light contributes to the frame
    pub enabled: bool,
    /// Backend light entity
    pub entity: EntityId,
}

/// Light registry keyed by unique name
#[derive(Debug, Default)]
pub struct LightRegistry {
    lights: SlotMap<LightId, LightEntity>,
    names: HashMap<String, LightId>,
}

impl LightRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a light is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Number of named lights
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// True when no light is registered
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Light names in storage order
    pub fn names(&self) -> Vec<String> {
        self.lights.values().map(|l| l.name.clone()).collect()
    }

    /// Registered lights in storage order
    pub fn iter(&self) -> impl Iterator<Item = &LightEntity> {
        self.lights.values()
    }

    fn entry(&self, name: &str) -> Option<&LightEntity> {
        self.names.get(name).and_then(|&id| self.lights.get(id))
    }

    /// Register `light` as `name`
    pub fn add(&mut self, native: &mut NativeScene, name: &str, light: Light) -> SceneResult<()> {
        if name == SUN_LIGHT_NAME {
            return Err(SceneError::ReservedName(name.to_string()));
        }
        if self.contains(name) {
            return Err(SceneError::DuplicateName {
                kind: "light",
                name: name.to_string(),
            });
        }
        if let Some(cone) = light.cone() {
            if !cone.is_valid() {
                return Err(SceneError::InvalidConeAngles {
                    name: name.to_string(),
                    inner: cone.inner,
                    outer: cone.outer,
                });
            }
        }

        let entity = native.add_light(light);
        let id = self.lights.insert(LightEntity {
            name: name.to_string(),
            enabled: true,
            entity,
        });
        self.names.insert(name.to_string(), id);
        log::debug!("Added light '{}'", name);
        Ok(())
    }

    /// Remove a light; false if `name` is unknown
    pub fn remove(&mut self, native: &mut NativeScene, name: &str) -> bool {
        let Some(id) = self.names.remove(name) else {
            return false;
        };
        if let Some(entry) = self.lights.remove(id) {
            native.remove(entry.entity);
        }
        log::debug!("Removed light '{}'", name);
        true
    }

    /// Copy of the light's parameters
    pub fn get(&self, native: &NativeScene, name: &str) -> SceneResult<Light> {
        self.entry(name)
            .and_then(|e| native.light(e.entity))
            .cloned()
            .ok_or_else(|| SceneError::LightNotFound(name.to_string()))
    }

    /// Whether the light is enabled
    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.entry(name).map(|e| e.enabled)
    }

    /// Enable or disable a light; false if `name` is unknown
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.names.get(name).and_then(|&id| self.lights.get_mut(id)) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    fn with_light<F>(&self, native: &mut NativeScene, name: &str, f: F) -> bool
    where
        F: FnOnce(&mut Light),
    {
        let light = match self.entry(name) {
            Some(entry) => native.light_mut(entry.entity),
            None => None,
        };
        match light {
            Some(light) => {
                f(light);
                true
            }
            None => {
                log::warn!("Light '{}' not found", name);
                false
            }
        }
    }

    /// Replace every parameter; invalid cone angles leave the light as is
    ///
    /// Spot directions are normalized; a zero direction keeps the current one.
    pub fn update(&self, native: &mut NativeScene, name: &str, light: &Light) -> bool {
        if let Some(cone) = light.cone() {
            if !cone.is_valid() {
                log::warn!("Ignoring update of '{}': invalid cone angles {:?}", name, cone);
                return false;
            }
        }
        self.with_light(native, name, |l| {
            let previous = l.direction().unwrap_or_else(|| Vec3::new(0.0, 0.0, -1.0));
            *l = light.clone();
            if let LightKind::Spot { direction, .. } = &mut l.kind {
                *direction = direction.try_normalize(f32::EPSILON).unwrap_or(previous);
            }
        })
    }

    /// Set the color
    pub fn update_color(&self, native: &mut NativeScene, name: &str, color: Vec3) -> bool {
        self.with_light(native, name, |l| l.color = color)
    }

    /// Set the position
    pub fn update_position(&self, native: &mut NativeScene, name: &str, position: Vec3) -> bool {
        self.with_light(native, name, |l| l.position = position)
    }

    /// Set the spot direction; ignored for point lights
    pub fn update_direction(&self, native: &mut NativeScene, name: &str, direction: Vec3) -> bool {
        self.with_light(native, name, |l| match &mut l.kind {
            LightKind::Spot { direction: d, .. } => {
                *d = direction.try_normalize(f32::EPSILON).unwrap_or(*d);
            }
            LightKind::Point => log::warn!("Point light '{}' has no direction", name),
        })
    }

    /// Set the intensity
    pub fn update_intensity(&self, native: &mut NativeScene, name: &str, intensity: f32) -> bool {
        self.with_light(native, name, |l| l.intensity = intensity)
    }

    /// Set the falloff distance
    pub fn update_falloff(&self, native: &mut NativeScene, name: &str, falloff: f32) -> bool {
        self.with_light(native, name, |l| l.falloff = falloff)
    }

    /// Set spot cone angles; invalid angles and point lights are ignored
    pub fn update_cone_angles(
        &self,
        native: &mut NativeScene,
        name: &str,
        cone: ConeAngles,
    ) -> bool {
        if !cone.is_valid() {
            log::warn!("Ignoring cone angles {:?} for '{}'", cone, name);
            return false;
        }
        self.with_light(native, name, |l| match &mut l.kind {
            LightKind::Spot { cone: c, .. } => *c = cone,
            LightKind::Point => log::warn!("Point light '{}' has no cone", name),
        })
    }

    /// Toggle shadow casting
    pub fn set_cast_shadows(
        &self,
        native: &mut NativeScene,
        name: &str,
        cast_shadows: bool,
    ) -> bool {
        self.with_light(native, name, |l| l.cast_shadows = cast_shadows)
    }
}
