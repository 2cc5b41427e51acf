//! Indirect light and skybox state
//!
//! The environment never owns the image-based light or skybox resources.
//! It remembers which named resource is bound and looks the handle up again
//! whenever a frame is built, so an evicted resource simply stops showing.

use super::{SceneError, SceneResult};
use crate::config::EnvironmentConfig;
use crate::foundation::math::Affine3;
use crate::render::IndirectLightItem;
use crate::resources::{lock_table, ResourceHandle, ResourceKind, ResourceTable, SharedResources};

#[derive(Debug, Clone, PartialEq)]
struct IndirectLightBinding {
    name: String,
    handle: ResourceHandle,
    skybox: Option<ResourceHandle>,
}

/// Environment lighting of a scene
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    binding: Option<IndirectLightBinding>,
    indirect_light_enabled: bool,
    skybox_enabled: bool,
    intensity: f32,
    rotation: Affine3,
}

impl Environment {
    /// Unbound environment with configured defaults
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self {
            binding: None,
            indirect_light_enabled: config.indirect_light_enabled,
            skybox_enabled: config.skybox_enabled,
            intensity: config.indirect_light_intensity,
            rotation: Affine3::identity(),
        }
    }

    /// Bind the indirect light registered as `name`
    ///
    /// A skybox registered under the same name is bound alongside it. An
    /// unknown name leaves the current binding untouched.
    pub fn set_indirect_light(
        &mut self,
        resources: &SharedResources,
        name: &str,
    ) -> SceneResult<()> {
        let (handle, skybox) = {
            let table = lock_table(resources);
            (
                table.find(ResourceKind::IndirectLight, name),
                table.find(ResourceKind::Skybox, name),
            )
        };
        let Some(handle) = handle else {
            return Err(SceneError::UnknownIndirectLight(name.to_string()));
        };

        if let Some(previous) = self.binding.take() {
            log::debug!("Unbinding indirect light '{}'", previous.name);
        }
        self.binding = Some(IndirectLightBinding {
            name: name.to_string(),
            handle,
            skybox,
        });
        log::info!("Bound indirect light '{}'", name);
        Ok(())
    }

    /// Name of the bound indirect light; empty when none is bound
    pub fn indirect_light(&self) -> &str {
        self.binding.as_ref().map_or("", |b| b.name.as_str())
    }

    /// Enable or disable indirect lighting; no-op when nothing is bound
    pub fn enable_indirect_light(&mut self, enable: bool) {
        if self.binding.is_none() {
            log::debug!("No indirect light bound, ignoring enable({})", enable);
            return;
        }
        self.indirect_light_enabled = enable;
    }

    /// Whether indirect lighting is enabled
    pub fn is_indirect_light_enabled(&self) -> bool {
        self.indirect_light_enabled
    }

    /// Set the indirect light intensity; no-op when nothing is bound
    pub fn set_intensity(&mut self, intensity: f32) {
        if self.binding.is_none() {
            log::debug!("No indirect light bound, ignoring intensity {}", intensity);
            return;
        }
        self.intensity = intensity;
    }

    /// Indirect light intensity
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Set the indirect light rotation; no-op when nothing is bound
    pub fn set_rotation(&mut self, rotation: Affine3) {
        if self.binding.is_none() {
            log::debug!("No indirect light bound, ignoring rotation");
            return;
        }
        self.rotation = rotation;
    }

    /// Indirect light rotation
    pub fn rotation(&self) -> Affine3 {
        self.rotation
    }

    /// Show or hide the skybox
    pub fn show_skybox(&mut self, show: bool) {
        self.skybox_enabled = show;
    }

    /// Whether the skybox is shown
    pub fn is_skybox_shown(&self) -> bool {
        self.skybox_enabled
    }

    /// Indirect light to draw: bound, enabled and still present in `table`
    pub(crate) fn resolve_indirect_light(
        &self,
        table: &dyn ResourceTable,
    ) -> Option<IndirectLightItem> {
        let binding = self.binding.as_ref()?;
        if !self.indirect_light_enabled {
            return None;
        }
        if !table.contains(binding.handle) {
            log::debug!("Indirect light '{}' is no longer resident", binding.name);
            return None;
        }
        Some(IndirectLightItem {
            handle: binding.handle,
            intensity: self.intensity,
            rotation: self.rotation,
        })
    }

    /// Skybox to draw: shown and still present in `table`
    pub(crate) fn resolve_skybox(&self, table: &dyn ResourceTable) -> Option<ResourceHandle> {
        if !self.skybox_enabled {
            return None;
        }
        let skybox = self.binding.as_ref()?.skybox?;
        table.contains(skybox).then_some(skybox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{share, ResourceManager};

    #[test]
    fn test_unknown_name_keeps_binding() {
        let table = share(ResourceManager::new());
        let shared: SharedResources = table.clone();
        table.lock().unwrap().register_indirect_light("studio").unwrap();

        let mut env = Environment::new(&EnvironmentConfig::default());
        assert_eq!(env.indirect_light(), "");
        env.set_indirect_light(&shared, "studio").unwrap();
        assert_eq!(
            env.set_indirect_light(&shared, "nowhere"),
            Err(SceneError::UnknownIndirectLight("nowhere".to_string()))
        );
        assert_eq!(env.indirect_light(), "studio");
    }

    #[test]
    fn test_setters_ignored_when_unbound() {
        let mut env = Environment::new(&EnvironmentConfig::default());
        let before = env.intensity();
        env.set_intensity(1.0);
        env.enable_indirect_light(false);
        assert_eq!(env.intensity(), before);
        assert!(env.is_indirect_light_enabled());
    }

    #[test]
    fn test_evicted_resources_resolve_to_none() {
        let table = share(ResourceManager::new());
        let shared: SharedResources = table.clone();
        let ibl = table.lock().unwrap().register_indirect_light("park").unwrap();
        let sky = table.lock().unwrap().register_skybox("park").unwrap();

        let mut env = Environment::new(&EnvironmentConfig::default());
        env.set_indirect_light(&shared, "park").unwrap();
        env.show_skybox(true);
        {
            let t = table.lock().unwrap();
            assert_eq!(env.resolve_indirect_light(&*t).map(|i| i.handle), Some(ibl));
            assert_eq!(env.resolve_skybox(&*t), Some(sky));
        }

        table.lock().unwrap().evict(ibl);
        table.lock().unwrap().evict(sky);
        let t = table.lock().unwrap();
        assert!(env.resolve_indirect_light(&*t).is_none());
        assert!(env.resolve_skybox(&*t).is_none());
        // The name stays bound
        assert_eq!(env.indirect_light(), "park");
    }

    #[test]
    fn test_skybox_independent_of_indirect_light() {
        let table = share(ResourceManager::new());
        let shared: SharedResources = table.clone();
        table.lock().unwrap().register_indirect_light("hall").unwrap();
        table.lock().unwrap().register_skybox("hall").unwrap();

        let mut env = Environment::new(&EnvironmentConfig::default());
        env.set_indirect_light(&shared, "hall").unwrap();
        env.enable_indirect_light(false);
        env.show_skybox(true);
        let t = table.lock().unwrap();
        assert!(env.resolve_indirect_light(&*t).is_none());
        assert!(env.resolve_skybox(&*t).is_some());
    }
}
