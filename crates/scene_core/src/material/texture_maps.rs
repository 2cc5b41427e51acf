//! Resolved texture bindings for a bound material

use super::{Material, TextureChannel, TextureChannels, TextureRefs};
use crate::resources::{lock_table, OwnedHandle, ResourceHandle, ResourceKind, SharedResources};

/// Texture bound to one channel
#[derive(Debug)]
pub enum TextureBinding {
    /// Shared placeholder, not reference counted
    Placeholder(ResourceHandle),
    /// Real texture the material holds a reference to
    Bound(OwnedHandle),
}

impl TextureBinding {
    /// Handle to sample from
    pub fn handle(&self) -> ResourceHandle {
        match self {
            Self::Placeholder(handle) => *handle,
            Self::Bound(owned) => owned.handle(),
        }
    }

    /// True for the shared placeholder
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

/// One texture binding per channel; never empty
///
/// Channels without a texture of their own resolve to the placeholder.
#[derive(Debug)]
pub struct TextureMaps {
    slots: [TextureBinding; 9],
}

impl TextureMaps {
    /// Every channel bound to its placeholder
    pub fn placeholders() -> Self {
        Self {
            slots: TextureChannel::ALL.map(|c| TextureBinding::Placeholder(c.placeholder())),
        }
    }

    /// Resolve the referenced textures of the `channels` subset
    ///
    /// Names unknown to the table fall back to the placeholder with a
    /// warning; the bind proceeds.
    pub fn resolve(table: &SharedResources, refs: &TextureRefs, channels: TextureChannels) -> Self {
        let slots = TextureChannel::ALL.map(|channel| {
            let placeholder = TextureBinding::Placeholder(channel.placeholder());
            if !channels.contains(channel.flag()) {
                return placeholder;
            }
            let Some(name) = refs.get(channel) else {
                return placeholder;
            };
            let found = lock_table(table).find(ResourceKind::Texture, name);
            match found.map(|handle| OwnedHandle::retain(table, handle)) {
                Some(Ok(owned)) => TextureBinding::Bound(owned),
                Some(Err(e)) => {
                    log::warn!("Texture '{}' for {:?} could not be retained: {}", name, channel, e);
                    placeholder
                }
                None => {
                    log::warn!("Texture '{}' for {:?} not found, using placeholder", name, channel);
                    placeholder
                }
            }
        });
        Self { slots }
    }

    /// Swap bound textures the table no longer holds for their placeholder
    ///
    /// Returns the number of channels that fell back.
    pub fn revalidate(&mut self, table: &SharedResources) -> usize {
        let stale: Vec<TextureChannel> = {
            let table = lock_table(table);
            TextureChannel::ALL
                .into_iter()
                .filter(|&channel| match &self.slots[channel.index()] {
                    TextureBinding::Bound(owned) => !table.contains(owned.handle()),
                    TextureBinding::Placeholder(_) => false,
                })
                .collect()
        };
        for &channel in &stale {
            let slot = &mut self.slots[channel.index()];
            log::warn!(
                "Texture {} for {:?} was evicted, using placeholder",
                slot.handle(),
                channel
            );
            // Dropping the stale guard locks the table
            *slot = TextureBinding::Placeholder(channel.placeholder());
        }
        stale.len()
    }

    /// Handle bound to `channel`
    pub fn get(&self, channel: TextureChannel) -> ResourceHandle {
        self.slots[channel.index()].handle()
    }

    /// Binding of `channel`
    pub fn binding(&self, channel: TextureChannel) -> &TextureBinding {
        &self.slots[channel.index()]
    }

    /// All handles in channel order
    pub fn handles(&self) -> [ResourceHandle; 9] {
        TextureChannel::ALL.map(|c| self.get(c))
    }
}

impl Default for TextureMaps {
    fn default() -> Self {
        Self::placeholders()
    }
}

/// Material bound to a geometry
#[derive(Debug)]
pub struct GeometryMaterialInstance {
    /// Resolved texture per channel
    pub maps: TextureMaps,
    /// Material the binding was built from
    pub properties: Material,
    /// Material instance in the resource table
    pub instance: OwnedHandle,
}

impl GeometryMaterialInstance {
    /// Handle of the material instance
    pub fn instance_handle(&self) -> ResourceHandle {
        self.instance.handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{
        share, ResourceManager, ResourceTable, DEFAULT_NORMAL_MAP, DEFAULT_TEXTURE,
    };

    #[test]
    fn test_placeholders() {
        let maps = TextureMaps::placeholders();
        assert_eq!(maps.get(TextureChannel::Albedo), DEFAULT_TEXTURE);
        assert_eq!(maps.get(TextureChannel::Normal), DEFAULT_NORMAL_MAP);
        assert!(maps.binding(TextureChannel::Anisotropy).is_placeholder());
    }

    #[test]
    fn test_resolve_known_unknown_and_masked() {
        let table = share(ResourceManager::new());
        let shared: SharedResources = table.clone();
        let albedo = table.lock().unwrap().register_texture("albedo").unwrap();
        let rough = table.lock().unwrap().register_texture("rough").unwrap();

        let mut refs = TextureRefs::new();
        refs.set(TextureChannel::Albedo, "albedo");
        refs.set(TextureChannel::Normal, "missing");
        refs.set(TextureChannel::Roughness, "rough");

        let channels = TextureChannels::ALBEDO | TextureChannels::NORMAL;
        let maps = TextureMaps::resolve(&shared, &refs, channels);

        assert_eq!(maps.get(TextureChannel::Albedo), albedo);
        assert_eq!(maps.get(TextureChannel::Normal), DEFAULT_NORMAL_MAP);
        // Not in the channel mask
        assert_eq!(maps.get(TextureChannel::Roughness), DEFAULT_TEXTURE);
        assert_eq!(table.lock().unwrap().ref_count(albedo), Some(2));
        assert_eq!(table.lock().unwrap().ref_count(rough), Some(1));

        drop(maps);
        assert_eq!(table.lock().unwrap().ref_count(albedo), Some(1));
    }

    #[test]
    fn test_revalidate_replaces_evicted_textures() {
        let table = share(ResourceManager::new());
        let shared: SharedResources = table.clone();
        let albedo = table.lock().unwrap().register_texture("albedo").unwrap();
        let normal = table.lock().unwrap().register_texture("normal").unwrap();

        let mut refs = TextureRefs::new();
        refs.set(TextureChannel::Albedo, "albedo");
        refs.set(TextureChannel::Normal, "normal");
        let mut maps = TextureMaps::resolve(&shared, &refs, TextureChannels::all());
        assert_eq!(maps.revalidate(&shared), 0);

        assert!(table.lock().unwrap().evict(albedo));
        assert_eq!(maps.revalidate(&shared), 1);
        assert!(maps.binding(TextureChannel::Albedo).is_placeholder());
        assert_eq!(maps.get(TextureChannel::Albedo), DEFAULT_TEXTURE);
        assert_eq!(maps.get(TextureChannel::Normal), normal);
        assert_eq!(table.lock().unwrap().ref_count(normal), Some(2));
    }
}
