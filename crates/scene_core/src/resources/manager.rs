//! Resource Manager - CPU-side handle table with reference counting
//!
//! **SEPARATION OF CONCERNS**:
//! - ResourceManager: handle issuing, reference counting, named lookup
//! - GPU allocator: actual buffer/texture creation (external)
//! - Scene: decides what exists and how it is wired together
//!
//! The in-memory [`ResourceManager`] is the reference implementation of
//! [`ResourceTable`]; rendering backends provide their own.

use super::{
    ParameterValue, ResourceDescriptor, ResourceError, ResourceHandle, ResourceKind,
    ResourceResult, DEFAULT_NORMAL_MAP, DEFAULT_TEXTURE,
};
use crate::config::ResourceConfig;
use crate::material::ShadingModel;
use std::collections::HashMap;

/// Handle table contract consumed by the scene
///
/// Implementations must keep [`DEFAULT_TEXTURE`] and [`DEFAULT_NORMAL_MAP`]
/// valid for their whole lifetime; retaining or releasing them is a no-op.
pub trait ResourceTable: Send {
    /// Create a resource with a reference count of one
    fn acquire(&mut self, descriptor: ResourceDescriptor) -> ResourceResult<ResourceHandle>;

    /// Add a reference to an existing resource
    fn retain(&mut self, handle: ResourceHandle) -> ResourceResult<()>;

    /// Drop a reference; the resource is freed when the count reaches zero
    fn release(&mut self, handle: ResourceHandle) -> ResourceResult<()>;

    /// Whether the handle currently refers to a live resource
    fn contains(&self, handle: ResourceHandle) -> bool;

    /// Current reference count of a live resource
    fn ref_count(&self, handle: ResourceHandle) -> Option<u32>;

    /// Look up a named resource
    fn find(&self, kind: ResourceKind, name: &str) -> Option<ResourceHandle>;

    /// Push a parameter value into a material instance
    fn set_parameter(
        &mut self,
        instance: ResourceHandle,
        name: &str,
        value: ParameterValue,
    ) -> ResourceResult<()>;

    /// Read back a material instance parameter
    fn parameter(&self, instance: ResourceHandle, name: &str) -> Option<ParameterValue>;

    /// Shader a material instance was created from
    fn shading_model(&self, instance: ResourceHandle) -> Option<ShadingModel>;

    /// Number of live resources, placeholders included
    fn live_count(&self) -> usize;
}

#[derive(Debug)]
enum Payload {
    Buffer { element_count: usize },
    Texture,
    MaterialInstance {
        shading_model: ShadingModel,
        parameters: HashMap<String, ParameterValue>,
    },
    Environment,
}

#[derive(Debug)]
struct Entry {
    ref_count: u32,
    pinned: bool,
    name: Option<String>,
    payload: Payload,
}

/// In-memory reference-counting resource table
#[derive(Debug)]
pub struct ResourceManager {
    entries: HashMap<ResourceHandle, Entry>,
    names: HashMap<(ResourceKind, String), ResourceHandle>,
    next_id: u32,
    config: ResourceConfig,
}

impl ResourceManager {
    /// First id handed out to non-placeholder resources
    const FIRST_DYNAMIC_ID: u32 = 16;

    /// Create a table with default configuration
    pub fn new() -> Self {
        Self::with_config(ResourceConfig::default())
    }

    /// Create a table with custom configuration
    pub fn with_config(config: ResourceConfig) -> Self {
        log::debug!("Creating ResourceManager with config: {:?}", config);
        let mut manager = Self {
            entries: HashMap::new(),
            names: HashMap::new(),
            next_id: Self::FIRST_DYNAMIC_ID,
            config,
        };
        for placeholder in [DEFAULT_TEXTURE, DEFAULT_NORMAL_MAP] {
            manager.entries.insert(
                placeholder,
                Entry {
                    ref_count: 1,
                    pinned: true,
                    name: None,
                    payload: Payload::Texture,
                },
            );
        }
        manager
    }

    /// Register a named texture owned by the caller
    pub fn register_texture(&mut self, name: &str) -> ResourceResult<ResourceHandle> {
        self.acquire(ResourceDescriptor::Texture { name: Some(name.to_string()) })
    }

    /// Register a named indirect light owned by the caller
    pub fn register_indirect_light(&mut self, name: &str) -> ResourceResult<ResourceHandle> {
        self.acquire(ResourceDescriptor::IndirectLight { name: name.to_string() })
    }

    /// Register a named skybox owned by the caller
    pub fn register_skybox(&mut self, name: &str) -> ResourceResult<ResourceHandle> {
        self.acquire(ResourceDescriptor::Skybox { name: name.to_string() })
    }

    /// Forcefully free a resource regardless of outstanding references
    ///
    /// Models eviction by the underlying allocator; holders of the handle
    /// observe it as unknown afterwards. Placeholders cannot be evicted.
    pub fn evict(&mut self, handle: ResourceHandle) -> bool {
        if self.entries.get(&handle).map_or(true, |e| e.pinned) {
            return false;
        }
        self.free(handle);
        log::debug!("Evicted resource {}", handle);
        true
    }

    /// Element count of a live vertex or index buffer
    pub fn buffer_len(&self, handle: ResourceHandle) -> Option<usize> {
        match self.entries.get(&handle)?.payload {
            Payload::Buffer { element_count } => Some(element_count),
            _ => None,
        }
    }

    fn free(&mut self, handle: ResourceHandle) {
        if let Some(entry) = self.entries.remove(&handle) {
            if let Some(name) = entry.name {
                self.names.remove(&(handle.kind(), name));
            }
        }
    }

    fn entry_mut(&mut self, handle: ResourceHandle) -> ResourceResult<&mut Entry> {
        self.entries
            .get_mut(&handle)
            .ok_or(ResourceError::UnknownHandle(handle))
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTable for ResourceManager {
    fn acquire(&mut self, descriptor: ResourceDescriptor) -> ResourceResult<ResourceHandle> {
        let max = self.config.max_resources;
        if max > 0 && self.entries.len() >= max {
            return Err(ResourceError::CapacityExhausted { max });
        }

        let kind = descriptor.kind();
        let name = descriptor.name().map(str::to_string);
        if let Some(name) = &name {
            if self.names.contains_key(&(kind, name.clone())) {
                return Err(ResourceError::DuplicateName { kind, name: name.clone() });
            }
        }

        let payload = match descriptor {
            ResourceDescriptor::VertexBuffer { vertex_count } => {
                Payload::Buffer { element_count: vertex_count }
            }
            ResourceDescriptor::IndexBuffer { index_count } => {
                Payload::Buffer { element_count: index_count }
            }
            ResourceDescriptor::Texture { .. } => Payload::Texture,
            ResourceDescriptor::MaterialInstance { shading_model } => Payload::MaterialInstance {
                shading_model,
                parameters: HashMap::new(),
            },
            ResourceDescriptor::IndirectLight { .. } | ResourceDescriptor::Skybox { .. } => {
                Payload::Environment
            }
        };

        let handle = ResourceHandle::new(kind, self.next_id);
        self.next_id += 1;
        if let Some(name) = &name {
            self.names.insert((kind, name.clone()), handle);
        }
        self.entries.insert(
            handle,
            Entry {
                ref_count: 1,
                pinned: false,
                name,
                payload,
            },
        );

        log::trace!("Acquired resource {}", handle);
        Ok(handle)
    }

    fn retain(&mut self, handle: ResourceHandle) -> ResourceResult<()> {
        let entry = self.entry_mut(handle)?;
        if !entry.pinned {
            entry.ref_count += 1;
        }
        Ok(())
    }

    fn release(&mut self, handle: ResourceHandle) -> ResourceResult<()> {
        let entry = self.entry_mut(handle)?;
        if entry.pinned {
            return Ok(());
        }
        entry.ref_count -= 1;
        if entry.ref_count == 0 {
            self.free(handle);
            log::trace!("Freed resource {}", handle);
        }
        Ok(())
    }

    fn contains(&self, handle: ResourceHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    fn ref_count(&self, handle: ResourceHandle) -> Option<u32> {
        self.entries.get(&handle).map(|e| e.ref_count)
    }

    fn find(&self, kind: ResourceKind, name: &str) -> Option<ResourceHandle> {
        self.names.get(&(kind, name.to_string())).copied()
    }

    fn set_parameter(
        &mut self,
        instance: ResourceHandle,
        name: &str,
        value: ParameterValue,
    ) -> ResourceResult<()> {
        match &mut self.entry_mut(instance)?.payload {
            Payload::MaterialInstance { parameters, .. } => {
                parameters.insert(name.to_string(), value);
                Ok(())
            }
            _ => Err(ResourceError::KindMismatch {
                handle: instance,
                expected: ResourceKind::MaterialInstance,
            }),
        }
    }

    fn parameter(&self, instance: ResourceHandle, name: &str) -> Option<ParameterValue> {
        match &self.entries.get(&instance)?.payload {
            Payload::MaterialInstance { parameters, .. } => parameters.get(name).copied(),
            _ => None,
        }
    }

    fn shading_model(&self, instance: ResourceHandle) -> Option<ShadingModel> {
        match &self.entries.get(&instance)?.payload {
            Payload::MaterialInstance { shading_model, .. } => Some(*shading_model),
            _ => None,
        }
    }

    fn live_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_always_present() {
        let mut manager = ResourceManager::new();
        assert!(manager.contains(DEFAULT_TEXTURE));
        assert!(manager.contains(DEFAULT_NORMAL_MAP));

        manager.release(DEFAULT_TEXTURE).unwrap();
        manager.release(DEFAULT_TEXTURE).unwrap();
        assert!(manager.contains(DEFAULT_TEXTURE));
        assert!(!manager.evict(DEFAULT_NORMAL_MAP));
    }

    #[test]
    fn test_ref_counting() {
        let mut manager = ResourceManager::new();
        let vb = manager.acquire(ResourceDescriptor::VertexBuffer { vertex_count: 8 }).unwrap();
        assert_eq!(manager.ref_count(vb), Some(1));
        assert_eq!(manager.buffer_len(vb), Some(8));

        manager.retain(vb).unwrap();
        assert_eq!(manager.ref_count(vb), Some(2));

        manager.release(vb).unwrap();
        manager.release(vb).unwrap();
        assert!(!manager.contains(vb));
        assert_eq!(manager.release(vb), Err(ResourceError::UnknownHandle(vb)));
    }

    #[test]
    fn test_named_lookup_and_duplicates() {
        let mut manager = ResourceManager::new();
        let tex = manager.register_texture("bricks").unwrap();
        assert_eq!(manager.find(ResourceKind::Texture, "bricks"), Some(tex));
        assert_eq!(manager.find(ResourceKind::Skybox, "bricks"), None);
        assert!(matches!(
            manager.register_texture("bricks"),
            Err(ResourceError::DuplicateName { .. })
        ));

        // Same name, different kind is fine
        manager.register_skybox("bricks").unwrap();

        manager.release(tex).unwrap();
        assert_eq!(manager.find(ResourceKind::Texture, "bricks"), None);
    }

    #[test]
    fn test_material_parameters() {
        let mut manager = ResourceManager::new();
        let mi = manager
            .acquire(ResourceDescriptor::MaterialInstance {
                shading_model: ShadingModel::DefaultLit,
            })
            .unwrap();
        manager.set_parameter(mi, "baseRoughness", ParameterValue::Float(0.25)).unwrap();
        assert_eq!(manager.parameter(mi, "baseRoughness"), Some(ParameterValue::Float(0.25)));
        assert_eq!(manager.shading_model(mi), Some(ShadingModel::DefaultLit));

        let tex = manager.register_texture("t").unwrap();
        assert!(matches!(
            manager.set_parameter(tex, "x", ParameterValue::Float(1.0)),
            Err(ResourceError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_capacity_limit() {
        let mut manager = ResourceManager::with_config(ResourceConfig { max_resources: 3 });
        manager.acquire(ResourceDescriptor::IndexBuffer { index_count: 3 }).unwrap();
        assert_eq!(
            manager.acquire(ResourceDescriptor::IndexBuffer { index_count: 3 }),
            Err(ResourceError::CapacityExhausted { max: 3 })
        );
    }

    #[test]
    fn test_evict_drops_name() {
        let mut manager = ResourceManager::new();
        let ibl = manager.register_indirect_light("studio").unwrap();
        assert!(manager.evict(ibl));
        assert!(!manager.contains(ibl));
        assert_eq!(manager.find(ResourceKind::IndirectLight, "studio"), None);
    }
}
