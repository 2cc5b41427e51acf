//! Scope-guarded resource ownership

use super::{lock_table, ResourceDescriptor, ResourceHandle, ResourceResult, SharedResources};
use std::fmt;

/// A handle the scene holds one reference to
///
/// The reference is released exactly once: on drop, or before the
/// replacement is acquired in [`OwnedHandle::rebind`].
///
/// Dropping locks the shared table, so an `OwnedHandle` must never be
/// dropped while the caller is holding [`lock_table`]'s guard.
pub struct OwnedHandle {
    handle: ResourceHandle,
    table: SharedResources,
    live: bool,
}

impl OwnedHandle {
    /// Create a new resource and take ownership of its only reference
    pub fn acquire(
        table: &SharedResources,
        descriptor: ResourceDescriptor,
    ) -> ResourceResult<Self> {
        let handle = lock_table(table).acquire(descriptor)?;
        Ok(Self {
            handle,
            table: table.clone(),
            live: true,
        })
    }

    /// Take an additional reference to an existing resource
    pub fn retain(table: &SharedResources, handle: ResourceHandle) -> ResourceResult<Self> {
        lock_table(table).retain(handle)?;
        Ok(Self {
            handle,
            table: table.clone(),
            live: true,
        })
    }

    /// The guarded handle
    pub fn handle(&self) -> ResourceHandle {
        self.handle
    }

    /// Whether this guard still holds a reference
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Release the current resource, then acquire a replacement
    ///
    /// If acquisition fails the guard is left empty and the error returned;
    /// the old handle is not released twice.
    pub fn rebind(&mut self, descriptor: ResourceDescriptor) -> ResourceResult<()> {
        let mut table = lock_table(&self.table);
        if self.live {
            self.live = false;
            if let Err(e) = table.release(self.handle) {
                log::debug!("Releasing {} during rebind: {}", self.handle, e);
            }
        }
        self.handle = table.acquire(descriptor)?;
        self.live = true;
        Ok(())
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        // The allocator may already have evicted it
        if let Err(e) = lock_table(&self.table).release(self.handle) {
            log::debug!("Releasing {}: {}", self.handle, e);
        }
    }
}

impl fmt::Debug for OwnedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedHandle")
            .field("handle", &self.handle)
            .field("live", &self.live)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::ShadingModel;
    use crate::resources::{share, ResourceManager, ResourceTable};

    #[test]
    fn test_drop_releases_once() {
        let table = share(ResourceManager::new());
        let shared: SharedResources = table.clone();
        let before = table.lock().unwrap().live_count();

        let owned =
            OwnedHandle::acquire(&shared, ResourceDescriptor::VertexBuffer { vertex_count: 3 })
                .unwrap();
        let handle = owned.handle();
        assert!(table.lock().unwrap().contains(handle));

        drop(owned);
        assert!(!table.lock().unwrap().contains(handle));
        assert_eq!(table.lock().unwrap().live_count(), before);
    }

    #[test]
    fn test_retain_shares_reference() {
        let table = share(ResourceManager::new());
        let shared: SharedResources = table.clone();
        let tex = table.lock().unwrap().register_texture("wood").unwrap();

        let owned = OwnedHandle::retain(&shared, tex).unwrap();
        assert_eq!(table.lock().unwrap().ref_count(tex), Some(2));
        drop(owned);
        assert_eq!(table.lock().unwrap().ref_count(tex), Some(1));
    }

    #[test]
    fn test_rebind_releases_before_acquire() {
        let table = share(ResourceManager::new());
        let shared: SharedResources = table.clone();

        let mut owned = OwnedHandle::acquire(
            &shared,
            ResourceDescriptor::MaterialInstance { shading_model: ShadingModel::DefaultLit },
        )
        .unwrap();
        let first = owned.handle();
        let count = table.lock().unwrap().live_count();

        owned
            .rebind(ResourceDescriptor::MaterialInstance { shading_model: ShadingModel::Depth })
            .unwrap();
        assert_ne!(owned.handle(), first);
        assert!(!table.lock().unwrap().contains(first));
        assert_eq!(table.lock().unwrap().live_count(), count);
        assert_eq!(table.lock().unwrap().shading_model(owned.handle()), Some(ShadingModel::Depth));
    }

    #[test]
    fn test_evicted_handle_drop_is_quiet() {
        let table = share(ResourceManager::new());
        let shared: SharedResources = table.clone();
        let owned =
            OwnedHandle::acquire(&shared, ResourceDescriptor::IndexBuffer { index_count: 6 })
                .unwrap();
        assert!(table.lock().unwrap().evict(owned.handle()));
        drop(owned);
    }
}
