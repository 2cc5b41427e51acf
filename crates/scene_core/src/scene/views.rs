//! View table and camera registry

use super::{SceneError, SceneResult};
use crate::config::ViewConfig;
use crate::render::{Camera, View, ViewHandle, Viewport};
use slotmap::SlotMap;
use std::collections::HashMap;

#[derive(Debug)]
struct ViewContainer {
    view: View,
    active: bool,
}

/// Views over a scene plus its named cameras
#[derive(Debug, Default)]
pub struct ViewManager {
    views: SlotMap<ViewHandle, ViewContainer>,
    cameras: HashMap<String, Camera>,
    active_camera: Option<String>,
    config: ViewConfig,
}

impl ViewManager {
    /// Empty manager creating views with `config` defaults
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Create an active view over the given rectangle
    pub fn add_view(&mut self, x: i32, y: i32, width: u32, height: u32) -> ViewHandle {
        let view = View::new(Viewport::new(x, y, width, height), &self.config);
        self.views.insert(ViewContainer { view, active: true })
    }

    /// View behind `handle`
    pub fn view(&self, handle: ViewHandle) -> Option<&View> {
        self.views.get(handle).map(|c| &c.view)
    }

    /// Mutable view behind `handle`
    pub fn view_mut(&mut self, handle: ViewHandle) -> Option<&mut View> {
        self.views.get_mut(handle).map(|c| &mut c.view)
    }

    /// Activate or deactivate a view; false if `handle` is unknown
    pub fn set_view_active(&mut self, handle: ViewHandle, active: bool) -> bool {
        match self.views.get_mut(handle) {
            Some(container) => {
                container.active = active;
                true
            }
            None => false,
        }
    }

    /// Whether the view is active
    pub fn is_view_active(&self, handle: ViewHandle) -> Option<bool> {
        self.views.get(handle).map(|c| c.active)
    }

    /// Remove a view; false if `handle` is unknown
    pub fn remove_view(&mut self, handle: ViewHandle) -> bool {
        self.views.remove(handle).is_some()
    }

    /// Number of views, active or not
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Active views in table order
    pub fn active_views(&self) -> impl Iterator<Item = (ViewHandle, &View)> {
        self.views
            .iter()
            .filter(|(_, c)| c.active)
            .map(|(handle, c)| (handle, &c.view))
    }

    /// Register a camera under `name`
    pub fn add_camera(&mut self, name: &str, camera: Camera) -> SceneResult<()> {
        if self.cameras.contains_key(name) {
            return Err(SceneError::DuplicateName {
                kind: "camera",
                name: name.to_string(),
            });
        }
        self.cameras.insert(name.to_string(), camera);
        Ok(())
    }

    /// Remove a camera, clearing the active camera if it was this one
    pub fn remove_camera(&mut self, name: &str) -> bool {
        if self.cameras.remove(name).is_none() {
            return false;
        }
        if self.active_camera.as_deref() == Some(name) {
            log::debug!("Removed the active camera '{}'", name);
            self.active_camera = None;
        }
        true
    }

    /// Make `name` the active camera
    pub fn set_active_camera(&mut self, name: &str) -> SceneResult<()> {
        if !self.cameras.contains_key(name) {
            return Err(SceneError::CameraNotFound(name.to_string()));
        }
        self.active_camera = Some(name.to_string());
        Ok(())
    }

    /// Camera registered under `name`
    pub fn camera(&self, name: &str) -> Option<&Camera> {
        self.cameras.get(name)
    }

    /// Mutable camera registered under `name`
    pub fn camera_mut(&mut self, name: &str) -> Option<&mut Camera> {
        self.cameras.get_mut(name)
    }

    /// Name and camera of the active camera
    pub fn active_camera(&self) -> Option<(&str, &Camera)> {
        let name = self.active_camera.as_deref()?;
        self.cameras.get(name).map(|camera| (name, camera))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_lifecycle() {
        let mut views = ViewManager::new(ViewConfig::default());
        let a = views.add_view(0, 0, 640, 480);
        let b = views.add_view(640, 0, 640, 480);
        assert_eq!(views.is_view_active(a), Some(true));

        assert!(views.set_view_active(a, false));
        let active: Vec<ViewHandle> = views.active_views().map(|(h, _)| h).collect();
        assert_eq!(active, vec![b]);

        assert!(views.remove_view(b));
        assert!(views.view(b).is_none());
        assert!(!views.set_view_active(b, true));
        assert_eq!(views.view_count(), 1);
    }

    #[test]
    fn test_active_camera() {
        let mut views = ViewManager::new(ViewConfig::default());
        assert_eq!(
            views.set_active_camera("front"),
            Err(SceneError::CameraNotFound("front".to_string()))
        );
        views.add_camera("front", Camera::default()).unwrap();
        views.add_camera("side", Camera::default()).unwrap();
        views.set_active_camera("front").unwrap();
        views.set_active_camera("side").unwrap();
        assert_eq!(views.active_camera().map(|(n, _)| n), Some("side"));

        assert!(matches!(
            views.add_camera("side", Camera::default()),
            Err(SceneError::DuplicateName { .. })
        ));
        assert!(views.remove_camera("side"));
        assert!(views.active_camera().is_none());
    }
}
