//! Named geometry registry
//!
//! Records live in a slotmap arena; names (and model group aliases) map to
//! arena ids. Every mesh buffer and material instance a record holds is an
//! [`OwnedHandle`], so erasing the record releases them.

use super::{SceneError, SceneResult};
use crate::foundation::bounds::Aabb;
use crate::foundation::math::Affine3;
use crate::geometry::{MeshData, MeshError, Model};
use crate::material::{bind_material, override_material, GeometryMaterialInstance, Material};
use crate::render::{EntityId, NativeScene, RenderableInstance, TransformNode};
use crate::resources::{OwnedHandle, ResourceDescriptor, ResourceHandle, SharedResources};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;

new_key_type! {
    /// Arena id of a registered geometry
    pub struct GeometryId;
}

/// Separator between a model name and its part names
pub const MODEL_PART_SEPARATOR: char = ':';

/// A registered geometry and everything it owns
#[derive(Debug)]
pub struct RenderableGeometry {
    /// Unique name
    pub name: String,
    /// Whether the geometry is drawn
    pub visible: bool,
    /// Whether the geometry casts shadows
    pub cast_shadows: bool,
    /// Whether the geometry receives shadows
    pub receive_shadows: bool,
    /// Bound material
    pub material: GeometryMaterialInstance,
    /// Vertex buffer
    pub vertex_buffer: OwnedHandle,
    /// Index buffer
    pub index_buffer: OwnedHandle,
    /// Backend renderable entity
    pub entity: EntityId,
    /// Placement node
    pub transform: TransformNode,
    local_bounds: Aabb,
}

impl RenderableGeometry {
    /// Mesh-space bounding box captured when the mesh was uploaded
    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }

    /// Current mesh-to-world transform; identity if the node is detached
    pub fn world_transform(&self, native: &NativeScene) -> Affine3 {
        native
            .transforms
            .get(self.transform)
            .copied()
            .unwrap_or_else(Affine3::identity)
    }

    /// World-space bounding box under the current transform
    pub fn world_bounds(&self, native: &NativeScene) -> Aabb {
        self.local_bounds.transformed(&self.world_transform(native))
    }

    fn sync(&self, native: &mut NativeScene) {
        if let Some(instance) = native.renderable_mut(self.entity) {
            instance.visible = self.visible;
            instance.cast_shadows = self.cast_shadows;
            instance.receive_shadows = self.receive_shadows;
            instance.material = self.material.instance_handle();
        }
    }
}

/// Vertex and index buffer handles of a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryBuffers {
    /// Vertex buffer
    pub vertex_buffer: ResourceHandle,
    /// Index buffer
    pub index_buffer: ResourceHandle,
}

/// Geometry registry keyed by unique name
#[derive(Debug, Default)]
pub struct GeometryRegistry {
    geometries: SlotMap<GeometryId, RenderableGeometry>,
    names: HashMap<String, GeometryId>,
    groups: HashMap<String, Vec<GeometryId>>,
}

impl GeometryRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `name` is a geometry or a model group
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name) || self.groups.contains_key(name)
    }

    /// Number of registered geometries (model parts counted individually)
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Geometry names in storage order
    pub fn names(&self) -> Vec<String> {
        self.geometries.values().map(|g| g.name.clone()).collect()
    }

    /// Registered geometries in storage order
    pub fn iter(&self) -> impl Iterator<Item = &RenderableGeometry> {
        self.geometries.values()
    }

    /// Geometry registered under exactly `name`
    pub fn get(&self, name: &str) -> Option<&RenderableGeometry> {
        self.names.get(name).and_then(|&id| self.geometries.get(id))
    }

    /// Part names of a model group
    pub fn group_parts(&self, name: &str) -> Option<Vec<String>> {
        let ids = self.groups.get(name)?;
        Some(
            ids.iter()
                .filter_map(|&id| self.geometries.get(id))
                .map(|g| g.name.clone())
                .collect(),
        )
    }

    /// Buffers of the geometry registered under `name`
    pub fn buffers(&self, name: &str) -> Option<GeometryBuffers> {
        self.get(name).map(|g| GeometryBuffers {
            vertex_buffer: g.vertex_buffer.handle(),
            index_buffer: g.index_buffer.handle(),
        })
    }

    /// Upload `mesh`, bind `material` and register the result as `name`
    pub fn add(
        &mut self,
        native: &mut NativeScene,
        resources: &SharedResources,
        name: &str,
        mesh: &MeshData,
        material: &Material,
    ) -> SceneResult<GeometryId> {
        if self.contains(name) {
            return Err(SceneError::DuplicateName {
                kind: "geometry",
                name: name.to_string(),
            });
        }
        mesh.validate().map_err(|source| SceneError::InvalidGeometry {
            name: name.to_string(),
            source,
        })?;

        // Guards release whatever was acquired if a later step fails
        let vertex_buffer = OwnedHandle::acquire(
            resources,
            ResourceDescriptor::VertexBuffer { vertex_count: mesh.vertices.len() },
        )?;
        let index_buffer = OwnedHandle::acquire(
            resources,
            ResourceDescriptor::IndexBuffer { index_count: mesh.index_count() },
        )?;
        let material = bind_material(resources, material)?;

        let transform = native.transforms.create(Affine3::identity());
        let entity = native.add_renderable(RenderableInstance {
            vertex_buffer: vertex_buffer.handle(),
            index_buffer: index_buffer.handle(),
            material: material.instance_handle(),
            transform,
            visible: true,
            cast_shadows: true,
            receive_shadows: true,
        });

        let id = self.geometries.insert(RenderableGeometry {
            name: name.to_string(),
            visible: true,
            cast_shadows: true,
            receive_shadows: true,
            material,
            vertex_buffer,
            index_buffer,
            entity,
            transform,
            local_bounds: mesh.bounds(),
        });
        self.names.insert(name.to_string(), id);
        log::debug!("Added geometry '{}'", name);
        Ok(id)
    }

    /// Register every mesh of `model` as `<name>:<mesh>` under group `name`
    ///
    /// Either all parts are added or none are.
    pub fn add_model(
        &mut self,
        native: &mut NativeScene,
        resources: &SharedResources,
        name: &str,
        model: &Model,
    ) -> SceneResult<Vec<String>> {
        if self.contains(name) {
            return Err(SceneError::DuplicateName {
                kind: "geometry",
                name: name.to_string(),
            });
        }
        let invalid = |source| SceneError::InvalidGeometry {
            name: name.to_string(),
            source,
        };
        if model.meshes.is_empty() {
            return Err(invalid(MeshError::Empty));
        }
        model.validate().map_err(invalid)?;

        let mut parts = Vec::with_capacity(model.meshes.len());
        for part in &model.meshes {
            let part_name = format!("{}{}{}", name, MODEL_PART_SEPARATOR, part.name);
            let material = &model.materials[part.material_index];
            match self.add(native, resources, &part_name, &part.mesh, material) {
                Ok(id) => parts.push(id),
                Err(e) => {
                    for id in parts {
                        self.erase(native, id);
                    }
                    return Err(e);
                }
            }
        }

        let names = parts
            .iter()
            .filter_map(|&id| self.geometries.get(id))
            .map(|g| g.name.clone())
            .collect();
        self.groups.insert(name.to_string(), parts);
        log::debug!("Added model '{}' with {} parts", name, model.meshes.len());
        Ok(names)
    }

    /// Remove a geometry or every part of a model group
    ///
    /// Returns false if nothing is registered under `name`.
    pub fn remove(&mut self, native: &mut NativeScene, name: &str) -> bool {
        if let Some(parts) = self.groups.remove(name) {
            for id in parts {
                self.erase(native, id);
            }
            return true;
        }
        match self.names.get(name).copied() {
            Some(id) => {
                self.erase(native, id);
                true
            }
            None => false,
        }
    }

    fn erase(&mut self, native: &mut NativeScene, id: GeometryId) {
        let Some(record) = self.geometries.remove(id) else {
            return;
        };
        self.names.remove(&record.name);
        self.groups.retain(|_, parts| {
            parts.retain(|&p| p != id);
            !parts.is_empty()
        });

        native.remove(record.entity);
        native.transforms.destroy(record.transform);
        log::debug!("Removed geometry '{}'", record.name);
        // Buffers and material instance are released with the record
    }

    fn resolve(&self, name: &str) -> Vec<GeometryId> {
        if let Some(&id) = self.names.get(name) {
            vec![id]
        } else {
            self.groups.get(name).cloned().unwrap_or_default()
        }
    }

    fn update<F>(&mut self, native: &mut NativeScene, name: &str, mut f: F) -> bool
    where
        F: FnMut(&mut RenderableGeometry, &mut NativeScene),
    {
        let ids = self.resolve(name);
        for &id in &ids {
            if let Some(record) = self.geometries.get_mut(id) {
                f(record, native);
                record.sync(native);
            }
        }
        !ids.is_empty()
    }

    /// Show or hide; false if `name` is unknown
    pub fn show(&mut self, native: &mut NativeScene, name: &str, show: bool) -> bool {
        self.update(native, name, |g, _| g.visible = show)
    }

    /// Set shadow flags; false if `name` is unknown
    pub fn set_shadows(
        &mut self,
        native: &mut NativeScene,
        name: &str,
        cast: bool,
        receive: bool,
    ) -> bool {
        self.update(native, name, |g, _| {
            g.cast_shadows = cast;
            g.receive_shadows = receive;
        })
    }

    /// Write the placement transform; false if `name` is unknown
    pub fn set_transform(
        &mut self,
        native: &mut NativeScene,
        name: &str,
        transform: &Affine3,
    ) -> bool {
        self.update(native, name, |g, native| {
            if !native.transforms.set(g.transform, *transform) {
                log::warn!("Geometry '{}' has no transform node", g.name);
            }
        })
    }

    /// Placement transform; the first part's for a model group
    pub fn transform(&self, native: &NativeScene, name: &str) -> SceneResult<Affine3> {
        self.resolve(name)
            .first()
            .and_then(|&id| self.geometries.get(id))
            .map(|g| g.world_transform(native))
            .ok_or_else(|| SceneError::GeometryNotFound(name.to_string()))
    }

    /// World-space bounds; the union of the parts for a model group
    pub fn bounding_box(&self, native: &NativeScene, name: &str) -> SceneResult<Aabb> {
        let ids = self.resolve(name);
        if ids.is_empty() {
            return Err(SceneError::GeometryNotFound(name.to_string()));
        }
        Ok(ids
            .iter()
            .filter_map(|&id| self.geometries.get(id))
            .fold(Aabb::empty(), |acc, g| acc.merge(&g.world_bounds(native))))
    }

    /// Rebind the material of a geometry or of every part of a group
    ///
    /// Every part is attempted; the first failure is returned.
    pub fn override_material(
        &mut self,
        native: &mut NativeScene,
        resources: &SharedResources,
        name: &str,
        material: &Material,
        shader_only: bool,
    ) -> SceneResult<()> {
        let ids = self.resolve(name);
        if ids.is_empty() {
            return Err(SceneError::GeometryNotFound(name.to_string()));
        }
        let mut first_error = None;
        for id in ids {
            if let Err(e) = self.override_one(native, resources, id, material, shader_only) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Rebind the material of every geometry; returns the number of failures
    pub fn override_material_all(
        &mut self,
        native: &mut NativeScene,
        resources: &SharedResources,
        material: &Material,
        shader_only: bool,
    ) -> usize {
        let ids: Vec<GeometryId> = self.geometries.keys().collect();
        ids.into_iter()
            .filter(|&id| {
                self.override_one(native, resources, id, material, shader_only)
                    .is_err()
            })
            .count()
    }

    fn override_one(
        &mut self,
        native: &mut NativeScene,
        resources: &SharedResources,
        id: GeometryId,
        material: &Material,
        shader_only: bool,
    ) -> SceneResult<()> {
        let Some(record) = self.geometries.get_mut(id) else {
            return Ok(());
        };
        let result = override_material(resources, &mut record.material, material, shader_only);
        // The instance may have been replaced even on failure
        record.sync(native);
        if let Err(e) = &result {
            log::warn!("Failed to override material of '{}': {}", record.name, e);
        }
        result.map_err(SceneError::from)
    }
}
