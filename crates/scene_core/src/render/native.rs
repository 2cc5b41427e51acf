//! Backend-side scene state
//!
//! Mirrors what a rendering backend keeps per scene: renderable and light
//! entities plus a transform node per renderable. The registries create and
//! destroy entries here; the frame snapshot reads from it.

use crate::foundation::math::Affine3;
use crate::lighting::Light;
use crate::resources::ResourceHandle;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Backend entity (renderable or light)
    pub struct EntityId;

    /// Placement node owned by the transform manager
    pub struct TransformNode;
}

/// Backend state of a renderable entity
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableInstance {
    /// Vertex buffer
    pub vertex_buffer: ResourceHandle,
    /// Index buffer
    pub index_buffer: ResourceHandle,
    /// Bound material instance
    pub material: ResourceHandle,
    /// Placement node
    pub transform: TransformNode,
    /// Whether the entity is drawn
    pub visible: bool,
    /// Whether the entity casts shadows
    pub cast_shadows: bool,
    /// Whether the entity receives shadows
    pub receive_shadows: bool,
}

#[derive(Debug)]
enum Entity {
    Renderable(RenderableInstance),
    Light(Light),
}

/// Placement nodes, one affine transform each
#[derive(Debug, Default)]
pub struct TransformManager {
    nodes: SlotMap<TransformNode, Affine3>,
}

impl TransformManager {
    /// Create a node holding `transform`
    pub fn create(&mut self, transform: Affine3) -> TransformNode {
        self.nodes.insert(transform)
    }

    /// Remove a node; true if it existed
    pub fn destroy(&mut self, node: TransformNode) -> bool {
        self.nodes.remove(node).is_some()
    }

    /// Current transform of `node`
    pub fn get(&self, node: TransformNode) -> Option<&Affine3> {
        self.nodes.get(node)
    }

    /// Overwrite the transform of `node`; false if the node is gone
    pub fn set(&mut self, node: TransformNode, transform: Affine3) -> bool {
        match self.nodes.get_mut(node) {
            Some(slot) => {
                *slot = transform;
                true
            }
            None => false,
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no node is live
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Entities and transforms of one scene
#[derive(Debug, Default)]
pub struct NativeScene {
    entities: SlotMap<EntityId, Entity>,
    /// Placement nodes of renderables
    pub transforms: TransformManager,
}

impl NativeScene {
    /// Empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderable entity
    pub fn add_renderable(&mut self, instance: RenderableInstance) -> EntityId {
        self.entities.insert(Entity::Renderable(instance))
    }

    /// Register a light entity
    pub fn add_light(&mut self, light: Light) -> EntityId {
        self.entities.insert(Entity::Light(light))
    }

    /// Remove an entity of either kind; true if it existed
    pub fn remove(&mut self, entity: EntityId) -> bool {
        self.entities.remove(entity).is_some()
    }

    /// Renderable state of `entity`
    pub fn renderable(&self, entity: EntityId) -> Option<&RenderableInstance> {
        match self.entities.get(entity)? {
            Entity::Renderable(r) => Some(r),
            Entity::Light(_) => None,
        }
    }

    /// Mutable renderable state of `entity`
    pub fn renderable_mut(&mut self, entity: EntityId) -> Option<&mut RenderableInstance> {
        match self.entities.get_mut(entity)? {
            Entity::Renderable(r) => Some(r),
            Entity::Light(_) => None,
        }
    }

    /// Light parameters of `entity`
    pub fn light(&self, entity: EntityId) -> Option<&Light> {
        match self.entities.get(entity)? {
            Entity::Light(l) => Some(l),
            Entity::Renderable(_) => None,
        }
    }

    /// Mutable light parameters of `entity`
    pub fn light_mut(&mut self, entity: EntityId) -> Option<&mut Light> {
        match self.entities.get_mut(entity)? {
            Entity::Light(l) => Some(l),
            Entity::Renderable(_) => None,
        }
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{affine_translation, Vec3};
    use crate::resources::DEFAULT_TEXTURE;

    #[test]
    fn test_transform_nodes() {
        let mut transforms = TransformManager::default();
        let node = transforms.create(Affine3::identity());
        assert!(transforms.set(node, affine_translation(Vec3::new(1.0, 2.0, 3.0))));
        assert_eq!(
            transforms.get(node).map(|t| t.matrix()[(0, 3)]),
            Some(1.0)
        );
        assert!(transforms.destroy(node));
        assert!(!transforms.set(node, Affine3::identity()));
        assert!(transforms.is_empty());
    }

    #[test]
    fn test_entity_kinds_do_not_alias() {
        let mut scene = NativeScene::new();
        let transform = scene.transforms.create(Affine3::identity());
        let renderable = scene.add_renderable(RenderableInstance {
            vertex_buffer: DEFAULT_TEXTURE,
            index_buffer: DEFAULT_TEXTURE,
            material: DEFAULT_TEXTURE,
            transform,
            visible: true,
            cast_shadows: true,
            receive_shadows: true,
        });
        let light =
            scene.add_light(Light::point(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), 1.0, 1.0));

        assert!(scene.renderable(renderable).is_some());
        assert!(scene.light(renderable).is_none());
        assert!(scene.light(light).is_some());
        assert!(scene.renderable_mut(light).is_none());

        assert!(scene.remove(light));
        assert!(!scene.remove(light));
        assert_eq!(scene.entity_count(), 1);
    }
}
