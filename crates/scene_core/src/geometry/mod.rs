//! Mesh data consumed when geometry is added to a scene
//!
//! Mesh data is uploaded once into vertex and index buffers; the scene keeps
//! only the resulting handles and the mesh-space bounding box.

use crate::foundation::bounds::Aabb;
use crate::foundation::math::Vec3;
use crate::material::Material;
use thiserror::Error;

/// Mesh validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Mesh has no vertices
    #[error("Mesh has no vertices")]
    Empty,

    /// An index points past the end of the vertex list
    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index value
        index: u32,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },

    /// Index count does not fit the primitive type
    #[error("{index_count} indices do not form whole {primitive:?} primitives")]
    IncompletePrimitive {
        /// Primitive topology
        primitive: PrimitiveType,
        /// Number of indices supplied
        index_count: usize,
    },

    /// Model mesh refers to a material the model does not have
    #[error("Mesh '{mesh}' uses material {index}, model has {count}")]
    MaterialOutOfRange {
        /// Mesh name
        mesh: String,
        /// Material index used
        index: usize,
        /// Number of materials in the model
        count: usize,
    },
}

/// Primitive topology of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveType {
    /// Independent points
    Points,
    /// Independent line segments
    Lines,
    /// Independent triangles
    #[default]
    Triangles,
}

impl PrimitiveType {
    /// Indices per primitive
    pub fn vertices_per_primitive(self) -> usize {
        match self {
            Self::Points => 1,
            Self::Lines => 2,
            Self::Triangles => 3,
        }
    }
}

/// Single mesh vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in mesh space
    pub position: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Vertex at `position` with zero normal and uv
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            normal: [0.0; 3],
            tex_coord: [0.0; 2],
        }
    }
}

/// Vertex attributes plus an index list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex list
    pub vertices: Vec<Vertex>,
    /// Index list; empty means the vertices are drawn in order
    pub indices: Vec<u32>,
    /// Topology
    pub primitive: PrimitiveType,
}

impl MeshData {
    /// Create mesh data from vertices and indices
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, primitive: PrimitiveType) -> Self {
        Self {
            vertices,
            indices,
            primitive,
        }
    }

    /// Point cloud without indices
    pub fn points(positions: &[[f32; 3]]) -> Self {
        Self::new(
            positions.iter().copied().map(Vertex::at).collect(),
            Vec::new(),
            PrimitiveType::Points,
        )
    }

    /// Axis-aligned cube of edge length `size` centered at the origin
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0], [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]]),
            ([0.0, 0.0, -1.0], [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]]),
            ([1.0, 0.0, 0.0], [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]]),
            ([-1.0, 0.0, 0.0], [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]]),
            ([0.0, 1.0, 0.0], [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]]),
            ([0.0, -1.0, 0.0], [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]]),
        ];
        let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = vertices.len() as u32;
            for (position, tex_coord) in corners.into_iter().zip(uvs) {
                vertices.push(Vertex {
                    position,
                    normal,
                    tex_coord,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self::new(vertices, indices, PrimitiveType::Triangles)
    }

    /// Number of elements the index buffer will hold
    pub fn index_count(&self) -> usize {
        if self.indices.is_empty() {
            self.vertices.len()
        } else {
            self.indices.len()
        }
    }

    /// Check the mesh can be uploaded
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.vertices.is_empty() {
            return Err(MeshError::Empty);
        }
        let vertex_count = self.vertices.len();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange { index, vertex_count });
        }
        let index_count = self.index_count();
        if index_count % self.primitive.vertices_per_primitive() != 0 {
            return Err(MeshError::IncompletePrimitive {
                primitive: self.primitive,
                index_count,
            });
        }
        Ok(())
    }

    /// Mesh-space bounding box
    pub fn bounds(&self) -> Aabb {
        let points: Vec<Vec3> = self.vertices.iter().map(|v| Vec3::from(v.position)).collect();
        Aabb::from_points(points.iter())
    }
}

/// Mesh inside a model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMesh {
    /// Part name, unique within the model
    pub name: String,
    /// Geometry
    pub mesh: MeshData,
    /// Index into [`Model::materials`]
    pub material_index: usize,
}

/// Collection of named meshes sharing a material list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// Parts of the model
    pub meshes: Vec<ModelMesh>,
    /// Materials referenced by the parts
    pub materials: Vec<Material>,
}

impl Model {
    /// Empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a material, returning its index
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Append a named mesh using material `material_index`
    pub fn add_mesh(&mut self, name: impl Into<String>, mesh: MeshData, material_index: usize) {
        self.meshes.push(ModelMesh {
            name: name.into(),
            mesh,
            material_index,
        });
    }

    /// Check every part before anything is uploaded
    pub fn validate(&self) -> Result<(), MeshError> {
        for part in &self.meshes {
            if part.material_index >= self.materials.len() {
                return Err(MeshError::MaterialOutOfRange {
                    mesh: part.name.clone(),
                    index: part.material_index,
                    count: self.materials.len(),
                });
            }
            part.mesh.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_layout() {
        let cube = MeshData::cube(1.0);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.validate().is_ok());

        let bounds = cube.bounds();
        assert_relative_eq!(bounds.min, Vec3::new(-0.5, -0.5, -0.5));
        assert_relative_eq!(bounds.max, Vec3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_validate_rejects_bad_meshes() {
        assert_eq!(MeshData::default().validate(), Err(MeshError::Empty));

        let mut mesh = MeshData::points(&[[0.0; 3], [1.0; 3]]);
        mesh.indices = vec![0, 2];
        assert!(matches!(mesh.validate(), Err(MeshError::IndexOutOfRange { index: 2, .. })));

        let mut tri = MeshData::points(&[[0.0; 3], [1.0; 3]]);
        tri.primitive = PrimitiveType::Triangles;
        assert!(matches!(tri.validate(), Err(MeshError::IncompletePrimitive { .. })));
    }

    #[test]
    fn test_points_index_count() {
        let mesh = MeshData::points(&[[0.0; 3], [1.0; 3], [2.0; 3]]);
        assert_eq!(mesh.index_count(), 3);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_model_material_range() {
        let mut model = Model::new();
        model.add_mesh("body", MeshData::cube(1.0), 0);
        assert!(matches!(model.validate(), Err(MeshError::MaterialOutOfRange { .. })));
        model.add_material(Material::default());
        assert!(model.validate().is_ok());
    }
}
