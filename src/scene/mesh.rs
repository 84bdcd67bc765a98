use glam::{Vec2, Vec3};

use crate::scene::MaterialKey;

/// One indexed triangle with the per-vertex data that was resolved for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub indices: [u32; 3],
    /// Per-vertex normals, present when a normal channel was loaded.
    pub normals: Option<[Vec3; 3]>,
    /// Per-vertex texture coordinates, present when a UV channel was loaded.
    pub uvs: Option<[Vec2; 3]>,
    pub centroid: Vec3,
    /// Derived face normal; only computed when no vertex normals exist.
    pub normal: Option<Vec3>,
}

/// Structured, finalized geometry: the vertex list plus triangulated faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
}

/// A renderable mesh object: finalized geometry paired with a material.
#[derive(Debug, Clone)]
pub struct RenderMesh {
    pub geometry: GeometryData,
    pub material: MaterialKey,
    pub cast_shadow: bool,
}

impl RenderMesh {
    #[must_use]
    pub fn new(geometry: GeometryData, material: MaterialKey) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: true,
        }
    }
}
