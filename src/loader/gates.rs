//! Completion gates for composite objects.
//!
//! [`GeometryGate`] accumulates the typed channels of one primitive and
//! finalizes exactly once when both the index array and every expected
//! attribute have arrived — in whatever order the transport delivers them.
//! [`MeshSlot`] latches once every primitive gate has finalized and drains
//! an explicit observer list; observers registered after completion fire
//! immediately.

use glam::{Vec2, Vec3};
use slotmap::new_key_type;

use crate::scene::mesh::{Face, GeometryData};
use crate::scene::{MaterialKey, NodeIndex};

new_key_type! {
    /// Handle of a geometry gate inside a load session.
    pub struct GeometryKey;
    /// Handle of a mesh completion slot inside a load session.
    pub struct MeshSlotKey;
}

/// Attribute semantic of one vertex channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Semantic {
    Position,
    Normal,
    TexCoord,
    /// Counted toward the completion gate but otherwise unused.
    Other(String),
}

impl Semantic {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "POSITION" => Self::Position,
            "NORMAL" => Self::Normal,
            "TEXCOORD" | "TEXCOORD_0" => Self::TexCoord,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Per-primitive accumulator with an exactly-once finalize step.
#[derive(Debug)]
pub struct GeometryGate {
    /// Mesh slot to notify when this gate finalizes.
    pub mesh: MeshSlotKey,

    pub total_attributes: usize,
    pub loaded_attributes: usize,

    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    pub index_array: Option<Vec<u16>>,

    pub finished: bool,
    /// Finalized output, present once `finished` is set.
    pub data: Option<GeometryData>,
}

impl GeometryGate {
    #[must_use]
    pub fn new(mesh: MeshSlotKey, total_attributes: usize) -> Self {
        Self {
            mesh,
            total_attributes,
            loaded_attributes: 0,
            positions: Vec::new(),
            normals: None,
            uvs: None,
            index_array: None,
            finished: false,
            data: None,
        }
    }

    pub fn supply_indices(&mut self, indices: Vec<u16>) {
        self.index_array = Some(indices);
    }

    /// Stores one resolved attribute channel and counts it toward the
    /// completion gate. Texture coordinates arrive with the V axis flipped
    /// (`v' = 1 - v`); unrecognized semantics only count.
    pub fn supply_attribute(&mut self, semantic: &Semantic, floats: &[f32]) {
        match semantic {
            Semantic::Position => {
                self.positions = floats
                    .chunks_exact(3)
                    .map(|c| Vec3::new(c[0], c[1], c[2]))
                    .collect();
            }
            Semantic::Normal => {
                self.normals = Some(
                    floats
                        .chunks_exact(3)
                        .map(|c| Vec3::new(c[0], c[1], c[2]))
                        .collect(),
                );
            }
            Semantic::TexCoord => {
                self.uvs = Some(
                    floats
                        .chunks_exact(2)
                        .map(|c| Vec2::new(c[0], 1.0 - c[1]))
                        .collect(),
                );
            }
            Semantic::Other(name) => {
                log::debug!("attribute semantic `{name}` is unused, counted for completion only");
            }
        }
        self.loaded_attributes += 1;
    }

    /// Runs the finalize transition if the gate is satisfied. Returns true
    /// only on the call that performed the transition.
    pub fn check_finished(&mut self) -> bool {
        if self.finished
            || self.index_array.is_none()
            || self.loaded_attributes != self.total_attributes
        {
            return false;
        }
        self.finalize();
        self.finished = true;
        true
    }

    /// Builds indexed triangles from the flat index array, pairing each
    /// with per-vertex normals and UVs where loaded, and computing
    /// centroids plus face normals when no vertex normals were supplied.
    fn finalize(&mut self) {
        let indices = self.index_array.take().unwrap_or_default();
        let vertices = std::mem::take(&mut self.positions);
        let normals = self.normals.take();
        let uvs = self.uvs.take();

        let mut faces = Vec::with_capacity(indices.len() / 3);
        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
                log::warn!("face index out of bounds, skipping triangle");
                continue;
            }

            let face_normals = normals
                .as_ref()
                .filter(|n| c.max(a).max(b) < n.len())
                .map(|n| [n[a], n[b], n[c]]);
            let face_uvs = uvs
                .as_ref()
                .filter(|uv| c.max(a).max(b) < uv.len())
                .map(|uv| [uv[a], uv[b], uv[c]]);

            let centroid = (vertices[a] + vertices[b] + vertices[c]) / 3.0;
            let derived_normal = if normals.is_none() {
                let edge1 = vertices[b] - vertices[a];
                let edge2 = vertices[c] - vertices[a];
                Some(edge1.cross(edge2).normalize_or_zero())
            } else {
                None
            };

            faces.push(Face {
                indices: [tri[0].into(), tri[1].into(), tri[2].into()],
                normals: face_normals,
                uvs: face_uvs,
                centroid,
                normal: derived_normal,
            });
        }

        self.data = Some(GeometryData { vertices, faces });
    }
}

/// One primitive of a mesh: its geometry gate plus the material to pair
/// with it once built.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveSlot {
    pub geometry: GeometryKey,
    pub material: MaterialKey,
}

/// Tracks completion of a whole mesh.
#[derive(Debug, Default)]
pub struct MeshSlot {
    pub name: Option<String>,
    pub primitives: Vec<PrimitiveSlot>,

    /// Primitives whose gate has finalized.
    pub loaded_geometry: usize,
    /// Set once every primitive was registered; completion is not checked
    /// before this, so partially built slots cannot fire early.
    pub sealed: bool,
    /// Latched completion state.
    pub complete: bool,

    /// Nodes waiting for this mesh. Drained (and left empty) on
    /// completion; late registrations are notified immediately instead.
    pub observers: Vec<NodeIndex>,
}

impl MeshSlot {
    #[must_use]
    pub fn named(name: Option<String>) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.sealed && self.loaded_geometry == self.primitives.len()
    }
}
