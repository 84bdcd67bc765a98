//! The resource registry: one entry per description record, keyed by id.
//!
//! The registry is the single source of truth for "has this id been
//! resolved yet". Entries are created when their description is first
//! handled (the object side may still be empty), filled in once when the
//! underlying resource resolves, and only ever removed by the bulk
//! [`ResourceRegistry::clear_entries`] at load-session boundaries.

use rustc_hash::FxHashMap;

use crate::document::{
    AnimationDesc, AttributeDesc, BufferDesc, BufferViewDesc, CameraDesc, ImageDesc, IndicesDesc,
    MaterialDesc, MeshDesc, NodeDesc, SceneDesc, TechniqueDesc,
};
use crate::errors::{Result, WeftError};
use crate::loader::gates::MeshSlotKey;
use crate::scene::{CameraKey, MaterialKey, NodeIndex};

/// The source description a registry entry was created from.
#[derive(Debug, Clone)]
pub enum Description {
    Buffer(BufferDesc),
    BufferView(BufferViewDesc),
    Attribute(AttributeDesc),
    Indices(IndicesDesc),
    Image(ImageDesc),
    Technique(TechniqueDesc),
    Material(MaterialDesc),
    Mesh(MeshDesc),
    Camera(CameraDesc),
    Node(NodeDesc),
    Scene(SceneDesc),
    Animation(AnimationDesc),
}

/// What an entry resolved to, once it did.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedObject {
    Mesh(MeshSlotKey),
    Material(MaterialKey),
    Camera(CameraKey),
    Node(NodeIndex),
}

/// A registry record binding an id to its resolved object and the
/// description it came from.
#[derive(Debug)]
pub struct RegistryEntry {
    pub id: String,
    pub object: Option<ResolvedObject>,
    pub description: Description,
}

/// Keyed store of every entry of one load session. No eviction; the whole
/// registry lives exactly as long as the load does.
#[derive(Default)]
pub struct ResourceRegistry {
    entries: FxHashMap<String, RegistryEntry>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entry. An empty id is refused; a duplicate id is
    /// overwritten with a warning — neither aborts the load.
    pub fn set_entry(&mut self, id: &str, object: Option<ResolvedObject>, description: Description) {
        if id.is_empty() {
            log::error!("no entry id provided, cannot store {description:?}");
            return;
        }
        if self.entries.contains_key(id) {
            log::warn!("entry `{id}` is being overwritten");
        }
        self.entries.insert(
            id.to_string(),
            RegistryEntry {
                id: id.to_string(),
                object,
                description,
            },
        );
    }

    #[must_use]
    pub fn get_entry(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    pub fn get_entry_mut(&mut self, id: &str) -> Option<&mut RegistryEntry> {
        self.entries.get_mut(id)
    }

    /// Resets the registry to empty. Used at load-session boundaries,
    /// never mid-load.
    pub fn clear_entries(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry, treating absence as a malformed reference.
    pub fn require(&self, id: &str) -> Result<&RegistryEntry> {
        self.entries
            .get(id)
            .ok_or_else(|| WeftError::MissingEntry(id.to_string()))
    }

    // ========================================================================
    // Typed accessors
    // ========================================================================

    pub fn buffer_desc(&self, id: &str) -> Result<&BufferDesc> {
        match &self.require(id)?.description {
            Description::Buffer(desc) => Ok(desc),
            _ => Err(wrong_kind(id, "buffer")),
        }
    }

    pub fn buffer_view_desc(&self, id: &str) -> Result<&BufferViewDesc> {
        match &self.require(id)?.description {
            Description::BufferView(desc) => Ok(desc),
            _ => Err(wrong_kind(id, "bufferView")),
        }
    }

    pub fn attribute_desc(&self, id: &str) -> Result<&AttributeDesc> {
        match &self.require(id)?.description {
            Description::Attribute(desc) => Ok(desc),
            _ => Err(wrong_kind(id, "attribute")),
        }
    }

    pub fn indices_desc(&self, id: &str) -> Result<&IndicesDesc> {
        match &self.require(id)?.description {
            Description::Indices(desc) => Ok(desc),
            _ => Err(wrong_kind(id, "indices")),
        }
    }

    pub fn image_desc(&self, id: &str) -> Result<&ImageDesc> {
        match &self.require(id)?.description {
            Description::Image(desc) => Ok(desc),
            _ => Err(wrong_kind(id, "image")),
        }
    }

    pub fn technique_desc(&self, id: &str) -> Result<&TechniqueDesc> {
        match &self.require(id)?.description {
            Description::Technique(desc) => Ok(desc),
            _ => Err(wrong_kind(id, "technique")),
        }
    }

    pub fn node_desc(&self, id: &str) -> Result<&NodeDesc> {
        match &self.require(id)?.description {
            Description::Node(desc) => Ok(desc),
            _ => Err(wrong_kind(id, "node")),
        }
    }

    pub fn mesh_object(&self, id: &str) -> Result<MeshSlotKey> {
        match self.require(id)?.object {
            Some(ResolvedObject::Mesh(key)) => Ok(key),
            _ => Err(wrong_kind(id, "mesh")),
        }
    }

    pub fn material_object(&self, id: &str) -> Result<MaterialKey> {
        match self.require(id)?.object {
            Some(ResolvedObject::Material(key)) => Ok(key),
            _ => Err(wrong_kind(id, "material")),
        }
    }

    pub fn camera_object(&self, id: &str) -> Result<CameraKey> {
        match self.require(id)?.object {
            Some(ResolvedObject::Camera(key)) => Ok(key),
            _ => Err(wrong_kind(id, "camera")),
        }
    }

    pub fn node_object(&self, id: &str) -> Result<NodeIndex> {
        match self.require(id)?.object {
            Some(ResolvedObject::Node(idx)) => Ok(idx),
            _ => Err(wrong_kind(id, "node")),
        }
    }
}

fn wrong_kind(id: &str, expected: &'static str) -> WeftError {
    WeftError::WrongKind {
        id: id.to_string(),
        expected,
    }
}
