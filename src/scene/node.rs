use smallvec::SmallVec;

use crate::scene::transform::Transform;
use crate::scene::{CameraKey, MeshKey, NodeIndex};

/// A scene-graph node: hierarchy links, a transform, and the content
/// attached to it.
///
/// A node may exist in the hierarchy before its visual content has
/// arrived; mesh attachment is deferred until the referenced mesh
/// completes, so `meshes` fills in as resolution progresses.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: String,

    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,

    pub transform: Transform,

    /// Renderable meshes attached to this node. Most nodes carry at most
    /// one primitive, hence the inline capacity.
    pub meshes: SmallVec<[MeshKey; 1]>,
    pub camera: Option<CameraKey>,

    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: String::new(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            meshes: SmallVec::new(),
            camera: None,
            visible: true,
        }
    }

    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::new()
        }
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }
}
