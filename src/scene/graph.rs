use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::camera::Camera;
use crate::scene::material::Material;
use crate::scene::mesh::RenderMesh;
use crate::scene::node::Node;
use crate::scene::{CameraKey, MaterialKey, MeshKey, NodeIndex};

/// The assembled scene graph.
///
/// Pure data: nodes form a tree through parent/child handles, while meshes,
/// cameras and materials live in component pools referenced from nodes.
#[derive(Debug, Default)]
pub struct SceneGraph {
    pub nodes: SlotMap<NodeIndex, Node>,
    pub root_nodes: Vec<NodeIndex>,

    pub meshes: SlotMap<MeshKey, RenderMesh>,
    pub cameras: SlotMap<CameraKey, Camera>,
    pub materials: SlotMap<MaterialKey, Material>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached node (not yet parented, not a root).
    pub fn create_node(&mut self) -> NodeIndex {
        self.nodes.insert(Node::new())
    }

    pub fn create_node_named(&mut self, name: &str) -> NodeIndex {
        self.nodes.insert(Node::named(name))
    }

    /// Promotes a detached node to a scene root.
    pub fn add_root(&mut self, idx: NodeIndex) {
        if !self.root_nodes.contains(&idx) {
            self.root_nodes.push(idx);
        }
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx)
    }

    #[inline]
    pub fn get_node_mut(&mut self, idx: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(idx)
    }

    /// Attaches `child` under `parent`, detaching it from its previous
    /// parent (or the root list) first.
    pub fn attach(&mut self, child: NodeIndex, parent: NodeIndex) {
        if child == parent {
            log::warn!("cannot attach a node to itself");
            return;
        }

        // Detach from old parent
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }

        // Attach to new
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        } else {
            log::warn!("attach target does not exist; node left detached");
            return;
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Recomputes local matrices (honoring `matrix_auto_update`) and
    /// propagates world matrices root-down.
    pub fn update_world_transforms(&mut self) {
        let mut stack: Vec<(NodeIndex, Affine3A)> = self
            .root_nodes
            .iter()
            .map(|&r| (r, Affine3A::IDENTITY))
            .collect();

        while let Some((idx, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(idx) else {
                continue;
            };
            node.transform.update_local_matrix();
            let world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(world);

            let children = node.children.clone();
            stack.extend(children.into_iter().map(|c| (c, world)));
        }
    }

    /// Depth-first search for a node by name, starting at `root`.
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeIndex, name: &str) -> Option<NodeIndex> {
        let node = self.nodes.get(root)?;
        if node.name == name {
            return Some(root);
        }
        for &child in &node.children {
            if let Some(found) = self.find_node_by_name(child, name) {
                return Some(found);
            }
        }
        None
    }
}
