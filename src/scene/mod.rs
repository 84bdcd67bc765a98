pub mod camera;
pub mod graph;
pub mod material;
pub mod mesh;
pub mod node;
pub mod transform;

pub use camera::Camera;
pub use graph::SceneGraph;
pub use material::{Material, MaterialKind, MaterialParams};
pub use mesh::{Face, GeometryData, RenderMesh};
pub use node::Node;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Handle of a node inside a [`SceneGraph`].
    pub struct NodeIndex;
    /// Handle of a renderable mesh in the graph's mesh pool.
    pub struct MeshKey;
    /// Handle of a camera in the graph's camera pool.
    pub struct CameraKey;
    /// Handle of a material in the graph's material pool.
    pub struct MaterialKey;
}
