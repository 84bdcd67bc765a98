//! Typed records of the scene-description document.
//!
//! The document is an already-parsed tree: every record carries an opaque
//! string id and references other records by id. The types here derive
//! [`serde::Deserialize`] (camelCase field names) so a caller can produce a
//! [`Document`] straight from JSON, but the resolution pipeline itself only
//! ever consumes the typed tree.

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::animation::TargetPath;

/// Element type of a typed buffer region. Fixes the per-element byte size
/// and the number of float components per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ElementType {
    #[serde(rename = "FLOAT")]
    Float,
    #[serde(rename = "UNSIGNED_BYTE")]
    UnsignedByte,
    #[serde(rename = "UNSIGNED_SHORT")]
    UnsignedShort,
    #[serde(rename = "FLOAT_VEC2")]
    FloatVec2,
    #[serde(rename = "FLOAT_VEC3")]
    FloatVec3,
    #[serde(rename = "FLOAT_VEC4")]
    FloatVec4,
}

impl ElementType {
    /// Size in bytes of one element of this type.
    #[inline]
    #[must_use]
    pub fn byte_size(self) -> u64 {
        match self {
            Self::UnsignedByte => 1,
            Self::UnsignedShort => 2,
            Self::Float => 4,
            Self::FloatVec2 => 8,
            Self::FloatVec3 => 12,
            Self::FloatVec4 => 16,
        }
    }

    /// Number of scalar components per element.
    #[inline]
    #[must_use]
    pub fn components(self) -> u32 {
        match self {
            Self::Float | Self::UnsignedByte | Self::UnsignedShort => 1,
            Self::FloatVec2 => 2,
            Self::FloatVec3 => 3,
            Self::FloatVec4 => 4,
        }
    }
}

/// A raw binary source, addressed by path and fetched in byte ranges.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferDesc {
    pub path: String,
    #[serde(default)]
    pub byte_length: u64,
}

/// A named byte sub-range of a buffer, not yet typed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferViewDesc {
    pub buffer: String,
    #[serde(default)]
    pub byte_offset: u64,
    #[serde(default)]
    pub byte_length: u64,
}

/// A typed, strided view over a buffer view (e.g. per-vertex positions).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDesc {
    pub buffer_view: String,
    #[serde(default)]
    pub byte_offset: u64,
    #[serde(default)]
    pub byte_stride: u64,
    pub count: u32,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    #[serde(default)]
    pub max: Option<Vec<f32>>,
    #[serde(default)]
    pub min: Option<Vec<f32>>,
}

/// An index-array view over a buffer view.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicesDesc {
    pub buffer_view: String,
    #[serde(default)]
    pub byte_offset: u64,
    pub count: u32,
    #[serde(rename = "type", default = "default_index_type")]
    pub element_type: ElementType,
}

fn default_index_type() -> ElementType {
    ElementType::UnsignedShort
}

/// An external image, carried as an opaque path (decoding happens elsewhere).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDesc {
    pub path: String,
}

/// The slice of a technique the pipeline interprets: the lighting model
/// selects a material kind, everything else passes through untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechniqueDesc {
    #[serde(default)]
    pub lighting_model: Option<String>,
    #[serde(default)]
    pub double_sided: bool,
}

/// A material parameter value: a texture reference, a color, or a scalar.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Texture { image: String },
    Color(Vec<f32>),
    Scalar(f32),
}

/// A material instance: a technique reference plus named parameter values
/// (`diffuse`, `transparency`, `shininess`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDesc {
    pub technique: String,
    #[serde(default)]
    pub values: FxHashMap<String, ParamValue>,
}

/// Topology of a mesh primitive. Only triangle lists carry geometry through
/// the pipeline; other topologies are skipped with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PrimitiveTopology {
    #[serde(rename = "TRIANGLES")]
    #[default]
    Triangles,
    #[serde(rename = "LINES")]
    Lines,
    #[serde(rename = "POINTS")]
    Points,
}

/// One primitive of a mesh: an index array, a material, and a map of
/// semantic name (`POSITION`, `NORMAL`, `TEXCOORD_0`, ...) to attribute id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimitiveDesc {
    #[serde(default)]
    pub primitive: PrimitiveTopology,
    pub material: String,
    pub indices: String,
    #[serde(default)]
    pub semantics: FxHashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDesc {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub primitives: Vec<PrimitiveDesc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDesc {
    #[serde(default = "default_projection")]
    pub projection: String,
    /// Vertical field of view, degrees.
    #[serde(default)]
    pub yfov: Option<f32>,
    /// Horizontal field of view, degrees. Used to derive `yfov` when absent.
    #[serde(default)]
    pub xfov: Option<f32>,
    #[serde(default)]
    pub aspect_ratio: Option<f32>,
    #[serde(default = "default_znear")]
    pub znear: f32,
    #[serde(default = "default_zfar")]
    pub zfar: f32,
}

fn default_projection() -> String {
    "perspective".to_string()
}

fn default_znear() -> f32 {
    0.1
}

fn default_zfar() -> f32 {
    2000.0
}

/// A node of the hierarchy. An explicit `matrix` (16 elements, column-major)
/// overrides the node's TRS components and disables transform auto-update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDesc {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub matrix: Option<[f32; 16]>,
    #[serde(default)]
    pub mesh: Option<String>,
    #[serde(default)]
    pub meshes: Vec<String>,
    #[serde(default)]
    pub camera: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDesc {
    #[serde(default)]
    pub nodes: Vec<String>,
}

/// One animated property of one node, with inline keyframe data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationChannelDesc {
    /// Node id the channel writes to.
    pub target: String,
    pub path: TargetPath,
    /// Keyframe times, strictly increasing.
    pub keys: Vec<f32>,
    /// Flat component values, `keys.len() * path.components()` floats.
    pub values: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDesc {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub channels: Vec<AnimationChannelDesc>,
}

/// The full description document: id-keyed maps of every record kind plus
/// an optional default-scene id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub buffers: FxHashMap<String, BufferDesc>,
    pub buffer_views: FxHashMap<String, BufferViewDesc>,
    pub attributes: FxHashMap<String, AttributeDesc>,
    pub indices: FxHashMap<String, IndicesDesc>,
    pub images: FxHashMap<String, ImageDesc>,
    pub techniques: FxHashMap<String, TechniqueDesc>,
    pub materials: FxHashMap<String, MaterialDesc>,
    pub cameras: FxHashMap<String, CameraDesc>,
    pub meshes: FxHashMap<String, MeshDesc>,
    pub nodes: FxHashMap<String, NodeDesc>,
    pub scenes: FxHashMap<String, SceneDesc>,
    pub animations: FxHashMap<String, AnimationDesc>,
    /// Default scene id. Falls back to any scene present when unset.
    pub scene: Option<String>,
}
