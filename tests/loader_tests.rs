//! Load Session Tests
//!
//! End-to-end resolution of description documents through a stub
//! transport:
//! - completion fires exactly once, only after every resolution, in any
//!   arrival order
//! - byte-range fetches are deduplicated per id across meshes
//! - partial failures (empty meshes, transport errors) stay contained
//! - explicit node matrices disable auto-update and decompose correctly

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{StubTransport, f32_bytes, u16_bytes};
use glam::Vec3;
use weft::loader::LoadSession;
use weft::{Document, LoaderConfig, MaterialKind, TransparencyConvention, WeftError};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Triangle scene: one buffer, indices at 0, positions/normals/uvs packed
/// behind a 64-byte view offset. Node A parents node B; B carries the
/// mesh and a camera.
fn triangle_document() -> Document {
    serde_json::from_value(serde_json::json!({
        "buffers": {
            "buf": { "path": "scene.bin", "byteLength": 160 }
        },
        "bufferViews": {
            "bv_idx":  { "buffer": "buf", "byteOffset": 0 },
            "bv_attr": { "buffer": "buf", "byteOffset": 64 }
        },
        "indices": {
            "idx0": { "bufferView": "bv_idx", "byteOffset": 0, "count": 3 }
        },
        "attributes": {
            "attr_pos": { "bufferView": "bv_attr", "byteOffset": 0,  "count": 3, "type": "FLOAT_VEC3" },
            "attr_nrm": { "bufferView": "bv_attr", "byteOffset": 36, "count": 3, "type": "FLOAT_VEC3" },
            "attr_uv":  { "bufferView": "bv_attr", "byteOffset": 72, "count": 3, "type": "FLOAT_VEC2" }
        },
        "techniques": {
            "tech": { "lightingModel": "Phong" }
        },
        "materials": {
            "mat": {
                "technique": "tech",
                "values": {
                    "diffuse": [1.0, 0.0, 0.0, 1.0],
                    "shininess": 32.0,
                    "transparency": 0.25
                }
            }
        },
        "cameras": {
            "cam": { "projection": "perspective", "yfov": 45.0, "aspectRatio": 1.5, "znear": 0.1, "zfar": 100.0 }
        },
        "meshes": {
            "mesh0": {
                "primitives": [{
                    "primitive": "TRIANGLES",
                    "material": "mat",
                    "indices": "idx0",
                    "semantics": {
                        "POSITION": "attr_pos",
                        "NORMAL": "attr_nrm",
                        "TEXCOORD_0": "attr_uv"
                    }
                }]
            }
        },
        "nodes": {
            "nodeA": { "name": "A", "children": ["nodeB"] },
            "nodeB": { "name": "B", "mesh": "mesh0", "camera": "cam" }
        },
        "scenes": {
            "scene0": { "nodes": ["nodeA"] }
        },
        "scene": "scene0"
    }))
    .expect("document deserializes")
}

fn triangle_bytes() -> Vec<u8> {
    let mut bytes = u16_bytes(&[0, 1, 2]);
    bytes.resize(64, 0);
    bytes.extend(f32_bytes(&[
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, // positions
    ]));
    bytes.extend(f32_bytes(&[
        0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, // normals
    ]));
    bytes.extend(f32_bytes(&[
        0.0, 0.0, 1.0, 0.0, 0.25, 0.25, // uvs
    ]));
    bytes
}

fn completion_counter() -> (Rc<Cell<u32>>, weft::loader::CompletionCallback) {
    let fired = Rc::new(Cell::new(0));
    let flag = fired.clone();
    (
        fired,
        Box::new(move |_graph, _root| flag.set(flag.get() + 1)),
    )
}

// ============================================================================
// Full assembly
// ============================================================================

#[test]
fn full_scene_resolves_and_completes_once() {
    let transport = StubTransport::auto().with_file("scene.bin", triangle_bytes());
    let mut session = LoadSession::new(triangle_document(), transport, LoaderConfig::default());
    let (fired, callback) = completion_counter();

    let root = session.begin(callback).expect("begin succeeds");
    assert_eq!(fired.get(), 0, "nothing resolved yet");

    session.run_to_completion().expect("load completes");
    assert_eq!(fired.get(), 1, "completion fires exactly once");
    assert!(session.is_complete());

    let graph = session.graph();
    let node_a = graph
        .find_node_by_name(root, "A")
        .expect("node A in hierarchy");
    let node_b = graph
        .find_node_by_name(root, "B")
        .expect("node B in hierarchy");
    assert_eq!(graph.get_node(node_b).unwrap().parent(), Some(node_a));

    // Mesh content arrived on B
    let b = graph.get_node(node_b).unwrap();
    assert_eq!(b.meshes.len(), 1);
    let mesh = &graph.meshes[b.meshes[0]];
    assert_eq!(mesh.geometry.faces.len(), 1);
    assert!(mesh.geometry.faces[0].normals.is_some());
    assert!(mesh.geometry.faces[0].uvs.is_some());

    // Material resolved from the technique's lighting model
    let material = &graph.materials[mesh.material];
    assert_eq!(material.kind, MaterialKind::Phong);
    assert_eq!(material.params.shininess, Some(32.0));
    assert!(
        approx(material.params.opacity, 0.75),
        "default convention: opacity = 1 - transparency"
    );
    assert!(material.params.transparent);

    // Camera collected into the side list and attached to B
    assert_eq!(session.cameras().len(), 1);
    let b = session.graph().get_node(node_b).unwrap();
    assert!(b.camera.is_some());
}

#[test]
fn completion_is_order_independent() {
    let transport = StubTransport::manual().with_file("scene.bin", triangle_bytes());
    let mut session = LoadSession::new(triangle_document(), transport, LoaderConfig::default());
    let (fired, callback) = completion_counter();
    let root = session.begin(callback).expect("begin succeeds");

    assert_eq!(
        session.transport_mut().pending.len(),
        4,
        "indices + three attributes"
    );

    // Release one completion: the gate must hold
    let first_id = session.transport_mut().pending[0].id.clone();
    session.transport_mut().release(&first_id);
    session.pump();
    assert_eq!(fired.get(), 0, "gate must hold until every arrival");

    // Deliver the rest in reverse issue order
    session.transport_mut().release_all_reversed();
    session.pump();
    assert_eq!(fired.get(), 1);

    // Same result as the forward ordering
    let reversed_faces = {
        let graph = session.graph();
        let node_b = graph.find_node_by_name(root, "B").unwrap();
        graph.meshes[graph.get_node(node_b).unwrap().meshes[0]]
            .geometry
            .faces
            .clone()
    };

    let transport = StubTransport::auto().with_file("scene.bin", triangle_bytes());
    let mut forward = LoadSession::new(triangle_document(), transport, LoaderConfig::default());
    let (_, callback) = completion_counter();
    let root = forward.begin(callback).unwrap();
    forward.run_to_completion().unwrap();
    let forward_faces = {
        let graph = forward.graph();
        let node_b = graph.find_node_by_name(root, "B").unwrap();
        graph.meshes[graph.get_node(node_b).unwrap().meshes[0]]
            .geometry
            .faces
            .clone()
    };

    assert_eq!(reversed_faces, forward_faces);
}

// ============================================================================
// Fetch deduplication across the document
// ============================================================================

#[test]
fn shared_buffer_regions_fetch_once() {
    // Two meshes sharing the same indices and position attribute ids
    let mut document = triangle_document();
    let mesh0 = document.meshes["mesh0"].clone();
    document.meshes.insert("mesh1".to_string(), mesh0);
    document
        .nodes
        .get_mut("nodeA")
        .unwrap()
        .mesh = Some("mesh1".to_string());

    let transport = StubTransport::auto().with_file("scene.bin", triangle_bytes());
    let mut session = LoadSession::new(document, transport, LoaderConfig::default());
    let (fired, callback) = completion_counter();
    let root = session.begin(callback).expect("begin succeeds");
    session.run_to_completion().expect("load completes");

    assert_eq!(fired.get(), 1);
    assert_eq!(
        session.transport_mut().fetch_count,
        4,
        "each distinct id fetched exactly once, regardless of consumers"
    );

    // Both nodes got their content
    let graph = session.graph();
    let node_a = graph.find_node_by_name(root, "A").unwrap();
    let node_b = graph.find_node_by_name(root, "B").unwrap();
    assert_eq!(graph.get_node(node_a).unwrap().meshes.len(), 1);
    assert_eq!(graph.get_node(node_b).unwrap().meshes.len(), 1);
}

// ============================================================================
// Partial failure containment
// ============================================================================

#[test]
fn empty_mesh_fails_locally_but_assembly_completes() {
    // A(root) -> B -> C, where C references a mesh with no primitives
    let document: Document = serde_json::from_value(serde_json::json!({
        "meshes": {
            "meshM": { "primitives": [] }
        },
        "nodes": {
            "nodeA": { "name": "A", "children": ["nodeB"] },
            "nodeB": { "name": "B", "children": ["nodeC"] },
            "nodeC": { "name": "C", "mesh": "meshM" }
        },
        "scenes": { "scene0": { "nodes": ["nodeA"] } },
        "scene": "scene0"
    }))
    .unwrap();

    let transport = StubTransport::auto();
    let mut session = LoadSession::new(document, transport, LoaderConfig::default());
    let (fired, callback) = completion_counter();
    let root = session.begin(callback).expect("begin succeeds");

    assert_eq!(fired.get(), 1, "structural assembly still completes");
    assert_eq!(session.failures().len(), 1);
    assert!(matches!(
        session.failures()[0].error,
        WeftError::MissingPrimitives(_)
    ));

    let graph = session.graph();
    let node_c = graph
        .find_node_by_name(root, "C")
        .expect("C attaches structurally");
    assert!(
        graph.get_node(node_c).unwrap().meshes.is_empty(),
        "mesh content never attaches"
    );
}

#[test]
fn transport_failure_leaves_load_pending() {
    // No file registered: the byte-range fetches all 404
    let transport = StubTransport::auto();
    let mut session = LoadSession::new(triangle_document(), transport, LoaderConfig::default());
    let (fired, callback) = completion_counter();
    session.begin(callback).expect("begin succeeds");

    let result = session.run_to_completion();
    assert!(matches!(
        result,
        Err(WeftError::LoadStalled { pending_meshes: 1 })
    ));
    assert_eq!(fired.get(), 0, "completion never fires on partial failure");
    assert!(!session.is_complete());
    assert!(!session.failures().is_empty());
}

#[test]
fn missing_reference_is_fatal() {
    let mut document = triangle_document();
    document
        .nodes
        .get_mut("nodeB")
        .unwrap()
        .mesh = Some("no_such_mesh".to_string());

    let transport = StubTransport::auto().with_file("scene.bin", triangle_bytes());
    let mut session = LoadSession::new(document, transport, LoaderConfig::default());
    let (_, callback) = completion_counter();
    let result = session.begin(callback);
    assert!(matches!(result, Err(WeftError::MissingEntry(id)) if id == "no_such_mesh"));
}

#[test]
fn document_without_scenes_is_fatal() {
    let transport = StubTransport::auto();
    let mut session = LoadSession::new(Document::default(), transport, LoaderConfig::default());
    let (_, callback) = completion_counter();
    assert!(matches!(
        session.begin(callback),
        Err(WeftError::InvalidDocument(_))
    ));
}

// ============================================================================
// Node matrices
// ============================================================================

#[test]
fn explicit_matrix_disables_auto_update_and_decomposes() {
    let document: Document = serde_json::from_value(serde_json::json!({
        "nodes": {
            "nodeA": {
                "name": "A",
                // Column-major: uniform scale 2, translation (1, 2, 3)
                "matrix": [
                    2.0, 0.0, 0.0, 0.0,
                    0.0, 2.0, 0.0, 0.0,
                    0.0, 0.0, 2.0, 0.0,
                    1.0, 2.0, 3.0, 1.0
                ]
            }
        },
        "scenes": { "scene0": { "nodes": ["nodeA"] } }
    }))
    .unwrap();

    let transport = StubTransport::auto();
    let mut session = LoadSession::new(document, transport, LoaderConfig::default());
    let (fired, callback) = completion_counter();
    let root = session.begin(callback).expect("begin succeeds");
    assert_eq!(fired.get(), 1);

    let graph = session.graph();
    let node = graph
        .get_node(graph.find_node_by_name(root, "A").unwrap())
        .unwrap();
    assert!(!node.transform.matrix_auto_update);

    let p = node.transform.position;
    assert!(approx(p.x, 1.0) && approx(p.y, 2.0) && approx(p.z, 3.0));
    let s = node.transform.scale;
    assert!(approx(s.x, 2.0) && approx(s.y, 2.0) && approx(s.z, 2.0));
}

// ============================================================================
// Material conventions
// ============================================================================

#[test]
fn transparency_convention_is_configurable() {
    let transport = StubTransport::auto().with_file("scene.bin", triangle_bytes());
    let config = LoaderConfig {
        transparency: TransparencyConvention::AlphaAsOpacity,
    };
    let mut session = LoadSession::new(triangle_document(), transport, config);
    let (_, callback) = completion_counter();
    let root = session.begin(callback).unwrap();
    session.run_to_completion().unwrap();

    let graph = session.graph();
    let node_b = graph.find_node_by_name(root, "B").unwrap();
    let mesh = &graph.meshes[graph.get_node(node_b).unwrap().meshes[0]];
    let material = &graph.materials[mesh.material];
    assert!(
        approx(material.params.opacity, 0.25),
        "alpha convention reads the value verbatim"
    );
}

// ============================================================================
// Duplicate registration
// ============================================================================

#[test]
fn duplicate_entry_overwrites_without_aborting() {
    use weft::document::BufferDesc;
    use weft::loader::{Description, ResourceRegistry};

    let mut registry = ResourceRegistry::new();
    registry.set_entry(
        "buf",
        None,
        Description::Buffer(BufferDesc {
            path: "first.bin".to_string(),
            byte_length: 0,
        }),
    );
    registry.set_entry(
        "buf",
        None,
        Description::Buffer(BufferDesc {
            path: "second.bin".to_string(),
            byte_length: 0,
        }),
    );

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.buffer_desc("buf").unwrap().path, "second.bin");

    // Empty ids are refused entirely
    registry.set_entry(
        "",
        None,
        Description::Buffer(BufferDesc {
            path: "void.bin".to_string(),
            byte_length: 0,
        }),
    );
    assert_eq!(registry.len(), 1);
}

// ============================================================================
// Animations from the document
// ============================================================================

#[test]
fn animations_bind_to_resolved_nodes() {
    use std::time::{Duration, Instant};
    use weft::AnimationTicker;

    let mut document = triangle_document();
    document.animations = serde_json::from_value(serde_json::json!({
        "anim0": {
            "channels": [{
                "target": "nodeB",
                "path": "translation",
                "keys": [0.0, 1.0, 2.0],
                "values": [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0]
            }]
        }
    }))
    .unwrap();

    let transport = StubTransport::auto().with_file("scene.bin", triangle_bytes());
    let mut session = LoadSession::new(document, transport, LoaderConfig::default());
    let (_, callback) = completion_counter();
    let root = session.begin(callback).unwrap();
    session.run_to_completion().unwrap();

    let animations = session.take_animations();
    assert_eq!(animations.len(), 1);
    assert!(approx(animations[0].duration(), 2.0));

    let mut ticker = AnimationTicker::new();
    let key = ticker.add(animations.into_iter().next().unwrap());
    let graph = session.graph_mut();

    let t0 = Instant::now();
    ticker.play_at(key, t0);
    ticker.update_at(t0 + Duration::from_millis(500), graph);

    let node_b = graph.find_node_by_name(root, "B").unwrap();
    let p = graph.get_node(node_b).unwrap().transform.position;
    assert!(approx(p.x, 0.5) && approx(p.y, 0.5) && approx(p.z, 0.5));
}

// ============================================================================
// World transforms after assembly
// ============================================================================

#[test]
fn world_transforms_propagate_after_load() {
    let document: Document = serde_json::from_value(serde_json::json!({
        "nodes": {
            "nodeA": {
                "name": "A",
                "children": ["nodeB"],
                "matrix": [
                    1.0, 0.0, 0.0, 0.0,
                    0.0, 1.0, 0.0, 0.0,
                    0.0, 0.0, 1.0, 0.0,
                    5.0, 0.0, 0.0, 1.0
                ]
            },
            "nodeB": { "name": "B" }
        },
        "scenes": { "scene0": { "nodes": ["nodeA"] } }
    }))
    .unwrap();

    let transport = StubTransport::auto();
    let mut session = LoadSession::new(document, transport, LoaderConfig::default());
    let (_, callback) = completion_counter();
    let root = session.begin(callback).unwrap();

    let graph = session.graph_mut();
    let node_b = graph.find_node_by_name(root, "B").unwrap();
    graph.get_node_mut(node_b).unwrap().transform.position = Vec3::new(0.0, 3.0, 0.0);
    graph.update_world_transforms();

    let world = graph
        .get_node(node_b)
        .unwrap()
        .transform
        .world_matrix_as_mat4();
    let origin = world.transform_point3(Vec3::ZERO);
    assert!(approx(origin.x, 5.0) && approx(origin.y, 3.0) && approx(origin.z, 0.0));
}
