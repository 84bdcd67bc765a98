//! The load session: record handling, completion propagation, and the
//! event pump that turns unordered transport completions into a
//! deterministic scene assembly.
//!
//! A [`LoadSession`] owns every piece of per-load state — the registry,
//! the fetch coordinator's cache, the output graph, the completion gates —
//! so independent loads in one process simply use independent sessions.

pub mod gates;
pub mod registry;

pub use gates::{GeometryGate, GeometryKey, MeshSlot, MeshSlotKey, PrimitiveSlot, Semantic};
pub use registry::{Description, RegistryEntry, ResolvedObject, ResourceRegistry};

use glam::{Affine3A, Mat4, Vec4};
use slotmap::SlotMap;

use crate::animation::{Animation, Channel};
use crate::document::{Document, ParamValue, PrimitiveTopology};
use crate::errors::{Result, WeftError};
use crate::fetch::coordinator::{BufferSpec, Converter, FetchCoordinator, FetchEvent, ResourceData};
use crate::fetch::transport::{FetchOutcome, Transport};
use crate::scene::material::{Material, MaterialKind, MaterialParams};
use crate::scene::mesh::RenderMesh;
use crate::scene::{Camera, CameraKey, NodeIndex, SceneGraph};

use std::sync::Arc;

/// Which opacity the `transparency` material parameter encodes. The source
/// format does not say, so the policy is configurable instead of baked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransparencyConvention {
    /// `transparency` measures how transparent the surface is;
    /// opacity = 1 - value.
    #[default]
    OneMinusTransparency,
    /// `transparency` already carries the alpha value; opacity = value.
    AlphaAsOpacity,
}

impl TransparencyConvention {
    #[must_use]
    pub fn opacity(self, transparency: f32) -> f32 {
        match self {
            Self::OneMinusTransparency => 1.0 - transparency,
            Self::AlphaAsOpacity => transparency,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    pub transparency: TransparencyConvention,
}

/// Where a fetched buffer is routed once converted.
#[derive(Debug, Clone)]
pub enum FetchTarget {
    Indices {
        geometry: GeometryKey,
    },
    Attribute {
        geometry: GeometryKey,
        semantic: Semantic,
    },
}

/// A local, non-fatal failure recorded during a load. The composite that
/// owned the failed resource never completes; everything else proceeds.
#[derive(Debug)]
pub struct LoadFailure {
    pub id: String,
    pub error: WeftError,
}

/// Fired exactly once, with the assembled graph and its root, when every
/// transitively referenced resource has arrived.
pub type CompletionCallback = Box<dyn FnOnce(&SceneGraph, NodeIndex)>;

/// Description record kinds, in the order the session resolves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Buffer,
    BufferView,
    Indices,
    Attribute,
    Image,
    Technique,
    Material,
    Camera,
    Mesh,
    Node,
    Animation,
    Scene,
}

const HANDLE_ORDER: [RecordKind; 12] = [
    RecordKind::Buffer,
    RecordKind::BufferView,
    RecordKind::Indices,
    RecordKind::Attribute,
    RecordKind::Image,
    RecordKind::Technique,
    RecordKind::Material,
    RecordKind::Camera,
    RecordKind::Mesh,
    RecordKind::Node,
    RecordKind::Animation,
    RecordKind::Scene,
];

/// One asynchronous load of one description document.
pub struct LoadSession<T: Transport> {
    document: Document,
    config: LoaderConfig,
    transport: T,

    registry: ResourceRegistry,
    coordinator: FetchCoordinator<FetchTarget>,

    graph: SceneGraph,
    geometries: SlotMap<GeometryKey, GeometryGate>,
    mesh_slots: SlotMap<MeshSlotKey, MeshSlot>,

    /// Cameras attached during assembly, for runtime camera switching.
    cameras: Vec<CameraKey>,
    animations: Vec<Animation>,
    failures: Vec<LoadFailure>,

    root: NodeIndex,
    selected_scene: Option<String>,
    pending_meshes: usize,
    hierarchy_built: bool,
    completed: bool,
    on_complete: Option<CompletionCallback>,
}

impl<T: Transport> LoadSession<T> {
    #[must_use]
    pub fn new(document: Document, transport: T, config: LoaderConfig) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.create_node_named("scene_root");
        graph.add_root(root);

        Self {
            document,
            config,
            transport,
            registry: ResourceRegistry::new(),
            coordinator: FetchCoordinator::new(),
            graph,
            geometries: SlotMap::with_key(),
            mesh_slots: SlotMap::with_key(),
            cameras: Vec::new(),
            animations: Vec::new(),
            failures: Vec::new(),
            root,
            selected_scene: None,
            pending_meshes: 0,
            hierarchy_built: false,
            completed: false,
            on_complete: None,
        }
    }

    /// Handles every document record and issues the byte-range fetches the
    /// meshes need. Returns the (initially empty) root node synchronously;
    /// `on_complete` fires exactly once when the whole graph has resolved.
    ///
    /// Structural errors — a reference to an id that was never registered,
    /// a document without scenes — are fatal and returned here. Per-record
    /// failures are logged, recorded in [`LoadSession::failures`], and do
    /// not abort the rest of the load.
    pub fn begin(&mut self, on_complete: CompletionCallback) -> Result<NodeIndex> {
        self.on_complete = Some(on_complete);

        if self.document.scenes.is_empty() {
            return Err(WeftError::InvalidDocument(
                "document contains no scenes".to_string(),
            ));
        }
        self.selected_scene = self
            .document
            .scene
            .clone()
            .filter(|id| self.document.scenes.contains_key(id))
            .or_else(|| self.document.scenes.keys().next().cloned());

        for kind in HANDLE_ORDER {
            for id in self.record_ids(kind) {
                match self.handle_record(kind, &id) {
                    Ok(true) => {}
                    Ok(false) => {
                        log::error!("failed to resolve {kind:?} record `{id}`");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        self.check_load_complete();
        Ok(self.root)
    }

    // ========================================================================
    // Event pump
    // ========================================================================

    /// Drains every transport completion that has already arrived and
    /// routes it through the pipeline. Returns the number processed.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Some(outcome) = self.transport.poll_outcome() {
            self.dispatch(outcome);
            processed += 1;
        }
        processed
    }

    /// Blocks on the transport until the load completes or no fetch
    /// remains outstanding (a stalled load, e.g. after a transport
    /// failure).
    pub fn run_to_completion(&mut self) -> Result<()> {
        while !self.completed {
            match self.transport.wait_outcome() {
                Some(outcome) => self.dispatch(outcome),
                None => break,
            }
        }
        if self.completed {
            Ok(())
        } else {
            Err(WeftError::LoadStalled {
                pending_meshes: self.pending_meshes,
            })
        }
    }

    fn dispatch(&mut self, outcome: FetchOutcome) {
        match self.coordinator.complete(outcome) {
            Some(FetchEvent::Resolved { data, waiters, .. }) => {
                for target in waiters {
                    self.deliver(target, data.clone());
                }
            }
            Some(FetchEvent::Failed { id, failure, .. }) => {
                log::error!(
                    "fetch for `{id}` failed: status {}: {}",
                    failure.status,
                    failure.message
                );
                self.failures.push(LoadFailure {
                    id: id.clone(),
                    error: WeftError::TransportStatus {
                        status: failure.status,
                        id,
                    },
                });
            }
            None => {}
        }
    }

    fn deliver(&mut self, target: FetchTarget, data: Arc<ResourceData>) {
        match target {
            FetchTarget::Indices { geometry } => {
                let Some(gate) = self.geometries.get_mut(geometry) else {
                    return;
                };
                if let ResourceData::U16(indices) = &*data {
                    gate.supply_indices(indices.clone());
                } else {
                    log::warn!("index buffer resolved to a non-index payload");
                    return;
                }
                if gate.check_finished() {
                    let owner = gate.mesh;
                    self.on_geometry_finished(owner);
                }
            }
            FetchTarget::Attribute { geometry, semantic } => {
                let Some(gate) = self.geometries.get_mut(geometry) else {
                    return;
                };
                if let ResourceData::F32(floats) = &*data {
                    gate.supply_attribute(&semantic, floats);
                } else {
                    log::warn!("attribute buffer resolved to a non-float payload");
                    gate.loaded_attributes += 1;
                }
                if gate.check_finished() {
                    let owner = gate.mesh;
                    self.on_geometry_finished(owner);
                }
            }
        }
    }

    // ========================================================================
    // Completion propagation
    // ========================================================================

    fn on_geometry_finished(&mut self, slot_key: MeshSlotKey) {
        if let Some(slot) = self.mesh_slots.get_mut(slot_key) {
            slot.loaded_geometry += 1;
        }
        self.check_mesh_complete(slot_key);
    }

    fn check_mesh_complete(&mut self, slot_key: MeshSlotKey) {
        let Some(slot) = self.mesh_slots.get_mut(slot_key) else {
            return;
        };
        if slot.complete || !slot.is_satisfied() {
            return;
        }
        slot.complete = true;
        let had_primitives = !slot.primitives.is_empty();
        let observers = std::mem::take(&mut slot.observers);

        for node in observers {
            self.attach_mesh_to_node(slot_key, node);
        }
        if had_primitives {
            self.pending_meshes -= 1;
            self.check_load_complete();
        }
    }

    /// Registers a node waiting for a mesh. Completion is latched, so a
    /// registration after the fact attaches immediately.
    fn register_mesh_observer(&mut self, slot_key: MeshSlotKey, node: NodeIndex) {
        let Some(slot) = self.mesh_slots.get_mut(slot_key) else {
            return;
        };
        if slot.complete {
            self.attach_mesh_to_node(slot_key, node);
        } else {
            slot.observers.push(node);
        }
    }

    fn attach_mesh_to_node(&mut self, slot_key: MeshSlotKey, node: NodeIndex) {
        let Some(slot) = self.mesh_slots.get(slot_key) else {
            return;
        };
        let primitives: Vec<PrimitiveSlot> = slot.primitives.clone();
        for primitive in primitives {
            let Some(gate) = self.geometries.get(primitive.geometry) else {
                continue;
            };
            let Some(data) = gate.data.clone() else {
                continue;
            };
            let mesh_key = self
                .graph
                .meshes
                .insert(RenderMesh::new(data, primitive.material));
            if let Some(node) = self.graph.get_node_mut(node) {
                node.meshes.push(mesh_key);
            }
        }
    }

    fn check_load_complete(&mut self) {
        if self.completed || !self.hierarchy_built || self.pending_meshes > 0 {
            return;
        }
        self.completed = true;
        if let Some(callback) = self.on_complete.take() {
            callback(&self.graph, self.root);
        }
    }

    // ========================================================================
    // Record handlers — uniform `handle(id) -> Result<bool>` contract:
    // Ok(true) handled, Ok(false) per-record failure, Err fatal.
    // ========================================================================

    fn record_ids(&self, kind: RecordKind) -> Vec<String> {
        match kind {
            RecordKind::Buffer => self.document.buffers.keys().cloned().collect(),
            RecordKind::BufferView => self.document.buffer_views.keys().cloned().collect(),
            RecordKind::Indices => self.document.indices.keys().cloned().collect(),
            RecordKind::Attribute => self.document.attributes.keys().cloned().collect(),
            RecordKind::Image => self.document.images.keys().cloned().collect(),
            RecordKind::Technique => self.document.techniques.keys().cloned().collect(),
            RecordKind::Material => self.document.materials.keys().cloned().collect(),
            RecordKind::Camera => self.document.cameras.keys().cloned().collect(),
            RecordKind::Mesh => self.document.meshes.keys().cloned().collect(),
            RecordKind::Node => self.document.nodes.keys().cloned().collect(),
            RecordKind::Animation => self.document.animations.keys().cloned().collect(),
            RecordKind::Scene => self.document.scenes.keys().cloned().collect(),
        }
    }

    fn handle_record(&mut self, kind: RecordKind, id: &str) -> Result<bool> {
        match kind {
            RecordKind::Buffer => self.handle_buffer(id),
            RecordKind::BufferView => self.handle_buffer_view(id),
            RecordKind::Indices => self.handle_indices(id),
            RecordKind::Attribute => self.handle_attribute(id),
            RecordKind::Image => self.handle_image(id),
            RecordKind::Technique => self.handle_technique(id),
            RecordKind::Material => self.handle_material(id),
            RecordKind::Camera => self.handle_camera(id),
            RecordKind::Mesh => self.handle_mesh(id),
            RecordKind::Node => self.handle_node(id),
            RecordKind::Animation => self.handle_animation(id),
            RecordKind::Scene => self.handle_scene(id),
        }
    }

    fn handle_buffer(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.buffers.get(id).cloned() else {
            return Ok(false);
        };
        self.registry.set_entry(id, None, Description::Buffer(desc));
        Ok(true)
    }

    fn handle_buffer_view(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.buffer_views.get(id).cloned() else {
            return Ok(false);
        };
        self.registry.require(&desc.buffer)?;
        self.registry
            .set_entry(id, None, Description::BufferView(desc));
        Ok(true)
    }

    fn handle_indices(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.indices.get(id).cloned() else {
            return Ok(false);
        };
        self.registry.set_entry(id, None, Description::Indices(desc));
        Ok(true)
    }

    fn handle_attribute(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.attributes.get(id).cloned() else {
            return Ok(false);
        };
        self.registry
            .set_entry(id, None, Description::Attribute(desc));
        Ok(true)
    }

    fn handle_image(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.images.get(id).cloned() else {
            return Ok(false);
        };
        self.registry.set_entry(id, None, Description::Image(desc));
        Ok(true)
    }

    fn handle_technique(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.techniques.get(id).cloned() else {
            return Ok(false);
        };
        self.registry
            .set_entry(id, None, Description::Technique(desc));
        Ok(true)
    }

    fn handle_material(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.materials.get(id).cloned() else {
            return Ok(false);
        };
        let technique = self.registry.technique_desc(&desc.technique)?;

        let kind = match technique.lighting_model.as_deref() {
            Some("Blinn" | "Phong") => MaterialKind::Phong,
            Some("Lambert") => MaterialKind::Lambert,
            _ => MaterialKind::Basic,
        };
        let mut params = MaterialParams {
            double_sided: technique.double_sided,
            ..MaterialParams::default()
        };

        match desc.values.get("diffuse") {
            Some(ParamValue::Texture { image }) => {
                params.map = Some(self.registry.image_desc(image)?.path.clone());
            }
            Some(ParamValue::Color(color)) => {
                params.color = Vec4::new(
                    color.first().copied().unwrap_or(1.0),
                    color.get(1).copied().unwrap_or(1.0),
                    color.get(2).copied().unwrap_or(1.0),
                    color.get(3).copied().unwrap_or(1.0),
                );
            }
            _ => {}
        }
        if let Some(ParamValue::Scalar(shininess)) = desc.values.get("shininess") {
            params.shininess = Some(*shininess);
        }
        if let Some(ParamValue::Scalar(transparency)) = desc.values.get("transparency") {
            params.opacity = self.config.transparency.opacity(*transparency);
            params.transparent = params.opacity < 1.0;
        }

        let key = self.graph.materials.insert(Material::new(kind, params));
        self.registry.set_entry(
            id,
            Some(ResolvedObject::Material(key)),
            Description::Material(desc),
        );
        Ok(true)
    }

    fn handle_camera(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.cameras.get(id).cloned() else {
            return Ok(false);
        };
        if desc.projection != "perspective" {
            log::debug!("camera `{id}`: projection `{}` is unsupported", desc.projection);
            return Ok(true);
        }

        let aspect = desc.aspect_ratio.unwrap_or(1.0);
        let yfov = desc.yfov.or_else(|| desc.xfov.map(|xfov| xfov / aspect));
        let Some(yfov) = yfov else {
            log::warn!("camera `{id}` has no usable field of view");
            return Ok(true);
        };

        let key = self
            .graph
            .cameras
            .insert(Camera::perspective(yfov, aspect, desc.znear, desc.zfar));
        self.registry.set_entry(
            id,
            Some(ResolvedObject::Camera(key)),
            Description::Camera(desc),
        );
        Ok(true)
    }

    fn handle_mesh(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.meshes.get(id).cloned() else {
            return Ok(false);
        };

        // Resolve every primitive into a fetch plan first; reference
        // lookups may fail fatally before any gate state exists.
        type AttrPlan = (Semantic, BufferSpec, Converter);
        let mut plans: Vec<(crate::scene::MaterialKey, BufferSpec, Converter, Vec<AttrPlan>)> =
            Vec::new();
        for primitive in &desc.primitives {
            if primitive.primitive != PrimitiveTopology::Triangles {
                log::warn!(
                    "mesh `{id}`: primitive topology {:?} is unsupported, skipping",
                    primitive.primitive
                );
                continue;
            }
            let material = self.registry.material_object(&primitive.material)?;
            let (indices_spec, indices_conv) = self.indices_spec(&primitive.indices)?;
            let mut attributes = Vec::with_capacity(primitive.semantics.len());
            for (semantic_name, attribute_id) in &primitive.semantics {
                let (spec, conv) = self.attribute_spec(attribute_id)?;
                attributes.push((Semantic::parse(semantic_name), spec, conv));
            }
            plans.push((material, indices_spec, indices_conv, attributes));
        }

        if plans.is_empty() {
            log::error!("mesh `{id}` has no usable primitives");
            let slot_key = self.mesh_slots.insert(MeshSlot::named(desc.name.clone()));
            self.mesh_slots[slot_key].sealed = true;
            self.registry.set_entry(
                id,
                Some(ResolvedObject::Mesh(slot_key)),
                Description::Mesh(desc),
            );
            self.failures.push(LoadFailure {
                id: id.to_string(),
                error: WeftError::MissingPrimitives(id.to_string()),
            });
            self.check_mesh_complete(slot_key);
            return Ok(false);
        }

        let slot_key = self.mesh_slots.insert(MeshSlot::named(desc.name.clone()));
        self.registry.set_entry(
            id,
            Some(ResolvedObject::Mesh(slot_key)),
            Description::Mesh(desc),
        );
        self.pending_meshes += 1;

        for (material, indices_spec, indices_conv, attributes) in plans {
            let gate_key = self
                .geometries
                .insert(GeometryGate::new(slot_key, attributes.len()));
            self.mesh_slots[slot_key].primitives.push(PrimitiveSlot {
                geometry: gate_key,
                material,
            });

            self.request_buffer(
                indices_spec,
                indices_conv,
                FetchTarget::Indices { geometry: gate_key },
            );
            for (semantic, spec, conv) in attributes {
                self.request_buffer(
                    spec,
                    conv,
                    FetchTarget::Attribute {
                        geometry: gate_key,
                        semantic,
                    },
                );
            }
        }

        self.mesh_slots[slot_key].sealed = true;
        self.check_mesh_complete(slot_key);
        Ok(true)
    }

    fn handle_node(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.nodes.get(id).cloned() else {
            return Ok(false);
        };
        let name = desc.name.clone().unwrap_or_else(|| id.to_string());
        let node_idx = self.graph.create_node_named(&name);

        if let Some(matrix) = desc.matrix {
            // Explicit matrix: applied verbatim, auto-update disabled.
            if let Some(node) = self.graph.get_node_mut(node_idx) {
                node.transform.matrix_auto_update = false;
                node.transform
                    .apply_local_matrix(Affine3A::from_mat4(Mat4::from_cols_array(&matrix)));
            }
        }

        self.registry.set_entry(
            id,
            Some(ResolvedObject::Node(node_idx)),
            Description::Node(desc.clone()),
        );

        for mesh_id in desc.mesh.iter().chain(desc.meshes.iter()) {
            let slot_key = self.registry.mesh_object(mesh_id)?;
            self.register_mesh_observer(slot_key, node_idx);
        }

        if let Some(camera_id) = &desc.camera {
            let camera_key = self.registry.camera_object(camera_id)?;
            if let Some(node) = self.graph.get_node_mut(node_idx) {
                node.camera = Some(camera_key);
            }
            self.cameras.push(camera_key);
        }

        Ok(true)
    }

    fn handle_animation(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.animations.get(id).cloned() else {
            return Ok(false);
        };

        let mut channels = Vec::with_capacity(desc.channels.len());
        for channel in &desc.channels {
            let target = match self.registry.node_object(&channel.target) {
                Ok(node) => node,
                Err(err) => {
                    log::warn!("animation `{id}`: {err}");
                    return Ok(false);
                }
            };
            match Channel::new(
                target,
                channel.path,
                channel.keys.clone(),
                channel.values.clone(),
            ) {
                Ok(channel) => channels.push(channel),
                Err(err) => {
                    log::warn!("animation `{id}`: {err}");
                    return Ok(false);
                }
            }
        }

        let name = desc.name.clone().unwrap_or_else(|| id.to_string());
        self.animations.push(Animation::new(&name, channels));
        self.registry
            .set_entry(id, None, Description::Animation(desc));
        Ok(true)
    }

    fn handle_scene(&mut self, id: &str) -> Result<bool> {
        let Some(desc) = self.document.scenes.get(id).cloned() else {
            return Ok(false);
        };
        self.registry
            .set_entry(id, None, Description::Scene(desc.clone()));

        if self.selected_scene.as_deref() != Some(id) {
            return Ok(true);
        }

        if desc.nodes.is_empty() {
            log::error!("scene `{id}` has no root nodes");
            self.failures.push(LoadFailure {
                id: id.to_string(),
                error: WeftError::EmptyScene(id.to_string()),
            });
            return Ok(false);
        }

        for node_id in &desc.nodes {
            self.build_node_hierarchy(node_id, self.root)?;
        }
        self.hierarchy_built = true;
        self.check_load_complete();
        Ok(true)
    }

    /// Recursively attaches the resolved node for `node_id` under `parent`
    /// and descends into its declared children.
    fn build_node_hierarchy(&mut self, node_id: &str, parent: NodeIndex) -> Result<NodeIndex> {
        let node_idx = self.registry.node_object(node_id)?;
        self.graph.attach(node_idx, parent);

        let children = self.registry.node_desc(node_id)?.children.clone();
        for child_id in &children {
            self.build_node_hierarchy(child_id, node_idx)?;
        }
        Ok(node_idx)
    }

    // ========================================================================
    // Fetch plumbing
    // ========================================================================

    fn request_buffer(&mut self, spec: BufferSpec, converter: Converter, target: FetchTarget) {
        if let Some(data) =
            self.coordinator
                .get_buffer(&spec, converter, target.clone(), &mut self.transport)
        {
            // Memoized fast path: apply synchronously.
            self.deliver(target, data);
        }
    }

    fn indices_spec(&self, id: &str) -> Result<(BufferSpec, Converter)> {
        let desc = self.registry.indices_desc(id)?;
        let view = self.registry.buffer_view_desc(&desc.buffer_view)?;
        let buffer = self.registry.buffer_desc(&view.buffer)?;
        let spec = BufferSpec {
            id: id.to_string(),
            path: buffer.path.clone(),
            byte_offset: view.byte_offset + desc.byte_offset,
            element_type: desc.element_type,
            count: desc.count,
        };
        Ok((spec, Converter::IndexU16 { count: desc.count }))
    }

    fn attribute_spec(&self, id: &str) -> Result<(BufferSpec, Converter)> {
        let desc = self.registry.attribute_desc(id)?;
        let view = self.registry.buffer_view_desc(&desc.buffer_view)?;
        let buffer = self.registry.buffer_desc(&view.buffer)?;
        let spec = BufferSpec {
            id: id.to_string(),
            path: buffer.path.clone(),
            byte_offset: view.byte_offset + desc.byte_offset,
            element_type: desc.element_type,
            count: desc.count,
        };
        let converter = Converter::FloatArray {
            count: desc.count,
            components: desc.element_type.components(),
        };
        Ok((spec, converter))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    #[inline]
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Cameras collected during assembly. Meaningful once the completion
    /// callback has fired.
    #[must_use]
    pub fn cameras(&self) -> &[CameraKey] {
        &self.cameras
    }

    /// Animations built from the document, bound to resolved nodes. Hand
    /// them to an [`crate::AnimationTicker`] to drive them.
    pub fn take_animations(&mut self) -> Vec<Animation> {
        std::mem::take(&mut self.animations)
    }

    /// Local failures recorded so far (transport errors, records missing
    /// required structure). These never abort the load by themselves.
    #[must_use]
    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the session, handing the assembled graph to the caller.
    #[must_use]
    pub fn into_graph(self) -> SceneGraph {
        self.graph
    }
}
