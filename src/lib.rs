//! Ingests a declarative scene description and asynchronously resolves it
//! into a fully populated scene graph: byte-range fetches are issued at most
//! once per distinct resource id, raw bytes are converted into typed vertex
//! and index records, and completion gates propagate readiness up through
//! geometry, mesh, node and scene so the caller is notified exactly once,
//! regardless of the order network completions arrive in.
//!
//! A small keyframe-interpolation module drives per-node transform
//! animation after assembly, paced by a caller-owned ticker.

pub mod animation;
pub mod document;
pub mod errors;
pub mod fetch;
pub mod loader;
pub mod scene;

pub use animation::{Animation, AnimationKey, AnimationTicker, Channel, TargetPath};
pub use document::Document;
pub use errors::{Result, WeftError};
#[cfg(feature = "http")]
pub use fetch::HttpRangeTransport;
pub use fetch::{
    BufferSpec, Converter, FetchCoordinator, FetchOutcome, FetchRequest, FileTransport,
    ResourceData, Transport,
};
pub use loader::{LoadFailure, LoadSession, LoaderConfig, TransparencyConvention};
pub use scene::{
    Camera, Material, MaterialKind, MaterialParams, Node, NodeIndex, RenderMesh, SceneGraph,
    Transform,
};
