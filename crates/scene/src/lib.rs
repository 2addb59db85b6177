//! Scene-graph construction and per-primitive draw-command synthesis.
//!
//! [`SceneGraph::rebuild`] walks the document's root node list and produces
//! one drawable node per index, recursively. Each primitive's attributes are
//! decoded, de-duplicated for wireframe barycentrics, and compiled into a
//! draw command; materials resolve to uniforms, feature flags and GPU
//! textures.
//!
//! # Invariants
//! - Every rebuild releases the previous graph's GPU textures before any new
//!   node is constructed.
//! - A node index outside the document's node array aborts the rebuild.
//! - Nodes without animation channels have an immutable transform computed at
//!   build time; animated nodes recompose theirs from sampled values each
//!   draw.

mod flags;
mod geometry;
mod graph;
mod material;
mod node;

pub use flags::FeatureFlags;
pub use geometry::{AttributeChannel, generate_barycentric};
pub use graph::SceneGraph;
pub use material::ResolvedMaterial;
pub use node::SceneNode;

use lucent_anim::AnimError;
use lucent_common::EnumError;
use lucent_document::DocumentError;
use lucent_render::RenderError;

/// Errors raised while (re)building or drawing the scene graph.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("document has no scenes")]
    MissingScene,
    #[error("node index {0} out of range")]
    NodeOutOfRange(usize),
    #[error("mesh index {0} out of range")]
    MeshOutOfRange(usize),
    #[error("texture index {0} out of range")]
    TextureOutOfRange(usize),
    #[error("animation sampler index {0} out of range")]
    AnimationSamplerOutOfRange(usize),
    #[error("primitive has no POSITION attribute")]
    MissingPositions,
    #[error("index accessor holds a non-integer component type")]
    InvalidIndexType,
    #[error("accessor shape: {0}")]
    Enum(#[from] EnumError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Anim(#[from] AnimError),
}

pub fn crate_info() -> &'static str {
    "lucent-scene v0.1.0"
}
