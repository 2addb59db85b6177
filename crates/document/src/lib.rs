//! Parsed scene-description document and accessor decoding.
//!
//! The document is the already-parsed node/mesh/material graph; fetching and
//! binary container parsing happen outside this crate. Callers hand the
//! decoder an optional embedded binary chunk and a loader for buffers with
//! external locators.
//!
//! # Invariants
//! - Raw buffers are fetched at most once and cached by buffer index.
//! - A buffer with no locator is only valid at index 0, backed by the
//!   container's embedded chunk.

mod decode;
mod gltf;

pub use decode::{AttributeDecoder, BufferLoader, DecodedAttribute};
pub use gltf::{
    Accessor, Animation, AnimationChannel, AnimationSampler, Buffer, BufferView, ChannelTarget,
    Document, Image, Material, Mesh, Node, NormalTextureInfo, OcclusionTextureInfo,
    PbrMetallicRoughness, Primitive, Sampler, Scene, Texture, TextureInfo,
};

use lucent_common::EnumError;

/// Errors from document parsing and accessor decoding.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no buffers found")]
    NoBuffers,
    #[error("buffer {0} has no locator and no embedded chunk is present")]
    MissingBinaryChunk(usize),
    #[error("buffer {0} has no locator; only buffer 0 may be embedded")]
    MissingLocator(usize),
    #[error("accessor index {0} out of range")]
    AccessorOutOfRange(usize),
    #[error("buffer view index {0} out of range")]
    BufferViewOutOfRange(usize),
    #[error("buffer index {0} out of range")]
    BufferOutOfRange(usize),
    #[error("image index {0} out of range")]
    ImageOutOfRange(usize),
    #[error("byte range {start}..{end} outside buffer of {len} bytes")]
    ByteRange { start: usize, end: usize, len: usize },
    #[error(transparent)]
    Enum(#[from] EnumError),
    #[error("buffer load failed: {0}")]
    Load(String),
}

pub fn crate_info() -> &'static str {
    "lucent-document v0.1.0"
}
