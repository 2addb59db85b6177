//! Renderer core: GPU abstraction, shader feature flags, and draw-command
//! assembly.
//!
//! The crate defines the [`GpuContext`] seam so the scene and post-processing
//! layers never touch a graphics API directly; a backend can be swapped in
//! without changing consumers. [`Renderer`] owns the shader-module registry,
//! the capability-derived global defines and the session-scoped IBL textures.
//!
//! # Invariants
//! - Global defines are derived once from backend capabilities and never
//!   change afterwards.
//! - Session textures survive scene rebuilds; per-node textures do not pass
//!   through this crate's ownership at all.

mod defines;
mod gpu;
mod recording;
mod renderer;

pub use defines::Defines;
pub use gpu::{
    Capabilities, DrawCommand, FramebufferHandle, GpuContext, ProgramHandle, RenderTarget,
    TextureData, TextureHandle, TextureParams, UniformValue, VertexAttribute,
};
pub use recording::{GpuEvent, RecordingGpu};
pub use renderer::Renderer;

/// Errors surfaced by the renderer and its GPU backends.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("shader: {0}")]
    Shader(#[from] lucent_shader::ShaderError),
    #[error("program compilation failed: {0}")]
    ProgramCompile(String),
    #[error("texture upload failed: {0}")]
    TextureUpload(String),
    #[error("unknown framebuffer handle {0}")]
    UnknownFramebuffer(u32),
    #[error("backend: {0}")]
    Backend(String),
}

pub fn crate_info() -> &'static str {
    "lucent-render v0.1.0"
}
