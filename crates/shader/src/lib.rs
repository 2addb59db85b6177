//! Textual shader-module system.
//!
//! Modules are named vertex/fragment source pairs. Registration extracts
//! uniform declarations (with optional inline defaults); resolution expands
//! `#pragma include` references, aggregates defaults across the include
//! closure, and caches the result by module name.
//!
//! # Invariants
//! - Resolution is idempotent: the same name always yields the cached text.
//! - An include already expanded within the current chain resolves to empty
//!   text rather than recursing.

mod builtin;
mod registry;

pub use builtin::register_builtins;
pub use registry::{GlslType, ModuleRegistry, ShaderModule, UniformDefault};

/// Errors from module registration and resolution.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("unknown shader module: {0}")]
    UnknownModule(String),
    #[error("unknown include \"{0}\"")]
    UnknownInclude(String),
}

pub fn crate_info() -> &'static str {
    "lucent-shader v0.1.0"
}
