//! Shared types for the lucent viewer.
//!
//! # Invariants
//! - Numeric glTF enums map one-to-one onto the typed enums here; unknown
//!   values are conversion errors, never silently coerced.
//! - Typed buffers preserve the component type they were decoded with.

mod buffer;
mod enums;
mod layer;
mod style;

pub use buffer::TypedBuffer;
pub use enums::{
    ComponentType, ElementType, EnumError, Interpolation, MagFilter, MinFilter, TargetPath,
    WrapMode,
};
pub use layer::RenderLayer;
pub use style::{DirectionalLight, Style};

pub fn crate_info() -> &'static str {
    "lucent-common v0.1.0"
}
