//! GPU collaborator interface.
//!
//! The core never talks to a graphics API directly. Everything it needs is
//! expressed against [`GpuContext`]: program compilation, texture and
//! framebuffer lifetime, and draw invocations. A real backend wraps a GL/wgpu
//! context; [`crate::RecordingGpu`] implements the same trait for tests and
//! headless runs.

use std::collections::BTreeMap;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use lucent_common::{MagFilter, MinFilter, WrapMode};
use lucent_shader::UniformDefault;

use crate::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProgramHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FramebufferHandle(pub u32);

/// Capability flags negotiated by the backend at context creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    /// Hardware sRGB sampling. Without it the shader converts manually.
    pub srgb_textures: bool,
    /// Explicit-LOD cube sampling for the specular environment.
    pub texture_lod: bool,
    /// Screen-space derivatives for tangent reconstruction and wireframe
    /// edge width.
    pub derivatives: bool,
}

/// Sampling state for a texture, mapped from the document's sampler.
#[derive(Debug, Clone, Copy)]
pub struct TextureParams {
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    /// Upload as sRGB so the hardware linearizes on sample.
    pub srgb: bool,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            min_filter: MinFilter::default(),
            mag_filter: MagFilter::default(),
            wrap_s: WrapMode::default(),
            wrap_t: WrapMode::default(),
            srgb: false,
        }
    }
}

/// Encoded image bytes plus the params to upload them with. Decoding the
/// container format is the backend's concern.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

/// A uniform value at draw time.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    FloatArray(Vec<f32>),
    Texture(TextureHandle),
}

impl UniformValue {
    /// Convert an extracted shader default into a concrete value. Sampler
    /// defaults carry no data and yield `None`.
    pub fn from_default(default: &UniformDefault) -> Option<Self> {
        match default {
            UniformDefault::Bool(b) => Some(UniformValue::Bool(*b)),
            UniformDefault::Float(f) => Some(UniformValue::Float(*f)),
            UniformDefault::Int(i) => Some(UniformValue::Int(*i)),
            UniformDefault::IntVector(values) => Some(UniformValue::FloatArray(
                values.iter().map(|v| *v as f32).collect(),
            )),
            UniformDefault::Vector(values) => Some(match values.len() {
                2 => UniformValue::Vec2(Vec2::from_slice(values)),
                3 => UniformValue::Vec3(Vec3::from_slice(values)),
                4 => UniformValue::Vec4(Vec4::from_slice(values)),
                9 => UniformValue::Mat3(Mat3::from_cols_slice(values)),
                16 => UniformValue::Mat4(Mat4::from_cols_slice(values)),
                _ => UniformValue::FloatArray(values.clone()),
            }),
            UniformDefault::Sampler => None,
        }
    }
}

/// One vertex attribute channel: flat f32 data with a fixed arity.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    pub name: String,
    pub data: Vec<f32>,
    pub arity: usize,
}

impl VertexAttribute {
    pub fn new(name: &str, data: Vec<f32>, arity: usize) -> Self {
        Self {
            name: name.to_string(),
            data,
            arity,
        }
    }

    /// Number of vertices this channel covers.
    pub fn len(&self) -> usize {
        self.data.len() / self.arity
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A fully resolved draw: compiled program, attribute channels, index list,
/// baked uniforms, culling policy.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub program: ProgramHandle,
    pub attributes: Vec<VertexAttribute>,
    pub indices: Vec<u32>,
    pub uniforms: BTreeMap<String, UniformValue>,
    /// Back-face culling, enabled only for single-sided materials.
    pub cull_face: bool,
}

/// Where a draw lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Screen,
    Framebuffer(FramebufferHandle),
}

/// The single seam between the core and a graphics backend.
///
/// Handle lifetime rules: textures created through this trait are owned by
/// whoever created them and must be destroyed explicitly; framebuffers live
/// for the backend's lifetime and are only resized.
pub trait GpuContext {
    fn capabilities(&self) -> Capabilities;

    fn compile_program(&mut self, vs: &str, fs: &str) -> Result<ProgramHandle, RenderError>;

    fn create_texture(
        &mut self,
        params: &TextureParams,
        data: &TextureData,
    ) -> Result<TextureHandle, RenderError>;

    fn destroy_texture(&mut self, texture: TextureHandle);

    fn create_framebuffer(&mut self, width: u32, height: u32)
    -> Result<FramebufferHandle, RenderError>;

    fn resize_framebuffer(
        &mut self,
        framebuffer: FramebufferHandle,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError>;

    /// Color attachment of a framebuffer, for sampling in a later pass.
    fn color_attachment(&self, framebuffer: FramebufferHandle) -> TextureHandle;

    /// Issue one draw. `overrides` is applied on top of the command's baked
    /// uniforms, last writer wins.
    fn draw(
        &mut self,
        command: &DrawCommand,
        target: RenderTarget,
        overrides: &[(&str, UniformValue)],
    ) -> Result<(), RenderError>;
}
