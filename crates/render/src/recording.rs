//! Headless GPU backend that records every call.
//!
//! Stands in for a real graphics context in tests and CLI inspection runs,
//! the same way a text renderer stands in for a windowed one.

use std::collections::{BTreeMap, BTreeSet};

use crate::gpu::{
    Capabilities, DrawCommand, FramebufferHandle, GpuContext, ProgramHandle, RenderTarget,
    TextureData, TextureHandle, TextureParams, UniformValue,
};
use crate::RenderError;

/// One recorded backend call.
#[derive(Debug, Clone)]
pub enum GpuEvent {
    CompileProgram(ProgramHandle),
    CreateTexture(TextureHandle),
    DestroyTexture(TextureHandle),
    CreateFramebuffer(FramebufferHandle),
    ResizeFramebuffer(FramebufferHandle, u32, u32),
    Draw {
        program: ProgramHandle,
        target: RenderTarget,
        vertex_count: usize,
        /// Command uniforms with per-draw overrides applied.
        uniforms: BTreeMap<String, UniformValue>,
    },
}

#[derive(Debug, Default)]
pub struct RecordingGpu {
    capabilities: Capabilities,
    next_handle: u32,
    pub events: Vec<GpuEvent>,
    pub live_textures: BTreeSet<TextureHandle>,
    /// Prefixed (vs, fs) source per compiled program.
    pub programs: BTreeMap<ProgramHandle, (String, String)>,
    framebuffer_sizes: BTreeMap<FramebufferHandle, (u32, u32)>,
    framebuffer_attachments: BTreeMap<FramebufferHandle, TextureHandle>,
}

impl RecordingGpu {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Recorded draws, in order.
    pub fn draws(&self) -> Vec<&GpuEvent> {
        self.events
            .iter()
            .filter(|event| matches!(event, GpuEvent::Draw { .. }))
            .collect()
    }

    pub fn framebuffer_size(&self, framebuffer: FramebufferHandle) -> Option<(u32, u32)> {
        self.framebuffer_sizes.get(&framebuffer).copied()
    }
}

impl GpuContext for RecordingGpu {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn compile_program(&mut self, vs: &str, fs: &str) -> Result<ProgramHandle, RenderError> {
        let handle = ProgramHandle(self.next());
        self.programs.insert(handle, (vs.to_string(), fs.to_string()));
        self.events.push(GpuEvent::CompileProgram(handle));
        Ok(handle)
    }

    fn create_texture(
        &mut self,
        _params: &TextureParams,
        _data: &TextureData,
    ) -> Result<TextureHandle, RenderError> {
        let handle = TextureHandle(self.next());
        self.live_textures.insert(handle);
        self.events.push(GpuEvent::CreateTexture(handle));
        Ok(handle)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.live_textures.remove(&texture);
        self.events.push(GpuEvent::DestroyTexture(texture));
    }

    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<FramebufferHandle, RenderError> {
        let handle = FramebufferHandle(self.next());
        let attachment = TextureHandle(self.next());
        self.framebuffer_sizes.insert(handle, (width, height));
        self.framebuffer_attachments.insert(handle, attachment);
        self.events.push(GpuEvent::CreateFramebuffer(handle));
        Ok(handle)
    }

    fn resize_framebuffer(
        &mut self,
        framebuffer: FramebufferHandle,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let size = self
            .framebuffer_sizes
            .get_mut(&framebuffer)
            .ok_or(RenderError::UnknownFramebuffer(framebuffer.0))?;
        *size = (width, height);
        self.events
            .push(GpuEvent::ResizeFramebuffer(framebuffer, width, height));
        Ok(())
    }

    fn color_attachment(&self, framebuffer: FramebufferHandle) -> TextureHandle {
        self.framebuffer_attachments
            .get(&framebuffer)
            .copied()
            .unwrap_or(TextureHandle(0))
    }

    fn draw(
        &mut self,
        command: &DrawCommand,
        target: RenderTarget,
        overrides: &[(&str, UniformValue)],
    ) -> Result<(), RenderError> {
        let mut uniforms = command.uniforms.clone();
        for (name, value) in overrides {
            uniforms.insert(name.to_string(), value.clone());
        }
        self.events.push(GpuEvent::Draw {
            program: command.program,
            target,
            vertex_count: command.indices.len(),
            uniforms,
        });
        Ok(())
    }
}
