use std::collections::BTreeMap;

use glam::Vec2;
use lucent_render::{
    Defines, DrawCommand, GpuContext, RenderError, RenderTarget, Renderer, TextureHandle,
    UniformValue, VertexAttribute,
};

// Thin-lens depth-of-field model.
const FOCAL_LENGTH: f32 = 1.0;
const FOCUS_DISTANCE: f32 = 2.0;
const FSTOP: f32 = 2.8;

/// Per-invocation inputs handed to a pass by the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PassFrame {
    /// Color attachment of the current read framebuffer.
    pub read_texture: TextureHandle,
    /// The current write framebuffer as a render target.
    pub offscreen: RenderTarget,
    pub viewport: (u32, u32),
}

/// One post-processing step. The pipeline tells each pass whether it is the
/// final on-screen step before invoking it.
pub trait Pass<G: GpuContext> {
    fn name(&self) -> &str;
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    fn set_render_to_screen(&mut self, to_screen: bool);
    fn render(&mut self, renderer: &mut Renderer<G>, frame: &PassFrame)
    -> Result<(), RenderError>;
}

/// Fullscreen-triangle pass driving one shader module.
///
/// The program and its uniforms are fixed at construction; per frame only
/// the read texture and viewport-derived uniforms change.
pub struct ScreenPass {
    name: String,
    command: DrawCommand,
    enabled: bool,
    render_to_screen: bool,
}

impl ScreenPass {
    pub fn new<G: GpuContext>(
        renderer: &mut Renderer<G>,
        name: &str,
        module: &str,
        uniforms: BTreeMap<String, UniformValue>,
    ) -> Result<Self, RenderError> {
        let command = renderer.create_draw_command(
            module,
            &Defines::new(),
            // fullscreen triangle, clipped to the viewport
            vec![VertexAttribute::new(
                "a_Position",
                vec![-4.0, -4.0, 4.0, -4.0, 0.0, 4.0],
                2,
            )],
            vec![0, 1, 2],
            uniforms,
            false,
        )?;
        Ok(Self {
            name: name.to_string(),
            command,
            enabled: true,
            render_to_screen: false,
        })
    }

    pub fn copy<G: GpuContext>(renderer: &mut Renderer<G>) -> Result<Self, RenderError> {
        Self::new(renderer, "copy", "copy-pass", BTreeMap::new())
    }

    pub fn blur_h<G: GpuContext>(renderer: &mut Renderer<G>) -> Result<Self, RenderError> {
        let mut uniforms = BTreeMap::new();
        uniforms.insert(
            "u_BlurDir".to_string(),
            UniformValue::Vec2(Vec2::new(8.0, 0.0)),
        );
        Self::new(renderer, "blur-h", "blur-pass", uniforms)
    }

    pub fn blur_v<G: GpuContext>(renderer: &mut Renderer<G>) -> Result<Self, RenderError> {
        let mut uniforms = BTreeMap::new();
        uniforms.insert(
            "u_BlurDir".to_string(),
            UniformValue::Vec2(Vec2::new(0.0, 8.0)),
        );
        Self::new(renderer, "blur-v", "blur-pass", uniforms)
    }

    /// Depth of field tuned from the camera's depth range.
    pub fn dof<G: GpuContext>(
        renderer: &mut Renderer<G>,
        znear: f32,
        zfar: f32,
    ) -> Result<Self, RenderError> {
        let magnification = FOCAL_LENGTH / (FOCUS_DISTANCE - FOCAL_LENGTH).abs();
        let blur_coefficient = FOCAL_LENGTH * magnification / FSTOP;

        let mut uniforms = BTreeMap::new();
        uniforms.insert(
            "u_FocusDistance".to_string(),
            UniformValue::Float(FOCUS_DISTANCE),
        );
        uniforms.insert(
            "u_BlurCoefficient".to_string(),
            UniformValue::Float(blur_coefficient),
        );
        uniforms.insert(
            "u_DepthRange".to_string(),
            UniformValue::Vec2(Vec2::new(znear, zfar)),
        );
        uniforms.insert(
            "u_TexelOffset".to_string(),
            UniformValue::Vec2(Vec2::new(1.0, 0.0)),
        );
        Self::new(renderer, "dof", "dof-pass", uniforms)
    }
}

impl<G: GpuContext> Pass<G> for ScreenPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn set_render_to_screen(&mut self, to_screen: bool) {
        self.render_to_screen = to_screen;
    }

    fn render(
        &mut self,
        renderer: &mut Renderer<G>,
        frame: &PassFrame,
    ) -> Result<(), RenderError> {
        let (width, height) = frame.viewport;
        let viewport = Vec2::new(width as f32, height as f32);
        // pixels per millimeter on a 35mm-frame diagonal
        let ppm = viewport.length() / 35.0;

        let target = if self.render_to_screen {
            RenderTarget::Screen
        } else {
            frame.offscreen
        };
        renderer.draw(
            &self.command,
            target,
            &[
                ("u_Texture", UniformValue::Texture(frame.read_texture)),
                ("u_ViewportSize", UniformValue::Vec2(viewport)),
                ("u_PPM", UniformValue::Float(ppm)),
            ],
        )
    }
}
