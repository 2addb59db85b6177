use std::collections::BTreeMap;

use glam::Mat4;
use lucent_camera::CameraRig;
use lucent_common::Style;
use lucent_shader::{ModuleRegistry, ShaderModule, register_builtins};
use tracing::debug;

use crate::defines::Defines;
use crate::gpu::{
    DrawCommand, GpuContext, RenderTarget, TextureData, TextureParams, UniformValue,
    VertexAttribute,
};
use crate::RenderError;

/// Ties a GPU backend, the shader-module registry and the visualization
/// style together, and turns resolved primitives into draw commands.
///
/// Session-scoped textures (BRDF lookup, environment maps) are owned here
/// and survive scene rebuilds; per-node textures are owned by the scene.
pub struct Renderer<G: GpuContext> {
    gpu: G,
    registry: ModuleRegistry,
    globals: Defines,
    session_uniforms: BTreeMap<String, UniformValue>,
    pub style: Style,
}

impl<G: GpuContext> Renderer<G> {
    pub fn new(gpu: G) -> Self {
        let caps = gpu.capabilities();
        let mut globals = Defines::new();
        globals.enable("USE_IBL");
        if !caps.srgb_textures {
            // no hardware sRGB sampling: linearize in the fragment shader
            globals.enable("MANUAL_SRGB");
        }
        if caps.texture_lod {
            globals.enable("USE_TEX_LOD");
        }
        debug!(?caps, "renderer capabilities");

        let mut registry = ModuleRegistry::new();
        register_builtins(&mut registry);

        Self {
            gpu,
            registry,
            globals,
            session_uniforms: BTreeMap::new(),
            style: Style::default(),
        }
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    pub fn globals(&self) -> &Defines {
        &self.globals
    }

    pub fn resolve_module(&mut self, name: &str) -> Result<ShaderModule, RenderError> {
        Ok(self.registry.get(name)?)
    }

    /// Upload the session-scoped IBL textures. Called once per environment,
    /// never per rebuild.
    pub fn load_session_textures(
        &mut self,
        brdf_lut: TextureData,
        diffuse_env: TextureData,
        specular_env: TextureData,
    ) -> Result<(), RenderError> {
        let srgb = self.gpu.capabilities().srgb_textures;
        let params = TextureParams {
            wrap_s: lucent_common::WrapMode::ClampToEdge,
            wrap_t: lucent_common::WrapMode::ClampToEdge,
            srgb,
            ..TextureParams::default()
        };
        for (name, data) in [
            ("u_brdfLUT", brdf_lut),
            ("u_DiffuseEnvSampler", diffuse_env),
            ("u_SpecularEnvSampler", specular_env),
        ] {
            let texture = self.gpu.create_texture(&params, &data)?;
            self.session_uniforms
                .insert(name.to_string(), UniformValue::Texture(texture));
        }
        Ok(())
    }

    /// Assemble and compile a draw command for a shader module.
    ///
    /// Uniform layering, lowest to highest precedence: defaults extracted
    /// from the module text, caller-supplied material uniforms, session
    /// uniforms.
    pub fn create_draw_command(
        &mut self,
        module_name: &str,
        defines: &Defines,
        attributes: Vec<VertexAttribute>,
        indices: Vec<u32>,
        material_uniforms: BTreeMap<String, UniformValue>,
        cull_face: bool,
    ) -> Result<DrawCommand, RenderError> {
        let module = self.registry.get(module_name)?;
        let merged = self.globals.merged(defines);
        let program = self
            .gpu
            .compile_program(&merged.prefix(&module.vs), &merged.prefix(&module.fs))?;

        let mut uniforms = BTreeMap::new();
        for (name, default) in &module.uniforms {
            if let Some(value) = UniformValue::from_default(default) {
                uniforms.insert(name.clone(), value);
            }
        }
        uniforms.extend(material_uniforms);
        uniforms.extend(self.session_uniforms.clone());

        debug!(module = module_name, program = program.0, "compiled draw command");
        Ok(DrawCommand {
            program,
            attributes,
            indices,
            uniforms,
            cull_face,
        })
    }

    /// Per-draw uniform overrides for one node under the current camera and
    /// style.
    pub fn frame_overrides(
        &self,
        rig: &CameraRig,
        model: Mat4,
    ) -> Vec<(&'static str, UniformValue)> {
        let normal_matrix = model.inverse().transpose();
        vec![
            ("u_Camera", UniformValue::Vec3(rig.eye)),
            ("u_ModelMatrix", UniformValue::Mat4(model)),
            ("u_NormalMatrix", UniformValue::Mat4(normal_matrix)),
            ("u_MVPMatrix", UniformValue::Mat4(rig.transform * model)),
            ("u_LightDirection", UniformValue::Vec3(self.style.light.direction)),
            ("u_LightColor", UniformValue::Vec3(self.style.light.color)),
            ("u_ScaleDiffBaseMR", UniformValue::Vec4(self.style.split_layer)),
            ("u_FinalSplit", UniformValue::Vec4(self.style.final_split)),
            (
                "u_WireframeLineColor",
                UniformValue::Vec3(self.style.wireframe_line_color),
            ),
            (
                "u_WireframeLineWidth",
                UniformValue::Float(self.style.wireframe_line_width),
            ),
        ]
    }

    pub fn draw(
        &mut self,
        command: &DrawCommand,
        target: RenderTarget,
        overrides: &[(&str, UniformValue)],
    ) -> Result<(), RenderError> {
        self.gpu.draw(command, target, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingGpu;
    use crate::Capabilities;
    use glam::Vec3;

    #[test]
    fn capability_flags_become_global_defines() {
        let gpu = RecordingGpu::new(Capabilities {
            srgb_textures: false,
            texture_lod: true,
            derivatives: true,
        });
        let renderer = Renderer::new(gpu);
        assert_eq!(renderer.globals().get("USE_IBL"), Some(1));
        assert_eq!(renderer.globals().get("MANUAL_SRGB"), Some(1));
        assert_eq!(renderer.globals().get("USE_TEX_LOD"), Some(1));
    }

    #[test]
    fn draw_command_layers_defaults_session_and_material_uniforms() {
        let gpu = RecordingGpu::new(Capabilities {
            srgb_textures: true,
            texture_lod: false,
            derivatives: true,
        });
        let mut renderer = Renderer::new(gpu);
        renderer
            .load_session_textures(
                TextureData { bytes: vec![0], mime_type: None },
                TextureData { bytes: vec![0], mime_type: None },
                TextureData { bytes: vec![0], mime_type: None },
            )
            .unwrap();

        let mut material = BTreeMap::new();
        material.insert(
            "u_BaseColorFactor".to_string(),
            UniformValue::Vec4(glam::Vec4::new(0.5, 0.5, 0.5, 1.0)),
        );

        let command = renderer
            .create_draw_command(
                "pbr",
                &Defines::new(),
                vec![VertexAttribute::new("a_Position", vec![0.0; 9], 3)],
                vec![0, 1, 2],
                material,
                true,
            )
            .unwrap();

        // default from shader text
        assert_eq!(
            command.uniforms["u_MetallicRoughnessValues"],
            UniformValue::Vec2(glam::Vec2::new(1.0, 1.0))
        );
        // material override beats the default
        assert_eq!(
            command.uniforms["u_BaseColorFactor"],
            UniformValue::Vec4(glam::Vec4::new(0.5, 0.5, 0.5, 1.0))
        );
        // session texture present
        assert!(matches!(
            command.uniforms["u_brdfLUT"],
            UniformValue::Texture(_)
        ));
    }

    #[test]
    fn frame_overrides_carry_camera_and_style() {
        let gpu = RecordingGpu::new(Capabilities::default());
        let mut renderer = Renderer::new(gpu);
        renderer.style.set_layer(lucent_common::RenderLayer::Wireframe);

        let rig = CameraRig::new(
            Vec3::new(0.0, 2.0, 2.0),
            Vec3::ZERO,
            45.0_f32.to_radians(),
            1.0,
            0.01,
            100.0,
        );
        let overrides = renderer.frame_overrides(&rig, Mat4::IDENTITY);
        let find = |name: &str| {
            overrides
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(find("u_Camera"), UniformValue::Vec3(Vec3::new(0.0, 2.0, 2.0)));
        assert_eq!(
            find("u_FinalSplit"),
            UniformValue::Vec4(glam::Vec4::new(1.0, 0.0, 0.0, 0.0))
        );
        assert_eq!(find("u_MVPMatrix"), UniformValue::Mat4(rig.transform));
    }
}
