//! Built-in shader modules, embedded at compile time.

use crate::registry::ModuleRegistry;

const COMMON: &str = include_str!("../shaders/chunks/common.glsl");
const WIREFRAME_VERT: &str = include_str!("../shaders/chunks/wireframe.vert.glsl");
const WIREFRAME_FRAG: &str = include_str!("../shaders/chunks/wireframe.frag.glsl");
const SPLIT_LAYER: &str = include_str!("../shaders/chunks/split-layer.glsl");
const PBR_VERT: &str = include_str!("../shaders/pbr.vert.glsl");
const PBR_FRAG: &str = include_str!("../shaders/pbr.frag.glsl");
const QUAD_VERT: &str = include_str!("../shaders/post/quad.vert.glsl");
const COPY_FRAG: &str = include_str!("../shaders/post/copy.frag.glsl");
const BLUR_FRAG: &str = include_str!("../shaders/post/blur.frag.glsl");
const DOF_FRAG: &str = include_str!("../shaders/post/dof.frag.glsl");

/// Register every built-in module. Call once on a fresh registry before any
/// resolution.
pub fn register_builtins(registry: &mut ModuleRegistry) {
    registry.register("common", COMMON, COMMON);
    registry.register("wireframe", WIREFRAME_VERT, WIREFRAME_FRAG);
    registry.register("split-layer", "", SPLIT_LAYER);
    registry.register("pbr", PBR_VERT, PBR_FRAG);
    registry.register("copy-pass", QUAD_VERT, COPY_FRAG);
    registry.register("blur-pass", QUAD_VERT, BLUR_FRAG);
    registry.register("dof-pass", QUAD_VERT, DOF_FRAG);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::UniformDefault;

    #[test]
    fn pbr_resolves_with_aggregated_defaults() {
        let mut registry = ModuleRegistry::new();
        register_builtins(&mut registry);
        let module = registry.get("pbr").unwrap();

        assert!(!module.vs.contains("#pragma include"));
        assert!(!module.fs.contains("#pragma include"));
        // wireframe chunk pulled into both stages
        assert!(module.vs.contains("a_Barycentric"));
        assert!(module.fs.contains("edgeFactor"));

        assert_eq!(
            module.uniforms["u_LightDirection"],
            UniformDefault::Vector(vec![0.0, 0.5, 0.5])
        );
        assert_eq!(
            module.uniforms["u_BaseColorFactor"],
            UniformDefault::Vector(vec![1.0, 1.0, 1.0, 1.0])
        );
        assert_eq!(module.uniforms["u_WireframeLineWidth"], UniformDefault::Float(1.0));
        assert_eq!(
            module.uniforms["u_ScaleIBLAmbient"],
            UniformDefault::Vector(vec![1.0, 1.0, 0.0, 0.0])
        );
    }

    #[test]
    fn post_passes_resolve() {
        let mut registry = ModuleRegistry::new();
        register_builtins(&mut registry);
        for name in ["copy-pass", "blur-pass", "dof-pass"] {
            let module = registry.get(name).unwrap();
            assert!(module.vs.contains("a_Position"), "{name} vertex stage");
            assert_eq!(module.uniforms["u_Texture"], UniformDefault::Sampler);
        }
        let dof = registry.get("dof-pass").unwrap();
        assert_eq!(dof.uniforms["u_FocusDistance"], UniformDefault::Float(2.0));
    }
}
