use crate::ShaderError;
use std::collections::BTreeMap;
use tracing::debug;

/// Injected when the resolved fragment text carries no precision qualifier.
const PRECISION_PREAMBLE: &str = "#ifdef GL_FRAGMENT_PRECISION_HIGH\n\
precision highp float;\n\
#else\n\
precision mediump float;\n\
#endif\n";

/// GLSL types recognized by uniform extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlslType {
    Bool,
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    SamplerCube,
}

impl GlslType {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "bool" => Some(GlslType::Bool),
            "float" => Some(GlslType::Float),
            "int" => Some(GlslType::Int),
            "vec2" => Some(GlslType::Vec2),
            "vec3" => Some(GlslType::Vec3),
            "vec4" => Some(GlslType::Vec4),
            "ivec2" => Some(GlslType::IVec2),
            "ivec3" => Some(GlslType::IVec3),
            "ivec4" => Some(GlslType::IVec4),
            "mat2" => Some(GlslType::Mat2),
            "mat3" => Some(GlslType::Mat3),
            "mat4" => Some(GlslType::Mat4),
            "sampler2D" => Some(GlslType::Sampler2D),
            "samplerCube" => Some(GlslType::SamplerCube),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            GlslType::Bool => "bool",
            GlslType::Float => "float",
            GlslType::Int => "int",
            GlslType::Vec2 => "vec2",
            GlslType::Vec3 => "vec3",
            GlslType::Vec4 => "vec4",
            GlslType::IVec2 => "ivec2",
            GlslType::IVec3 => "ivec3",
            GlslType::IVec4 => "ivec4",
            GlslType::Mat2 => "mat2",
            GlslType::Mat3 => "mat3",
            GlslType::Mat4 => "mat4",
            GlslType::Sampler2D => "sampler2D",
            GlslType::SamplerCube => "samplerCube",
        }
    }

    /// Component count of the vector/matrix types; 0 for the rest.
    fn component_count(self) -> usize {
        match self {
            GlslType::Vec2 | GlslType::IVec2 => 2,
            GlslType::Vec3 | GlslType::IVec3 => 3,
            GlslType::Vec4 | GlslType::IVec4 | GlslType::Mat2 => 4,
            GlslType::Mat3 => 9,
            GlslType::Mat4 => 16,
            _ => 0,
        }
    }
}

/// Typed default value extracted from a uniform declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformDefault {
    Bool(bool),
    Float(f32),
    Int(i32),
    Vector(Vec<f32>),
    IntVector(Vec<i32>),
    Sampler,
}

/// A resolved module: final shader text plus aggregated uniform defaults.
#[derive(Debug, Clone, Default)]
pub struct ShaderModule {
    pub vs: String,
    pub fs: String,
    pub uniforms: BTreeMap<String, UniformDefault>,
}

#[derive(Debug, Clone)]
struct RawModule {
    vs: String,
    fs: String,
    uniforms: BTreeMap<String, UniformDefault>,
}

#[derive(Clone, Copy)]
enum Stage {
    Vertex,
    Fragment,
}

/// Owned registry of shader modules. Registered once at startup, resolved
/// lazily, cached for the registry's lifetime.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    raw: BTreeMap<String, RawModule>,
    resolved: BTreeMap<String, ShaderModule>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a module's raw text. Uniform declarations are extracted and
    /// rewritten without their default annotations.
    pub fn register(&mut self, name: &str, vs: &str, fs: &str) {
        let (vs, vs_uniforms) = extract_uniforms(vs);
        let (fs, fs_uniforms) = extract_uniforms(fs);
        let mut uniforms = vs_uniforms;
        uniforms.extend(fs_uniforms);
        debug!(module = name, uniforms = uniforms.len(), "registered shader module");
        self.raw.insert(name.to_string(), RawModule { vs, fs, uniforms });
    }

    /// Resolve a module: expand includes, aggregate defaults across the
    /// include closure, inject the fragment precision preamble if needed.
    pub fn get(&mut self, name: &str) -> Result<ShaderModule, ShaderError> {
        if let Some(module) = self.resolved.get(name) {
            return Ok(module.clone());
        }
        let raw = self
            .raw
            .get(name)
            .ok_or_else(|| ShaderError::UnknownModule(name.to_string()))?;

        // the root module counts as already expanded, so a cycle back to it
        // resolves to empty text instead of repeating its body
        let mut vs_includes = vec![name.to_string()];
        let vs = expand(&self.raw, &raw.vs, Stage::Vertex, &mut vs_includes)?;
        let mut fs_includes = vec![name.to_string()];
        let mut fs = expand(&self.raw, &raw.fs, Stage::Fragment, &mut fs_includes)?;

        let mut uniforms = BTreeMap::new();
        for module_name in vs_includes
            .iter()
            .chain(fs_includes.iter())
            .map(String::as_str)
            .chain(std::iter::once(name))
        {
            if let Some(raw) = self.raw.get(module_name) {
                uniforms.extend(raw.uniforms.clone());
            }
        }

        if !has_precision_qualifier(&fs) {
            fs = format!("{PRECISION_PREAMBLE}{fs}");
        }

        let module = ShaderModule {
            vs: vs.trim().to_string(),
            fs: fs.trim().to_string(),
            uniforms,
        };
        self.resolved.insert(name.to_string(), module.clone());
        Ok(module)
    }
}

/// Expand `#pragma include "name"` directives line by line. A name already
/// present in the chain yields empty text.
fn expand(
    raw: &BTreeMap<String, RawModule>,
    content: &str,
    stage: Stage,
    included: &mut Vec<String>,
) -> Result<String, ShaderError> {
    let mut out = String::new();
    for line in content.lines() {
        match parse_include(line) {
            Some(name) => {
                if included.iter().any(|seen| seen == name) {
                    continue;
                }
                included.push(name.to_string());
                let module = raw
                    .get(name)
                    .ok_or_else(|| ShaderError::UnknownInclude(name.to_string()))?;
                let text = match stage {
                    Stage::Vertex => &module.vs,
                    Stage::Fragment => &module.fs,
                };
                out.push_str(&expand(raw, text, stage, included)?);
            }
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    Ok(out)
}

fn parse_include(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("#pragma include")?;
    let start = rest.find('"')? + 1;
    let end = start + rest[start..].find('"')?;
    Some(&rest[start..end])
}

/// Pull uniform declarations of recognized types out of the source, coercing
/// any `: default` annotation and rewriting the line without it.
fn extract_uniforms(content: &str) -> (String, BTreeMap<String, UniformDefault>) {
    let mut uniforms = BTreeMap::new();
    let mut out = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        let parsed = trimmed.strip_prefix("uniform ").and_then(|rest| {
            let rest = rest.trim_start();
            let (type_token, decl) = rest.split_once(char::is_whitespace)?;
            let ty = GlslType::parse(type_token)?;
            let decl = decl.trim().strip_suffix(';')?;
            Some((ty, decl))
        });

        match parsed {
            Some((ty, decl)) => {
                let (name, default) = match decl.split_once(':') {
                    Some((name, default)) => (name.trim(), Some(default.trim())),
                    None => (decl.trim(), None),
                };
                uniforms.insert(name.to_string(), coerce_default(ty, default));
                out.push_str(&format!("uniform {} {};\n", ty.keyword(), name));
            }
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    (out, uniforms)
}

fn coerce_default(ty: GlslType, default: Option<&str>) -> UniformDefault {
    match ty {
        GlslType::Bool => UniformDefault::Bool(default == Some("true")),
        GlslType::Float => {
            UniformDefault::Float(default.and_then(|s| s.parse().ok()).unwrap_or(0.0))
        }
        GlslType::Int => UniformDefault::Int(default.and_then(|s| s.parse().ok()).unwrap_or(0)),
        GlslType::IVec2 | GlslType::IVec3 | GlslType::IVec4 => {
            UniformDefault::IntVector(parse_list(ty, default))
        }
        GlslType::Vec2
        | GlslType::Vec3
        | GlslType::Vec4
        | GlslType::Mat2
        | GlslType::Mat3
        | GlslType::Mat4 => UniformDefault::Vector(parse_list(ty, default)),
        GlslType::Sampler2D | GlslType::SamplerCube => UniformDefault::Sampler,
    }
}

/// Parse a bracketed comma list, zero-filled to the type's component count
/// when absent.
fn parse_list<T: Default + std::str::FromStr + Clone>(
    ty: GlslType,
    default: Option<&str>,
) -> Vec<T> {
    match default {
        Some(text) if !text.is_empty() => text
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(|part| part.trim().parse().unwrap_or_default())
            .collect(),
        _ => vec![T::default(); ty.component_count()],
    }
}

fn has_precision_qualifier(source: &str) -> bool {
    let tokens: Vec<&str> = source.split_whitespace().collect();
    tokens.windows(3).any(|window| {
        window[0] == "precision"
            && matches!(window[1], "highp" | "mediump" | "lowp")
            && window[2].starts_with("float")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_typed_defaults() {
        let fs = "precision highp float;\n\
                  uniform vec3 u_Color : [0.5, 0.5, 1];\n\
                  uniform float u_Width : 2.5;\n\
                  uniform bool u_Enabled : true;\n\
                  uniform vec4 u_Empty;\n\
                  uniform sampler2D u_Texture;\n\
                  void main() {}\n";
        let mut registry = ModuleRegistry::new();
        registry.register("m", "", fs);
        let module = registry.get("m").unwrap();

        assert_eq!(
            module.uniforms["u_Color"],
            UniformDefault::Vector(vec![0.5, 0.5, 1.0])
        );
        assert_eq!(module.uniforms["u_Width"], UniformDefault::Float(2.5));
        assert_eq!(module.uniforms["u_Enabled"], UniformDefault::Bool(true));
        assert_eq!(
            module.uniforms["u_Empty"],
            UniformDefault::Vector(vec![0.0; 4])
        );
        assert_eq!(module.uniforms["u_Texture"], UniformDefault::Sampler);
        // annotation stripped from the rewritten text
        assert!(module.fs.contains("uniform vec3 u_Color;"));
        assert!(!module.fs.contains(':'));
    }

    #[test]
    fn resolves_includes_and_aggregates_uniforms() {
        let mut registry = ModuleRegistry::new();
        registry.register("lights", "", "uniform vec3 u_LightDir : [0, 0.5, 0.5];\n");
        registry.register(
            "main",
            "void main() {}\n",
            "precision mediump float;\n#pragma include \"lights\"\nvoid main() {}\n",
        );
        let module = registry.get("main").unwrap();
        assert!(module.fs.contains("uniform vec3 u_LightDir;"));
        assert!(!module.fs.contains("#pragma include"));
        assert_eq!(
            module.uniforms["u_LightDir"],
            UniformDefault::Vector(vec![0.0, 0.5, 0.5])
        );
    }

    #[test]
    fn include_cycles_resolve_to_empty() {
        let mut registry = ModuleRegistry::new();
        registry.register("a", "", "#pragma include \"b\"\nfloat a() { return 1.0; }\n");
        registry.register("b", "", "#pragma include \"a\"\nfloat b() { return 2.0; }\n");
        let module = registry.get("a").unwrap();
        // both bodies appear exactly once
        assert_eq!(module.fs.matches("float a()").count(), 1);
        assert_eq!(module.fs.matches("float b()").count(), 1);
    }

    #[test]
    fn self_include_resolves_to_empty() {
        let mut registry = ModuleRegistry::new();
        registry.register("m", "", "#pragma include \"m\"\nfloat m() { return 3.0; }\n");
        let module = registry.get("m").unwrap();
        assert_eq!(module.fs.matches("float m()").count(), 1);
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut registry = ModuleRegistry::new();
        registry.register("m", "void main() {}\n", "void main() {}\n");
        let first = registry.get("m").unwrap();
        let second = registry.get("m").unwrap();
        assert_eq!(first.vs, second.vs);
        assert_eq!(first.fs, second.fs);
        assert_eq!(first.uniforms, second.uniforms);
    }

    #[test]
    fn precision_preamble_injected_when_missing() {
        let mut registry = ModuleRegistry::new();
        registry.register("bare", "", "void main() {}\n");
        registry.register("qualified", "", "precision highp float;\nvoid main() {}\n");
        assert!(registry
            .get("bare")
            .unwrap()
            .fs
            .starts_with("#ifdef GL_FRAGMENT_PRECISION_HIGH"));
        assert!(!registry
            .get("qualified")
            .unwrap()
            .fs
            .contains("GL_FRAGMENT_PRECISION_HIGH"));
    }

    #[test]
    fn unknown_module_errors() {
        let mut registry = ModuleRegistry::new();
        assert!(matches!(
            registry.get("nope"),
            Err(ShaderError::UnknownModule(_))
        ));
    }
}
