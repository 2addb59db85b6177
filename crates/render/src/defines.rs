use std::collections::BTreeMap;

/// Shader feature flags baked into program text before compilation.
///
/// A flag with value 0 is omitted entirely, so `#ifdef` checks in the shader
/// see it as undefined rather than defined-but-false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defines {
    flags: BTreeMap<String, i32>,
}

impl Defines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: i32) {
        self.flags.insert(name.to_string(), value);
    }

    pub fn enable(&mut self, name: &str) {
        self.set(name, 1);
    }

    pub fn get(&self, name: &str) -> Option<i32> {
        self.flags.get(name).copied()
    }

    /// This set with `other` layered on top.
    pub fn merged(&self, other: &Defines) -> Defines {
        let mut flags = self.flags.clone();
        flags.extend(other.flags.iter().map(|(k, v)| (k.clone(), *v)));
        Defines { flags }
    }

    /// Prepend `#define` lines to shader source, skipping zero-valued flags.
    pub fn prefix(&self, source: &str) -> String {
        let mut out = String::new();
        for (name, value) in &self.flags {
            if *value != 0 {
                out.push_str(&format!("#define {name} {value}\n"));
            }
        }
        out.push_str(source);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_flags_are_not_emitted() {
        let mut defines = Defines::new();
        defines.set("USE_IBL", 1);
        defines.set("MANUAL_SRGB", 0);
        let text = defines.prefix("void main() {}");
        assert!(text.contains("#define USE_IBL 1\n"));
        assert!(!text.contains("MANUAL_SRGB"));
        assert!(text.ends_with("void main() {}"));
    }

    #[test]
    fn merged_prefers_the_overlay() {
        let mut base = Defines::new();
        base.set("USE_TEX_LOD", 1);
        base.set("USE_IBL", 1);
        let mut per_draw = Defines::new();
        per_draw.set("USE_TEX_LOD", 0);
        per_draw.enable("HAS_NORMALS");

        let merged = base.merged(&per_draw);
        assert_eq!(merged.get("USE_TEX_LOD"), Some(0));
        assert_eq!(merged.get("USE_IBL"), Some(1));
        assert_eq!(merged.get("HAS_NORMALS"), Some(1));
    }
}
