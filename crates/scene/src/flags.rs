use lucent_render::Defines;

/// Shader features present on one primitive.
///
/// Assembled once at construction from which optional channels and textures
/// actually resolved, then baked into the program text as `HAS_*` defines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub normals: bool,
    pub tangents: bool,
    pub uv: bool,
    pub base_color_map: bool,
    pub metal_roughness_map: bool,
    pub normal_map: bool,
    pub emissive_map: bool,
    pub occlusion_map: bool,
}

impl FeatureFlags {
    /// Union of two flag sets.
    pub fn merge(self, other: FeatureFlags) -> FeatureFlags {
        FeatureFlags {
            normals: self.normals || other.normals,
            tangents: self.tangents || other.tangents,
            uv: self.uv || other.uv,
            base_color_map: self.base_color_map || other.base_color_map,
            metal_roughness_map: self.metal_roughness_map || other.metal_roughness_map,
            normal_map: self.normal_map || other.normal_map,
            emissive_map: self.emissive_map || other.emissive_map,
            occlusion_map: self.occlusion_map || other.occlusion_map,
        }
    }

    pub fn to_defines(self) -> Defines {
        let mut defines = Defines::new();
        for (name, set) in [
            ("HAS_NORMALS", self.normals),
            ("HAS_TANGENTS", self.tangents),
            ("HAS_UV", self.uv),
            ("HAS_BASECOLORMAP", self.base_color_map),
            ("HAS_METALROUGHNESSMAP", self.metal_roughness_map),
            ("HAS_NORMALMAP", self.normal_map),
            ("HAS_EMISSIVEMAP", self.emissive_map),
            ("HAS_OCCLUSIONMAP", self.occlusion_map),
        ] {
            if set {
                defines.enable(name);
            }
        }
        defines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_set_flags_become_defines() {
        let flags = FeatureFlags {
            normals: true,
            uv: true,
            ..FeatureFlags::default()
        };
        let text = flags.to_defines().prefix("");
        assert!(text.contains("#define HAS_NORMALS 1"));
        assert!(text.contains("#define HAS_UV 1"));
        assert!(!text.contains("HAS_TANGENTS"));
    }

    #[test]
    fn merge_is_a_union() {
        let a = FeatureFlags {
            normals: true,
            ..FeatureFlags::default()
        };
        let b = FeatureFlags {
            base_color_map: true,
            ..FeatureFlags::default()
        };
        let merged = a.merge(b);
        assert!(merged.normals && merged.base_color_map);
        assert!(!merged.uv);
    }
}
