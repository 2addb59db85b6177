use glam::Vec4;

/// Named visualization mode selected by the host.
///
/// Each layer maps to the two vec4 selector uniforms consumed by the PBR
/// fragment shader: the first picks a debug channel (normal/albedo/metallic/
/// roughness), the second switches the final mix (wireframe overlay or the
/// split-layers view).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderLayer {
    #[default]
    Final,
    Normal,
    Albedo,
    Metallic,
    Roughness,
    Wireframe,
    Layers,
}

impl RenderLayer {
    /// Per-channel selector (`u_ScaleDiffBaseMR`).
    pub fn split_layer(self) -> Vec4 {
        match self {
            RenderLayer::Normal => Vec4::new(1.0, 0.0, 0.0, 0.0),
            RenderLayer::Albedo => Vec4::new(0.0, 1.0, 0.0, 0.0),
            RenderLayer::Metallic => Vec4::new(0.0, 0.0, 1.0, 0.0),
            RenderLayer::Roughness => Vec4::new(0.0, 0.0, 0.0, 1.0),
            _ => Vec4::ZERO,
        }
    }

    /// Final-mix selector (`u_FinalSplit`).
    pub fn final_split(self) -> Vec4 {
        match self {
            RenderLayer::Wireframe => Vec4::new(1.0, 0.0, 0.0, 0.0),
            RenderLayer::Layers => Vec4::new(0.0, 1.0, 0.0, 0.0),
            _ => Vec4::ZERO,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "final" => Some(RenderLayer::Final),
            "normal" => Some(RenderLayer::Normal),
            "albedo" => Some(RenderLayer::Albedo),
            "metallic" => Some(RenderLayer::Metallic),
            "roughness" => Some(RenderLayer::Roughness),
            "wireframe" => Some(RenderLayer::Wireframe),
            "layers" => Some(RenderLayer::Layers),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_vectors() {
        assert_eq!(RenderLayer::Final.split_layer(), Vec4::ZERO);
        assert_eq!(
            RenderLayer::Metallic.split_layer(),
            Vec4::new(0.0, 0.0, 1.0, 0.0)
        );
        assert_eq!(
            RenderLayer::Wireframe.final_split(),
            Vec4::new(1.0, 0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn parse_names() {
        assert_eq!(RenderLayer::parse("roughness"), Some(RenderLayer::Roughness));
        assert_eq!(RenderLayer::parse("depth"), None);
    }
}
