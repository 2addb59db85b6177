use crate::layer::RenderLayer;
use glam::{Vec3, Vec4};

/// Directional light feeding the PBR shading pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, 0.5, 0.5),
            color: Vec3::ONE,
        }
    }
}

/// Mutable visualization state shared by every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub split_layer: Vec4,
    pub final_split: Vec4,
    pub wireframe_line_color: Vec3,
    pub wireframe_line_width: f32,
    pub light: DirectionalLight,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            split_layer: Vec4::ZERO,
            final_split: Vec4::ZERO,
            wireframe_line_color: Vec3::ZERO,
            wireframe_line_width: 1.0,
            light: DirectionalLight::default(),
        }
    }
}

impl Style {
    /// Apply a named visualization layer.
    pub fn set_layer(&mut self, layer: RenderLayer) {
        self.split_layer = layer.split_layer();
        self.final_split = layer.final_split();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style() {
        let style = Style::default();
        assert_eq!(style.wireframe_line_width, 1.0);
        assert_eq!(style.light.direction, Vec3::new(0.0, 0.5, 0.5));
    }

    #[test]
    fn set_layer_updates_both_selectors() {
        let mut style = Style::default();
        style.set_layer(RenderLayer::Albedo);
        assert_eq!(style.split_layer, Vec4::new(0.0, 1.0, 0.0, 0.0));
        assert_eq!(style.final_split, Vec4::ZERO);

        style.set_layer(RenderLayer::Layers);
        assert_eq!(style.split_layer, Vec4::ZERO);
        assert_eq!(style.final_split, Vec4::new(0.0, 1.0, 0.0, 0.0));
    }
}
