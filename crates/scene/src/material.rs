//! Material resolution: factors to uniforms, texture references to GPU
//! textures, presence to feature flags.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3, Vec4};
use lucent_common::{MagFilter, MinFilter, WrapMode};
use lucent_document::{AttributeDecoder, BufferLoader, Document, Sampler};
use lucent_render::{
    GpuContext, Renderer, TextureData, TextureHandle, TextureParams, UniformValue,
};
use tracing::debug;

use crate::{FeatureFlags, SceneError};

/// Everything a primitive's material contributes to its draw command.
#[derive(Debug, Default)]
pub struct ResolvedMaterial {
    pub uniforms: BTreeMap<String, UniformValue>,
    pub flags: FeatureFlags,
    /// Back-face culling, disabled for double-sided materials.
    pub cull_face: bool,
    /// Textures created for this material, owned by the node for release.
    pub textures: Vec<TextureHandle>,
}

/// Resolve an optional material reference.
///
/// A missing reference is not an error: the defaults are dielectric white
/// with zero metallic/roughness. A present material with missing optional
/// textures silently skips them.
pub fn resolve_material<G: GpuContext>(
    doc: &Document,
    material_index: Option<usize>,
    decoder: &mut AttributeDecoder,
    loader: &mut dyn BufferLoader,
    renderer: &mut Renderer<G>,
) -> Result<ResolvedMaterial, SceneError> {
    let mut resolved = ResolvedMaterial {
        cull_face: true,
        ..ResolvedMaterial::default()
    };
    match fill_material(doc, material_index, decoder, loader, renderer, &mut resolved) {
        Ok(()) => Ok(resolved),
        Err(err) => {
            // don't orphan textures created before the failing lookup
            for texture in resolved.textures.drain(..) {
                renderer.gpu_mut().destroy_texture(texture);
            }
            Err(err)
        }
    }
}

fn fill_material<G: GpuContext>(
    doc: &Document,
    material_index: Option<usize>,
    decoder: &mut AttributeDecoder,
    loader: &mut dyn BufferLoader,
    renderer: &mut Renderer<G>,
    resolved: &mut ResolvedMaterial,
) -> Result<(), SceneError> {
    let Some(material) = material_index.and_then(|i| doc.materials.get(i)) else {
        resolved.uniforms.insert(
            "u_BaseColorFactor".to_string(),
            UniformValue::Vec4(Vec4::ONE),
        );
        resolved.uniforms.insert(
            "u_MetallicRoughnessValues".to_string(),
            UniformValue::Vec2(Vec2::ZERO),
        );
        return Ok(());
    };

    resolved.cull_face = !material.double_sided;
    let srgb = renderer.gpu().capabilities().srgb_textures;

    if let Some(pbr) = &material.pbr_metallic_roughness {
        if let Some(info) = &pbr.base_color_texture {
            // base color is authored in sRGB
            if let Some(texture) =
                load_texture(doc, info.index, srgb, decoder, loader, renderer)?
            {
                resolved.flags.base_color_map = true;
                resolved
                    .uniforms
                    .insert("u_BaseColorSampler".to_string(), UniformValue::Texture(texture));
                resolved.textures.push(texture);
            }
        }
        resolved.uniforms.insert(
            "u_BaseColorFactor".to_string(),
            UniformValue::Vec4(Vec4::from_array(
                pbr.base_color_factor.unwrap_or([1.0, 1.0, 1.0, 1.0]),
            )),
        );
        resolved.uniforms.insert(
            "u_MetallicRoughnessValues".to_string(),
            UniformValue::Vec2(Vec2::new(
                pbr.metallic_factor.unwrap_or(1.0),
                pbr.roughness_factor.unwrap_or(1.0),
            )),
        );
        if let Some(info) = &pbr.metallic_roughness_texture {
            if let Some(texture) =
                load_texture(doc, info.index, false, decoder, loader, renderer)?
            {
                resolved.flags.metal_roughness_map = true;
                resolved.uniforms.insert(
                    "u_MetallicRoughnessSampler".to_string(),
                    UniformValue::Texture(texture),
                );
                resolved.textures.push(texture);
            }
        }
    }

    if let Some(info) = &material.normal_texture {
        if let Some(texture) = load_texture(doc, info.index, false, decoder, loader, renderer)? {
            resolved.flags.normal_map = true;
            resolved
                .uniforms
                .insert("u_NormalSampler".to_string(), UniformValue::Texture(texture));
            resolved.uniforms.insert(
                "u_NormalScale".to_string(),
                UniformValue::Float(info.scale.unwrap_or(1.0)),
            );
            resolved.textures.push(texture);
        }
    }

    if let Some(info) = &material.emissive_texture {
        if let Some(texture) = load_texture(doc, info.index, srgb, decoder, loader, renderer)? {
            resolved.flags.emissive_map = true;
            resolved
                .uniforms
                .insert("u_EmissiveSampler".to_string(), UniformValue::Texture(texture));
            resolved.uniforms.insert(
                "u_EmissiveFactor".to_string(),
                UniformValue::Vec3(Vec3::from_array(
                    material.emissive_factor.unwrap_or([0.0, 0.0, 0.0]),
                )),
            );
            resolved.textures.push(texture);
        }
    }

    if let Some(info) = &material.occlusion_texture {
        if let Some(texture) = load_texture(doc, info.index, false, decoder, loader, renderer)? {
            resolved.flags.occlusion_map = true;
            resolved
                .uniforms
                .insert("u_OcclusionSampler".to_string(), UniformValue::Texture(texture));
            resolved.uniforms.insert(
                "u_OcclusionStrength".to_string(),
                UniformValue::Float(info.strength.unwrap_or(1.0)),
            );
            resolved.textures.push(texture);
        }
    }

    Ok(())
}

/// Fetch a texture's image bytes and upload them with its sampler state.
/// A texture without a source image resolves to `None`.
fn load_texture<G: GpuContext>(
    doc: &Document,
    texture_index: usize,
    srgb: bool,
    decoder: &mut AttributeDecoder,
    loader: &mut dyn BufferLoader,
    renderer: &mut Renderer<G>,
) -> Result<Option<TextureHandle>, SceneError> {
    let texture = doc
        .textures
        .get(texture_index)
        .ok_or(SceneError::TextureOutOfRange(texture_index))?;
    let Some(source) = texture.source else {
        debug!(texture = texture_index, "texture has no source image");
        return Ok(None);
    };

    let bytes = decoder.image_bytes(doc, loader, source)?;
    let image = &doc.images[source];
    let params = sampler_params(
        texture.sampler.and_then(|i| doc.samplers.get(i)),
        srgb,
    )?;
    let data = TextureData {
        bytes,
        mime_type: image.mime_type.clone(),
    };
    let handle = renderer.gpu_mut().create_texture(&params, &data)?;
    Ok(Some(handle))
}

/// Map a document sampler to upload params, defaulting to linear/repeat.
fn sampler_params(sampler: Option<&Sampler>, srgb: bool) -> Result<TextureParams, SceneError> {
    let mut params = TextureParams {
        srgb,
        ..TextureParams::default()
    };
    if let Some(sampler) = sampler {
        if let Some(min) = sampler.min_filter {
            params.min_filter = MinFilter::try_from(min)?;
        }
        if let Some(mag) = sampler.mag_filter {
            params.mag_filter = MagFilter::try_from(mag)?;
        }
        if let Some(wrap_s) = sampler.wrap_s {
            params.wrap_s = WrapMode::try_from(wrap_s)?;
        }
        if let Some(wrap_t) = sampler.wrap_t {
            params.wrap_t = WrapMode::try_from(wrap_t)?;
        }
    }
    Ok(params)
}
