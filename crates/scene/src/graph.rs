use std::collections::BTreeMap;

use glam::{Mat4, Quat, Vec3};
use lucent_anim::{Track, TrackValues};
use lucent_camera::CameraRig;
use lucent_common::TargetPath;
use lucent_document::{AttributeDecoder, BufferLoader, Document, Node, Primitive};
use lucent_render::{GpuContext, RenderError, RenderTarget, Renderer, VertexAttribute};
use tracing::{debug, info};

use crate::geometry::{AttributeChannel, generate_barycentric};
use crate::material::resolve_material;
use crate::node::SceneNode;
use crate::{FeatureFlags, SceneError};

/// The built scene: root nodes plus a rebuild generation counter.
///
/// The generation increments at the start of every rebuild; hosts that defer
/// work across a rebuild can compare generations to drop stale results.
#[derive(Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    generation: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn roots(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Longest animation track duration in the graph, in seconds.
    pub fn animation_duration(&self) -> f32 {
        fn walk(node: &SceneNode, mut best: f32) -> f32 {
            best = best.max(node.max_track_duration());
            for child in node.children() {
                best = walk(child, best);
            }
            best
        }
        self.nodes.iter().fold(0.0, |best, node| walk(node, best))
    }

    /// Tear down the previous graph and build the default scene's node list.
    ///
    /// Previous nodes' GPU textures are released before any new node is
    /// constructed. A failed rebuild releases everything it built so far and
    /// leaves the graph empty; the caller retries the whole build.
    pub fn rebuild<G: GpuContext>(
        &mut self,
        doc: &Document,
        decoder: &mut AttributeDecoder,
        loader: &mut dyn BufferLoader,
        renderer: &mut Renderer<G>,
    ) -> Result<(), SceneError> {
        for node in &mut self.nodes {
            node.release(renderer);
        }
        self.nodes.clear();
        self.generation += 1;

        let scene = doc.default_scene().ok_or(SceneError::MissingScene)?;
        let roots = scene.nodes.clone();
        let mut builder = NodeBuilder {
            doc,
            decoder,
            loader,
            renderer: &mut *renderer,
        };
        for index in roots {
            match builder.build_node(index) {
                Ok(node) => self.nodes.push(node),
                Err(err) => {
                    for node in &mut self.nodes {
                        node.release(renderer);
                    }
                    self.nodes.clear();
                    return Err(err);
                }
            }
        }
        info!(
            generation = self.generation,
            roots = self.nodes.len(),
            "scene graph rebuilt"
        );
        Ok(())
    }

    /// Draw every root subtree at playback time `t`.
    pub fn draw<G: GpuContext>(
        &mut self,
        renderer: &mut Renderer<G>,
        rig: &CameraRig,
        target: RenderTarget,
        t: f32,
    ) -> Result<(), RenderError> {
        for node in &mut self.nodes {
            node.draw(renderer, rig, target, Mat4::IDENTITY, t)?;
        }
        Ok(())
    }
}

struct NodeBuilder<'a, G: GpuContext> {
    doc: &'a Document,
    decoder: &'a mut AttributeDecoder,
    loader: &'a mut dyn BufferLoader,
    renderer: &'a mut Renderer<G>,
}

impl<G: GpuContext> NodeBuilder<'_, G> {
    fn build_node(&mut self, index: usize) -> Result<SceneNode, SceneError> {
        let node = self
            .doc
            .nodes
            .get(index)
            .ok_or(SceneError::NodeOutOfRange(index))?;

        let translation = Vec3::from_array(node.translation.unwrap_or([0.0; 3]));
        let rotation = node
            .rotation
            .map(Quat::from_array)
            .unwrap_or(Quat::IDENTITY);
        let scale = Vec3::from_array(node.scale.unwrap_or([1.0; 3]));
        let local = match node.matrix {
            Some(matrix) => Mat4::from_cols_array(&matrix),
            None => Mat4::from_scale_rotation_translation(scale, rotation, translation),
        };

        let mut scene_node = SceneNode::new(index, local, translation, rotation, scale);
        match self.populate_node(node, index, &mut scene_node) {
            Ok(()) => Ok(scene_node),
            Err(err) => {
                // destroy any textures the half-built subtree already owns
                scene_node.release(self.renderer);
                Err(err)
            }
        }
    }

    fn populate_node(
        &mut self,
        node: &Node,
        index: usize,
        scene_node: &mut SceneNode,
    ) -> Result<(), SceneError> {
        if let Some(mesh_index) = node.mesh {
            let mesh = self
                .doc
                .meshes
                .get(mesh_index)
                .ok_or(SceneError::MeshOutOfRange(mesh_index))?;
            for primitive in &mesh.primitives {
                self.build_primitive(primitive, scene_node)?;
            }
        }

        scene_node.set_tracks(self.build_tracks(index)?);

        for &child in &node.children {
            let child_node = self.build_node(child)?;
            scene_node.add_child(child_node);
        }
        Ok(())
    }

    /// Decode a primitive's channels, de-duplicate for barycentrics, resolve
    /// its material and compile the draw command.
    fn build_primitive(
        &mut self,
        primitive: &Primitive,
        node: &mut SceneNode,
    ) -> Result<(), SceneError> {
        let mut flags = FeatureFlags::default();
        let mut channels = BTreeMap::new();

        for (semantic, &accessor) in &primitive.attributes {
            let name = match semantic.as_str() {
                "POSITION" => "a_Position",
                "NORMAL" => {
                    flags.normals = true;
                    "a_Normal"
                }
                "TANGENT" => {
                    flags.tangents = true;
                    "a_Tangent"
                }
                "TEXCOORD_0" => {
                    flags.uv = true;
                    "a_UV"
                }
                _ => continue,
            };
            let decoded = self.decoder.decode(self.doc, self.loader, accessor)?;
            channels.insert(
                name.to_string(),
                AttributeChannel {
                    arity: decoded.element_type.component_count(),
                    buffer: decoded.data,
                },
            );
        }

        let position = channels
            .get("a_Position")
            .ok_or(SceneError::MissingPositions)?;
        let vertex_count = position.buffer.len() / position.arity;

        let indices = match primitive.indices {
            Some(accessor) => self
                .decoder
                .decode(self.doc, self.loader, accessor)?
                .data
                .to_index_vec()
                .ok_or(SceneError::InvalidIndexType)?,
            None => (0..vertex_count as u32).collect(),
        };

        let material = resolve_material(
            self.doc,
            primitive.material,
            self.decoder,
            self.loader,
            self.renderer,
        )?;
        flags = flags.merge(material.flags);

        let (unique, unique_indices) = generate_barycentric(&channels, &indices);
        let attributes: Vec<VertexAttribute> = unique
            .into_iter()
            .map(|(name, channel)| {
                VertexAttribute::new(&name, channel.buffer.to_f32_vec(), channel.arity)
            })
            .collect();

        debug!(
            node = node.id(),
            vertices = unique_indices.len(),
            ?flags,
            "synthesized draw command"
        );

        // the node owns the textures from here on, so a failed compile below
        // still releases them through the caller's error path
        node.push_textures(&material.textures);
        let command = self.renderer.create_draw_command(
            "pbr",
            &flags.to_defines(),
            attributes,
            unique_indices,
            material.uniforms,
            material.cull_face,
        )?;
        node.push_command(command);
        Ok(())
    }

    /// Collect keyframe tracks targeting this node across all animations.
    fn build_tracks(&mut self, node_index: usize) -> Result<Vec<Track>, SceneError> {
        let mut tracks = Vec::new();
        for animation in &self.doc.animations {
            for channel in &animation.channels {
                if channel.target.node != Some(node_index) {
                    continue;
                }
                let sampler = animation
                    .samplers
                    .get(channel.sampler)
                    .ok_or(SceneError::AnimationSamplerOutOfRange(channel.sampler))?;

                let timeline = self
                    .decoder
                    .decode(self.doc, self.loader, sampler.input)?
                    .data
                    .to_f32_vec();
                let floats = self
                    .decoder
                    .decode(self.doc, self.loader, sampler.output)?
                    .data
                    .to_f32_vec();

                let values = match channel.target.path {
                    TargetPath::Translation | TargetPath::Scale => TrackValues::Vec3(
                        floats.chunks_exact(3).map(Vec3::from_slice).collect(),
                    ),
                    TargetPath::Rotation => TrackValues::Quat(
                        floats.chunks_exact(4).map(Quat::from_slice).collect(),
                    ),
                    TargetPath::Weights => {
                        let per_key = floats.len() / timeline.len().max(1);
                        TrackValues::Weights(
                            floats
                                .chunks(per_key.max(1))
                                .map(<[f32]>::to_vec)
                                .collect(),
                        )
                    }
                };
                tracks.push(Track::new(
                    timeline,
                    values,
                    sampler.interpolation,
                    channel.target.path,
                )?);
            }
        }
        Ok(tracks)
    }
}
