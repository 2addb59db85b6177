use glam::{Mat4, Quat, Vec3};
use lucent_anim::{SampledValue, Track};
use lucent_camera::CameraRig;
use lucent_common::TargetPath;
use lucent_render::{DrawCommand, GpuContext, RenderError, RenderTarget, Renderer, TextureHandle};
use tracing::debug;

/// One drawable node: local transform, compiled draw commands for its mesh
/// primitives, owned GPU textures, owned children.
///
/// A node without a mesh still contributes its transform to descendants.
pub struct SceneNode {
    id: usize,
    base_translation: Vec3,
    base_rotation: Quat,
    base_scale: Vec3,
    /// Build-time local transform; immutable unless tracks are present.
    local: Mat4,
    commands: Vec<DrawCommand>,
    textures: Vec<TextureHandle>,
    tracks: Vec<Track>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    pub(crate) fn new(
        id: usize,
        local: Mat4,
        base_translation: Vec3,
        base_rotation: Quat,
        base_scale: Vec3,
    ) -> Self {
        Self {
            id,
            base_translation,
            base_rotation,
            base_scale,
            local,
            commands: Vec::new(),
            textures: Vec::new(),
            tracks: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn local_transform(&self) -> Mat4 {
        self.local
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn is_animated(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Longest track duration on this node alone.
    pub fn max_track_duration(&self) -> f32 {
        self.tracks
            .iter()
            .map(Track::duration)
            .fold(0.0, f32::max)
    }

    pub(crate) fn push_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub(crate) fn push_textures(&mut self, textures: &[TextureHandle]) {
        self.textures.extend_from_slice(textures);
    }

    pub(crate) fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
    }

    pub(crate) fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Local transform at playback time `t`: the build-time matrix for
    /// static nodes, a fresh TRS composition from sampled tracks otherwise.
    fn local_at(&mut self, t: f32) -> Mat4 {
        if self.tracks.is_empty() {
            return self.local;
        }
        let mut translation = self.base_translation;
        let mut rotation = self.base_rotation;
        let mut scale = self.base_scale;
        for track in &mut self.tracks {
            match (track.path(), track.sample(t)) {
                (TargetPath::Translation, SampledValue::Vec3(v)) => translation = v,
                (TargetPath::Rotation, SampledValue::Quat(q)) => rotation = q,
                (TargetPath::Scale, SampledValue::Vec3(v)) => scale = v,
                // morph weights do not affect the transform
                _ => {}
            }
        }
        Mat4::from_scale_rotation_translation(scale, rotation, translation)
    }

    /// Draw this node and its subtree under `parent`, sampling animation
    /// tracks at playback time `t`.
    pub fn draw<G: GpuContext>(
        &mut self,
        renderer: &mut Renderer<G>,
        rig: &CameraRig,
        target: RenderTarget,
        parent: Mat4,
        t: f32,
    ) -> Result<(), RenderError> {
        let world = parent * self.local_at(t);
        for command in &self.commands {
            let overrides = renderer.frame_overrides(rig, world);
            renderer.draw(command, target, &overrides)?;
        }
        for child in &mut self.children {
            child.draw(renderer, rig, target, world, t)?;
        }
        Ok(())
    }

    /// Destroy this subtree's GPU textures and drop its draw commands.
    pub(crate) fn release<G: GpuContext>(&mut self, renderer: &mut Renderer<G>) {
        for texture in self.textures.drain(..) {
            renderer.gpu_mut().destroy_texture(texture);
        }
        if !self.commands.is_empty() {
            debug!(node = self.id, "released node resources");
        }
        self.commands.clear();
        for child in &mut self.children {
            child.release(renderer);
        }
    }
}
