use std::path::PathBuf;

use clap::{Parser, Subcommand};
use glam::Vec3;
use lucent_camera::CameraRig;
use lucent_common::RenderLayer;
use lucent_document::{AttributeDecoder, BufferLoader, Document, DocumentError};
use lucent_post::{PostProcessPipeline, ScreenPass};
use lucent_render::{Capabilities, GpuEvent, RecordingGpu, RenderTarget, Renderer};
use lucent_scene::{SceneGraph, SceneNode};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lucent-cli", about = "Headless glTF scene inspector")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build the scene graph from a .gltf file and print its structure
    Inspect {
        /// Path to a .gltf document
        asset: PathBuf,
    },
    /// Render one headless frame and trace the resulting GPU calls
    Frame {
        /// Path to a .gltf document
        asset: PathBuf,
        /// Visualization layer: final, normal, albedo, metallic, roughness,
        /// wireframe, layers
        #[arg(short, long, default_value = "final")]
        layer: String,
        /// Playback time in seconds
        #[arg(short, long, default_value = "0")]
        time: f32,
        /// Viewport size as WIDTHxHEIGHT
        #[arg(long, default_value = "1280x720")]
        size: String,
        /// Chain blur/depth-of-field/copy post-processing passes
        #[arg(long)]
        post: bool,
    },
}

/// Resolves buffer and image locators relative to the document's directory.
struct FileBufferLoader {
    base: PathBuf,
}

impl BufferLoader for FileBufferLoader {
    fn load(&mut self, uri: &str) -> Result<Vec<u8>, DocumentError> {
        std::fs::read(self.base.join(uri))
            .map_err(|err| DocumentError::Load(format!("{uri}: {err}")))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("lucent-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", lucent_common::crate_info());
            println!("document: {}", lucent_document::crate_info());
            println!("shader: {}", lucent_shader::crate_info());
            println!("camera: {}", lucent_camera::crate_info());
            println!("anim: {}", lucent_anim::crate_info());
            println!("render: {}", lucent_render::crate_info());
            println!("scene: {}", lucent_scene::crate_info());
            println!("post: {}", lucent_post::crate_info());
        }
        Commands::Inspect { asset } => {
            let (doc, mut loader) = open_document(&asset)?;
            let mut decoder = AttributeDecoder::new(None);
            let mut renderer = Renderer::new(RecordingGpu::new(caps()));
            let mut graph = SceneGraph::new();
            graph.rebuild(&doc, &mut decoder, &mut loader, &mut renderer)?;

            println!("scene graph ({} roots)", graph.roots().len());
            for node in graph.roots() {
                print_node(node, 1);
            }
            let duration = graph.animation_duration();
            if duration > 0.0 {
                println!("animation duration: {duration:.3}s");
            }
        }
        Commands::Frame {
            asset,
            layer,
            time,
            size,
            post,
        } => {
            let layer = RenderLayer::parse(&layer)
                .ok_or_else(|| anyhow::anyhow!("unknown layer: {layer}"))?;
            let (width, height) = parse_size(&size)?;

            let (doc, mut loader) = open_document(&asset)?;
            let mut decoder = AttributeDecoder::new(None);
            let mut renderer = Renderer::new(RecordingGpu::new(caps()));
            renderer.style.set_layer(layer);

            let mut graph = SceneGraph::new();
            graph.rebuild(&doc, &mut decoder, &mut loader, &mut renderer)?;

            let rig = CameraRig::new(
                Vec3::new(0.0, 2.0, 2.0),
                Vec3::ZERO,
                45.0_f32.to_radians(),
                width as f32 / height as f32,
                0.01,
                100.0,
            );

            if post {
                let mut pipeline = PostProcessPipeline::new(&mut renderer)?;
                pipeline.resize(&mut renderer, width, height)?;
                pipeline.add(Box::new(ScreenPass::blur_h(&mut renderer)?));
                pipeline.add(Box::new(ScreenPass::blur_v(&mut renderer)?));
                pipeline.add(Box::new(ScreenPass::dof(&mut renderer, rig.znear, rig.zfar)?));
                pipeline.add(Box::new(ScreenPass::copy(&mut renderer)?));

                let target = pipeline.scene_target();
                graph.draw(&mut renderer, &rig, target, time)?;
                pipeline.render(&mut renderer)?;
            } else {
                graph.draw(&mut renderer, &rig, RenderTarget::Screen, time)?;
            }

            print_trace(renderer.gpu());
        }
    }

    Ok(())
}

fn caps() -> Capabilities {
    Capabilities {
        srgb_textures: true,
        texture_lod: true,
        derivatives: true,
    }
}

fn open_document(asset: &PathBuf) -> anyhow::Result<(Document, FileBufferLoader)> {
    let json = std::fs::read_to_string(asset)?;
    let doc = Document::from_json(&json)?;
    info!(asset = %asset.display(), nodes = doc.nodes.len(), "loaded document");
    let base = asset
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((doc, FileBufferLoader { base }))
}

fn parse_size(size: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = size
        .split_once('x')
        .ok_or_else(|| anyhow::anyhow!("size must be WIDTHxHEIGHT, got {size}"))?;
    Ok((w.parse()?, h.parse()?))
}

fn print_node(node: &SceneNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let animated = if node.is_animated() { " [animated]" } else { "" };
    println!(
        "{indent}node {} ({} draw commands){animated}",
        node.id(),
        node.commands().len()
    );
    for command in node.commands() {
        println!(
            "{indent}  {} vertices, {} uniforms, cull={}",
            command.indices.len(),
            command.uniforms.len(),
            command.cull_face
        );
    }
    for child in node.children() {
        print_node(child, depth + 1);
    }
}

fn print_trace(gpu: &RecordingGpu) {
    let mut compiles = 0usize;
    let mut textures = 0usize;
    let mut draws = 0usize;
    for event in &gpu.events {
        match event {
            GpuEvent::CompileProgram(_) => compiles += 1,
            GpuEvent::CreateTexture(_) => textures += 1,
            GpuEvent::Draw { target, vertex_count, .. } => {
                draws += 1;
                let target = match target {
                    RenderTarget::Screen => "screen".to_string(),
                    RenderTarget::Framebuffer(fb) => format!("fbo {}", fb.0),
                };
                println!("draw #{draws}: {vertex_count} vertices -> {target}");
            }
            _ => {}
        }
    }
    println!("{compiles} programs, {textures} textures, {draws} draws");
}
