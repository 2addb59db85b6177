use lucent_render::{FramebufferHandle, GpuContext, RenderError, RenderTarget, Renderer};
use tracing::debug;

use crate::pass::{Pass, PassFrame};

/// Ordered pass chain over an exclusively owned read/write framebuffer pair.
pub struct PostProcessPipeline<G: GpuContext> {
    passes: Vec<Box<dyn Pass<G>>>,
    read: FramebufferHandle,
    write: FramebufferHandle,
    width: u32,
    height: u32,
}

impl<G: GpuContext> PostProcessPipeline<G> {
    pub fn new(renderer: &mut Renderer<G>) -> Result<Self, RenderError> {
        let read = renderer.gpu_mut().create_framebuffer(1, 1)?;
        let write = renderer.gpu_mut().create_framebuffer(1, 1)?;
        Ok(Self {
            passes: Vec::new(),
            read,
            write,
            width: 1,
            height: 1,
        })
    }

    /// Where the scene draw should land so the first pass can sample it.
    pub fn scene_target(&self) -> RenderTarget {
        RenderTarget::Framebuffer(self.read)
    }

    /// Resize both targets together on viewport change.
    pub fn resize(
        &mut self,
        renderer: &mut Renderer<G>,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        renderer.gpu_mut().resize_framebuffer(self.read, width, height)?;
        renderer.gpu_mut().resize_framebuffer(self.write, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn add(&mut self, pass: Box<dyn Pass<G>>) {
        debug!(pass = pass.name(), "added post-processing pass");
        self.passes.push(pass);
    }

    pub fn insert(&mut self, pass: Box<dyn Pass<G>>, index: usize) {
        self.passes.insert(index, pass);
    }

    pub fn pass_mut(&mut self, index: usize) -> Option<&mut Box<dyn Pass<G>>> {
        self.passes.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    fn is_last_enabled(&self, index: usize) -> bool {
        !self.passes[index + 1..].iter().any(|pass| pass.is_enabled())
    }

    /// Run the chain. Pass `i` renders to the screen iff no later pass is
    /// enabled; the pair swaps after every pass except the last.
    pub fn render(&mut self, renderer: &mut Renderer<G>) -> Result<(), RenderError> {
        let count = self.passes.len();
        for i in 0..count {
            let to_screen = self.is_last_enabled(i);
            let frame = PassFrame {
                read_texture: renderer.gpu().color_attachment(self.read),
                offscreen: RenderTarget::Framebuffer(self.write),
                viewport: (self.width, self.height),
            };
            let pass = &mut self.passes[i];
            pass.set_render_to_screen(to_screen);
            pass.render(renderer, &frame)?;
            if i != count - 1 {
                std::mem::swap(&mut self.read, &mut self.write);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucent_render::{Capabilities, RecordingGpu};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records what the pipeline told it, draws nothing.
    struct ProbePass {
        name: &'static str,
        enabled: bool,
        log: Rc<RefCell<Vec<(&'static str, bool, u32)>>>,
        to_screen: bool,
    }

    impl ProbePass {
        fn new(
            name: &'static str,
            enabled: bool,
            log: &Rc<RefCell<Vec<(&'static str, bool, u32)>>>,
        ) -> Box<Self> {
            Box::new(Self {
                name,
                enabled,
                log: Rc::clone(log),
                to_screen: false,
            })
        }
    }

    impl Pass<RecordingGpu> for ProbePass {
        fn name(&self) -> &str {
            self.name
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }

        fn set_render_to_screen(&mut self, to_screen: bool) {
            self.to_screen = to_screen;
        }

        fn render(
            &mut self,
            _renderer: &mut Renderer<RecordingGpu>,
            frame: &PassFrame,
        ) -> Result<(), RenderError> {
            self.log
                .borrow_mut()
                .push((self.name, self.to_screen, frame.read_texture.0));
            Ok(())
        }
    }

    fn renderer() -> Renderer<RecordingGpu> {
        Renderer::new(RecordingGpu::new(Capabilities::default()))
    }

    #[test]
    fn screen_marking_skips_disabled_passes() {
        let mut renderer = renderer();
        let mut pipeline = PostProcessPipeline::new(&mut renderer).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        pipeline.add(ProbePass::new("a", true, &log));
        pipeline.add(ProbePass::new("b", false, &log));
        pipeline.add(ProbePass::new("c", true, &log));

        pipeline.render(&mut renderer).unwrap();

        let log = log.borrow();
        let flags: Vec<(&str, bool)> = log.iter().map(|(n, s, _)| (*n, *s)).collect();
        // every pass runs; only the last *enabled* one targets the screen
        assert_eq!(flags, vec![("a", false), ("b", false), ("c", true)]);
    }

    #[test]
    fn buffers_swap_after_every_pass_but_the_last() {
        let mut renderer = renderer();
        let mut pipeline = PostProcessPipeline::new(&mut renderer).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        pipeline.add(ProbePass::new("a", true, &log));
        pipeline.add(ProbePass::new("b", false, &log));
        pipeline.add(ProbePass::new("c", true, &log));

        let initial_read = pipeline.read;
        let initial_write = pipeline.write;
        pipeline.render(&mut renderer).unwrap();

        // two swaps over three passes: read/write are back where they began
        assert_eq!(pipeline.read, initial_read);
        assert_eq!(pipeline.write, initial_write);

        let log = log.borrow();
        // a samples the scene target, b samples what a wrote, c what b wrote
        assert_eq!(log[0].2, renderer.gpu().color_attachment(initial_read).0);
        assert_eq!(log[1].2, renderer.gpu().color_attachment(initial_write).0);
        assert_eq!(log[2].2, renderer.gpu().color_attachment(initial_read).0);
    }

    #[test]
    fn resize_keeps_both_targets_in_step() {
        let mut renderer = renderer();
        let mut pipeline = PostProcessPipeline::new(&mut renderer).unwrap();
        pipeline.resize(&mut renderer, 640, 480).unwrap();
        assert_eq!(
            renderer.gpu().framebuffer_size(pipeline.read),
            Some((640, 480))
        );
        assert_eq!(
            renderer.gpu().framebuffer_size(pipeline.write),
            Some((640, 480))
        );
    }

    #[test]
    fn screen_passes_build_from_builtin_modules() {
        let mut renderer = renderer();
        let mut pipeline = PostProcessPipeline::new(&mut renderer).unwrap();
        pipeline.add(Box::new(crate::ScreenPass::blur_h(&mut renderer).unwrap()));
        pipeline.add(Box::new(crate::ScreenPass::blur_v(&mut renderer).unwrap()));
        pipeline.add(Box::new(crate::ScreenPass::dof(&mut renderer, 0.01, 100.0).unwrap()));
        pipeline.add(Box::new(crate::ScreenPass::copy(&mut renderer).unwrap()));

        pipeline.render(&mut renderer).unwrap();
        let draws = renderer.gpu().draws();
        assert_eq!(draws.len(), 4);
        // only the final pass hits the screen
        for (i, event) in draws.iter().enumerate() {
            let lucent_render::GpuEvent::Draw { target, .. } = event else {
                unreachable!()
            };
            if i == 3 {
                assert_eq!(*target, RenderTarget::Screen);
            } else {
                assert!(matches!(target, RenderTarget::Framebuffer(_)));
            }
        }
    }
}
