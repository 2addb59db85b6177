//! Multi-pass post-processing over a ping-pong framebuffer pair.
//!
//! The pipeline owns two equally sized color targets. The scene is drawn
//! into the read target; each pass samples the read target and writes to the
//! write target (or the screen), and the pair swaps roles after every pass
//! except the last.
//!
//! # Invariants
//! - A pass renders to the screen iff no later pass is enabled.
//! - Every pass is invoked each frame, disabled or not; enablement only
//!   affects screen-target determination and what the pass itself draws.
//! - Both framebuffers are resized together on viewport change.

mod pass;
mod pipeline;

pub use pass::{Pass, PassFrame, ScreenPass};
pub use pipeline::PostProcessPipeline;

pub fn crate_info() -> &'static str {
    "lucent-post v0.1.0"
}
