//! Playback clock shared by every animated node.

use std::time::Instant;

/// Wall-clock driven playback time with pause/resume, scrubbing, and an
/// optional fixed time for deterministic frames.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    start: Instant,
    paused: bool,
    paused_secs: f32,
    fixed_secs: Option<f32>,
    duration: f32,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            paused: true,
            paused_secs: 0.0,
            fixed_secs: None,
            duration: 1.0,
        }
    }
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current playback time in seconds. While paused this is frozen at the
    /// pause point; a fixed time overrides the wall clock entirely.
    pub fn elapsed_secs(&self) -> f32 {
        if self.paused {
            return self.paused_secs;
        }
        self.fixed_secs
            .unwrap_or_else(|| self.start.elapsed().as_secs_f32())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle(&mut self) {
        if self.paused {
            self.unpause();
        } else {
            self.pause();
        }
    }

    pub fn start(&mut self) {
        self.start = Instant::now();
        self.paused = false;
    }

    /// Freeze at the current playback time.
    pub fn pause(&mut self) {
        self.paused_secs = self.elapsed_secs();
        self.paused = true;
    }

    /// Freeze at a normalized position within `[0, 1]` of the duration.
    pub fn scrub(&mut self, normalized: f32) {
        self.paused_secs = normalized * self.duration;
        self.paused = true;
    }

    /// Resume, keeping the playback position continuous across the pause.
    pub fn unpause(&mut self) {
        self.start = Instant::now() - std::time::Duration::from_secs_f32(self.paused_secs.max(0.0));
        self.paused = false;
    }

    pub fn reset(&mut self) {
        self.start = Instant::now();
        self.paused_secs = 0.0;
    }

    /// Pin playback to a fixed time; useful for reproducible frame captures.
    pub fn set_fixed_time(&mut self, secs: f32) {
        self.fixed_secs = Some(secs);
        self.paused = false;
    }

    pub fn clear_fixed_time(&mut self) {
        self.fixed_secs = None;
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Set the loop duration used by [`Self::scrub`].
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(f32::EPSILON);
    }
}
