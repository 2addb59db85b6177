//! Keyframe track sampling and the shared playback clock.
//!
//! A [`Track`] owns a timeline and a value array and answers `sample(t)` with
//! the interpolated value at the wrapped time. Sampling keeps the previously
//! resolved key so a monotonically advancing clock pays a short forward scan
//! rather than a search from the start; a single rewind to key 0 handles loop
//! restart.
//!
//! # Invariants
//! - The timeline is non-empty and strictly increasing; duration is
//!   `last - first`.
//! - `sample(t)` wraps `t` modulo the duration, never earlier than the first
//!   key.
//! - Rotation tracks interpolate spherically; everything else blends
//!   component-wise.

mod clock;

pub use clock::PlaybackClock;

use glam::{Quat, Vec3};
use lucent_common::{Interpolation, TargetPath};

#[derive(Debug, thiserror::Error)]
pub enum AnimError {
    #[error("track timeline is empty")]
    EmptyTimeline,
    #[error("track timeline is not strictly increasing at key {0}")]
    NonMonotonicTimeline(usize),
    #[error("track has {times} keys but {values} values")]
    KeyValueMismatch { times: usize, values: usize },
    #[error("CUBICSPLINE interpolation is not supported")]
    UnsupportedInterpolation,
}

/// Per-key values of a track, shaped by its target path.
#[derive(Debug, Clone)]
pub enum TrackValues {
    Vec3(Vec<Vec3>),
    Quat(Vec<Quat>),
    Weights(Vec<Vec<f32>>),
}

impl TrackValues {
    fn len(&self) -> usize {
        match self {
            TrackValues::Vec3(v) => v.len(),
            TrackValues::Quat(v) => v.len(),
            TrackValues::Weights(v) => v.len(),
        }
    }
}

/// A single sampled value.
#[derive(Debug, Clone, PartialEq)]
pub enum SampledValue {
    Vec3(Vec3),
    Quat(Quat),
    Weights(Vec<f32>),
}

/// One animation channel's keyframe data plus sampling state.
#[derive(Debug, Clone)]
pub struct Track {
    timeline: Vec<f32>,
    values: TrackValues,
    interpolation: Interpolation,
    path: TargetPath,
    duration: f32,
    prev_key: usize,
    prev_time: f32,
}

impl Track {
    /// Validates the timeline and rejects unsupported interpolation modes up
    /// front, so `sample` never has to fail.
    pub fn new(
        timeline: Vec<f32>,
        values: TrackValues,
        interpolation: Interpolation,
        path: TargetPath,
    ) -> Result<Self, AnimError> {
        if timeline.is_empty() {
            return Err(AnimError::EmptyTimeline);
        }
        if let Some(i) = timeline.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(AnimError::NonMonotonicTimeline(i + 1));
        }
        if values.len() != timeline.len() {
            return Err(AnimError::KeyValueMismatch {
                times: timeline.len(),
                values: values.len(),
            });
        }
        if interpolation == Interpolation::Cubicspline {
            return Err(AnimError::UnsupportedInterpolation);
        }
        let duration = timeline[timeline.len() - 1] - timeline[0];
        Ok(Self {
            timeline,
            values,
            interpolation,
            path,
            duration,
            prev_key: 0,
            prev_time: 0.0,
        })
    }

    pub fn path(&self) -> TargetPath {
        self.path
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Sample the track at time `t` (seconds), wrapping into the track's
    /// span so the animation loops.
    pub fn sample(&mut self, t: f32) -> SampledValue {
        if self.duration <= 0.0 || self.timeline.len() == 1 {
            return self.value_at(0, 0, 0.0);
        }

        let t = (t % self.duration).max(self.timeline[0]);
        if self.prev_time > t {
            self.prev_key = 0;
        }
        self.prev_time = t;

        let last = self.timeline.len() - 1;
        let mut next_key = 1;
        for i in self.prev_key..self.timeline.len() {
            if t <= self.timeline[i] {
                next_key = i.clamp(1, last);
                break;
            }
        }
        self.prev_key = next_key - 1;

        let key_delta = self.timeline[next_key] - self.timeline[self.prev_key];
        let tn = (t - self.timeline[self.prev_key]) / key_delta;
        self.value_at(self.prev_key, next_key, tn)
    }

    fn value_at(&self, prev: usize, next: usize, tn: f32) -> SampledValue {
        match (&self.values, self.interpolation) {
            (TrackValues::Quat(keys), Interpolation::Linear) => SampledValue::Quat(
                keys[prev]
                    .normalize()
                    .slerp(keys[next].normalize(), tn)
                    .normalize(),
            ),
            (TrackValues::Quat(keys), _) => SampledValue::Quat(keys[prev]),
            (TrackValues::Vec3(keys), Interpolation::Linear) => {
                SampledValue::Vec3(keys[prev].lerp(keys[next], tn))
            }
            (TrackValues::Vec3(keys), _) => SampledValue::Vec3(keys[prev]),
            (TrackValues::Weights(keys), Interpolation::Linear) => SampledValue::Weights(
                keys[prev]
                    .iter()
                    .zip(keys[next].iter())
                    .map(|(a, b)| a * (1.0 - tn) + b * tn)
                    .collect(),
            ),
            (TrackValues::Weights(keys), _) => SampledValue::Weights(keys[prev].clone()),
        }
    }
}

pub fn crate_info() -> &'static str {
    "lucent-anim v0.1.0"
}
