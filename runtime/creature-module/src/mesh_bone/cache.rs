//! Time-indexed keyframe caches
//!
//! Clip keyframes are sparse; the caches resample them once at load time into
//! one entry per integer frame so playback only ever interpolates between two
//! neighbouring frames.

use super::bone::BoneState;
use super::interpolation::sample_keyframes;
use super::region::UvWarp;
use super::types::Lerp;
use glam::Vec2;
use std::collections::BTreeMap;

/// Bone name -> posed segment
pub type BoneFrame = BTreeMap<String, BoneState>;
/// Region name -> per-point rest-space displacement
pub type DisplacementFrame = BTreeMap<String, Vec<Vec2>>;
/// Region name -> texture-coordinate warp
pub type UvWarpFrame = BTreeMap<String, UvWarp>;

/// Dense per-frame cache over `[start_time, end_time]`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeCache<T> {
    start_time: i32,
    end_time: i32,
    frames: Vec<T>,
}

pub type BoneCache = TimeCache<BoneFrame>;
pub type DisplacementCache = TimeCache<DisplacementFrame>;
pub type UvWarpCache = TimeCache<UvWarpFrame>;

impl<T: Lerp + Default> TimeCache<T> {
    /// A cache with no keyframe data; every sample is `T::default()`
    pub fn empty(start_time: i32, end_time: i32) -> Self {
        Self {
            start_time,
            end_time,
            frames: Vec::new(),
        }
    }

    /// Resample sparse `(time, value)` keyframes into one entry per frame
    pub fn from_keyframes(mut keys: Vec<(i32, T)>, start_time: i32, end_time: i32) -> Self {
        if keys.is_empty() {
            return Self::empty(start_time, end_time);
        }

        keys.sort_by_key(|(time, _)| *time);
        let (timestamps, values): (Vec<i32>, Vec<T>) = keys.into_iter().unzip();

        let frames = (start_time..=end_time)
            .map(|frame| sample_keyframes(&timestamps, &values, frame as f32).unwrap_or_default())
            .collect();

        Self {
            start_time,
            end_time,
            frames,
        }
    }

    pub fn start_time(&self) -> i32 {
        self.start_time
    }

    pub fn end_time(&self) -> i32 {
        self.end_time
    }

    /// Number of cached frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&T> {
        self.frames.get(index)
    }

    /// Floor frame index for `time`, clamped into the cached range
    pub fn index_by_time(&self, time: f32) -> usize {
        let clamped = time.clamp(self.start_time as f32, self.end_time as f32);
        let index = (clamped.floor() as i32 - self.start_time).max(0) as usize;
        index.min(self.frames.len().saturating_sub(1))
    }

    /// Value at a possibly fractional time, interpolating neighbouring frames
    pub fn sample(&self, time: f32) -> T {
        if self.frames.is_empty() {
            return T::default();
        }

        let clamped = time.clamp(self.start_time as f32, self.end_time as f32);
        let low = self.index_by_time(clamped.floor());
        let high = self.index_by_time(clamped.ceil());
        let ratio = clamped - clamped.floor();

        if low == high || ratio <= 0.0 {
            return self.frames[low].clone();
        }
        self.frames[low].lerp(&self.frames[high], ratio)
    }
}
