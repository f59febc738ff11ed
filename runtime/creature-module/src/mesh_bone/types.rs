//! Interpolation trait shared by the keyframe caches

use glam::Vec2;
use std::collections::BTreeMap;

/// Trait for types that can be linearly interpolated
pub trait Lerp: Clone {
    /// Linear interpolation between self and other
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec2::lerp(*self, *other, t)
    }
}

/// Per-vertex displacement lists interpolate element-wise.
///
/// Lists of different lengths cannot be matched up, so `self` wins.
impl Lerp for Vec<Vec2> {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        if self.len() != other.len() {
            return self.clone();
        }
        self.iter()
            .zip(other)
            .map(|(a, b)| Lerp::lerp(a, b, t))
            .collect()
    }
}

/// Named entries interpolate key by key; entries only present on one side are held.
impl<T: Lerp> Lerp for BTreeMap<String, T> {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut out = self.clone();
        for (name, value) in out.iter_mut() {
            if let Some(target) = other.get(name) {
                *value = value.lerp(target, t);
            }
        }
        for (name, value) in other {
            out.entry(name.clone()).or_insert_with(|| value.clone());
        }
        out
    }
}
