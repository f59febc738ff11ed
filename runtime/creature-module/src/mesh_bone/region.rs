//! Mesh render regions
//!
//! A region is a contiguous run of points and indices inside the creature's
//! global buffers, skinned by a set of weighted bones.

use super::bone::BoneTransform2D;
use super::types::Lerp;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weights below this are ignored when skinning
pub const WEIGHT_THRESHOLD: f32 = 0.001;

/// Texture-coordinate warp of a region at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UvWarp {
    pub enabled: bool,
    pub local_offset: Vec2,
    pub global_offset: Vec2,
    pub scale: Vec2,
}

impl UvWarp {
    /// Apply the warp to a bind-pose texture coordinate
    pub fn apply(&self, uv: Vec2) -> Vec2 {
        if !self.enabled {
            return uv;
        }
        (uv + self.local_offset) * self.scale + self.global_offset
    }
}

impl Default for UvWarp {
    fn default() -> Self {
        Self {
            enabled: false,
            local_offset: Vec2::ZERO,
            global_offset: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }
}

impl Lerp for UvWarp {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            enabled: self.enabled,
            local_offset: self.local_offset.lerp(other.local_offset, t),
            global_offset: self.global_offset.lerp(other.global_offset, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }
}

/// A skinned piece of the creature mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRenderRegion {
    name: String,
    start_pt_index: usize,
    end_pt_index: usize,
    start_index: usize,
    end_index: usize,
    /// Bone name -> one weight per region point
    weights: BTreeMap<String, Vec<f32>>,
    uv_warp: UvWarp,
}

impl MeshRenderRegion {
    pub(crate) fn new(
        name: String,
        start_pt_index: usize,
        end_pt_index: usize,
        start_index: usize,
        end_index: usize,
        weights: BTreeMap<String, Vec<f32>>,
    ) -> Self {
        Self {
            name,
            start_pt_index,
            end_pt_index,
            start_index,
            end_index,
            weights,
            uv_warp: UvWarp::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_pt_index(&self) -> usize {
        self.start_pt_index
    }

    pub fn end_pt_index(&self) -> usize {
        self.end_pt_index
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.end_index
    }

    /// Number of points covered by this region
    pub fn num_pts(&self) -> usize {
        self.end_pt_index - self.start_pt_index + 1
    }

    /// Number of indices covered by this region
    pub fn num_indices(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    pub fn weights(&self) -> &BTreeMap<String, Vec<f32>> {
        &self.weights
    }

    /// UV warp from the most recent pose
    pub fn uv_warp(&self) -> &UvWarp {
        &self.uv_warp
    }

    pub(crate) fn set_uv_warp(&mut self, uv_warp: UvWarp) {
        self.uv_warp = uv_warp;
    }

    /// Skin the region's points into `target`
    ///
    /// `rest_pts` is the full bind-pose buffer, `displacements` the optional
    /// per-point rest-space offsets for this region.
    pub(crate) fn deform(
        &self,
        transforms: &BTreeMap<&str, BoneTransform2D>,
        rest_pts: &[Vec3],
        displacements: Option<&[Vec2]>,
        target: &mut [Vec3],
    ) {
        for local in 0..self.num_pts() {
            let global = self.start_pt_index + local;
            let rest = rest_pts[global];
            let offset = displacements
                .and_then(|d| d.get(local))
                .copied()
                .unwrap_or(Vec2::ZERO);
            let point = rest.truncate() + offset;

            let mut accum = Vec2::ZERO;
            let mut total_weight = 0.0f32;
            for (bone_name, weights) in &self.weights {
                let weight = weights[local];
                if weight < WEIGHT_THRESHOLD {
                    continue;
                }
                let Some(xform) = transforms.get(bone_name.as_str()) else {
                    continue;
                };
                accum += xform.apply(point) * weight;
                total_weight += weight;
            }

            let posed = if total_weight < WEIGHT_THRESHOLD {
                point
            } else {
                accum / total_weight
            };
            target[global] = posed.extend(rest.z);
        }
    }

    /// Add the skinning difference between two bone poses to `target`
    pub(crate) fn add_pose_delta(
        &self,
        before: &BTreeMap<&str, BoneTransform2D>,
        after: &BTreeMap<&str, BoneTransform2D>,
        rest_pts: &[Vec3],
        target: &mut [Vec3],
    ) {
        for local in 0..self.num_pts() {
            let global = self.start_pt_index + local;
            let point = rest_pts[global].truncate();

            let mut delta = Vec2::ZERO;
            let mut total_weight = 0.0f32;
            for (bone_name, weights) in &self.weights {
                let weight = weights[local];
                if weight < WEIGHT_THRESHOLD {
                    continue;
                }
                let (Some(old), Some(new)) =
                    (before.get(bone_name.as_str()), after.get(bone_name.as_str()))
                else {
                    continue;
                };
                delta += (new.apply(point) - old.apply(point)) * weight;
                total_weight += weight;
            }

            if total_weight >= WEIGHT_THRESHOLD {
                target[global] += (delta / total_weight).extend(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_bone::bone::BoneState;

    #[test]
    fn test_uv_warp_disabled_is_identity() {
        let warp = UvWarp {
            enabled: false,
            local_offset: Vec2::ONE,
            global_offset: Vec2::ONE,
            scale: Vec2::splat(2.0),
        };
        assert_eq!(warp.apply(Vec2::new(0.25, 0.5)), Vec2::new(0.25, 0.5));
    }

    #[test]
    fn test_uv_warp_enabled() {
        let warp = UvWarp {
            enabled: true,
            local_offset: Vec2::new(0.5, 0.0),
            global_offset: Vec2::new(0.0, 0.25),
            scale: Vec2::splat(0.5),
        };
        assert_eq!(warp.apply(Vec2::new(0.5, 0.5)), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_deform_blends_weighted_bones() {
        let mut weights = BTreeMap::new();
        weights.insert("a".to_string(), vec![1.0]);
        weights.insert("b".to_string(), vec![1.0]);
        let region = MeshRenderRegion::new("r".to_string(), 0, 0, 0, 2, weights);

        let rest = BoneState::new(Vec2::ZERO, Vec2::X);
        let mut transforms = BTreeMap::new();
        transforms.insert("a", BoneTransform2D::between(&rest, &rest));
        transforms.insert(
            "b",
            BoneTransform2D::between(&rest, &BoneState::new(Vec2::new(0.0, 2.0), Vec2::new(1.0, 2.0))),
        );

        let rest_pts = [Vec3::new(0.5, 0.0, 0.0)];
        let mut target = [Vec3::ZERO];
        region.deform(&transforms, &rest_pts, None, &mut target);

        assert_eq!(target[0], Vec3::new(0.5, 1.0, 0.0));
    }

    #[test]
    fn test_unweighted_points_keep_displaced_rest() {
        let region = MeshRenderRegion::new("r".to_string(), 0, 0, 0, 2, BTreeMap::new());
        let rest_pts = [Vec3::new(1.0, 1.0, 0.0)];
        let mut target = [Vec3::ZERO];
        let disp = [Vec2::new(0.5, -0.5)];

        region.deform(&BTreeMap::new(), &rest_pts, Some(&disp), &mut target);

        assert_eq!(target[0], Vec3::new(1.5, 0.5, 0.0));
    }
}
