//! A single named animation clip

use crate::error::{CreatureError, Result};
use crate::load::{ClipSection, LoadDataPacket, flat_to_vec2, parse_frame_key};
use crate::mesh_bone::{
    BoneCache, BoneFrame, BoneState, DisplacementCache, DisplacementFrame, TimeCache, UvWarpCache,
    UvWarpFrame,
};
use glam::Vec3;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Most integer frames a clip may span; every keyframe cache holds one
/// entry per frame
pub const MAX_CLIP_FRAMES: usize = 100_000;

/// Point range of a mesh region, used to check displacement keyframes
#[derive(Debug, Deserialize)]
struct RegionExtent {
    name: String,
    start_pt_index: usize,
    end_pt_index: usize,
}

/// Keyframe data and playback range of one clip
///
/// The three keyframe caches hold one entry per integer frame in
/// `[start_time, end_time]`. The optional point cache holds fully deformed
/// points for the same frames, filled by
/// [`CreatureManager::make_point_cache`](crate::CreatureManager::make_point_cache).
#[derive(Debug, Clone)]
pub struct CreatureAnimation {
    name: String,
    start_time: f32,
    end_time: f32,
    bones_cache: BoneCache,
    displacement_cache: DisplacementCache,
    uv_warp_cache: UvWarpCache,
    cache_pts: Vec<Vec<Vec3>>,
}

impl CreatureAnimation {
    /// Build the clip `name` from a parsed document
    pub fn new(load_data: &LoadDataPacket, name: &str) -> Result<Self> {
        let clip = ClipSection::deserialize(load_data.animation_node(name)?)?;

        let mut bone_keys: Vec<(i32, BoneFrame)> = Vec::with_capacity(clip.bones.len());
        for (key, bones) in &clip.bones {
            let frame = bones
                .iter()
                .map(|(bone, state)| (bone.clone(), BoneState::new(state.start_pt, state.end_pt)))
                .collect();
            bone_keys.push((parse_frame_key(key)?, frame));
        }

        let start_time = bone_keys.iter().map(|(time, _)| *time).min();
        let end_time = bone_keys.iter().map(|(time, _)| *time).max();
        let (Some(start_time), Some(end_time)) = (start_time, end_time) else {
            return Err(CreatureError::Load(format!(
                "animation '{name}' has no bone keyframes"
            )));
        };
        let span = i64::from(end_time) - i64::from(start_time) + 1;
        if span > MAX_CLIP_FRAMES as i64 {
            return Err(CreatureError::Load(format!(
                "animation '{name}' spans {span} frames ({start_time}..={end_time}), at most {MAX_CLIP_FRAMES} are supported"
            )));
        }

        let region_pts = region_point_counts(load_data)?;
        let mut displacement_keys: Vec<(i32, DisplacementFrame)> = Vec::new();
        for (key, regions) in &clip.meshes {
            let mut frame = DisplacementFrame::new();
            for (region, section) in regions {
                let Some(&expected) = region_pts.get(region) else {
                    return Err(CreatureError::Load(format!(
                        "animation '{name}' displaces unknown region '{region}'"
                    )));
                };
                let offsets = flat_to_vec2(&section.displacements, "displacements")?;
                if offsets.len() != expected {
                    return Err(CreatureError::Load(format!(
                        "animation '{name}' has {} displacements for region '{region}', expected {expected}",
                        offsets.len()
                    )));
                }
                frame.insert(region.clone(), offsets);
            }
            displacement_keys.push((parse_frame_key(key)?, frame));
        }

        let mut uv_warp_keys: Vec<(i32, UvWarpFrame)> = Vec::new();
        for (key, regions) in &clip.uv_swap {
            uv_warp_keys.push((parse_frame_key(key)?, regions.clone()));
        }

        log::debug!(
            "Loaded animation '{}': frames {}..={}, {} bone keys, {} mesh keys, {} uv keys",
            name,
            start_time,
            end_time,
            bone_keys.len(),
            displacement_keys.len(),
            uv_warp_keys.len()
        );

        Ok(Self {
            name: name.to_string(),
            start_time: start_time as f32,
            end_time: end_time as f32,
            bones_cache: TimeCache::from_keyframes(bone_keys, start_time, end_time),
            displacement_cache: TimeCache::from_keyframes(displacement_keys, start_time, end_time),
            uv_warp_cache: TimeCache::from_keyframes(uv_warp_keys, start_time, end_time),
            cache_pts: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the start time of the animation
    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    /// Return the end time of the animation
    pub fn end_time(&self) -> f32 {
        self.end_time
    }

    /// Number of integer frames in `[start_time, end_time]`
    pub fn num_frames(&self) -> usize {
        (self.end_time - self.start_time) as usize + 1
    }

    pub fn bones_cache(&self) -> &BoneCache {
        &self.bones_cache
    }

    pub fn displacement_cache(&self) -> &DisplacementCache {
        &self.displacement_cache
    }

    pub fn uv_warp_cache(&self) -> &UvWarpCache {
        &self.uv_warp_cache
    }

    pub fn has_cache_pts(&self) -> bool {
        !self.cache_pts.is_empty()
    }

    pub fn cache_pts(&self) -> &[Vec<Vec3>] {
        &self.cache_pts
    }

    pub(crate) fn set_cache_pts(&mut self, cache_pts: Vec<Vec<Vec3>>) {
        self.cache_pts = cache_pts;
    }

    /// Drop the point cache so poses are skinned again
    pub fn clear_cache_pts(&mut self) {
        self.cache_pts.clear();
    }

    /// Floor frame index for `time`, clamped into `[start_time, end_time]`
    pub fn get_index_by_time(&self, time: f32) -> usize {
        let clamped = time.clamp(self.start_time, self.end_time);
        let index = (clamped.floor() - self.start_time).max(0.0) as usize;
        index.min(self.num_frames() - 1)
    }

    /// Write cached points for `time` into `target`
    ///
    /// Fractional times interpolate between the neighbouring cached frames.
    /// Returns `false` and leaves `target` alone when there is no point cache
    /// or its frames do not hold exactly `num_pts` points.
    pub fn pose_from_cache_pts(&self, time: f32, target: &mut [Vec3], num_pts: usize) -> bool {
        if !self.has_cache_pts() {
            log::warn!("Animation '{}' has no point cache to pose from", self.name);
            return false;
        }
        let cached_pts = self.cache_pts[0].len();
        if cached_pts != num_pts || target.len() < num_pts {
            log::warn!(
                "Point cache of '{}' holds {} points per frame, creature has {}",
                self.name,
                cached_pts,
                num_pts
            );
            return false;
        }

        let clamped = time.clamp(self.start_time, self.end_time);
        let last = self.cache_pts.len() - 1;
        let low = self.get_index_by_time(clamped.floor()).min(last);
        let high = self.get_index_by_time(clamped.ceil()).min(last);
        let ratio = clamped - clamped.floor();

        let low_pts = &self.cache_pts[low];
        let high_pts = &self.cache_pts[high];

        if low == high || ratio <= 0.0 {
            target[..num_pts].copy_from_slice(low_pts);
            return true;
        }

        for ((out, a), b) in target[..num_pts].iter_mut().zip(low_pts).zip(high_pts) {
            *out = *a * (1.0 - ratio) + *b * ratio;
        }
        true
    }
}

fn region_point_counts(load_data: &LoadDataPacket) -> Result<BTreeMap<String, usize>> {
    let regions = match load_data.mesh_node()?.get("regions") {
        Some(node) => Vec::<RegionExtent>::deserialize(node)?,
        None => Vec::new(),
    };
    Ok(regions
        .into_iter()
        .map(|r| {
            let count = r.end_pt_index.saturating_sub(r.start_pt_index) + 1;
            (r.name, count)
        })
        .collect())
}
