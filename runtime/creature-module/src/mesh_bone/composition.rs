//! Render composition: how bones drive the creature mesh

use super::bone::{BoneState, BoneTransform2D, MeshBone};
use super::cache::{BoneFrame, DisplacementFrame, UvWarpFrame};
use super::region::MeshRenderRegion;
use glam::Vec3;
use std::collections::BTreeMap;

/// Bones of a composition keyed by name
pub type BoneMap = BTreeMap<String, MeshBone>;

/// Bones plus the regions they skin
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderComposition {
    bones: BoneMap,
    regions: Vec<MeshRenderRegion>,
}

impl RenderComposition {
    /// Build a composition, wiring up child lists from each bone's parent
    pub(crate) fn new(mut bones: BoneMap, regions: Vec<MeshRenderRegion>) -> Self {
        let links: Vec<(String, String)> = bones
            .values()
            .filter_map(|bone| {
                bone.parent()
                    .map(|parent| (parent.to_string(), bone.name().to_string()))
            })
            .collect();

        for (parent, child) in links {
            if let Some(bone) = bones.get_mut(&parent) {
                bone.add_child(child);
            }
        }

        Self { bones, regions }
    }

    pub fn bones(&self) -> &BoneMap {
        &self.bones
    }

    pub fn bones_mut(&mut self) -> &mut BoneMap {
        &mut self.bones
    }

    pub fn bone(&self, name: &str) -> Option<&MeshBone> {
        self.bones.get(name)
    }

    /// Bones without a parent, in name order
    pub fn root_bones(&self) -> impl Iterator<Item = &MeshBone> {
        self.bones.values().filter(|bone| bone.parent().is_none())
    }

    pub fn regions(&self) -> &[MeshRenderRegion] {
        &self.regions
    }

    pub fn region(&self, name: &str) -> Option<&MeshRenderRegion> {
        self.regions.iter().find(|region| region.name() == name)
    }

    /// Current posed segment of every bone
    pub fn bone_states(&self) -> BoneFrame {
        self.bones
            .iter()
            .map(|(name, bone)| (name.clone(), bone.world))
            .collect()
    }

    /// Current UV warp of every region
    pub fn uv_warps(&self) -> UvWarpFrame {
        self.regions
            .iter()
            .map(|region| (region.name().to_string(), *region.uv_warp()))
            .collect()
    }

    /// Pose bones from a sampled bone frame; bones absent from it rest
    pub fn apply_bone_frame(&mut self, frame: &BoneFrame) {
        for (name, bone) in self.bones.iter_mut() {
            match frame.get(name) {
                Some(state) => bone.world = *state,
                None => bone.reset_to_rest(),
            }
        }
    }

    /// Mix the current posed bones towards `other` by `factor`
    ///
    /// Factor 0 keeps `other`, factor 1 keeps the current pose.
    pub fn blend_bones_from(&mut self, other: &BoneFrame, factor: f32) {
        for (name, bone) in self.bones.iter_mut() {
            if let Some(from) = other.get(name) {
                bone.world = BoneState::new(
                    from.start_pt * (1.0 - factor) + bone.world.start_pt * factor,
                    from.end_pt * (1.0 - factor) + bone.world.end_pt * factor,
                );
            }
        }
    }

    /// Store the sampled UV warps on their regions
    pub fn apply_uv_warp_frame(&mut self, frame: &UvWarpFrame) {
        for region in self.regions.iter_mut() {
            region.set_uv_warp(frame.get(region.name()).copied().unwrap_or_default());
        }
    }

    fn transforms(&self) -> BTreeMap<&str, BoneTransform2D> {
        self.bones
            .iter()
            .map(|(name, bone)| (name.as_str(), bone.transform()))
            .collect()
    }

    fn transforms_for(&self, states: &BoneFrame) -> BTreeMap<&str, BoneTransform2D> {
        self.bones
            .iter()
            .map(|(name, bone)| {
                let world = states.get(name).copied().unwrap_or(bone.world);
                (name.as_str(), BoneTransform2D::between(bone.rest(), &world))
            })
            .collect()
    }

    /// Deform the bind pose with the current bones into `target`
    ///
    /// Points outside every region are copied from the bind pose.
    pub fn deform(&self, rest_pts: &[Vec3], displacements: &DisplacementFrame, target: &mut [Vec3]) {
        target.copy_from_slice(rest_pts);

        let transforms = self.transforms();
        for region in &self.regions {
            let offsets = displacements.get(region.name()).map(Vec::as_slice);
            region.deform(&transforms, rest_pts, offsets, target);
        }
    }

    /// Fold bone edits made since `before` into already-posed points
    pub fn apply_override_delta(&self, before: &BoneFrame, rest_pts: &[Vec3], target: &mut [Vec3]) {
        let old = self.transforms_for(before);
        let new = self.transforms();
        for region in &self.regions {
            region.add_pose_delta(&old, &new, rest_pts, target);
        }
    }
}
