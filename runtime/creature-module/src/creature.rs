//! The creature character: bind-pose mesh, skeleton and render buffers

use crate::animation::CreatureAnimation;
use crate::error::{CreatureError, Result};
use crate::load::{BoneSection, LoadDataPacket, MeshSection, flat_to_vec2};
use crate::mesh_bone::{
    BoneFrame, BoneMap, BoneState, MeshBone, MeshRenderRegion, RenderComposition,
};
use glam::{Vec2, Vec3};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Colour every vertex starts with
pub const DEFAULT_RENDER_COLOUR: [u8; 4] = [255, 255, 255, 255];

/// A skinned 2D mesh character
///
/// Point and index counts are fixed at construction. Only the render points,
/// render colours and the posed state of the render composition change
/// afterwards.
#[derive(Debug, Clone)]
pub struct Creature {
    texture_filename: String,
    global_indices: Vec<u32>,
    global_pts: Vec<Vec3>,
    global_uvs: Vec<Vec2>,
    render_pts: Vec<Vec3>,
    render_colours: Vec<[u8; 4]>,
    render_composition: RenderComposition,
    animation_names: Vec<String>,
}

impl Creature {
    /// Build a creature from a parsed document
    ///
    /// Animations are not instantiated here; see
    /// [`CreatureManager::create_animation`](crate::CreatureManager::create_animation).
    pub fn new(load_data: &LoadDataPacket) -> Result<Self> {
        let mesh = MeshSection::deserialize(load_data.mesh_node()?)?;
        let bones = load_skeleton(load_data)?;

        let points = flat_to_vec2(&mesh.points, "mesh points")?;
        let uvs = flat_to_vec2(&mesh.uvs, "mesh uvs")?;
        if uvs.len() != points.len() {
            return Err(CreatureError::Load(format!(
                "mesh has {} points but {} uvs",
                points.len(),
                uvs.len()
            )));
        }

        if mesh.indices.len() % 3 != 0 {
            return Err(CreatureError::Load(format!(
                "index count {} is not a multiple of 3",
                mesh.indices.len()
            )));
        }
        if let Some(bad) = mesh.indices.iter().find(|&&i| i as usize >= points.len()) {
            return Err(CreatureError::Load(format!(
                "index {bad} out of range for {} points",
                points.len()
            )));
        }

        let regions = load_regions(&mesh, &bones, points.len())?;
        let global_pts: Vec<Vec3> = points.iter().map(|p| p.extend(0.0)).collect();
        let total_num_pts = global_pts.len();

        log::debug!(
            "Loaded creature: {} points, {} indices, {} regions, {} bones",
            total_num_pts,
            mesh.indices.len(),
            regions.len(),
            bones.len()
        );

        Ok(Self {
            texture_filename: mesh.texture,
            global_indices: mesh.indices,
            render_pts: global_pts.clone(),
            global_pts,
            global_uvs: uvs,
            render_colours: vec![DEFAULT_RENDER_COLOUR; total_num_pts],
            render_composition: RenderComposition::new(bones, regions),
            animation_names: load_data.animation_names(),
        })
    }

    /// Returns the filename of the texture
    pub fn texture_filename(&self) -> &str {
        &self.texture_filename
    }

    /// Fills entire mesh with (r,g,b,a) colours
    pub fn fill_render_colours(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.render_colours.fill([r, g, b, a]);
    }

    pub fn global_indices(&self) -> &[u32] {
        &self.global_indices
    }

    /// Bind-pose points
    pub fn global_pts(&self) -> &[Vec3] {
        &self.global_pts
    }

    /// Bind-pose texture coordinates
    pub fn global_uvs(&self) -> &[Vec2] {
        &self.global_uvs
    }

    /// Texture coordinates with each region's current UV warp applied
    pub fn warped_uvs(&self) -> Vec<Vec2> {
        let mut uvs = self.global_uvs.clone();
        for region in self.render_composition.regions() {
            let warp = region.uv_warp();
            for uv in &mut uvs[region.start_pt_index()..=region.end_pt_index()] {
                *uv = warp.apply(*uv);
            }
        }
        uvs
    }

    pub fn render_pts(&self) -> &[Vec3] {
        &self.render_pts
    }

    pub fn render_pts_mut(&mut self) -> &mut [Vec3] {
        &mut self.render_pts
    }

    pub fn render_colours(&self) -> &[[u8; 4]] {
        &self.render_colours
    }

    pub fn total_num_pts(&self) -> usize {
        self.global_pts.len()
    }

    pub fn total_num_indices(&self) -> usize {
        self.global_indices.len()
    }

    pub fn render_composition(&self) -> &RenderComposition {
        &self.render_composition
    }

    pub fn render_composition_mut(&mut self) -> &mut RenderComposition {
        &mut self.render_composition
    }

    /// Available animation names; these may not have been loaded yet
    pub fn animation_names(&self) -> &[String] {
        &self.animation_names
    }

    /// Pose the composition's bones and UV warps for `animation` at `time`
    pub fn pose_bones(&mut self, animation: &CreatureAnimation, time: f32) {
        let bones = animation.bones_cache().sample(time);
        self.render_composition.apply_bone_frame(&bones);
        let uv_warps = animation.uv_warp_cache().sample(time);
        self.render_composition.apply_uv_warp_frame(&uv_warps);
    }

    /// Skin the bind pose with the current bones and `animation`'s displacements
    ///
    /// `target` must hold exactly [`total_num_pts`](Self::total_num_pts) points.
    pub fn deform(&self, animation: &CreatureAnimation, time: f32, target: &mut [Vec3]) {
        let displacements = animation.displacement_cache().sample(time);
        self.render_composition
            .deform(&self.global_pts, &displacements, target);
    }

    /// Fold bone edits made since `before` into the render points
    pub fn apply_bone_override_delta(&mut self, before: &BoneFrame) {
        let Self {
            global_pts,
            render_pts,
            render_composition,
            ..
        } = self;
        render_composition.apply_override_delta(before, global_pts, render_pts);
    }
}

fn load_skeleton(load_data: &LoadDataPacket) -> Result<BoneMap> {
    let sections = BTreeMap::<String, BoneSection>::deserialize(load_data.skeleton_node()?)?;

    let mut bones = BoneMap::new();
    for (name, section) in &sections {
        if let Some(parent) = &section.parent {
            if parent == name || !sections.contains_key(parent) {
                return Err(CreatureError::Load(format!(
                    "bone '{name}' has invalid parent '{parent}'"
                )));
            }
        }
        let rest = BoneState::new(section.rest_start_pt, section.rest_end_pt);
        bones.insert(
            name.clone(),
            MeshBone::new(name.clone(), section.id, section.parent.clone(), rest),
        );
    }

    Ok(bones)
}

fn load_regions(
    mesh: &MeshSection,
    bones: &BoneMap,
    num_pts: usize,
) -> Result<Vec<MeshRenderRegion>> {
    let num_indices = mesh.indices.len();
    let mut regions = Vec::with_capacity(mesh.regions.len());

    for section in &mesh.regions {
        let name = &section.name;
        if section.start_pt_index > section.end_pt_index || section.end_pt_index >= num_pts {
            return Err(CreatureError::Load(format!(
                "region '{name}' point range {}..={} is invalid for {num_pts} points",
                section.start_pt_index, section.end_pt_index
            )));
        }
        if section.start_index > section.end_index || section.end_index >= num_indices {
            return Err(CreatureError::Load(format!(
                "region '{name}' index range {}..={} is invalid for {num_indices} indices",
                section.start_index, section.end_index
            )));
        }

        let region_pts = section.end_pt_index - section.start_pt_index + 1;
        for (bone_name, weights) in &section.weights {
            if !bones.contains_key(bone_name) {
                return Err(CreatureError::Load(format!(
                    "region '{name}' is weighted to unknown bone '{bone_name}'"
                )));
            }
            if weights.len() != region_pts {
                return Err(CreatureError::Load(format!(
                    "region '{name}' has {} weights for bone '{bone_name}', expected {region_pts}",
                    weights.len()
                )));
            }
        }

        regions.push(MeshRenderRegion::new(
            name.clone(),
            section.start_pt_index,
            section.end_pt_index,
            section.start_index,
            section.end_index,
            section.weights.clone(),
        ));
    }

    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn document() -> Value {
        json!({
            "mesh": {
                "texture": "hero.png",
                "points": [0.0, 0.0, 1.0, 0.0, 1.0, 1.0],
                "uvs": [0.0, 0.0, 1.0, 0.0, 1.0, 1.0],
                "indices": [0, 1, 2],
                "regions": [{
                    "name": "body",
                    "start_pt_index": 0, "end_pt_index": 2,
                    "start_index": 0, "end_index": 2,
                    "weights": { "root": [1.0, 1.0, 1.0] }
                }]
            },
            "skeleton": {
                "root": { "id": 0, "rest_start_pt": [0.0, 0.0], "rest_end_pt": [1.0, 0.0] }
            },
            "animation": { "idle": { "bones": { "0": {} } } }
        })
    }

    fn load(doc: Value) -> Result<Creature> {
        Creature::new(&LoadDataPacket::from_value(doc)?)
    }

    #[test]
    fn test_load_valid() {
        let creature = load(document()).unwrap();
        assert_eq!(creature.texture_filename(), "hero.png");
        assert_eq!(creature.total_num_pts(), 3);
        assert_eq!(creature.total_num_indices(), 3);
        assert_eq!(creature.render_pts(), creature.global_pts());
        assert_eq!(creature.render_colours().len(), 3);
        assert_eq!(creature.animation_names(), ["idle".to_string()]);
        assert_eq!(creature.render_composition().regions().len(), 1);
    }

    #[test]
    fn test_fill_render_colours() {
        let mut creature = load(document()).unwrap();
        creature.fill_render_colours(10, 20, 30, 40);
        assert!(creature.render_colours().iter().all(|c| *c == [10, 20, 30, 40]));
    }

    #[test]
    fn test_uv_count_mismatch() {
        let mut doc = document();
        doc["mesh"]["uvs"] = json!([0.0, 0.0]);
        assert!(matches!(load(doc), Err(CreatureError::Load(_))));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut doc = document();
        doc["mesh"]["indices"] = json!([0, 1, 7]);
        assert!(matches!(load(doc), Err(CreatureError::Load(_))));
    }

    #[test]
    fn test_unknown_parent() {
        let mut doc = document();
        doc["skeleton"]["root"]["parent"] = json!("ghost");
        assert!(matches!(load(doc), Err(CreatureError::Load(_))));
    }

    #[test]
    fn test_missing_skeleton() {
        let mut doc = document();
        if let Some(root) = doc.as_object_mut() {
            root.remove("skeleton");
        }
        assert!(matches!(load(doc), Err(CreatureError::Load(_))));
    }
}
