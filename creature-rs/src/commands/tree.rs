//! `tree` command: skeleton hierarchy

use anyhow::{Context, Result};
use creature_module::Creature;
use creature_module::mesh_bone::{BoneMap, MeshBone};
use std::path::Path;

use crate::commands::load_document;
use crate::utils::{NodeType, TreeNode, TreeOptions, format_vec2, render_tree};

pub fn execute(path: &Path, max_depth: usize, no_color: bool, show_metadata: bool) -> Result<()> {
    let packet = load_document(path)?;
    let creature = Creature::new(&packet).context("Failed to build creature")?;
    let composition = creature.render_composition();

    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let mut root = TreeNode::new(name, NodeType::Root)
        .with_metadata("texture", creature.texture_filename())
        .with_metadata("points", &creature.total_num_pts().to_string());

    for bone in composition.root_bones() {
        root = root.add_child(bone_node(bone, composition.bones()));
    }
    for region in composition.regions() {
        let bones: Vec<&str> = region.weights().keys().map(String::as_str).collect();
        root = root.add_child(
            TreeNode::new(region.name().to_string(), NodeType::Region)
                .with_metadata("points", &region.num_pts().to_string())
                .with_metadata("bones", &bones.join(", ")),
        );
    }

    let options = TreeOptions {
        max_depth: Some(max_depth),
        no_color,
        show_metadata,
    };
    print!("{}", render_tree(&root, &options));
    Ok(())
}

fn bone_node(bone: &MeshBone, bones: &BoneMap) -> TreeNode {
    let mut node = TreeNode::new(bone.name().to_string(), NodeType::Bone)
        .with_metadata("id", &bone.id().to_string())
        .with_metadata(
            "rest",
            &format!(
                "{} -> {}",
                format_vec2(bone.rest().start_pt),
                format_vec2(bone.rest().end_pt)
            ),
        );

    for child in bone.children() {
        if let Some(child) = bones.get(child) {
            node = node.add_child(bone_node(child, bones));
        }
    }
    node
}
