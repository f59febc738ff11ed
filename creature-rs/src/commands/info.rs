//! `info` command: summary of a creature document

use anyhow::{Context, Result};
use creature_module::{Creature, CreatureAnimation};
use std::path::Path;

use crate::commands::load_document;
use crate::utils::{add_table_row, create_table, format_vec2};

pub fn execute(path: &Path, detailed: bool) -> Result<()> {
    println!("Loading creature: {}", path.display());

    let packet = load_document(path)?;
    let creature = Creature::new(&packet).context("Failed to build creature")?;
    let composition = creature.render_composition();

    println!("\n=== Creature Information ===");
    println!("Texture:    {}", creature.texture_filename());
    println!("Points:     {}", creature.total_num_pts());
    println!(
        "Indices:    {} ({} triangles)",
        creature.total_num_indices(),
        creature.total_num_indices() / 3
    );
    println!("Regions:    {}", composition.regions().len());
    println!("Bones:      {}", composition.bones().len());
    println!("Animations: {}", creature.animation_names().len());

    let mut table = create_table(vec!["Animation", "Start", "End", "Frames"]);
    for name in creature.animation_names() {
        let animation = CreatureAnimation::new(&packet, name)
            .with_context(|| format!("Failed to build animation '{name}'"))?;
        add_table_row(
            &mut table,
            vec![
                name.clone(),
                animation.start_time().to_string(),
                animation.end_time().to_string(),
                animation.num_frames().to_string(),
            ],
        );
    }
    println!();
    table.printstd();

    if detailed {
        println!("\n=== Regions ===");
        let mut regions = create_table(vec!["Region", "Points", "Indices", "Bones"]);
        for region in composition.regions() {
            let bones: Vec<&str> = region.weights().keys().map(String::as_str).collect();
            add_table_row(
                &mut regions,
                vec![
                    region.name().to_string(),
                    format!("{}..={}", region.start_pt_index(), region.end_pt_index()),
                    format!("{}..={}", region.start_index(), region.end_index()),
                    bones.join(", "),
                ],
            );
        }
        regions.printstd();

        println!("\n=== Bones ===");
        let mut bones = create_table(vec!["Bone", "Id", "Parent", "Rest start", "Rest end"]);
        for bone in composition.bones().values() {
            add_table_row(
                &mut bones,
                vec![
                    bone.name().to_string(),
                    bone.id().to_string(),
                    bone.parent().unwrap_or("-").to_string(),
                    format_vec2(bone.rest().start_pt),
                    format_vec2(bone.rest().end_pt),
                ],
            );
        }
        bones.printstd();
    }

    Ok(())
}
