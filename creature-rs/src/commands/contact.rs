//! `contact` command: hit-test a point against the posed skeleton

use anyhow::{Context, Result};
use clap::Args;
use glam::{Mat4, Vec2};
use std::path::PathBuf;

use crate::commands::{load_document, load_manager};

#[derive(Args, Debug)]
pub struct ContactArgs {
    /// Path to the creature document (.json or .zip)
    pub file: PathBuf,

    /// Animation posing the skeleton
    #[arg(short, long, env = "CREATURE_ANIMATION")]
    pub animation: String,

    /// X coordinate of the point
    #[arg(short, long, allow_hyphen_values = true)]
    pub x: f32,

    /// Y coordinate of the point
    #[arg(short, long, allow_hyphen_values = true)]
    pub y: f32,

    /// Run time to pose the animation at
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub time: f32,

    /// Maximum distance from a bone
    #[arg(short, long, default_value_t = 0.5)]
    pub radius: f32,
}

pub fn execute(args: ContactArgs) -> Result<()> {
    let packet = load_document(&args.file)?;
    let mut manager = load_manager(&packet)?;

    manager
        .set_active_animation_name(&args.animation, false)
        .with_context(|| format!("Unknown animation '{}'", args.animation))?;
    manager.set_run_time(args.time);

    let mut pts = Vec::new();
    manager
        .pose_creature(&args.animation, &mut pts)
        .context("Failed to pose creature")?;

    let point = Vec2::new(args.x, args.y);
    let hit = manager
        .is_contact_bone(point, &Mat4::IDENTITY, args.radius)
        .context("Failed to test contact")?;

    match hit {
        Some(bone) => println!("Contact bone: {bone}"),
        None => println!(
            "No bone within {} of ({}, {})",
            args.radius, args.x, args.y
        ),
    }
    Ok(())
}
