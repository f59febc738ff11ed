//! `play` command: headless playback

use anyhow::{Context, Result, bail};
use clap::Args;
use creature_module::PlaybackSettings;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::commands::{load_document, load_manager};
use crate::utils::{add_table_row, bounds, create_table, format_vec2};

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Path to the creature document (.json or .zip)
    pub file: PathBuf,

    /// Animation to play
    #[arg(short, long, env = "CREATURE_ANIMATION")]
    pub animation: Option<String>,

    /// Number of updates to run
    #[arg(short = 'n', long, default_value_t = 10, env = "CREATURE_FRAMES")]
    pub frames: usize,

    /// Time passed to each update
    #[arg(short, long, default_value_t = 1.0, env = "CREATURE_DELTA")]
    pub delta: f32,

    /// Multiplier applied to every update's delta
    #[arg(long, env = "CREATURE_TIME_SCALE")]
    pub time_scale: Option<f32>,

    /// Clamp at the end of the clip instead of wrapping
    #[arg(long)]
    pub no_loop: bool,

    /// Negate Y of every render point
    #[arg(long)]
    pub mirror_y: bool,

    /// Build a point cache before playing
    #[arg(long)]
    pub cache: bool,

    /// Playback settings file; flags given here override it
    #[arg(short, long, env = "CREATURE_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Write every frame's render points to this JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PlaybackOutput {
    animation: String,
    frames: Vec<FrameOutput>,
}

#[derive(Debug, Serialize)]
struct FrameOutput {
    frame: usize,
    run_time: f32,
    points: Vec<[f32; 3]>,
}

impl PlayArgs {
    /// Settings file (or defaults) with command-line overrides applied
    fn playback_settings(&self) -> Result<PlaybackSettings> {
        let mut settings = match &self.settings {
            Some(path) => PlaybackSettings::from_path(path).with_context(|| {
                format!("Failed to load playback settings from {}", path.display())
            })?,
            None => PlaybackSettings::default(),
        };

        if let Some(animation) = &self.animation {
            settings.animation = Some(animation.clone());
        }
        if let Some(time_scale) = self.time_scale {
            settings.time_scale = time_scale;
        }
        if self.no_loop {
            settings.should_loop = false;
        }
        if self.mirror_y {
            settings.mirror_y = true;
        }
        Ok(settings)
    }
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let settings = args.playback_settings()?;
    let Some(animation) = settings.animation.clone() else {
        bail!("No animation given; pass --animation or set one in the settings file");
    };

    let packet = load_document(&args.file)?;
    let mut manager = load_manager(&packet)?;
    manager
        .apply_settings(&settings)
        .context("Failed to apply playback settings")?;

    if args.cache {
        manager
            .make_point_cache(&animation)
            .with_context(|| format!("Failed to build point cache for '{animation}'"))?;
    }

    let creature = manager
        .get_creature()
        .context("Manager has no target creature")?;

    println!(
        "Playing '{}' for {} frames (delta {})",
        animation, args.frames, args.delta
    );

    let mut table = create_table(vec!["Frame", "Run time", "Min", "Max"]);
    let mut frames = Vec::with_capacity(args.frames);
    for frame in 1..=args.frames {
        manager
            .update(args.delta)
            .with_context(|| format!("Update failed at frame {frame}"))?;

        let creature = creature.borrow();
        let pts = creature.render_pts();
        let (min, max) = match bounds(pts) {
            Some((min, max)) => (format_vec2(min), format_vec2(max)),
            None => ("-".to_string(), "-".to_string()),
        };
        add_table_row(
            &mut table,
            vec![
                frame.to_string(),
                format!("{:.2}", manager.get_run_time()),
                min,
                max,
            ],
        );

        if args.output.is_some() {
            frames.push(FrameOutput {
                frame,
                run_time: manager.get_run_time(),
                points: pts.iter().map(|p| p.to_array()).collect(),
            });
        }
    }
    table.printstd();

    if let Some(path) = &args.output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        let output = PlaybackOutput { animation, frames };
        serde_json::to_writer_pretty(BufWriter::new(file), &output)
            .with_context(|| format!("Failed to write frames to {}", path.display()))?;
        println!("Wrote {} frames to {}", output.frames.len(), path.display());
    }

    Ok(())
}
