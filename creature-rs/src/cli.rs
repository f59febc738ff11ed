//! Root CLI structure for creature-rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{contact::ContactArgs, play::PlayArgs};

#[derive(Parser)]
#[command(name = "creature-rs")]
#[command(about = "Command-line tools for 2D skeletal mesh creatures", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display information about a creature document
    Info {
        /// Path to the creature document (.json or .zip)
        file: PathBuf,

        /// Show regions and bones as well
        #[arg(short, long)]
        detailed: bool,
    },

    /// Display the skeleton hierarchy as a tree
    Tree {
        /// Path to the creature document (.json or .zip)
        file: PathBuf,

        /// Maximum depth to display
        #[arg(short, long, default_value = "16")]
        depth: usize,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Hide bone ids and rest segments
        #[arg(long)]
        no_metadata: bool,
    },

    /// Play an animation headlessly and report each frame
    Play(PlayArgs),

    /// Find the bone under a point
    Contact(ContactArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
