//! Root CLI structure for skelanim

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "skelanim")]
#[command(about = "Inspect and sample skeletal animation scenes", long_about = None)]
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
    /// Show the node hierarchy, skinned bones and clips of a scene
    Info(crate::commands::info::InfoArgs),

    /// Play a clip and print the final bone matrices of each frame
    Sample(crate::commands::sample::SampleArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
