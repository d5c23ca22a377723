use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::models::Territory;

#[derive(Parser)]
#[command(name = "resumo-meteo")]
#[command(about = "Daily IPMA station leaderboards rendered onto report images")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options for the default `run` command
    #[command(flatten)]
    pub run: RunArgs,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress spinners")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: resumo-meteo.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the leaderboards and publish one image per territory (default)
    Run(RunArgs),

    /// Print the leaderboards and snapshot coverage without rendering
    Inspect(SnapshotArgs),

    /// Load the configuration and check every territory layout
    CheckConfig,
}

/// Which snapshot to read and which day and territories to report on
#[derive(Args, Clone, Debug, Default)]
pub struct SnapshotArgs {
    #[arg(short, long, help = "Report date, YYYY-MM-DD [default: yesterday]")]
    pub date: Option<NaiveDate>,

    #[arg(
        short,
        long,
        help = "Restrict to a territory (repeatable) [default: all configured]"
    )]
    pub territory: Vec<Territory>,

    #[arg(long, help = "Read the snapshot from a saved page or JSON file")]
    pub snapshot_file: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    #[arg(short, long, help = "Output directory [default: from configuration]")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, help = "Also export the leaderboards as CSV")]
    pub csv: bool,

    #[arg(long, help = "Print draw instructions instead of rendering")]
    pub dry_run: bool,

    #[arg(long, default_value_t = num_cpus::get())]
    pub max_workers: usize,
}
