use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "retinai")]
#[command(about = "Retinal screening: archive captures, classify, keep a scan history")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the history database and image archive
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Show debug logging
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Archive an image, classify it and record the result
    Scan(ScanArgs),

    /// List recorded scans, newest first
    History(HistoryArgs),

    /// Show a single scan record
    Show(ShowArgs),

    /// Delete a scan record
    Delete(DeleteArgs),

    /// Remove every scan record (archived images are kept)
    Clear,

    /// Write the full history to an export document
    Export(ExportArgs),

    /// Remove archived images no record refers to
    Prune(PruneArgs),

    /// Open maps searching for a nearby specialist
    Specialist(SpecialistArgs),
}

#[derive(Parser)]
pub struct ScanArgs {
    /// Captured or selected image
    pub image: PathBuf,

    /// Output as JSON instead of table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write the result document and share it
    #[arg(long, default_value_t = false)]
    pub share: bool,
}

#[derive(Parser)]
pub struct HistoryArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Record id
    pub id: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct DeleteArgs {
    /// Record id
    pub id: String,

    /// Keep the archived image
    #[arg(long, default_value_t = false)]
    pub keep_image: bool,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Share the document after writing it
    #[arg(long, default_value_t = false)]
    pub share: bool,
}

#[derive(Parser)]
pub struct PruneArgs {
    /// Only list what would be removed
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct SpecialistArgs {
    /// Print the maps URL instead of opening it
    #[arg(long, default_value_t = false)]
    pub print: bool,
}
