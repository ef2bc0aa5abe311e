use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Plan scoring CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "plangap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a district plan against precomputed tile data
    Score(ScoreArgs),

    /// Recompute the efficiency-gap summary for an already-scored upload
    Summarize(SummarizeArgs),
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Input plan file (.geojson or .shp)
    #[arg(value_hint = ValueHint::FilePath)]
    pub plan: PathBuf,

    /// Store root; tile data is read from here and results land here too
    #[arg(value_hint = ValueHint::DirPath)]
    pub store: PathBuf,

    /// Key prefix of the precomputed tile payloads
    #[arg(long, default_value = "tiles")]
    pub tiles_prefix: String,

    /// EPSG code of the plan geometry, when it is not lon/lat
    #[arg(long)]
    pub epsg: Option<u32>,

    /// Wall-clock budget for the whole job, in seconds
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Store root containing the upload
    #[arg(value_hint = ValueHint::DirPath)]
    pub store: PathBuf,

    /// Upload identifier to summarize
    pub upload: String,
}
