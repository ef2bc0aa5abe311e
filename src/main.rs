use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use plangap::cli::{Cli, Commands};
use plangap::commands::{score, summarize};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Score(args) => score::run(&cli, args),
        Commands::Summarize(args) => summarize::run(&cli, args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
