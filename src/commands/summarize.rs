use anyhow::{Context, Result};

use crate::cli::{Cli, SummarizeArgs};
use crate::config::ScoreConfig;
use crate::plan::{self, PlanResult};
use crate::store::{DiskStore, ObjectStore};
use crate::{aggregate, gap, observe};

/// Rebuild the index document for an upload from whatever district results
/// are stored, recomputing the efficiency-gap summary.
pub fn run(cli: &Cli, args: &SummarizeArgs) -> Result<()> {
    let cfg = ScoreConfig::default();
    let store = DiskStore::new(&args.store);

    let object = store
        .get(&plan::index_key(&args.upload))
        .context("reading upload index")?;
    let bytes = object.into_bytes().context("reading upload index")?;
    let upload = PlanResult::from_json(&bytes).context("parsing upload index")?;

    let districts = aggregate::collect_districts(&store, &args.upload, &cfg)?;
    if cli.verbose > 0 {
        eprintln!("[summarize] upload={} districts={}", args.upload, districts.len());
    }

    let output = gap::calculate_gap(&upload.with_districts(districts), &cfg);
    observe::put_index(&store, &output)?;

    println!("{}", plan::index_key(&output.id));
    Ok(())
}
