use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{Cli, ScoreArgs};
use crate::config::ScoreConfig;
use crate::dispatch::ThreadDispatcher;
use crate::observe::{CompletionTracker, DeadlineBudget, SystemClock, TrackerState};
use crate::plan::{self, PlanResult, Progress};
use crate::store::DiskStore;
use crate::{aggregate, gap, observe, score};

/// Run a scoring job end to end against a local disk store: publish the
/// initial index, dispatch one scoring task per district, track completion
/// under the time budget, then aggregate and summarize.
pub fn run(cli: &Cli, args: &ScoreArgs) -> Result<()> {
    let cfg = ScoreConfig::default();
    let store = DiskStore::new(&args.store);

    let mut parsed = plan::read_plan(&args.plan).context("reading plan")?;
    if let Some(code) = args.epsg {
        for district in &mut parsed.districts {
            district.epsg = Some(code);
        }
    }
    let count = parsed.districts.len();

    let upload = PlanResult::new(
        plan::generate_id(),
        parsed.description.clone(),
        parsed.incumbents.clone(),
    )
    .with_progress(
        Progress::new(0, count),
        "Scoring this newly-uploaded plan.",
    );
    observe::put_index(&store, &upload)?;
    info!(id = %upload.id, districts = count, "created upload");

    let dispatcher = ThreadDispatcher::new(store.clone(), cfg.clone());
    score::dispatch_plan(&dispatcher, &upload.id, &parsed, &args.tiles_prefix)?;

    let clock = SystemClock::new();
    let budget = DeadlineBudget::new(clock, Duration::from_secs(args.timeout));
    let expected: Vec<String> =
        (0..count).map(|index| plan::district_key(&upload.id, index)).collect();
    let tracker = CompletionTracker::new(&store, &clock, &budget, &cfg);
    let (state, tracked) = tracker.watch(upload, &expected)?;

    if state != TrackerState::Completed {
        println!("upload {} gave up before completion: {}", tracked.id, tracked.message);
        return Ok(());
    }

    let districts = aggregate::collect_districts(&store, &tracked.id, &cfg)?;
    let output = gap::calculate_gap(&tracked.with_districts(districts), &cfg);
    observe::put_index(&store, &output)?;

    if cli.verbose > 0 {
        eprintln!("[score] plan={} districts={}", args.plan.display(), count);
    }
    println!("{}", plan::index_key(&output.id));
    Ok(())
}
