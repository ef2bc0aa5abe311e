//! Whole-plan scoring: the inline path scores every district in order; the
//! dispatched path fans one task out per district and lets results surface
//! through the object store.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::config::ScoreConfig;
use crate::dispatch::TaskDispatcher;
use crate::error::{Result, ScoreError};
use crate::gap;
use crate::plan::{self, District, DistrictTotals, Plan, PlanResult};
use crate::score::score_district;
use crate::store::{ObjectStore, Visibility};

/// Dispatch target for per-district scoring tasks.
pub const SCORE_DISTRICT_TASK: &str = "plangap-score-district";

/// Payload for one independently scheduled district scoring task. Carries
/// everything a worker needs; workers share no state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictTask {
    pub upload_id: String,
    pub index: usize,
    pub geometry: Value,
    pub epsg: Option<u32>,
    pub tiles_prefix: String,
}

/// Score a whole plan inline, district by district, and return the
/// finished result plus a diagnostic transcript.
pub fn score_plan(
    store: &dyn ObjectStore,
    upload: &PlanResult,
    plan: &Plan,
    tiles_prefix: &str,
    cfg: &ScoreConfig,
) -> Result<(PlanResult, String)> {
    let mut districts = Vec::with_capacity(plan.districts.len());
    let mut log = String::new();

    for (index, district) in plan.districts.iter().enumerate() {
        let scored = score_district(store, district, tiles_prefix, cfg)?;
        let _ = writeln!(log, "district {index}:");
        log.push_str(&scored.log);
        districts.push(DistrictTotals::new(scored.totals.into_map(), scored.tiles));
    }

    let _ = writeln!(log, "{} districts scored against {tiles_prefix:?}", districts.len());
    let output = gap::calculate_gap(&upload.with_districts(districts), cfg);
    Ok((output, log))
}

/// Fan one scoring task out per district. Fire-and-forget: completion is
/// observed only through result objects appearing in storage.
pub fn dispatch_plan(
    dispatcher: &dyn TaskDispatcher,
    upload_id: &str,
    plan: &Plan,
    tiles_prefix: &str,
) -> Result<()> {
    for (index, district) in plan.districts.iter().enumerate() {
        let task = DistrictTask {
            upload_id: upload_id.to_string(),
            index,
            geometry: plan::geometry_to_json(&district.geom),
            epsg: district.epsg,
            tiles_prefix: tiles_prefix.to_string(),
        };
        let payload =
            serde_json::to_vec(&task).map_err(|err| ScoreError::parse("district task", err))?;
        dispatcher.invoke(SCORE_DISTRICT_TASK, payload)?;
    }

    info!(districts = plan.districts.len(), "dispatched scoring tasks");
    Ok(())
}

/// Worker entry point: score one district and write its result object.
pub fn run_district_task(
    store: &dyn ObjectStore,
    payload: &[u8],
    cfg: &ScoreConfig,
) -> Result<()> {
    let task: DistrictTask =
        serde_json::from_slice(payload).map_err(|err| ScoreError::parse("district task", err))?;
    let district = District {
        geom: plan::geometry_from_json(&task.geometry)?,
        epsg: task.epsg,
    };

    let scored = score_district(store, &district, &task.tiles_prefix, cfg)?;
    let result = DistrictTotals::new(scored.totals.into_map(), scored.tiles);
    let body =
        serde_json::to_vec(&result).map_err(|err| ScoreError::parse("district result", err))?;
    store.put(
        &plan::district_key(&task.upload_id, task.index),
        &body,
        "text/json",
        Visibility::Private,
    )?;
    Ok(())
}
