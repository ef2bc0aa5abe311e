//! Aggregation of independently produced per-district results into one
//! ordered list.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::ScoreConfig;
use crate::error::{Result, ScoreError};
use crate::plan::{self, DistrictTotals};
use crate::score::FieldTotals;
use crate::store::{ObjectStore, StoreError};

#[derive(Default)]
struct DistrictAccumulator {
    totals: FieldTotals,
    tiles: Vec<String>,
}

/// Discover and combine per-district result objects for an upload.
///
/// District order comes from the index encoded in each storage key, so the
/// output is correct whatever order the scoring tasks finished in. Objects
/// that vanish between listing and fetch are skipped; the completion
/// tracker decides whether absence is acceptable at any point in time.
/// Every value is rounded as it is added, so totals do not drift however
/// many contributions arrive.
pub fn collect_districts(
    store: &dyn ObjectStore,
    upload_id: &str,
    cfg: &ScoreConfig,
) -> Result<Vec<DistrictTotals>> {
    let prefix = plan::district_prefix(upload_id);
    let mut merged: BTreeMap<usize, DistrictAccumulator> = BTreeMap::new();

    for key in store.list(&prefix)? {
        let Some(index) = plan::district_index(&key) else {
            continue;
        };
        let object = match store.get(&key) {
            Ok(object) => object,
            Err(StoreError::NotFound(_)) => continue,
            Err(err) => return Err(err.into()),
        };
        let bytes = object
            .into_bytes()
            .map_err(|err| ScoreError::parse("district result", err))?;
        let district: DistrictTotals = serde_json::from_slice(&bytes)
            .map_err(|err| ScoreError::parse("district result", err))?;

        let slot = merged.entry(index).or_default();
        for (field, value) in &district.totals {
            slot.totals.add_rounded(field, *value, cfg.round_digits);
        }
        slot.tiles.extend(district.tiles);
    }

    debug!(found = merged.len(), "collected district results");
    Ok(merged
        .into_values()
        .map(|acc| DistrictTotals::new(acc.totals.into_map(), acc.tiles))
        .collect())
}
