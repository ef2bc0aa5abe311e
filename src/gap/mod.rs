//! Efficiency-gap analysis: wasted-vote accounting per category, with a
//! swing sensitivity curve built from uniform vote-share shifts.

mod swing;

pub use swing::apply_swing;

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{GapCategory, ScoreConfig};
use crate::plan::{DistrictTotals, PlanResult, Summary};

/// Wasted-vote tallies for one category across a full plan.
struct WastedVotes {
    majority: f64,
    minority: f64,
    election_votes: f64,
}

/// Tally wasted votes: the winner wastes its surplus beyond half the
/// district's votes, the loser wastes everything it cast. An exact tie
/// contributes no wasted votes (its votes still count toward the
/// election total).
fn tally(districts: &[DistrictTotals], category: &GapCategory) -> WastedVotes {
    let mut tallies = WastedVotes { majority: 0.0, minority: 0.0, election_votes: 0.0 };

    for district in districts {
        let majority = district.get(&category.majority_field);
        let minority = district.get(&category.minority_field);
        let district_votes = majority + minority;
        tallies.election_votes += district_votes;
        let threshold = district_votes / 2.0;

        if majority > minority {
            tallies.majority += majority - threshold; // surplus
            tallies.minority += minority; // losing side
        } else if minority > majority {
            tallies.minority += minority - threshold;
            tallies.majority += majority;
        }
    }

    tallies
}

/// Efficiency gap for one category, or `None` when no votes were cast for
/// the category anywhere in the plan. Undefined is not zero.
pub fn efficiency_gap(districts: &[DistrictTotals], category: &GapCategory) -> Option<f64> {
    let tallies = tally(districts, category);
    (tallies.election_votes > 0.0)
        .then(|| (tallies.majority - tallies.minority) / tallies.election_votes)
}

/// Attach an efficiency-gap summary to a plan result: the baseline per
/// category plus the sensitivity curve across every configured swing.
pub fn calculate_gap(upload: &PlanResult, cfg: &ScoreConfig) -> PlanResult {
    let mut baseline = BTreeMap::new();
    let mut curves: BTreeMap<String, Vec<(f64, Option<f64>)>> = BTreeMap::new();

    // swing_set is ascending, so each curve comes out sorted by swing.
    for swing in cfg.swing_set() {
        let districts = apply_swing(&upload.districts, &cfg.categories, swing);
        for category in &cfg.categories {
            let gap = efficiency_gap(&districts, category);
            if swing == 0.0 {
                baseline.insert(category.name.clone(), gap);
            }
            curves.entry(category.name.clone()).or_default().push((swing, gap));
        }
    }

    debug!(categories = cfg.categories.len(), "computed efficiency-gap summary");
    upload.with_summary(Summary { baseline, swings: curves })
}
