use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One efficiency-gap category: a display name plus the two vote fields it
/// compares. "Majority" and "minority" fix the sign convention of both the
/// gap and the swing direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapCategory {
    pub name: String,
    pub majority_field: String,
    pub minority_field: String,
}

impl GapCategory {
    pub fn new(name: &str, majority_field: &str, minority_field: &str) -> Self {
        Self {
            name: name.to_string(),
            majority_field: majority_field.to_string(),
            minority_field: minority_field.to_string(),
        }
    }
}

/// Immutable configuration for one scoring job, passed into every
/// component. Nothing reads these values as ambient globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Numeric fields accumulated during overlay scoring.
    pub fields: Vec<String>,

    /// Reserved per-feature field holding the split fraction.
    pub fraction_field: String,

    /// Zoom level of the precomputed tile grid.
    pub tile_zoom: u8,

    /// Decimal places kept when aggregating district totals.
    pub round_digits: i32,

    /// Buffer distance (degrees) for the single invalid-geometry repair.
    pub buffer_epsilon: f64,

    /// Efficiency-gap categories.
    pub categories: Vec<GapCategory>,

    /// Swing magnitudes; the analyzer evaluates zero plus ± each.
    pub swing_magnitudes: Vec<f64>,

    /// Sleep between polls for a result that has not appeared yet.
    pub poll_backoff: Duration,

    /// Minimum interval between persisted progress snapshots.
    pub update_throttle: Duration,

    /// Give up once the remaining time budget drops below this.
    pub safety_margin: Duration,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            fields: [
                "Voters",
                "Blue Votes",
                "Red Votes",
                "US House Dem Votes",
                "US House Rep Votes",
                "SLDU Dem Votes",
                "SLDU Rep Votes",
                "SLDL Dem Votes",
                "SLDL Rep Votes",
            ]
            .map(String::from)
            .to_vec(),
            fraction_field: "fraction".to_string(),
            tile_zoom: 12,
            round_digits: 6,
            buffer_epsilon: 0.000_000_1,
            categories: vec![
                GapCategory::new("Efficiency Gap", "Red Votes", "Blue Votes"),
                GapCategory::new(
                    "US House Efficiency Gap",
                    "US House Rep Votes",
                    "US House Dem Votes",
                ),
                GapCategory::new("SLDU Efficiency Gap", "SLDU Rep Votes", "SLDU Dem Votes"),
                GapCategory::new("SLDL Efficiency Gap", "SLDL Rep Votes", "SLDL Dem Votes"),
            ],
            swing_magnitudes: vec![0.01, 0.02, 0.03, 0.04, 0.05, 0.07, 0.10],
            poll_backoff: Duration::from_secs(3),
            update_throttle: Duration::from_secs(3),
            safety_margin: Duration::from_secs(5),
        }
    }
}

impl ScoreConfig {
    /// The full swing set: zero plus ± each magnitude, ascending.
    pub fn swing_set(&self) -> Vec<f64> {
        let mut swings = vec![0.0];
        for s in &self.swing_magnitudes {
            swings.push(*s);
            swings.push(-*s);
        }
        swings.sort_by(f64::total_cmp);
        swings
    }
}
