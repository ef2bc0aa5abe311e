use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// (completed, total) progress pair, serialized as a two-element array.
/// The total is fixed when the job starts; completed only increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress(usize, usize);

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        debug_assert!(completed <= total, "progress past total");
        Self(completed, total)
    }

    pub fn completed(&self) -> usize {
        self.0
    }

    pub fn total(&self) -> usize {
        self.1
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= self.1
    }
}

/// Accumulated field totals for one district plus the tiles that
/// contributed data, ordered by the district's index in the source plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistrictTotals {
    pub totals: BTreeMap<String, f64>,
    pub tiles: Vec<String>,
}

impl DistrictTotals {
    pub fn new(totals: BTreeMap<String, f64>, tiles: Vec<String>) -> Self {
        Self { totals, tiles }
    }

    /// Value for a field, zero when absent.
    pub fn get(&self, field: &str) -> f64 {
        self.totals.get(field).copied().unwrap_or(0.0)
    }

    /// Copy with one field replaced.
    pub fn with_value(&self, field: &str, value: f64) -> Self {
        let mut totals = self.totals.clone();
        totals.insert(field.to_string(), value);
        Self { totals, tiles: self.tiles.clone() }
    }
}

/// Efficiency-gap summary: a baseline value per category, plus the full
/// sensitivity curve per category under "Swings". Serializes flat, so the
/// document reads `{"<category>": n, ..., "Swings": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(flatten)]
    pub baseline: BTreeMap<String, Option<f64>>,

    #[serde(rename = "Swings")]
    pub swings: BTreeMap<String, Vec<(f64, Option<f64>)>>,
}

/// The persisted, progressively-updated record of one scoring job.
///
/// Shared instances are never mutated: every update goes through a `with_*`
/// copy constructor and lands in storage as a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub id: String,
    pub description: String,
    pub incumbents: Vec<String>,
    pub districts: Vec<DistrictTotals>,
    pub progress: Option<Progress>,
    pub message: String,
    pub summary: Option<Summary>,
}

impl PlanResult {
    pub fn new(id: String, description: String, incumbents: Vec<String>) -> Self {
        Self {
            id,
            description,
            incumbents,
            districts: Vec::new(),
            progress: None,
            message: String::new(),
            summary: None,
        }
    }

    pub fn with_progress(&self, progress: Progress, message: impl Into<String>) -> Self {
        if let Some(prev) = self.progress {
            debug_assert_eq!(prev.total(), progress.total(), "progress total is fixed at job start");
            debug_assert!(prev.completed() <= progress.completed(), "progress only advances");
        }
        Self {
            progress: Some(progress),
            message: message.into(),
            ..self.clone()
        }
    }

    pub fn with_message(&self, message: impl Into<String>) -> Self {
        Self { message: message.into(), ..self.clone() }
    }

    pub fn with_districts(&self, districts: Vec<DistrictTotals>) -> Self {
        Self { districts, ..self.clone() }
    }

    pub fn with_summary(&self, summary: Summary) -> Self {
        Self { summary: Some(summary), ..self.clone() }
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
