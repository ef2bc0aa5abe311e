//! Per-district overlay scoring and whole-plan orchestration.

mod district;
mod plan;
mod totals;

pub use district::{DistrictScore, score_district};
pub use plan::{
    DistrictTask, SCORE_DISTRICT_TASK, dispatch_plan, run_district_task, score_plan,
};
pub use totals::{FieldTotals, round_to};
