//! Plan-level value types, storage keys, identifiers, and plan-file IO.

mod ids;
mod io;
mod keys;
mod result;

pub use ids::{generate_id, generate_signed_id, sign_id, verify_id};
pub use io::{District, Plan, geometry_from_json, geometry_to_json, read_plan, read_plan_geojson};
pub use keys::{district_index, district_key, district_prefix, index_key, tile_key, upload_prefix};
pub use result::{DistrictTotals, PlanResult, Progress, Summary};
