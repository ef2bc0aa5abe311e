//! Storage key layout for one upload. District indexes are encoded in the
//! key so aggregation never depends on discovery or completion order.

use std::sync::OnceLock;

use regex::Regex;

use crate::tile::TileCoord;

pub fn upload_prefix(id: &str) -> String {
    format!("uploads/{id}/")
}

/// The publicly readable job index document.
pub fn index_key(id: &str) -> String {
    format!("uploads/{id}/index.json")
}

/// Prefix under which per-district result objects are written.
pub fn district_prefix(id: &str) -> String {
    format!("uploads/{id}/districts/")
}

/// Result object for one district, addressed by its index in the plan.
pub fn district_key(id: &str, index: usize) -> String {
    format!("uploads/{id}/districts/{index}.json")
}

/// Precomputed tile payload under a data prefix.
pub fn tile_key(prefix: &str, tile: &TileCoord) -> String {
    format!("{prefix}/{tile}.geojson")
}

/// The district index encoded in a result key, if the key has the expected
/// shape.
pub fn district_index(key: &str) -> Option<usize> {
    static INDEX: OnceLock<Regex> = OnceLock::new();
    let re = INDEX.get_or_init(|| Regex::new(r"/districts/(\d+)\.json$").expect("valid pattern"));
    re.captures(key)?.get(1)?.as_str().parse().ok()
}
