//! Shared fixtures: an in-memory tile set in the 10/511/* cells, a
//! simulated timeline for tracker tests, and stores with injectable
//! behavior.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use flate2::{Compression, write::GzEncoder};
use serde_json::{Value, json};

use plangap::config::ScoreConfig;
use plangap::observe::{Clock, TimeBudget};
use plangap::plan::{District, geometry_from_json};
use plangap::store::{MemStore, ObjectStore, StoreError, StoredObject, Visibility};

/// Configuration matching the test tile set: zoom 10, three scored fields.
pub fn test_config() -> ScoreConfig {
    ScoreConfig {
        tile_zoom: 10,
        fields: ["Voters", "Blue Votes", "Red Votes"].map(String::from).to_vec(),
        ..ScoreConfig::default()
    }
}

/// Axis-aligned square as a GeoJSON Polygon geometry.
pub fn square(west: f64, south: f64, east: f64, north: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [west, south], [east, south], [east, north], [west, north], [west, south]
        ]]
    })
}

/// District covering the given square, no spatial reference tag.
pub fn district(west: f64, south: f64, east: f64, north: f64) -> District {
    District {
        geom: geometry_from_json(&square(west, south, east, north)).unwrap(),
        epsg: None,
    }
}

/// GeoJSON feature with a fraction and flat numeric fields.
pub fn feature(geometry: Value, fraction: f64, fields: &[(&str, f64)]) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert("fraction".to_string(), json!(fraction));
    for (name, value) in fields {
        properties.insert((*name).to_string(), json!(value));
    }
    json!({ "type": "Feature", "geometry": geometry, "properties": properties })
}

pub fn feature_collection(features: Vec<Value>) -> Vec<u8> {
    serde_json::to_vec(&json!({ "type": "FeatureCollection", "features": features })).unwrap()
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

pub const PRECINCT_A_VOTES: &[(&str, f64)] =
    &[("Voters", 10.0), ("Blue Votes", 4.0), ("Red Votes", 4.0)];
pub const PRECINCT_B_VOTES: &[(&str, f64)] =
    &[("Voters", 5.0), ("Blue Votes", 2.0), ("Red Votes", 2.0)];

/// Two precincts west of the origin. Precinct A sits entirely in tile
/// 10/511/511; precinct B straddles the equator tile boundary and is
/// stored as two split features carrying the full precinct values with
/// fractions 0.25 (north) and 0.75 (south).
pub fn seed_tiles(store: &MemStore, prefix: &str, compress: bool) {
    let north = feature_collection(vec![
        feature(square(-0.30, 0.05, -0.10, 0.25), 1.0, PRECINCT_A_VOTES),
        feature(square(-0.30, 0.0, -0.10, 0.05), 0.25, PRECINCT_B_VOTES),
    ]);
    let south = feature_collection(vec![
        feature(square(-0.30, -0.10, -0.10, 0.0), 0.75, PRECINCT_B_VOTES),
    ]);

    let encode = |bytes: Vec<u8>| if compress { gzip(&bytes) } else { bytes };
    store.insert(&format!("{prefix}/10/511/511.geojson"), encode(north));
    store.insert(&format!("{prefix}/10/511/512.geojson"), encode(south));
}

/// Simulated timeline: sleeping advances time instantly and the budget is
/// a fixed deadline on the same clock.
pub struct FakeTimeline {
    now_ms: AtomicU64,
    deadline_ms: u64,
}

impl FakeTimeline {
    pub fn with_deadline(deadline: Duration) -> Self {
        Self { now_ms: AtomicU64::new(0), deadline_ms: deadline.as_millis() as u64 }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

impl Clock for FakeTimeline {
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms())
    }

    fn sleep(&self, duration: Duration) {
        self.now_ms.fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }
}

impl TimeBudget for FakeTimeline {
    fn remaining(&self) -> Duration {
        Duration::from_millis(self.deadline_ms.saturating_sub(self.now_ms()))
    }
}

/// Store wrapper whose seeded objects only become visible at scheduled
/// times on the shared timeline.
pub struct AppearingStore<'a> {
    pub inner: MemStore,
    pub timeline: &'a FakeTimeline,
    pub appear_at: HashMap<String, u64>,
}

impl ObjectStore for AppearingStore<'_> {
    fn get(&self, key: &str) -> Result<StoredObject, StoreError> {
        if let Some(at) = self.appear_at.get(key) {
            if self.timeline.now_ms() < *at {
                return Err(StoreError::NotFound(key.to_string()));
            }
        }
        self.inner.get(key)
    }

    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StoreError> {
        self.inner.put(key, bytes, content_type, visibility)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.inner.list(prefix)
    }
}

/// Store where every operation fails with a non-NotFound error.
pub struct FailingStore;

impl ObjectStore for FailingStore {
    fn get(&self, key: &str) -> Result<StoredObject, StoreError> {
        Err(fail(key))
    }

    fn put(&self, key: &str, _: &[u8], _: &str, _: Visibility) -> Result<(), StoreError> {
        Err(fail(key))
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Err(fail(prefix))
    }
}

fn fail(key: &str) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source: std::io::Error::other("injected failure"),
    }
}
