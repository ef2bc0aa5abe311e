use std::collections::BTreeMap;
use std::fmt::Write as _;

use geo::{Area, BooleanOps, BoundingRect, Buffer, Intersects, MultiPolygon, Validation};
use serde_json::Value;
use tracing::debug;

use crate::config::ScoreConfig;
use crate::error::{Result, ScoreError};
use crate::plan::{self, District};
use crate::proj;
use crate::score::FieldTotals;
use crate::store::{ObjectStore, StoreError};
use crate::tile;

/// One precinct feature from a tile payload: its geometry, the fraction of
/// the precinct's true totals this instance represents, and its numeric
/// fields. Precincts split across tiles appear once per tile, fractions
/// summing to one.
#[derive(Debug, Clone)]
struct PrecinctFeature {
    geom: MultiPolygon<f64>,
    fraction: f64,
    fields: BTreeMap<String, f64>,
}

/// Result of overlaying one district against the tile grid.
#[derive(Debug, Clone)]
pub struct DistrictScore {
    pub totals: FieldTotals,
    /// Tiles where at least one feature intersected, in visit order.
    pub tiles: Vec<String>,
    /// Diagnostic transcript for the job log.
    pub log: String,
}

/// Overlay a district against the precomputed tile grid and accumulate the
/// configured fields, weighting each precinct by overlap area and split
/// fraction.
pub fn score_district(
    store: &dyn ObjectStore,
    district: &District,
    tiles_prefix: &str,
    cfg: &ScoreConfig,
) -> Result<DistrictScore> {
    let mut log = String::new();
    let mut totals = FieldTotals::zeroed(&cfg.fields);
    let mut touched = Vec::new();

    let geom = proj::to_canonical(&district.geom, district.epsg)?;
    let Some(envelope) = geom.bounding_rect() else {
        return Ok(DistrictScore { totals, tiles: touched, log });
    };

    for tile in tile::cover_rect(&envelope, cfg.tile_zoom) {
        if !tile.polygon().intersects(&geom) {
            continue;
        }

        let key = plan::tile_key(tiles_prefix, &tile);
        let object = match store.get(&key) {
            Ok(object) => object,
            // No precomputed data for this cell yet; nothing to add.
            Err(StoreError::NotFound(_)) => continue,
            Err(err) => return Err(err.into()),
        };
        let bytes = object
            .into_bytes()
            .map_err(|err| ScoreError::parse("tile payload", err))?;

        let mut intersected = false;
        for feature in parse_tile_features(&bytes, cfg)? {
            if !feature.geom.intersects(&geom) {
                continue;
            }
            let weight = overlap_weight(&feature, &geom, cfg.buffer_epsilon)?;
            for field in &cfg.fields {
                if let Some(value) = feature.fields.get(field) {
                    totals.add(field, weight * value);
                }
            }
            intersected = true;
        }

        if intersected {
            let _ = writeln!(log, "  {key}");
            touched.push(tile.to_string());
        }
    }

    debug!(tiles = touched.len(), "scored district");
    let _ = writeln!(log, "> {totals:?}");
    Ok(DistrictScore { totals, tiles: touched, log })
}

/// Intersection area over feature area, times the feature's split
/// fraction. An invalid feature geometry gets exactly one repair attempt:
/// inflate it by a tiny buffer, then intersect and measure against the
/// repaired shape.
fn overlap_weight(
    feature: &PrecinctFeature,
    district: &MultiPolygon<f64>,
    epsilon: f64,
) -> Result<f64> {
    let repaired;
    let geom = if feature.geom.is_valid() {
        &feature.geom
    } else {
        repaired = feature.geom.buffer(epsilon);
        &repaired
    };

    let area = geom.unsigned_area();
    if area == 0.0 {
        return Ok(0.0);
    }

    let ratio = geom.intersection(district).unsigned_area() / area;
    if !ratio.is_finite() {
        return Err(ScoreError::Geometry(format!(
            "non-finite overlap ratio against feature of area {area}"
        )));
    }
    Ok(ratio * feature.fraction)
}

/// Parse a tile payload: a GeoJSON FeatureCollection whose features carry
/// flat numeric properties, including the reserved fraction field.
fn parse_tile_features(bytes: &[u8], cfg: &ScoreConfig) -> Result<Vec<PrecinctFeature>> {
    let doc: Value =
        serde_json::from_slice(bytes).map_err(|err| ScoreError::parse("tile payload", err))?;
    let features = doc["features"]
        .as_array()
        .ok_or_else(|| ScoreError::parse("tile payload", "missing features array"))?;

    features
        .iter()
        .map(|feature| {
            let geom = plan::geometry_from_json(&feature["geometry"])?;
            let mut fields = BTreeMap::new();
            if let Some(properties) = feature["properties"].as_object() {
                for (name, value) in properties {
                    if let Some(number) = value.as_f64() {
                        fields.insert(name.clone(), number);
                    }
                }
            }
            let fraction = fields.remove(&cfg.fraction_field).ok_or_else(|| {
                ScoreError::parse(
                    "tile payload",
                    format!("feature missing {:?} field", cfg.fraction_field),
                )
            })?;
            Ok(PrecinctFeature { geom, fraction, fields })
        })
        .collect()
}
