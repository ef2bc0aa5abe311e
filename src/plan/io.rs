//! Reading submitted district plans. GeoJSON FeatureCollections and ESRI
//! shapefiles are accepted; anything unreadable is a parse failure that
//! aborts the job before any partial results are written.

use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Value, json};

use crate::error::{Result, ScoreError};

/// One district geometry as read from a submitted plan.
#[derive(Debug, Clone)]
pub struct District {
    pub geom: MultiPolygon<f64>,
    /// EPSG code of the source reference, if it carries one. Anything
    /// non-canonical is reprojected before overlay math.
    pub epsg: Option<u32>,
}

/// A parsed district plan: one geometry per seat, with incumbency labels.
#[derive(Debug, Clone)]
pub struct Plan {
    pub description: String,
    pub districts: Vec<District>,
    pub incumbents: Vec<String>,
}

/// Incumbency label used when a plan feature does not carry one.
const OPEN_SEAT: &str = "O";

/// Read a plan from disk, dispatching on the file extension.
pub fn read_plan(path: &Path) -> Result<Plan> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "geojson" | "json" => {
            let bytes =
                std::fs::read(path).map_err(|err| ScoreError::parse("plan file", err))?;
            read_plan_geojson(&bytes)
        }
        "shp" => read_plan_shapefile(path),
        other => Err(ScoreError::parse(
            "plan file",
            format!("unsupported plan format {other:?}"),
        )),
    }
}

/// Parse a GeoJSON FeatureCollection plan.
pub fn read_plan_geojson(bytes: &[u8]) -> Result<Plan> {
    let doc: Value =
        serde_json::from_slice(bytes).map_err(|err| ScoreError::parse("plan GeoJSON", err))?;
    let features = doc["features"]
        .as_array()
        .ok_or_else(|| ScoreError::parse("plan GeoJSON", "missing features array"))?;

    let mut districts = Vec::with_capacity(features.len());
    let mut incumbents = Vec::with_capacity(features.len());
    for feature in features {
        districts.push(District {
            geom: geometry_from_json(&feature["geometry"])?,
            epsg: None,
        });
        incumbents.push(
            feature["properties"]["Incumbent"]
                .as_str()
                .unwrap_or(OPEN_SEAT)
                .to_string(),
        );
    }

    let description = doc["description"].as_str().unwrap_or("district plan").to_string();
    Ok(Plan { description, districts, incumbents })
}

fn read_plan_shapefile(path: &Path) -> Result<Plan> {
    let mut reader = shapefile::Reader::from_path(path)
        .map_err(|err| ScoreError::parse("plan shapefile", err))?;

    let mut districts = Vec::new();
    let mut incumbents = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.map_err(|err| ScoreError::parse("plan shapefile", err))?;
        let polygon = match shape {
            shapefile::Shape::Polygon(polygon) => polygon,
            shapefile::Shape::NullShape => continue,
            other => {
                return Err(ScoreError::parse(
                    "plan shapefile",
                    format!("unsupported shape type {}", other.shapetype()),
                ));
            }
        };

        districts.push(District { geom: shp_to_multipolygon(&polygon), epsg: None });
        incumbents.push(match record.get("Incumbent") {
            Some(shapefile::dbase::FieldValue::Character(Some(label))) => label.clone(),
            _ => OPEN_SEAT.to_string(),
        });
    }

    let description = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("district plan")
        .to_string();
    Ok(Plan { description, districts, incumbents })
}

/// Shapefile rings arrive exterior-first (clockwise) with holes following;
/// regroup them into polygons by orientation.
fn shp_to_multipolygon(shape: &shapefile::Polygon) -> MultiPolygon<f64> {
    fn signed_area(coords: &[Coord<f64>]) -> f64 {
        coords
            .windows(2)
            .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
            .sum::<f64>()
            / 2.0
    }

    let mut polygons = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes: Vec<LineString<f64>> = Vec::new();

    for ring in shape.rings() {
        let mut coords: Vec<Coord<f64>> =
            ring.points().iter().map(|p| Coord { x: p.x, y: p.y }).collect();
        close_ring(&mut coords);
        let is_exterior = signed_area(&coords) < 0.0;
        let ring = LineString(coords);

        if is_exterior {
            if let Some(ext) = exterior.take() {
                polygons.push(Polygon::new(ext, std::mem::take(&mut holes)));
            }
            exterior = Some(ring);
        } else {
            holes.push(ring);
        }
    }
    if let Some(ext) = exterior {
        polygons.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polygons)
}

/// Parse a GeoJSON geometry object (Polygon or MultiPolygon).
pub fn geometry_from_json(value: &Value) -> Result<MultiPolygon<f64>> {
    let kind = value["type"].as_str().unwrap_or_default();
    let coords = &value["coordinates"];
    match kind {
        "Polygon" => Ok(MultiPolygon(vec![parse_polygon(coords)?])),
        "MultiPolygon" => {
            let polygons = coords
                .as_array()
                .ok_or_else(|| malformed("MultiPolygon coordinates"))?;
            Ok(MultiPolygon(
                polygons.iter().map(parse_polygon).collect::<Result<_>>()?,
            ))
        }
        other => Err(ScoreError::parse(
            "geometry",
            format!("unsupported geometry type {other:?}"),
        )),
    }
}

/// Serialize a MultiPolygon as a GeoJSON geometry object.
pub fn geometry_to_json(geom: &MultiPolygon<f64>) -> Value {
    let coordinates: Vec<Value> = geom
        .0
        .iter()
        .map(|polygon| {
            let mut rings = vec![ring_coords(polygon.exterior())];
            rings.extend(polygon.interiors().iter().map(ring_coords));
            json!(rings)
        })
        .collect();
    json!({ "type": "MultiPolygon", "coordinates": coordinates })
}

fn ring_coords(ring: &LineString<f64>) -> Value {
    json!(ring.coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>())
}

fn parse_polygon(value: &Value) -> Result<Polygon<f64>> {
    let rings = value.as_array().ok_or_else(|| malformed("polygon rings"))?;
    let mut rings = rings.iter().map(parse_ring);
    let exterior = rings.next().ok_or_else(|| malformed("polygon without exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_ring(value: &Value) -> Result<LineString<f64>> {
    let pairs = value.as_array().ok_or_else(|| malformed("ring coordinates"))?;
    let mut coords = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let xy = pair.as_array().ok_or_else(|| malformed("coordinate pair"))?;
        let (Some(x), Some(y)) = (
            xy.first().and_then(Value::as_f64),
            xy.get(1).and_then(Value::as_f64),
        ) else {
            return Err(malformed("coordinate pair"));
        };
        coords.push(Coord { x, y });
    }
    close_ring(&mut coords);
    Ok(LineString(coords))
}

fn close_ring(coords: &mut Vec<Coord<f64>>) {
    if !coords.is_empty() && coords.first() != coords.last() {
        coords.push(coords[0]);
    }
}

fn malformed(what: &str) -> ScoreError {
    ScoreError::parse("geometry", format!("malformed {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_two_district_plan() {
        let bytes = serde_json::to_vec(&json!({
            "type": "FeatureCollection",
            "description": "test plan",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                    },
                    "properties": {"Incumbent": "D"}
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [[[[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 0.0]]]]
                    },
                    "properties": {}
                }
            ]
        }))
        .unwrap();

        let plan = read_plan_geojson(&bytes).unwrap();
        assert_eq!(plan.description, "test plan");
        assert_eq!(plan.districts.len(), 2);
        assert_eq!(plan.incumbents, vec!["D", "O"]);
        assert_eq!(plan.districts[0].geom.0.len(), 1);
    }

    #[test]
    fn open_rings_are_closed() {
        let geom = geometry_from_json(&json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]]
        }))
        .unwrap();

        let ring = geom.0[0].exterior();
        assert_eq!(ring.0.first(), ring.0.last());
    }

    #[test]
    fn geometry_round_trips_through_json() {
        let value = json!({
            "type": "MultiPolygon",
            "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]
        });
        let geom = geometry_from_json(&value).unwrap();
        assert_eq!(geometry_to_json(&geom), value);
    }

    #[test]
    fn junk_bytes_are_a_parse_failure() {
        assert!(matches!(
            read_plan_geojson(b"not geojson"),
            Err(ScoreError::Parse { .. })
        ));
    }

    #[test]
    fn point_geometry_is_a_parse_failure() {
        assert!(matches!(
            geometry_from_json(&json!({"type": "Point", "coordinates": [0.0, 0.0]})),
            Err(ScoreError::Parse { .. })
        ));
    }
}
