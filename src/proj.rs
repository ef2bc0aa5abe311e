//! Reprojection of plan geometry to the canonical spatial reference. All
//! overlay math happens in EPSG:4326 lon/lat degrees.

use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::Proj;
use proj4rs::transform::transform;

use crate::error::{Result, ScoreError};

/// Canonical spatial reference for overlay math.
pub const CANONICAL_EPSG: u32 = 4326;

/// Proj definitions for the references district plans arrive in.
/// The bool marks geographic (degree-based) references.
fn definition(epsg: u32) -> Option<(&'static str, bool)> {
    match epsg {
        4326 => Some(("+proj=longlat +datum=WGS84 +no_defs", true)),
        4269 => Some(("+proj=longlat +datum=NAD83 +no_defs", true)),
        3857 => Some((
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs",
            false,
        )),
        5070 => Some((
            "+proj=aea +lat_0=23 +lon_0=-96 +lat_1=29.5 +lat_2=45.5 +x_0=0 +y_0=0 +datum=NAD83 +units=m +no_defs",
            false,
        )),
        2163 => Some((
            "+proj=laea +lat_0=45 +lon_0=-100 +x_0=0 +y_0=0 +a=6370997 +b=6370997 +units=m +no_defs",
            false,
        )),
        _ => None,
    }
}

/// Reproject a geometry tagged with `epsg` to the canonical reference.
/// Geometries with no reference are taken to be canonical already.
pub fn to_canonical(geom: &MultiPolygon<f64>, epsg: Option<u32>) -> Result<MultiPolygon<f64>> {
    let Some(code) = epsg else {
        return Ok(geom.clone());
    };
    if code == CANONICAL_EPSG {
        return Ok(geom.clone());
    }

    let (src_def, src_geographic) = definition(code)
        .ok_or_else(|| ScoreError::Geometry(format!("unsupported spatial reference EPSG:{code}")))?;
    let src = parse_definition(code, src_def)?;
    let (dst_def, _) = definition(CANONICAL_EPSG).unwrap();
    let dst = parse_definition(CANONICAL_EPSG, dst_def)?;

    geom.try_map_coords(|Coord { x, y }| {
        // proj4rs works in radians for geographic references.
        let mut point = if src_geographic {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };
        transform(&src, &dst, &mut point).map_err(|err| {
            ScoreError::Geometry(format!("reprojection from EPSG:{code} failed: {err}"))
        })?;
        Ok(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
    })
}

fn parse_definition(epsg: u32, def: &str) -> Result<Proj> {
    Proj::from_proj_string(def)
        .map_err(|err| ScoreError::Geometry(format!("bad projection for EPSG:{epsg}: {err}")))
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};

    use super::*;

    fn square(coords: &[(f64, f64)]) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString(coords.iter().map(|&(x, y)| Coord { x, y }).collect()),
            vec![],
        )])
    }

    #[test]
    fn untagged_geometry_is_untouched() {
        let geom = square(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(to_canonical(&geom, None).unwrap(), geom);
        assert_eq!(to_canonical(&geom, Some(CANONICAL_EPSG)).unwrap(), geom);
    }

    #[test]
    fn web_mercator_reprojects_to_degrees() {
        // (1°, 1°) in EPSG:3857 meters.
        let geom = square(&[
            (0.0, 0.0),
            (111319.49079327357, 0.0),
            (111319.49079327357, 111325.14286638486),
            (0.0, 0.0),
        ]);
        let out = to_canonical(&geom, Some(3857)).unwrap();
        let ring = out.0[0].exterior();

        let Coord { x, y } = ring[2];
        assert!((x - 1.0).abs() < 1e-6, "lon {x}");
        assert!((y - 1.0).abs() < 1e-6, "lat {y}");
    }

    #[test]
    fn unknown_reference_is_a_geometry_error() {
        let geom = square(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert!(matches!(
            to_canonical(&geom, Some(9999)),
            Err(ScoreError::Geometry(_))
        ));
    }
}
