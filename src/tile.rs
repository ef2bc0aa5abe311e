//! Spherical-mercator tile grid: the fixed partitioning scheme under which
//! precinct data is precomputed and stored.

use std::f64::consts::PI;
use std::fmt;

use geo::{Coord, Polygon, Rect};

/// A fixed-size cell at a fixed zoom level, identified by (zoom, column,
/// row) in the spherical-mercator grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub zoom: u8,
    pub column: u32,
    pub row: u32,
}

impl TileCoord {
    pub fn new(zoom: u8, column: u32, row: u32) -> Self {
        Self { zoom, column, row }
    }

    /// The tile containing a lon/lat point.
    pub fn at(lon: f64, lat: f64, zoom: u8) -> Self {
        let n = (1u32 << zoom) as f64;
        let column = ((lon + 180.0) / 360.0 * n).floor();
        let lat_rad = lat.to_radians();
        let row = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

        let max = (1u32 << zoom) - 1;
        Self {
            zoom,
            column: (column.max(0.0) as u32).min(max),
            row: (row.max(0.0) as u32).min(max),
        }
    }

    /// Cell bounds in lon/lat degrees.
    pub fn bounds(&self) -> Rect<f64> {
        let n = (1u32 << self.zoom) as f64;
        let west = self.column as f64 / n * 360.0 - 180.0;
        let east = (self.column as f64 + 1.0) / n * 360.0 - 180.0;
        let north = lat_of_row(self.row as f64, n);
        let south = lat_of_row(self.row as f64 + 1.0, n);
        Rect::new(Coord { x: west, y: south }, Coord { x: east, y: north })
    }

    /// Cell polygon, for intersection tests against district geometry.
    pub fn polygon(&self) -> Polygon<f64> {
        self.bounds().to_polygon()
    }
}

fn lat_of_row(row: f64, n: f64) -> f64 {
    (PI * (1.0 - 2.0 * row / n)).sinh().atan().to_degrees()
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.column, self.row)
    }
}

/// Every tile at `zoom` whose cell overlaps the lon/lat envelope, rows
/// north to south, columns west to east.
pub fn cover_rect(rect: &Rect<f64>, zoom: u8) -> Vec<TileCoord> {
    let nw = TileCoord::at(rect.min().x, rect.max().y, zoom);
    let se = TileCoord::at(rect.max().x, rect.min().y, zoom);

    let mut tiles =
        Vec::with_capacity(((se.row - nw.row + 1) * (se.column - nw.column + 1)) as usize);
    for row in nw.row..=se.row {
        for column in nw.column..=se.column {
            tiles.push(TileCoord::new(zoom, column, row));
        }
    }
    tiles
}
