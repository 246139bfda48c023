//! Geographic tiling
//!
//! Splits a bounding box into a row-major grid of smaller boxes. Tile
//! boundaries are computed from the grid index rather than accumulated, so
//! neighbouring tiles share their edges exactly and the outer edges of the
//! grid are the input box's own bounds.

use crate::domain::geometry::{metres_per_degree, BoundingBox, Polygon};
use crate::domain::{GeoExportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound on the number of tiles produced for one bounding box
pub const MAX_TILES: usize = 1_000_000;

/// How the number of grid rows and columns is rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridRounding {
    /// `ceil(edge / max_patch)`: every tile edge is at most the patch size
    Ceil,
    /// `max(1, floor(edge / max_patch))`: tiles may be slightly larger than
    /// the patch size; matches batches exported before ceil rounding existed
    #[default]
    Truncate,
}

impl GridRounding {
    fn cells(self, edge_metres: f64, max_patch_metres: f64) -> Result<usize> {
        let ratio = edge_metres / max_patch_metres;
        let cells = match self {
            GridRounding::Ceil => ratio.ceil(),
            GridRounding::Truncate => ratio.floor(),
        };
        if !cells.is_finite() || cells > MAX_TILES as f64 {
            return Err(GeoExportError::InvalidParameter(format!(
                "max patch size {max_patch_metres} m splits a {edge_metres:.0} m edge \
                 into more than {MAX_TILES} cells"
            )));
        }
        Ok((cells as usize).max(1))
    }
}

impl fmt::Display for GridRounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridRounding::Ceil => f.write_str("ceil"),
            GridRounding::Truncate => f.write_str("truncate"),
        }
    }
}

impl FromStr for GridRounding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ceil" => Ok(GridRounding::Ceil),
            "truncate" => Ok(GridRounding::Truncate),
            other => Err(format!(
                "Invalid grid rounding '{other}', expected 'ceil' or 'truncate'"
            )),
        }
    }
}

/// Splits `bbox` into tiles whose edges are no longer than `max_patch_metres`.
///
/// Edge lengths are measured with the metre-per-degree series at the box's
/// mean latitude. Tiles are ordered row-major: rows from `min_lat` upward,
/// columns from `min_lon` eastward.
///
/// # Errors
///
/// Returns [`GeoExportError::InvalidParameter`] if `max_patch_metres` is not
/// a positive finite number, or if the grid would hold more than
/// [`MAX_TILES`] tiles.
///
/// # Examples
///
/// ```
/// use geoexport::core::tiling::tile;
/// use geoexport::domain::BoundingBox;
///
/// let bbox = BoundingBox::new(0.0, 0.1, 36.0, 36.1).unwrap();
/// let tiles = tile(&bbox, 5_000.0).unwrap();
/// assert_eq!(tiles.len(), 9);
/// assert_eq!(tiles[0].min_lat(), bbox.min_lat());
/// assert_eq!(tiles[8].max_lon(), bbox.max_lon());
/// ```
pub fn tile(bbox: &BoundingBox, max_patch_metres: f64) -> Result<Vec<BoundingBox>> {
    tile_with(bbox, max_patch_metres, GridRounding::Ceil)
}

/// Splits `bbox` into a grid sized with the given rounding rule
pub fn tile_with(
    bbox: &BoundingBox,
    max_patch_metres: f64,
    rounding: GridRounding,
) -> Result<Vec<BoundingBox>> {
    if !max_patch_metres.is_finite() || max_patch_metres <= 0.0 {
        return Err(GeoExportError::InvalidParameter(format!(
            "max patch size must be positive, got {max_patch_metres}"
        )));
    }

    let (ns_metres, ew_metres) = bbox.edge_metres();
    let rows = rounding.cells(ns_metres, max_patch_metres)?;
    let cols = rounding.cells(ew_metres, max_patch_metres)?;
    let count = rows
        .checked_mul(cols)
        .filter(|count| *count <= MAX_TILES)
        .ok_or_else(|| {
            GeoExportError::InvalidParameter(format!(
                "max patch size {max_patch_metres} m gives a {rows}x{cols} grid, \
                 more than {MAX_TILES} tiles"
            ))
        })?;

    let lat_edges = grid_edges(bbox.min_lat(), bbox.max_lat(), rows);
    let lon_edges = grid_edges(bbox.min_lon(), bbox.max_lon(), cols);

    let mut tiles = Vec::with_capacity(count);
    for lat in lat_edges.windows(2) {
        for lon in lon_edges.windows(2) {
            tiles.push(BoundingBox::new(lat[0], lat[1], lon[0], lon[1])?);
        }
    }

    tracing::debug!(
        bbox = %bbox,
        rows = rows,
        cols = cols,
        rounding = %rounding,
        "Tiled bounding box"
    );

    Ok(tiles)
}

/// `cells + 1` boundaries from `min` to `max`; the last one is `max` itself
fn grid_edges(min: f64, max: f64, cells: usize) -> Vec<f64> {
    let span = max - min;
    (0..=cells)
        .map(|i| {
            if i == cells {
                max
            } else {
                min + span * (i as f64) / (cells as f64)
            }
        })
        .collect()
}

/// Converts a box into the closed ring submitted to the imagery service
pub fn to_polygon(bbox: &BoundingBox) -> Polygon {
    bbox.to_polygon()
}

/// Square buffer of `surrounding_metres` around a point
pub fn from_centre(lat: f64, lon: f64, surrounding_metres: f64) -> Result<BoundingBox> {
    BoundingBox::from_centre(lat, lon, surrounding_metres)
}

/// Edge lengths in metres of `tile`, measured at `reference_lat`
pub fn edge_metres_at(tile: &BoundingBox, reference_lat: f64) -> (f64, f64) {
    let (per_deg_lat, per_deg_lon) = metres_per_degree(reference_lat);
    (
        (tile.max_lat() - tile.min_lat()) * per_deg_lat,
        (tile.max_lon() - tile.min_lon()) * per_deg_lon,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_one_degree_box_truncated_grid() {
        let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let tiles = tile_with(&bbox, 10_000.0, GridRounding::Truncate).unwrap();
        assert_eq!(tiles.len(), 121);
    }

    #[test]
    fn test_one_degree_box_ceil_grid() {
        let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let tiles = tile(&bbox, 10_000.0).unwrap();
        assert_eq!(tiles.len(), 144);
    }

    #[test_case(0.0, 1.0, 0.0, 1.0, 10_000.0 ; "one degree at the equator")]
    #[test_case(-5.202, 6.002, 33.501, 42.283, 10_000.0 ; "kenya")]
    #[test_case(-17.07, -14.636, 34.211, 35.772, 7_500.0 ; "southern hemisphere")]
    #[test_case(0.0, 0.001, 36.0, 36.001, 10_000.0 ; "box smaller than patch")]
    fn test_tiles_cover_box_within_patch_size(
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
        patch: f64,
    ) {
        let bbox = BoundingBox::new(min_lat, max_lat, min_lon, max_lon).unwrap();
        let tiles = tile(&bbox, patch).unwrap();
        let (mean_lat, _) = bbox.centre();

        let covered: f64 = tiles.iter().map(BoundingBox::area).sum();
        assert!((covered - bbox.area()).abs() < 1e-9 * bbox.area().max(1.0));

        for t in &tiles {
            assert!(bbox.contains(t));
            let (ns, ew) = edge_metres_at(t, mean_lat);
            assert!(ns <= patch * (1.0 + 1e-9), "north-south edge {ns} > {patch}");
            assert!(ew <= patch * (1.0 + 1e-9), "east-west edge {ew} > {patch}");
        }
    }

    #[test]
    fn test_outer_edges_are_exact() {
        let bbox = BoundingBox::new(-0.3, 0.7, 34.1, 35.3).unwrap();
        let tiles = tile(&bbox, 20_000.0).unwrap();
        let min_lat = tiles.iter().map(|t| t.min_lat()).fold(f64::INFINITY, f64::min);
        let max_lat = tiles.iter().map(|t| t.max_lat()).fold(f64::NEG_INFINITY, f64::max);
        let min_lon = tiles.iter().map(|t| t.min_lon()).fold(f64::INFINITY, f64::min);
        let max_lon = tiles.iter().map(|t| t.max_lon()).fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(min_lat, bbox.min_lat());
        assert_eq!(max_lat, bbox.max_lat());
        assert_eq!(min_lon, bbox.min_lon());
        assert_eq!(max_lon, bbox.max_lon());
    }

    #[test]
    fn test_row_major_order() {
        let bbox = BoundingBox::new(0.0, 0.2, 0.0, 0.2).unwrap();
        let tiles = tile(&bbox, 12_000.0).unwrap();
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[0].min_lon(), 0.0);
        assert_eq!(tiles[1].min_lat(), 0.0);
        assert_eq!(tiles[1].max_lon(), 0.2);
        assert_eq!(tiles[2].min_lon(), 0.0);
        assert_eq!(tiles[2].max_lat(), 0.2);
        assert_eq!(tiles[0].max_lat(), tiles[2].min_lat());
    }

    #[test_case(0.0 ; "zero")]
    #[test_case(-1.0 ; "negative")]
    #[test_case(f64::NAN ; "nan")]
    #[test_case(f64::INFINITY ; "infinite")]
    #[test_case(1e-300 ; "tiny patch overflows grid")]
    #[test_case(5e-324 ; "subnormal patch gives infinite ratio")]
    #[test_case(0.5 ; "grid above tile limit")]
    fn test_invalid_patch_size(patch: f64) {
        let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0).unwrap();
        assert!(matches!(
            tile(&bbox, patch),
            Err(GeoExportError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_grid_rounding_from_str() {
        assert_eq!("ceil".parse::<GridRounding>().unwrap(), GridRounding::Ceil);
        assert_eq!(
            "Truncate".parse::<GridRounding>().unwrap(),
            GridRounding::Truncate
        );
        assert!("round".parse::<GridRounding>().is_err());
    }
}
