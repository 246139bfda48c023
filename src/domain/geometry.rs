//! Geographic value types
//!
//! [`BoundingBox`] is the axis-aligned lat/lon rectangle every export is
//! derived from. [`Polygon`] is the closed ring handed to the imagery service.

use super::errors::GeoExportError;
use super::result::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metres per degree of latitude and longitude at the given latitude.
///
/// Uses the truncated series expansion of the WGS84 ellipsoid, which is what
/// previously exported tiles were sized with.
pub fn metres_per_degree(lat: f64) -> (f64, f64) {
    let phi = lat.to_radians();
    let per_deg_lat =
        111_132.954 - 559.822 * (2.0 * phi).cos() + 1.175 * (4.0 * phi).cos();
    let per_deg_lon =
        111_412.84 * phi.cos() - 93.5 * (3.0 * phi).cos() + 0.118 * (5.0 * phi).cos();
    (per_deg_lat, per_deg_lon)
}

/// An axis-aligned geographic rectangle in degrees.
///
/// Construction validates `min_lat < max_lat` and `min_lon < max_lon`; the
/// fields are private so a constructed box is never invalid.
///
/// # Examples
///
/// ```
/// use geoexport::domain::BoundingBox;
///
/// let bbox = BoundingBox::new(-0.5, 0.5, 36.0, 37.0).unwrap();
/// assert_eq!(bbox.centre(), (0.0, 36.5));
/// assert!(BoundingBox::new(1.0, 0.0, 36.0, 37.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoundingBox")]
pub struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

#[derive(Deserialize)]
struct RawBoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = GeoExportError;

    fn try_from(raw: RawBoundingBox) -> Result<Self> {
        BoundingBox::new(raw.min_lat, raw.max_lat, raw.min_lon, raw.max_lon)
    }
}

impl BoundingBox {
    /// Creates a bounding box, validating its extent
    ///
    /// # Errors
    ///
    /// Returns [`GeoExportError::InvalidParameter`] if a value is not finite,
    /// out of range, or the box has no positive extent on either axis.
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Result<Self> {
        let values = [min_lat, max_lat, min_lon, max_lon];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GeoExportError::InvalidParameter(format!(
                "bounding box values must be finite, got {values:?}"
            )));
        }
        if !(-90.0..=90.0).contains(&min_lat) || !(-90.0..=90.0).contains(&max_lat) {
            return Err(GeoExportError::InvalidParameter(format!(
                "latitude out of range [-90, 90]: {min_lat}..{max_lat}"
            )));
        }
        if !(-180.0..=180.0).contains(&min_lon) || !(-180.0..=180.0).contains(&max_lon) {
            return Err(GeoExportError::InvalidParameter(format!(
                "longitude out of range [-180, 180]: {min_lon}..{max_lon}"
            )));
        }
        if min_lat >= max_lat {
            return Err(GeoExportError::InvalidParameter(format!(
                "min_lat ({min_lat}) must be less than max_lat ({max_lat})"
            )));
        }
        if min_lon >= max_lon {
            return Err(GeoExportError::InvalidParameter(format!(
                "min_lon ({min_lon}) must be less than max_lon ({max_lon})"
            )));
        }
        Ok(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    /// Creates a square buffer of `surrounding_metres` on each side of a point.
    ///
    /// The metre distance is converted to degrees at the point's latitude, so
    /// the box is square on the ground rather than in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`GeoExportError::InvalidParameter`] if `surrounding_metres` is not
    /// positive or the resulting box falls outside valid coordinates.
    pub fn from_centre(lat: f64, lon: f64, surrounding_metres: f64) -> Result<Self> {
        if !surrounding_metres.is_finite() || surrounding_metres <= 0.0 {
            return Err(GeoExportError::InvalidParameter(format!(
                "surrounding_metres must be positive, got {surrounding_metres}"
            )));
        }
        let (per_deg_lat, per_deg_lon) = metres_per_degree(lat);
        let deg_lat = surrounding_metres / per_deg_lat;
        let deg_lon = surrounding_metres / per_deg_lon;
        Self::new(lat - deg_lat, lat + deg_lat, lon - deg_lon, lon + deg_lon)
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    /// Area in square degrees
    pub fn area(&self) -> f64 {
        (self.max_lat - self.min_lat) * (self.max_lon - self.min_lon)
    }

    /// Approximate area in square metres, evaluated at the mean latitude
    pub fn area_square_metres(&self) -> f64 {
        let (height, width) = self.edge_metres();
        height * width
    }

    /// Centre point as `(lat, lon)`
    pub fn centre(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Edge lengths in metres as `(north-south, east-west)` at the mean latitude
    pub fn edge_metres(&self) -> (f64, f64) {
        let (mean_lat, _) = self.centre();
        let (per_deg_lat, per_deg_lon) = metres_per_degree(mean_lat);
        (
            (self.max_lat - self.min_lat) * per_deg_lat,
            (self.max_lon - self.min_lon) * per_deg_lon,
        )
    }

    /// Closed polygon ring, counter-clockwise from the south-west corner
    pub fn to_polygon(&self) -> Polygon {
        Polygon {
            vertices: vec![
                (self.min_lat, self.min_lon),
                (self.min_lat, self.max_lon),
                (self.max_lat, self.max_lon),
                (self.max_lat, self.min_lon),
                (self.min_lat, self.min_lon),
            ],
        }
    }

    /// Whether `other` lies entirely inside this box (edges inclusive)
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min_lat >= self.min_lat
            && other.max_lat <= self.max_lat
            && other.min_lon >= self.min_lon
            && other.max_lon <= self.max_lon
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}]",
            self.min_lat, self.max_lat, self.min_lon, self.max_lon
        )
    }
}

/// A closed ring of `(lat, lon)` vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<(f64, f64)>,
}

impl Polygon {
    /// Vertices in ring order; the first vertex is repeated at the end
    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    /// Vertices as `[lon, lat]` pairs, the order GeoJSON expects
    pub fn to_lon_lat_ring(&self) -> Vec<[f64; 2]> {
        self.vertices.iter().map(|&(lat, lon)| [lon, lat]).collect()
    }

    /// GeoJSON geometry object for this ring
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "Polygon",
            "coordinates": [self.to_lon_lat_ring()],
        })
    }

    /// Smallest bounding box containing every vertex
    pub fn bounds(&self) -> Result<BoundingBox> {
        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        let mut min_lon = f64::INFINITY;
        let mut max_lon = f64::NEG_INFINITY;
        for &(lat, lon) in &self.vertices {
            min_lat = min_lat.min(lat);
            max_lat = max_lat.max(lat);
            min_lon = min_lon.min(lon);
            max_lon = max_lon.max(lon);
        }
        BoundingBox::new(min_lat, max_lat, min_lon, max_lon)
    }
}
