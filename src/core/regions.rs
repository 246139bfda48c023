//! Registry of named export regions

use crate::domain::{BoundingBox, GeoExportError, Result};

/// `(name, min_lat, max_lat, min_lon, max_lon)`
const REGIONS: &[(&str, f64, f64, f64, f64)] = &[
    ("Kenya", -5.202, 6.002, 33.501, 42.283),
    (
        "Busia",
        -0.041_198_726_914_934_91,
        0.777_945_456_331_361_3,
        33.883_895_874_023_44,
        34.440_078_735_351_56,
    ),
    ("NorthMalawi", -14.636, -9.231, 32.688, 35.772),
    ("SouthMalawi", -17.07, -14.636, 34.211, 35.772),
    ("Rwanda", -2.854, -1.034, 28.841, 30.909),
    ("Togo", 6.089_404_296_87, 11.115_625, -0.150_1, 1.777_929_687_5),
];

/// Bounding box of a named region; names are case-sensitive
pub fn named_region(name: &str) -> Option<BoundingBox> {
    REGIONS
        .iter()
        .find(|(region, ..)| *region == name)
        .and_then(|&(_, min_lat, max_lat, min_lon, max_lon)| {
            BoundingBox::new(min_lat, max_lat, min_lon, max_lon).ok()
        })
}

/// Like [`named_region`], failing with the list of known names
pub fn require_region(name: &str) -> Result<BoundingBox> {
    named_region(name).ok_or_else(|| {
        GeoExportError::InvalidParameter(format!(
            "unknown region '{name}', expected one of: {}",
            region_names().join(", ")
        ))
    })
}

/// Names of every known region
pub fn region_names() -> Vec<&'static str> {
    REGIONS.iter().map(|(name, ..)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_region_is_valid() {
        for name in region_names() {
            assert!(named_region(name).is_some(), "{name} is not a valid box");
        }
    }

    #[test]
    fn test_kenya() {
        let kenya = named_region("Kenya").unwrap();
        assert_eq!(kenya.min_lat(), -5.202);
        assert_eq!(kenya.max_lon(), 42.283);
        assert!(kenya.contains(&named_region("Busia").unwrap()));
    }

    #[test]
    fn test_unknown_region() {
        assert!(named_region("kenya").is_none());
        let err = require_region("Atlantis").unwrap_err();
        assert!(err.to_string().contains("NorthMalawi"));
    }
}
