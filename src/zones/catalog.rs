//! Zone polygon catalog and point-in-polygon resolution.
//!
//! The catalog is loaded once at startup from a GeoJSON feature collection in
//! which every feature carries a `Zone_No` property and a polygon ring of
//! (longitude, latitude) vertices. Resolution walks the catalog in load order
//! and returns the first zone whose polygon contains the point; overlapping
//! polygons (malformed data) are therefore resolved by catalog order rather
//! than treated as an error.

use std::fs;
use std::path::Path;

use geojson::{FeatureCollection, GeoJson, Value};
use tracing::warn;

use crate::reports::domain::Coordinates;

/// Outcome of resolving a coordinate pair against the catalog.
///
/// Resolution failure is a value, not an error: a point outside every polygon
/// (or a catalog that failed to load) yields [`ZoneResolution::Unknown`] and
/// report creation carries on without an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneResolution {
    Zone(u32),
    Unknown,
}

impl ZoneResolution {
    pub const UNKNOWN_LABEL: &'static str = "Unknown Zone";

    /// Display label stored on the report (`"Zone 5"` / `"Unknown Zone"`).
    pub fn label(&self) -> String {
        match self {
            Self::Zone(number) => format!("Zone {number}"),
            Self::Unknown => Self::UNKNOWN_LABEL.to_string(),
        }
    }

    pub fn zone_number(&self) -> Option<u32> {
        match self {
            Self::Zone(number) => Some(*number),
            Self::Unknown => None,
        }
    }
}

/// One administrative zone: its number and the outer ring of its boundary,
/// vertices in (longitude, latitude) order.
#[derive(Debug, Clone)]
pub struct ZonePolygon {
    pub zone_number: u32,
    ring: Vec<(f64, f64)>,
}

impl ZonePolygon {
    /// Builds a polygon, rejecting rings with fewer than three vertices.
    pub fn new(zone_number: u32, ring: Vec<(f64, f64)>) -> Result<Self, CatalogError> {
        if ring.len() < 3 {
            return Err(CatalogError::DegenerateRing {
                zone_number,
                vertices: ring.len(),
            });
        }
        Ok(Self { zone_number, ring })
    }

    /// Ray-casting containment test, horizontal ray toward +x.
    ///
    /// The edge policy is contractual and must match the dataset authors'
    /// classifier: horizontal edges (`p1y == p2y`) never toggle, and a point on
    /// a vertical edge (`p1x == p2x`) toggles without the intersection
    /// comparison, which also keeps the division well-defined.
    pub fn contains(&self, point: Coordinates) -> bool {
        let (x, y) = (point.longitude, point.latitude);
        let n = self.ring.len();
        let mut inside = false;

        let (mut p1x, mut p1y) = self.ring[0];
        for i in 1..=n {
            let (p2x, p2y) = self.ring[i % n];
            if y > p1y.min(p2y) && y <= p1y.max(p2y) && x <= p1x.max(p2x) && p1y != p2y {
                let x_intersection = (y - p1y) * (p2x - p1x) / (p2y - p1y) + p1x;
                if p1x == p2x || x <= x_intersection {
                    inside = !inside;
                }
            }
            (p1x, p1y) = (p2x, p2y);
        }

        inside
    }
}

/// Immutable set of zone polygons, queried for every report submission.
#[derive(Debug, Default)]
pub struct ZoneCatalog {
    polygons: Vec<ZonePolygon>,
}

impl ZoneCatalog {
    pub fn new(polygons: Vec<ZonePolygon>) -> Self {
        Self { polygons }
    }

    /// Loads the catalog, degrading every failure to an empty catalog.
    ///
    /// A missing or malformed dataset must not stop the service; it only means
    /// every submission resolves to [`ZoneResolution::Unknown`] until the
    /// dataset is fixed and the service restarted.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::from_path(path.as_ref()) {
            Ok(catalog) => catalog,
            Err(error) => {
                warn!(path = %path.as_ref().display(), %error, "zone dataset unavailable, all points will resolve to Unknown Zone");
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::from_geojson_str(&content)
    }

    /// Parses a GeoJSON feature collection into a catalog.
    ///
    /// Each feature is expected to carry a numeric `Zone_No` property and a
    /// `Polygon` or `MultiPolygon` geometry; only the outer ring of the first
    /// polygon is kept, matching how the boundaries were authored. Features
    /// that cannot be used are skipped with a warning so one bad feature does
    /// not take the rest of the catalog down with it.
    pub fn from_geojson_str(content: &str) -> Result<Self, CatalogError> {
        let geojson: GeoJson = content.parse()?;
        let collection = FeatureCollection::try_from(geojson)
            .map_err(|_| CatalogError::NotAFeatureCollection)?;

        let mut polygons: Vec<ZonePolygon> = Vec::with_capacity(collection.features.len());
        for feature in collection.features {
            let zone_number = match feature.property("Zone_No").and_then(|v| v.as_u64()) {
                Some(number) if number > 0 => number as u32,
                _ => {
                    warn!("skipping zone feature without a positive numeric Zone_No property");
                    continue;
                }
            };

            if polygons.iter().any(|p| p.zone_number == zone_number) {
                warn!(zone_number, "duplicate zone number in dataset, keeping the first feature");
                continue;
            }

            let Some(ring) = feature.geometry.as_ref().and_then(outer_ring) else {
                warn!(zone_number, "skipping zone feature without polygon geometry");
                continue;
            };

            match ZonePolygon::new(zone_number, ring) {
                Ok(polygon) => polygons.push(polygon),
                Err(error) => warn!(zone_number, %error, "skipping zone feature"),
            }
        }

        if polygons.is_empty() {
            return Err(CatalogError::NoUsableZones);
        }

        Ok(Self::new(polygons))
    }

    /// Resolves a point to the first zone whose polygon contains it.
    pub fn resolve(&self, point: Coordinates) -> ZoneResolution {
        self.polygons
            .iter()
            .find(|polygon| polygon.contains(point))
            .map(|polygon| ZoneResolution::Zone(polygon.zone_number))
            .unwrap_or(ZoneResolution::Unknown)
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read zone dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("zone dataset is not valid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),
    #[error("zone dataset is not a feature collection")]
    NotAFeatureCollection,
    #[error("zone {zone_number} has a degenerate ring of {vertices} vertices")]
    DegenerateRing { zone_number: u32, vertices: usize },
    #[error("zone dataset contains no usable zone features")]
    NoUsableZones,
}

fn outer_ring(geometry: &geojson::Geometry) -> Option<Vec<(f64, f64)>> {
    let ring = match &geometry.value {
        Value::Polygon(rings) => rings.first()?,
        Value::MultiPolygon(polygons) => polygons.first()?.first()?,
        _ => return None,
    };

    Some(
        ring.iter()
            .filter(|position| position.len() >= 2)
            .map(|position| (position[0], position[1]))
            .collect(),
    )
}
