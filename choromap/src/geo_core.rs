use anyhow::Result;
#[cfg(feature = "proj")]
use anyhow::Context;
use geo::{BoundingRect, Geometry, Rect};
#[cfg(feature = "proj")]
use geo::{Coord, MapCoords};
#[cfg(feature = "proj")]
use proj::Proj;
use serde::{Deserialize, Serialize};

/// EPSG code of WGS 84 geographic coordinates (longitude/latitude)
pub const WGS84_EPSG: u32 = 4326;

/// Coordinate reference system tag carried by a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crs {
    /// Authority code, e.g. EPSG:3310 (California Albers)
    Epsg(u32),
    /// Any other definition PROJ understands (WKT, PROJ string, URN)
    Definition(String),
}

impl Crs {
    pub fn wgs84() -> Self {
        Crs::Epsg(WGS84_EPSG)
    }

    /// Parse a CRS name as found in GeoJSON `crs` members or configuration
    ///
    /// Recognises `EPSG:xxxx`, `urn:ogc:def:crs:EPSG::xxxx` and the OGC CRS84
    /// aliases; anything else is kept verbatim as a definition.
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        let upper = trimmed.to_ascii_uppercase();

        if upper == "OGC:CRS84" || upper.ends_with(":CRS84") {
            return Crs::wgs84();
        }

        let code = upper
            .strip_prefix("EPSG:")
            .or_else(|| upper.strip_prefix("URN:OGC:DEF:CRS:EPSG::"))
            .or_else(|| upper.strip_prefix("URN:OGC:DEF:CRS:EPSG:6.6:"));

        match code.and_then(|c| c.parse::<u32>().ok()) {
            Some(code) => Crs::Epsg(code),
            None => Crs::Definition(trimmed.to_string()),
        }
    }

    /// True when coordinates are already longitude/latitude on WGS 84
    pub fn is_wgs84(&self) -> bool {
        match self {
            Crs::Epsg(code) => *code == WGS84_EPSG,
            Crs::Definition(def) => matches!(Crs::parse(def), Crs::Epsg(WGS84_EPSG)),
        }
    }

    /// String handed to PROJ
    pub fn as_proj_str(&self) -> String {
        match self {
            Crs::Epsg(code) => format!("EPSG:{}", code),
            Crs::Definition(def) => def.clone(),
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Definition(def) => write!(f, "{}", def),
        }
    }
}

/// Converts geometries from a source CRS to EPSG:4326 longitude/latitude
#[cfg(feature = "proj")]
pub struct Reprojector {
    proj: Proj,
}

#[cfg(feature = "proj")]
impl Reprojector {
    pub fn to_wgs84(from: &Crs) -> Result<Self> {
        let from_crs = from.as_proj_str();
        let to_crs = format!("EPSG:{}", WGS84_EPSG);

        // new_known_crs normalises axis order to x=longitude, y=latitude
        let proj = Proj::new_known_crs(&from_crs, &to_crs, None)
            .with_context(|| format!("Failed to create Proj transformation from {}", from))?;

        Ok(Reprojector { proj })
    }

    pub fn convert(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        self.proj
            .convert((x, y))
            .context("Failed to transform coordinates")
    }

    pub fn geometry(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        geometry.try_map_coords(|c: Coord<f64>| -> Result<Coord<f64>> {
            let (x, y) = self.convert(c.x, c.y)?;
            Ok(Coord { x, y })
        })
    }
}

/// Bounding box structure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64, // min longitude
    pub min_y: f64, // min latitude
    pub max_x: f64, // max longitude
    pub max_y: f64, // max latitude
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn of_geometry(geometry: &Geometry<f64>) -> Option<Self> {
        geometry.bounding_rect().map(BoundingBox::from)
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> Self {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Corners as `[[south, west], [north, east]]`, Leaflet order
    pub fn to_lat_lon_bounds(&self) -> [[f64; 2]; 2] {
        [[self.min_y, self.min_x], [self.max_y, self.max_x]]
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}
