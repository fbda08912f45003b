//! Point/line construction, geodesic buffering and area.
//!
//! All coordinates are WGS 84 longitude/latitude (wkid 4326).

pub mod buffer;
pub mod harness;

pub use buffer::{geodesic_area, line_between, point_at, GeodesicBuffer};

use geo::{Coord, LineString, Point};
use serde::{Deserialize, Serialize};

/// Well-known id of WGS 84.
pub const WGS84_WKID: u32 = 4326;

/// A geocoded longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeocodedLocation {
    pub x: f64,
    pub y: f64,
}

/// Geometry built for one extracted part before buffering.
#[derive(Debug, Clone, PartialEq)]
pub enum PartGeometry {
    Point(Point<f64>),
    Line(LineString<f64>),
}

impl PartGeometry {
    /// Coordinate the local projection is centered on.
    pub(crate) fn anchor(&self) -> Coord<f64> {
        match self {
            PartGeometry::Point(p) => p.0,
            PartGeometry::Line(l) => {
                let n = l.0.len().max(1) as f64;
                let (sx, sy) = l.0.iter().fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
                Coord { x: sx / n, y: sy / n }
            }
        }
    }
}
