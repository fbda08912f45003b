use super::{GeocodedLocation, PartGeometry};
use crate::error::{Error, Result};
use geo::algorithm::buffer::Buffer;
use geo::{BooleanOps, Coord, GeodesicArea, Geometry, LineString, MapCoords, MultiPolygon, Point};

// WGS 84 ellipsoid
const WGS84_A: f64 = 6_378_137.0;
const WGS84_E2: f64 = 6.694_379_990_14e-3;

/// Local plane in meters tangent to the ellipsoid at `origin`.
///
/// Distances near the origin match ground distance closely enough that a
/// planar buffer there is a geodesic buffer for the few-meter widths used
/// here.
#[derive(Debug, Clone, Copy)]
struct LocalPlane {
    lon0: f64,
    lat0: f64,
    /// meters per radian of longitude
    kx: f64,
    /// meters per radian of latitude
    ky: f64,
}

impl LocalPlane {
    fn new(origin: Coord<f64>) -> Self {
        let phi = origin.y.to_radians();
        let w = 1.0 - WGS84_E2 * phi.sin().powi(2);
        let prime_vertical = WGS84_A / w.sqrt();
        let meridional = WGS84_A * (1.0 - WGS84_E2) / w.powf(1.5);
        Self {
            lon0: origin.x,
            lat0: origin.y,
            kx: prime_vertical * phi.cos(),
            ky: meridional,
        }
    }

    fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.lon0).to_radians() * self.kx,
            y: (c.y - self.lat0).to_radians() * self.ky,
        }
    }

    fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.lon0 + (c.x / self.kx).to_degrees(),
            y: self.lat0 + (c.y / self.ky).to_degrees(),
        }
    }
}

/// Fixed-distance geodesic buffer.
#[derive(Debug, Clone, Copy)]
pub struct GeodesicBuffer {
    distance_m: f64,
}

impl GeodesicBuffer {
    pub fn new(distance_m: f64) -> Result<Self> {
        if !distance_m.is_finite() || distance_m <= 0.0 {
            return Err(Error::Geometry(format!(
                "buffer distance must be a positive number of meters, got {distance_m}"
            )));
        }
        Ok(Self { distance_m })
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// Buffer one point or line.
    pub fn buffer(&self, part: &PartGeometry) -> Result<MultiPolygon<f64>> {
        let geometry: Geometry<f64> = match part {
            PartGeometry::Point(p) => Geometry::Point(*p),
            PartGeometry::Line(l) => Geometry::LineString(l.clone()),
        };
        let plane = LocalPlane::new(part.anchor());
        let projected = geometry.map_coords(|c| plane.forward(c));
        let buffered = projected.buffer(self.distance_m);
        if buffered.0.is_empty() {
            return Err(Error::Geometry("buffer produced an empty polygon".to_string()));
        }
        Ok(buffered.map_coords(|c| plane.inverse(c)))
    }

    /// Buffer every part and union the results into one polygon set.
    pub fn buffer_union(&self, parts: &[PartGeometry]) -> Result<MultiPolygon<f64>> {
        let mut merged: Option<MultiPolygon<f64>> = None;
        for part in parts {
            let buffered = self.buffer(part)?;
            merged = Some(match merged {
                None => buffered,
                Some(acc) => acc.union(&buffered),
            });
        }
        merged.ok_or_else(|| Error::Geometry("nothing to buffer".to_string()))
    }
}

/// Area on the ellipsoid, square meters.
pub fn geodesic_area(polygons: &MultiPolygon<f64>) -> f64 {
    polygons.geodesic_area_unsigned()
}

/// Point geometry at a geocoded location.
pub fn point_at(loc: GeocodedLocation) -> PartGeometry {
    PartGeometry::Point(Point::new(loc.x, loc.y))
}

/// Two-vertex line between geocoded locations.
pub fn line_between(start: GeocodedLocation, finish: GeocodedLocation) -> PartGeometry {
    PartGeometry::Line(LineString::from(vec![(start.x, start.y), (finish.x, finish.y)]))
}
