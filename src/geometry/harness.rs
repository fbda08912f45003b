//! Buffer-area test harness: buffer a fixed point and line and report the
//! geodesic areas, as a quick sanity check of the buffer step.

use super::{geodesic_area, line_between, point_at, GeocodedLocation, GeodesicBuffer};
use crate::error::Result;
use serde::Serialize;

pub const TEST_POINT: GeocodedLocation = GeocodedLocation { x: -86.25, y: 41.68 };
pub const TEST_LINE_END: GeocodedLocation = GeocodedLocation { x: -86.26, y: 41.69 };

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BufferAreas {
    pub distance_m: f64,
    pub point_area_m2: f64,
    pub line_area_m2: f64,
}

pub fn run(distance_m: f64) -> Result<BufferAreas> {
    let buffer = GeodesicBuffer::new(distance_m)?;
    let point_area_m2 = geodesic_area(&buffer.buffer(&point_at(TEST_POINT))?);
    let line_area_m2 = geodesic_area(&buffer.buffer(&line_between(TEST_POINT, TEST_LINE_END))?);
    tracing::debug!(distance_m, point_area_m2, line_area_m2, "buffer test");
    Ok(BufferAreas {
        distance_m,
        point_area_m2,
        line_area_m2,
    })
}

impl std::fmt::Display for BufferAreas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Buffered Point Area (sq m): {:.2}", self.point_area_m2)?;
        write!(f, "Buffered Line Area (sq m): {:.2}", self.line_area_m2)
    }
}
