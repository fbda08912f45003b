use crate::geometry::{GeocodedLocation, WGS84_WKID};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialReference {
    pub wkid: u32,
}

impl Default for SpatialReference {
    fn default() -> Self {
        Self { wkid: WGS84_WKID }
    }
}

/// Esri JSON geometry as accepted by `addFeatures`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EsriGeometry {
    Point {
        x: f64,
        y: f64,
        #[serde(rename = "spatialReference")]
        spatial_reference: SpatialReference,
    },
    Polygon {
        rings: Vec<Vec<[f64; 2]>>,
        #[serde(rename = "spatialReference")]
        spatial_reference: SpatialReference,
    },
}

impl EsriGeometry {
    pub fn point(loc: GeocodedLocation) -> Self {
        EsriGeometry::Point {
            x: loc.x,
            y: loc.y,
            spatial_reference: SpatialReference::default(),
        }
    }

    /// Esri rings: exteriors clockwise, holes counter-clockwise.
    pub fn polygon(polygons: &MultiPolygon<f64>) -> Self {
        use geo::orient::{Direction, Orient};
        let oriented = polygons.orient(Direction::Reversed);
        let mut rings = Vec::new();
        for polygon in &oriented.0 {
            rings.push(ring_coords(polygon.exterior()));
            for hole in polygon.interiors() {
                rings.push(ring_coords(hole));
            }
        }
        EsriGeometry::Polygon {
            rings,
            spatial_reference: SpatialReference::default(),
        }
    }
}

fn ring_coords(ring: &geo::LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

/// One feature for `addFeatures`.
#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    pub attributes: serde_json::Map<String, serde_json::Value>,
    pub geometry: EsriGeometry,
}

/// Error object the REST API embeds in 200 responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub details: Vec<String>,
}

impl RestError {
    pub fn summary(&self) -> String {
        let mut text = self
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| self.message.clone());
        if !self.details.is_empty() {
            text = format!("{text} ({})", self.details.join("; "));
        }
        if self.code != 0 {
            text = format!("{} {text}", self.code);
        }
        text
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GeocodeResponse {
    #[serde(default)]
    pub candidates: Vec<GeocodeCandidate>,
    pub error: Option<RestError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeCandidate {
    #[serde(default)]
    pub address: String,
    pub location: GeocodedLocation,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddFeaturesResponse {
    #[serde(default)]
    pub add_results: Vec<EditResult>,
    pub error: Option<RestError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResult {
    #[serde(default)]
    pub object_id: Option<i64>,
    #[serde(default)]
    pub success: bool,
    pub error: Option<RestError>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: Option<String>,
    /// Epoch milliseconds.
    pub expires: Option<i64>,
    pub error: Option<RestError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SelfResponse {
    pub full_name: Option<String>,
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon, Winding};

    #[test]
    fn point_serializes_with_spatial_reference() {
        let json = serde_json::to_value(EsriGeometry::point(GeocodedLocation { x: -85.6, y: 40.5 }))
            .unwrap();
        assert_eq!(json["x"], -85.6);
        assert_eq!(json["spatialReference"]["wkid"], 4326);
    }

    #[test]
    fn polygon_exterior_is_clockwise() {
        let ccw = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        match EsriGeometry::polygon(&MultiPolygon::new(vec![ccw])) {
            EsriGeometry::Polygon { rings, .. } => {
                assert_eq!(rings.len(), 1);
                let ring = geo::LineString::from(
                    rings[0].iter().map(|c| (c[0], c[1])).collect::<Vec<_>>(),
                );
                assert!(ring.is_cw());
                assert_eq!(rings[0].first(), rings[0].last());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rest_error_summary_prefers_description() {
        let err: RestError = serde_json::from_str(
            r#"{"code":498,"message":"Invalid token.","description":"Token expired","details":["x"]}"#,
        )
        .unwrap();
        assert_eq!(err.summary(), "498 Token expired (x)");
    }

    #[test]
    fn add_results_parse() {
        let resp: AddFeaturesResponse = serde_json::from_str(
            r#"{"addResults":[{"objectId":17,"success":true}]}"#,
        )
        .unwrap();
        assert!(resp.add_results[0].success);
        assert_eq!(resp.add_results[0].object_id, Some(17));
    }
}
