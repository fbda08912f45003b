use super::schema::GeocodeResponse;
use super::Geocoder;
use crate::error::{Error, Result};
use crate::geometry::GeocodedLocation;
use async_trait::async_trait;

/// World geocoding service `findAddressCandidates` client.
#[derive(Clone)]
pub struct ArcgisGeocoder {
    http: reqwest::Client,
    endpoint: String,
}

impl ArcgisGeocoder {
    pub fn new(http: reqwest::Client, geocode_url: &str) -> Self {
        let endpoint = format!("{}/findAddressCandidates", geocode_url.trim_end_matches('/'));
        Self { http, endpoint }
    }
}

/// Join a place with optional disambiguating context.
pub fn qualify(place: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!("{}, {}", place.trim(), context),
        None => place.trim().to_string(),
    }
}

#[async_trait]
impl Geocoder for ArcgisGeocoder {
    async fn geocode(&self, query: &str, token: Option<&str>) -> Result<Option<GeocodedLocation>> {
        let mut params = vec![
            ("f", "json"),
            ("SingleLine", query),
            ("outFields", "*"),
            ("maxLocations", "1"),
        ];
        if let Some(token) = token {
            params.push(("token", token));
        }
        tracing::debug!(%query, "geocoding");
        let resp = self.http.get(&self.endpoint).query(&params).send().await?;
        if !resp.status().is_success() {
            return Err(Error::from_response("geocoder", resp).await);
        }
        let parsed: GeocodeResponse = resp.json().await?;
        if let Some(err) = parsed.error {
            return Err(Error::Http {
                service: "geocoder",
                status: u16::try_from(err.code).unwrap_or(500),
                body: err.summary(),
            });
        }
        Ok(parsed.candidates.into_iter().next().map(|candidate| {
            tracing::debug!(
                matched = %candidate.address,
                score = candidate.score,
                x = candidate.location.x,
                y = candidate.location.y,
                "geocode candidate"
            );
            candidate.location
        }))
    }
}
