//! Mapping-platform clients: geocoding, feature publishing and identity.

pub mod features;
pub mod geocode;
pub mod identity;
pub mod schema;

pub use features::FeatureLayer;
pub use geocode::{qualify, ArcgisGeocoder};
pub use identity::{Credential, CredentialStore, IdentityManager};
pub use schema::{EditResult, EsriGeometry, Feature, SpatialReference};

use crate::error::Result;
use crate::geometry::GeocodedLocation;
use async_trait::async_trait;

/// Resolves a free-text place to its first candidate location.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str, token: Option<&str>) -> Result<Option<GeocodedLocation>>;
}

/// Writes one feature to a hosted layer.
#[async_trait]
pub trait FeaturePublisher: Send + Sync {
    async fn add_feature(&self, feature: &Feature, token: &str) -> Result<EditResult>;
}
