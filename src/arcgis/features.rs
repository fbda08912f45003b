use super::schema::{AddFeaturesResponse, EditResult, Feature};
use super::FeaturePublisher;
use crate::error::{Error, Result};
use async_trait::async_trait;

/// Hosted feature layer `addFeatures` client.
#[derive(Clone)]
pub struct FeatureLayer {
    http: reqwest::Client,
    layer_url: String,
}

impl FeatureLayer {
    pub fn new(http: reqwest::Client, layer_url: &str) -> Self {
        Self {
            http,
            layer_url: layer_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.layer_url
    }
}

#[async_trait]
impl FeaturePublisher for FeatureLayer {
    async fn add_feature(&self, feature: &Feature, token: &str) -> Result<EditResult> {
        let features = serde_json::to_string(&[feature])?;
        let form = [("f", "json"), ("token", token), ("features", features.as_str())];
        tracing::debug!(layer = %self.layer_url, "adding feature");
        let resp = self
            .http
            .post(format!("{}/addFeatures", self.layer_url))
            .form(&form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::from_response("feature layer", resp).await);
        }
        let parsed: AddFeaturesResponse = resp.json().await?;
        if let Some(err) = parsed.error {
            return Err(Error::FeatureRejected {
                message: err.summary(),
            });
        }
        match parsed.add_results.into_iter().next() {
            Some(result) if result.success => Ok(result),
            Some(result) => Err(Error::FeatureRejected {
                message: result
                    .error
                    .map(|e| e.summary())
                    .unwrap_or_else(|| "success=false".to_string()),
            }),
            None => Err(Error::FeatureRejected {
                message: "response carried no addResults".to_string(),
            }),
        }
    }
}
