use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Top-level configuration, read from `config.toml`.
///
/// Secrets (AI key, ArcGIS password) are never stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    pub ai: AiConfig,
    pub arcgis: ArcgisConfig,
    pub buffer: BufferConfig,
    pub intake: IntakeConfig,
    pub workflow: WorkflowConfig,
    pub http: HttpConfig,
}

/// Which record shape the model is asked to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Water/sewer connection permit: one address, one point feature.
    #[default]
    Permit,
    /// As-built project record: several parts, one buffered polygon.
    Project,
}

impl std::str::FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permit" => Ok(Self::Permit),
            "project" => Ok(Self::Project),
            other => Err(format!("unknown extraction mode '{other}' (expected permit or project)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    /// Files above this size go through the resumable upload.
    pub inline_limit_bytes: u64,
    pub upload_poll_attempts: u32,
    pub upload_poll_interval_ms: u64,
    pub mode: ExtractionMode,
    /// Appended to permit addresses by the model.
    pub address_suffix: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            inline_limit_bytes: 20 * 1024 * 1024,
            upload_poll_attempts: 10,
            upload_poll_interval_ms: 2_000,
            mode: ExtractionMode::Permit,
            address_suffix: " Marion Indiana 46952".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ArcgisConfig {
    pub portal_url: String,
    pub geocode_url: String,
    pub feature_layer_url: String,
    pub referer: String,
    pub token_expiration_minutes: u32,
}

impl Default for ArcgisConfig {
    fn default() -> Self {
        Self {
            portal_url: "https://www.arcgis.com/sharing/rest".to_string(),
            geocode_url: "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer"
                .to_string(),
            feature_layer_url: "https://services5.arcgis.com/S5JQ6TlhA1BbeUBC/arcgis/rest/services/AIGeocoder/FeatureServer/0".to_string(),
            referer: "http://localhost".to_string(),
            token_expiration_minutes: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BufferConfig {
    /// Buffer distance in meters around every project part.
    pub distance_m: f64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { distance_m: 10.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IntakeConfig {
    pub max_file_size_bytes: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 100 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Disambiguating context appended to every geocode query, e.g. "Marion, IN".
    pub location_details: Option<String>,
    pub require_location_details: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}
