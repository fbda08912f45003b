//! Configuration loading.
//!
//! The file lives at `<config dir>/ailocator/config.toml` unless a path is
//! given explicitly. A missing file is not an error; defaults apply.

mod schema;

pub use schema::{
    AiConfig, ArcgisConfig, BufferConfig, Config, ExtractionMode, HttpConfig, IntakeConfig,
    WorkflowConfig,
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Default config file location, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ailocator").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from `path` (tilde-expanded), or from [`Config::default_path`].
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(PathBuf::from(shellexpand::tilde(p).to_string())),
            None => Self::default_path(),
        };
        match path {
            Some(p) if p.exists() => Self::load_from(&p),
            Some(p) => {
                tracing::debug!(path = %p.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// JSON Schema for the config file, for editor tooling.
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(Config);
        serde_json::to_string_pretty(&schema).context("Failed to serialize config schema")
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Shared HTTP client for every service call.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout())
            .build()
            .context("Failed to build HTTP client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("[buffer]\ndistance_m = 25.0\n").unwrap();
        assert_eq!(config.buffer.distance_m, 25.0);
        assert!(config.workflow.location_details.is_none());
        assert_eq!(config.ai.mode, ExtractionMode::Permit);
        assert_eq!(config.intake.max_file_size_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn load_reads_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ai]\nmode = \"project\"\nmodel = \"gemini-test\"").unwrap();
        let config = Config::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.ai.mode, ExtractionMode::Project);
        assert_eq!(config.ai.model, "gemini-test");
    }

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.http.timeout_secs, 120);
    }

    #[test]
    fn toml_round_trips_through_defaults() {
        let rendered = Config::default().to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.arcgis.portal_url, Config::default().arcgis.portal_url);
    }

    #[test]
    fn schema_names_sections() {
        let schema = Config::json_schema().unwrap();
        assert!(schema.contains("buffer"));
        assert!(schema.contains("workflow"));
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Project".parse::<ExtractionMode>(), Ok(ExtractionMode::Project));
        assert!("plan".parse::<ExtractionMode>().is_err());
    }
}
