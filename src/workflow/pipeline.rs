//! Per-file processing: extract, geocode, buffer, publish.
//!
//! Files run strictly one after another and every call is awaited before the
//! next starts. A failure ends only the current file.

use super::log::ProcessingLog;
use crate::ai::{ExtractionResult, Extractor, PermitRecord, ProjectRecord};
use crate::arcgis::{qualify, EsriGeometry, Feature, FeaturePublisher, Geocoder};
use crate::error::{Error, Result};
use crate::geometry::{geodesic_area, line_between, point_at, GeodesicBuffer, PartGeometry};
use crate::intake::UploadedFile;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::Instrument;

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileStatus {
    Published { object_id: Option<i64> },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub name: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub run_id: String,
    pub reports: Vec<FileReport>,
}

impl BatchOutcome {
    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.status)).count()
    }

    pub fn published(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Published { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }
}

/// The extraction → geocode → buffer → publish chain.
#[derive(Clone)]
pub struct Pipeline {
    extractor: Arc<dyn Extractor>,
    geocoder: Arc<dyn Geocoder>,
    publisher: Arc<dyn FeaturePublisher>,
    buffer: GeodesicBuffer,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        geocoder: Arc<dyn Geocoder>,
        publisher: Arc<dyn FeaturePublisher>,
        buffer: GeodesicBuffer,
    ) -> Self {
        Self {
            extractor,
            geocoder,
            publisher,
            buffer,
        }
    }

    /// Process `files` in order. `context` is appended to every geocode query.
    pub async fn run(
        &self,
        files: &[UploadedFile],
        token: &str,
        context: Option<&str>,
        log: &mut ProcessingLog,
    ) -> BatchOutcome {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("batch", run_id = %run_id, files = files.len());
        self.run_files(run_id, files, token, context, log)
            .instrument(span)
            .await
    }

    async fn run_files(
        &self,
        run_id: String,
        files: &[UploadedFile],
        token: &str,
        context: Option<&str>,
        log: &mut ProcessingLog,
    ) -> BatchOutcome {
        log.push("--- Geocoding Process Started ---");
        let mut outcome = BatchOutcome {
            run_id,
            reports: Vec::with_capacity(files.len()),
        };
        if files.is_empty() {
            log.push("No files to process.");
        }

        for file in files {
            log.push(format!("Processing: {}", file.name));
            let status = match self.process_file(file, token, context, log).await {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!(file = %file.name, error = %e, "file failed");
                    log.push(format!("  Error: {e}"));
                    FileStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            outcome.reports.push(FileReport {
                name: file.name.clone(),
                status,
            });
        }

        log.push("--- Geocoding Complete ---");
        tracing::info!(
            published = outcome.published(),
            skipped = outcome.skipped(),
            failed = outcome.failed(),
            "batch finished"
        );
        outcome
    }

    async fn process_file(
        &self,
        file: &UploadedFile,
        token: &str,
        context: Option<&str>,
        log: &mut ProcessingLog,
    ) -> Result<FileStatus> {
        log.push("  Sending to AI...");
        match self.extractor.extract(file).await? {
            ExtractionResult::Permit(record) => {
                self.publish_permit(file, record, token, context, log).await
            }
            ExtractionResult::Project(record) => {
                self.publish_project(file, record, token, context, log).await
            }
        }
    }

    async fn publish_permit(
        &self,
        file: &UploadedFile,
        record: PermitRecord,
        token: &str,
        context: Option<&str>,
        log: &mut ProcessingLog,
    ) -> Result<FileStatus> {
        let Some(address) = record.address.clone() else {
            log.push("  Found address: [none]");
            log.push(format!("  No address found; skipping {}", file.name));
            return Ok(FileStatus::Skipped {
                reason: "no address".to_string(),
            });
        };
        log.push(format!("  Found address: {address}"));

        log.push("  Geocoding address...");
        let query = qualify(&address, context);
        let location = self
            .geocoder
            .geocode(&query, Some(token))
            .await?
            .ok_or_else(|| Error::NoCandidates {
                query: query.clone(),
            })?;

        let feature = Feature {
            attributes: permit_attributes(&record),
            geometry: EsriGeometry::point(location),
        };
        self.publish(file, &feature, token, log).await
    }

    async fn publish_project(
        &self,
        file: &UploadedFile,
        record: ProjectRecord,
        token: &str,
        context: Option<&str>,
        log: &mut ProcessingLog,
    ) -> Result<FileStatus> {
        let name = record.project_name.as_deref().unwrap_or("[unnamed]");
        log.push(format!(
            "  Found project: {name} ({} part{})",
            record.parts.len(),
            if record.parts.len() == 1 { "" } else { "s" }
        ));
        if record.parts.is_empty() {
            log.push(format!("  No parts found; skipping {}", file.name));
            return Ok(FileStatus::Skipped {
                reason: "no parts".to_string(),
            });
        }

        let mut geometries = Vec::with_capacity(record.parts.len());
        for (i, part) in record.parts.iter().enumerate() {
            let n = i + 1;
            let start_query = qualify(&part.start, context);
            log.push(format!("  Geocoding part {n} start: {start_query}"));
            let Some(start) = self.geocoder.geocode(&start_query, Some(token)).await? else {
                log.push(format!("  Geocode failed for: {start_query}; dropping part {n}"));
                continue;
            };
            let geometry = match part.finish.as_deref() {
                Some(finish) => {
                    let finish_query = qualify(finish, context);
                    log.push(format!("  Geocoding part {n} finish: {finish_query}"));
                    match self.geocoder.geocode(&finish_query, Some(token)).await? {
                        Some(end) => line_between(start, end),
                        None => {
                            log.push(format!(
                                "  Geocode failed for: {finish_query}; using start point only"
                            ));
                            point_at(start)
                        }
                    }
                }
                None => point_at(start),
            };
            geometries.push(geometry);
        }

        if geometries.is_empty() {
            return Err(Error::NoCandidates {
                query: record
                    .parts
                    .iter()
                    .map(|p| p.start.as_str())
                    .collect::<Vec<_>>()
                    .join(" | "),
            });
        }

        log.push(format!(
            "  Buffering {} part{} by {} m...",
            geometries.len(),
            if geometries.len() == 1 { "" } else { "s" },
            self.buffer.distance_m()
        ));
        let polygons = self.buffer.buffer_union(&geometries)?;
        let area = geodesic_area(&polygons);
        log.push(format!("  Buffered area: {area:.2} sq m"));

        let feature = Feature {
            attributes: project_attributes(&record, &geometries),
            geometry: EsriGeometry::polygon(&polygons),
        };
        self.publish(file, &feature, token, log).await
    }

    async fn publish(
        &self,
        file: &UploadedFile,
        feature: &Feature,
        token: &str,
        log: &mut ProcessingLog,
    ) -> Result<FileStatus> {
        log.push("  Adding feature to layer...");
        let result = self.publisher.add_feature(feature, token).await?;
        log.push(format!("  Added feature for {}", file.name));
        Ok(FileStatus::Published {
            object_id: result.object_id,
        })
    }
}

fn opt(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

fn permit_attributes(record: &PermitRecord) -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert("address".into(), opt(&record.address));
    attributes.insert("installdate".into(), opt(&record.date));
    attributes.insert("diameter".into(), json!(record.size));
    attributes.insert("material".into(), opt(&record.material));
    attributes.insert("notes".into(), opt(&record.notes));
    attributes
}

fn project_attributes(record: &ProjectRecord, geometries: &[PartGeometry]) -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert("project_name".into(), opt(&record.project_name));
    attributes.insert("project_number".into(), opt(&record.project_number));
    attributes.insert("project_date".into(), opt(&record.date));
    attributes.insert("notes".into(), opt(&record.notes));
    attributes.insert("part_count".into(), json!(geometries.len()));
    attributes
}
