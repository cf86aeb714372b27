//! Export documents.
//!
//! Two kinds of pretty-printed JSON file, both written to the export
//! directory (a cache location by default):
//! - `retinai-history-<millis>.json`: the full scan history
//! - `retinai-results-<millis>.json`: one classification result

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::error::Result;
use crate::history::{RiskLevel, ScanRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDocument {
    pub exported_at: DateTime<Utc>,
    pub count: usize,
    pub scans: Vec<ScanRecord>,
}

impl HistoryDocument {
    /// None for an empty history.
    pub fn build(records: &[ScanRecord], exported_at: DateTime<Utc>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        Some(HistoryDocument {
            exported_at,
            count: records.len(),
            scans: records.to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsDocument {
    pub generated_at: DateTime<Utc>,
    pub results: ResultsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPayload {
    pub overall_risk: RiskLevel,
    pub confidence: f64,
    pub diseases: Vec<DiseaseEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseEntry {
    pub name: String,
    pub probability: f64,
    pub description: String,
}

impl ResultsDocument {
    pub fn build(classification: &Classification, generated_at: DateTime<Utc>) -> Self {
        ResultsDocument {
            generated_at,
            results: ResultsPayload {
                overall_risk: classification.overall_risk,
                confidence: classification.confidence,
                diseases: classification
                    .all
                    .iter()
                    .map(|c| DiseaseEntry {
                        name: c.name.to_string(),
                        probability: c.probability,
                        description: c.description.to_string(),
                    })
                    .collect(),
            },
        }
    }
}

/// Writes export documents into one directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Exporter { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// None when `records` is empty, nothing is written in that case.
    pub fn write_history(&self, records: &[ScanRecord]) -> Result<Option<PathBuf>> {
        let now = Utc::now();
        let Some(document) = HistoryDocument::build(records, now) else {
            return Ok(None);
        };

        let path = self.write("retinai-history", now, &document)?;
        tracing::debug!(path = %path.display(), count = document.count, "exported history");
        Ok(Some(path))
    }

    pub fn write_results(&self, classification: &Classification) -> Result<PathBuf> {
        let now = Utc::now();
        let document = ResultsDocument::build(classification, now);

        let path = self.write("retinai-results", now, &document)?;
        tracing::debug!(path = %path.display(), "exported classification result");
        Ok(path)
    }

    fn write<T: Serialize>(&self, prefix: &str, at: DateTime<Utc>, document: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(format!("{prefix}-{}.json", at.timestamp_millis()));
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&path, json)?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ApWeightedClassifier, Classifier};
    use tempfile::TempDir;

    fn sample(id: &str, at: &str) -> ScanRecord {
        ScanRecord {
            id: id.to_string(),
            created_at: at.parse().unwrap(),
            image_uri: format!("/docs/images/{id}.jpg"),
            overall_risk: RiskLevel::Low,
            main_condition: "Normal".to_string(),
            confidence: 0.2,
        }
    }

    #[test]
    fn empty_history_builds_no_document() {
        assert!(HistoryDocument::build(&[], Utc::now()).is_none());
    }

    #[test]
    fn empty_history_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path().join("exports"));

        assert!(exporter.write_history(&[]).unwrap().is_none());
        assert!(!exporter.dir().exists());
    }

    #[test]
    fn history_document_uses_camel_case_fields() {
        let records = vec![sample("1", "2024-01-01T00:00:00Z")];
        let doc = HistoryDocument::build(&records, "2024-02-01T00:00:00Z".parse().unwrap()).unwrap();

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["exportedAt"], "2024-02-01T00:00:00Z");
        assert_eq!(value["scans"][0]["mainCondition"], "Normal");
        assert_eq!(value["scans"][0]["overallRisk"], "low");
    }

    #[test]
    fn history_file_name_and_content() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());
        let records = vec![
            sample("2", "2024-01-02T00:00:00Z"),
            sample("1", "2024-01-01T00:00:00Z"),
        ];

        let path = exporter.write_history(&records).unwrap().unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("retinai-history-"));
        assert!(name.ends_with(".json"));

        let doc: HistoryDocument = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc.count, 2);
        assert_eq!(doc.scans, records);
    }

    #[test]
    fn results_document_lists_every_condition() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());
        let classification = ApWeightedClassifier::with_seed(5).classify();

        let path = exporter.write_results(&classification).unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("retinai-results-"));

        let doc: ResultsDocument = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc.results.overall_risk, classification.overall_risk);
        assert_eq!(doc.results.diseases.len(), classification.all.len());
        assert_eq!(doc.results.diseases[0].name, classification.predicted.name);
    }
}
