//! Client side of report downloads: formats, filenames and where files land.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

use crate::error::InputError;

pub const DEFAULT_CSV_FILENAME: &str = "weatherwise_analysis.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub const fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Csv, ExportFormat::Json]
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = InputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(InputError::unknown_variant("format", value, &["csv", "json"])),
        }
    }
}

/// Body of `POST /api/download`.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadRequest<'a> {
    pub format: ExportFormat,
    pub data: &'a Value,
}

/// Raw CSV response together with its `Content-Disposition` header, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvDownload {
    pub content_disposition: Option<String>,
    pub bytes: Vec<u8>,
}

impl CsvDownload {
    pub fn filename(&self) -> String {
        filename_from_content_disposition(self.content_disposition.as_deref())
    }
}

/// JSON export envelope: `{success, filename, content}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonEnvelope {
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content: Value,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("no historical analysis has been loaded")]
    NoAnalysis,

    #[error("backend declined the export")]
    Rejected,

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Filename announced by a `Content-Disposition` header, or the default CSV name.
pub fn filename_from_content_disposition(header: Option<&str>) -> String {
    header
        .and_then(|value| value.split_once("filename="))
        .map(|(_, rest)| rest.split(';').next().unwrap_or_default())
        .map(|name| name.trim().trim_matches('"').trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_CSV_FILENAME.to_string())
}

/// Two-space indented JSON, the layout of exported `.json` reports.
pub fn pretty_json(content: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(content).context("Failed to serialize export content")
}

/// Destination for downloaded reports.
pub trait FileSink: Send + Sync {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Writes reports into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        // Server-chosen names must not escape the download directory.
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| anyhow!("Refusing to save download under name '{filename}'"))?;

        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create download directory: {}", self.dir.display())
        })?;

        let path = self.dir.join(name);
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write download: {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filename_from_header() {
        let name = filename_from_content_disposition(Some(
            "attachment; filename=weatherwise_analysis_Pune_Maharashtra_India.csv",
        ));
        assert_eq!(name, "weatherwise_analysis_Pune_Maharashtra_India.csv");
    }

    #[test]
    fn filename_strips_quotes_and_trailing_params() {
        let name =
            filename_from_content_disposition(Some(r#"attachment; filename="r.csv"; size=10"#));
        assert_eq!(name, "r.csv");
    }

    #[test]
    fn filename_falls_back_to_default() {
        assert_eq!(filename_from_content_disposition(None), DEFAULT_CSV_FILENAME);
        assert_eq!(filename_from_content_disposition(Some("attachment")), DEFAULT_CSV_FILENAME);
        assert_eq!(
            filename_from_content_disposition(Some("attachment; filename=\"\"")),
            DEFAULT_CSV_FILENAME
        );
    }

    #[test]
    fn pretty_json_uses_two_space_indent() {
        let bytes = pretty_json(&json!({"a": 1})).expect("serializable");
        assert_eq!(bytes, b"{\n  \"a\": 1\n}");
    }

    #[test]
    fn export_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn download_request_body_shape() {
        let data = json!({"location": {"name": "Delhi"}});
        let body = serde_json::to_value(DownloadRequest { format: ExportFormat::Json, data: &data })
            .expect("serializable");

        assert_eq!(body, json!({"format": "json", "data": {"location": {"name": "Delhi"}}}));
    }

    #[test]
    fn directory_sink_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = DirectorySink::new(dir.path().join("reports"));

        let path = sink.save("r.json", b"{}").expect("save");

        assert_eq!(path, dir.path().join("reports").join("r.json"));
        assert_eq!(fs::read(&path).expect("read back"), b"{}");
    }

    #[test]
    fn directory_sink_drops_path_components() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = DirectorySink::new(dir.path());

        let path = sink.save("../../etc/report.csv", b"x").expect("save");
        assert_eq!(path, dir.path().join("report.csv"));

        assert!(sink.save("..", b"x").is_err());
    }
}
