use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::recorder::{Extrema, TapInterval};
use crate::stats::{compute_stats, TapStats};

pub const CSV_FILE_NAME: &str = "taps.csv";
pub const JSON_FILE_NAME: &str = "taps.json";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(#[from] io::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Statistics block of the JSON export
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudReport {
    pub count: usize,
    pub total_on_time: u64,
    pub average_on_time: f64,
    pub gaps: Vec<u64>,
    pub average_gap: Option<f64>,
    pub total_gap_time: Option<u64>,
    pub total_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_gap: Option<u64>,
}

impl HudReport {
    pub fn new(stats: &TapStats, extrema: Option<Extrema>) -> Self {
        Self {
            count: stats.count,
            total_on_time: stats.total_on_time,
            average_on_time: stats.average_on_time,
            gaps: stats
                .gaps
                .as_ref()
                .map(|g| g.gaps.clone())
                .unwrap_or_default(),
            average_gap: stats.gaps.as_ref().map(|g| g.average_gap),
            total_gap_time: stats.gaps.as_ref().map(|g| g.total_gap_time),
            total_time: stats.total_time(),
            max_duration: extrema.map(|e| e.max_duration),
            max_gap: extrema.map(|e| e.max_gap),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    taps: &'a [TapInterval],
    hud: Option<HudReport>,
}

/// `start,end` per line, newline terminated, no header
pub fn to_csv(history: &[TapInterval]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    for tap in history {
        wtr.write_record([tap.start.to_string(), tap.end.to_string()])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// `{"taps": [...], "hud": {...}}`; `hud` is null while there are no taps
pub fn to_json(history: &[TapInterval], extrema: Option<Extrema>) -> Result<String, ExportError> {
    let export = JsonExport {
        taps: history,
        hud: compute_stats(history).map(|stats| HudReport::new(&stats, extrema)),
    };
    Ok(serde_json::to_string(&export)?)
}

pub fn export_csv(dir: &Path, history: &[TapInterval]) -> Result<PathBuf, ExportError> {
    write_export(dir, CSV_FILE_NAME, &to_csv(history)?)
}

pub fn export_json(
    dir: &Path,
    history: &[TapInterval],
    extrema: Option<Extrema>,
) -> Result<PathBuf, ExportError> {
    write_export(dir, JSON_FILE_NAME, &to_json(history, extrema)?)
}

fn write_export(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name);
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, contents))
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "exported taps");
    Ok(path)
}
