// src/data.rs - Export committed reps and session summaries for the caller's storage
use crate::session::{FailureEvent, RepRecord, SessionSummary, VelocitySource};
use anyhow::{Context, Result};
use chrono::Local;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

const REP_HEADER: [&str; 5] = ["rep", "exercise", "peak_velocity", "fatigue_percent", "source"];
const FAILURE_HEADER: [&str; 3] = ["attempt", "exercise", "timestamp_ms"];

#[derive(Debug, Serialize)]
struct RepRow {
    rep: u32,
    exercise: &'static str,
    peak_velocity: f64,
    fatigue_percent: u8,
    source: &'static str,
}

#[derive(Debug, Serialize)]
struct FailureRow {
    attempt: u32,
    exercise: &'static str,
    timestamp_ms: f64,
}

pub struct SessionExporter {
    output_dir: PathBuf,
    session_name: String,
}

impl SessionExporter {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
        }
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn export_reps_csv(&self, records: &[RepRecord]) -> Result<PathBuf> {
        let rows = records.iter().map(|r| RepRow {
            rep: r.index,
            exercise: r.exercise.name(),
            peak_velocity: r.peak_velocity,
            fatigue_percent: r.fatigue_percent,
            source: source_name(r.source),
        });
        self.write_csv("reps.csv", &REP_HEADER, rows)
    }

    pub fn export_failures_csv(&self, failures: &[FailureEvent]) -> Result<PathBuf> {
        let rows = failures.iter().map(|f| FailureRow {
            attempt: f.attempt_index,
            exercise: f.exercise.name(),
            timestamp_ms: f.timestamp_ms,
        });
        self.write_csv("failures.csv", &FAILURE_HEADER, rows)
    }

    pub fn export_summary_json(&self, summary: &SessionSummary) -> Result<PathBuf> {
        let path = self.prepare("summary.json")?;
        let json = serde_json::to_string_pretty(summary)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    fn write_csv<T: Serialize>(
        &self,
        file_name: &str,
        header: &[&str],
        rows: impl Iterator<Item = T>,
    ) -> Result<PathBuf> {
        let path = self.prepare(file_name)?;
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        // Header goes out even for an empty set
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(header)?;

        for row in rows {
            writer.serialize(row)?;
        }

        writer.flush()?;
        Ok(path)
    }

    fn prepare(&self, file_name: &str) -> Result<PathBuf> {
        let dir = self.session_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(dir.join(file_name))
    }
}

fn source_name(source: VelocitySource) -> &'static str {
    match source {
        VelocitySource::Vision => "camera",
        VelocitySource::Inertial => "sensor",
    }
}
