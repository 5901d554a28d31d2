// src/main.rs - Replay a recorded capture through the tracker and export the set
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::{info, warn};

use vbt_tracker::data::SessionExporter;
use vbt_tracker::mediapipe_bridge::frame_from_landmarks;
use vbt_tracker::pipeline::{spawn_tracker, TrackerOutput};
use vbt_tracker::sensor_bridge::{decode_accel_payload, SENSOR_DEVICE_NAME};
use vbt_tracker::{Exercise, RepEvent, TrackerConfig, VbtTracker};

#[derive(Parser, Debug)]
#[command(name = "vbt_replay", about = "Replay pose and sensor captures through the rep tracker")]
struct Cli {
    /// JSON-lines capture file
    input: PathBuf,

    #[arg(short, long, value_enum, default_value = "squat")]
    exercise: ExerciseArg,

    /// Tracker configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for reps.csv and summary.json
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    session_name: Option<String>,

    /// Skip writing export files
    #[arg(long, default_value_t = false)]
    no_export: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExerciseArg {
    Squat,
    Deadlift,
}

impl From<ExerciseArg> for Exercise {
    fn from(arg: ExerciseArg) -> Self {
        match arg {
            ExerciseArg::Squat => Exercise::Squat,
            ExerciseArg::Deadlift => Exercise::Deadlift,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CaptureEvent {
    Pose {
        timestamp_ms: f64,
        width: u32,
        height: u32,
        landmarks: Vec<[f64; 4]>,
    },
    Accel {
        timestamp_ms: f64,
        value: f64,
    },
    Payload {
        timestamp_ms: f64,
        data: String,
    },
    Sensor {
        connected: bool,
    },
    Reset,
}

fn default_output_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|p| p.join("VbtTracker")))
        .unwrap_or_else(|| PathBuf::from("./output"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let exercise = Exercise::from(cli.exercise);

    let config = match &cli.config {
        Some(path) => TrackerConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TrackerConfig::default(),
    };

    let (camera, mut outputs, task) = spawn_tracker(VbtTracker::new(config), 256);
    let sensor = camera.clone();

    let reporter = tokio::spawn(async move {
        while let Some(output) = outputs.recv().await {
            if let TrackerOutput::Frame(frame) = output {
                match frame.rep_event {
                    Some(RepEvent::Committed(rep)) => println!(
                        "rep {:>2}  {:.2} m/s  loss {:>3}%",
                        rep.index, rep.peak_velocity, rep.fatigue_percent
                    ),
                    Some(RepEvent::Failed(fail)) => {
                        println!("rep {:>2}  no depth", fail.attempt_index)
                    }
                    None => {}
                }
            }
        }
    });

    let file = std::fs::File::open(&cli.input)
        .with_context(|| format!("Failed to open capture {}", cli.input.display()))?;

    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event: CaptureEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "unreadable capture line skipped");
                continue;
            }
        };

        match event {
            CaptureEvent::Pose { timestamp_ms, width, height, landmarks } => {
                match frame_from_landmarks(&landmarks, width, height, timestamp_ms) {
                    Ok(frame) => camera.submit_frame(frame, exercise).await?,
                    Err(e) => warn!(line = line_no + 1, error = %e, "pose frame dropped"),
                }
            }
            CaptureEvent::Accel { timestamp_ms, value } => {
                sensor.submit_accel_sample(value, timestamp_ms).await?
            }
            CaptureEvent::Payload { timestamp_ms, data } => {
                match decode_accel_payload(data.as_bytes()) {
                    Ok(value) => sensor.submit_accel_sample(value, timestamp_ms).await?,
                    Err(e) => warn!(line = line_no + 1, error = %e, "sensor payload dropped"),
                }
            }
            CaptureEvent::Sensor { connected } => {
                info!(device = SENSOR_DEVICE_NAME, connected, "sensor link changed");
                sensor.set_inertial_active(connected).await?
            }
            CaptureEvent::Reset => camera.reset_session().await?,
        }
    }

    let summary = camera.close_session().await?;

    // Dropping the last handles lets the tracker task finish and hand the session back
    drop(camera);
    drop(sensor);
    let tracker = task.await.context("Tracker task failed")?;
    reporter.await.ok();

    if !cli.no_export {
        let exporter = SessionExporter::new(
            cli.output.clone().unwrap_or_else(default_output_dir),
            cli.session_name.clone(),
        );
        let reps = exporter.export_reps_csv(tracker.session().records())?;
        exporter.export_failures_csv(tracker.session().failures())?;
        exporter.export_summary_json(&summary)?;
        info!(path = %reps.display(), "session exported");
    }

    println!(
        "{} reps, best {:.2} m/s, {} failed",
        summary.rep_count, summary.best_velocity, summary.failed_attempts
    );
    Ok(())
}
