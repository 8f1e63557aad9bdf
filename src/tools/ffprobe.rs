//! Track durations via `ffprobe`.
//!
//! Runs `ffprobe -v quiet -print_format json -show_format <file>` and reads
//! `format.duration`, which ffprobe reports as a decimal string of seconds.

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::pipeline::DurationProbe;

/// `ffprobe`-backed duration probe
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: String,
    timeout: Option<Duration>,
}

impl Ffprobe {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl DurationProbe for Ffprobe {
    fn duration(&self, path: &Path) -> Result<f64> {
        let output = super::run(
            &self.program,
            [
                OsStr::new("-v"),
                OsStr::new("quiet"),
                OsStr::new("-print_format"),
                OsStr::new("json"),
                OsStr::new("-show_format"),
                path.as_os_str(),
            ],
            self.timeout,
        )
        .map_err(|e| Error::probe(path, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::probe(
                path,
                format!("ffprobe failed ({}): {}", output.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let secs = parse_ffprobe_json(&stdout).map_err(|msg| Error::probe(path, msg))?;
        tracing::debug!(target: "tools::ffprobe", path = %path.display(), secs, "Probed duration");
        Ok(secs)
    }
}

/// Parse the JSON output from ffprobe into seconds
fn parse_ffprobe_json(json: &str) -> std::result::Result<f64, String> {
    let parsed: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse ffprobe output: {}", e))?;

    let raw = parsed
        .format
        .duration
        .ok_or_else(|| "ffprobe output has no format.duration".to_string())?;

    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("Failed to parse duration {:?}: {}", raw, e))?;

    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("Invalid duration {:?}", raw));
    }
    Ok(secs)
}

/// ffprobe `-show_format` JSON output structure
#[derive(Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}
