//! The merge invocation of `ffmpeg`.
//!
//! All tracks become inputs `0..K`, the chapter-metadata file is input `K`.
//! Audio streams are joined with the `concat` filter, re-encoded, and the
//! container takes its global metadata and chapters from input `K`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::RunError;
use crate::config::EncoderConfig;
use crate::error::{Error, Result};
use crate::pipeline::Encoder;

/// How much of ffmpeg's stderr an [`Error::Encode`] carries
const STDERR_TAIL_BYTES: usize = 64 * 1024;

/// File name used when neither author nor title is known
pub const DEFAULT_OUTPUT_NAME: &str = "audiobook.m4b";

/// Everything the encoder needs for one merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeJob {
    /// Tracks in play order
    pub inputs: Vec<PathBuf>,
    /// FFMETADATA1 chapter file
    pub chapters_file: PathBuf,
    /// Destination container
    pub output: PathBuf,
}

/// `ffmpeg`-backed encoder
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: String,
    timeout: Option<Duration>,
    settings: EncoderConfig,
}

impl Ffmpeg {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>, settings: EncoderConfig) -> Self {
        Self {
            program: program.into(),
            timeout,
            settings,
        }
    }
}

impl Encoder for Ffmpeg {
    fn encode(&self, job: &MergeJob) -> Result<()> {
        let args = build_args(job, &self.settings);
        tracing::debug!(target: "tools::ffmpeg", ?args, "Running ffmpeg");

        let output = super::run_streaming(&self.program, &args, self.timeout, STDERR_TAIL_BYTES)
            .map_err(|e| Error::Encode {
                status: match e {
                    RunError::TimedOut { .. } => "timed out".to_string(),
                    _ => "not started".to_string(),
                },
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Encode {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr_tail).into_owned(),
            });
        }

        tracing::info!(target: "tools::ffmpeg", output = %job.output.display(), "Merge finished");
        Ok(())
    }
}

/// Output file name for an `(author, title)` pair.
pub fn output_file_name(author: Option<&str>, title: Option<&str>) -> String {
    match (author, title) {
        (Some(author), Some(title)) => format!(
            "{} - {}.m4b",
            sanitize_filename(author),
            sanitize_filename(title)
        ),
        (None, Some(title)) => format!("{}.m4b", sanitize_filename(title)),
        _ => DEFAULT_OUTPUT_NAME.to_string(),
    }
}

/// Sanitizes a filename by removing/replacing invalid characters
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// `[0:a] [1:a] … concat=n=K:v=0:a=1 [out]`
pub fn concat_filter(count: usize) -> String {
    let inputs: Vec<String> = (0..count).map(|i| format!("[{}:a]", i)).collect();
    format!("{} concat=n={}:v=0:a=1 [out]", inputs.join(" "), count)
}

/// Full argument list for the merge, without the program name.
pub fn build_args(job: &MergeJob, settings: &EncoderConfig) -> Vec<OsString> {
    let count = job.inputs.len();
    let mut args: Vec<OsString> = Vec::with_capacity(2 * count + 32);

    for input in &job.inputs {
        args.push("-i".into());
        args.push(input.into());
    }
    args.push("-i".into());
    args.push(job.chapters_file.as_path().into());

    let filter = concat_filter(count);
    let metadata_input = count.to_string();
    let sample_rate = settings.sample_rate.to_string();
    let fixed: [&str; 18] = [
        "-filter_complex",
        &filter,
        "-map",
        "[out]",
        "-map_metadata",
        &metadata_input,
        "-map_chapters",
        &metadata_input,
        "-c:a",
        &settings.codec,
        "-b:a",
        &settings.bitrate,
        "-ar",
        &sample_rate,
        "-f",
        "mp4",
        "-brand",
        "M4B ",
    ];
    args.extend(fixed.iter().map(OsString::from));

    if settings.faststart {
        args.push("-movflags".into());
        args.push("+faststart".into());
    }
    args.push("-metadata".into());
    args.push("media_type=audiobook".into());
    args.push("-y".into());
    args.push(job.output.as_path().into());
    args
}

/// Where the merged book goes: next to the tracks.
pub fn output_path(dir: &Path, author: Option<&str>, title: Option<&str>) -> PathBuf {
    dir.join(output_file_name(author, title))
}
