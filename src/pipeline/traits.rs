//! Trait definitions for the pipeline's external collaborators.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses [`Ffprobe`](crate::tools::Ffprobe),
//! [`LoftyTags`](crate::metadata::LoftyTags) and
//! [`Ffmpeg`](crate::tools::Ffmpeg); tests substitute the mocks in
//! `test_utils`.

use std::path::Path;

use crate::error::Result;
use crate::metadata::TagUpdate;
use crate::tools::ffmpeg::MergeJob;

/// Reports the playback length of one audio file.
pub trait DurationProbe {
    /// Duration in seconds. Failure is fatal to the run.
    fn duration(&self, path: &Path) -> Result<f64>;
}

/// Reads and rewrites per-track metadata tags.
pub trait TagEditor {
    /// Embedded title, if the file has a tag carrying one.
    fn read_title(&self, path: &Path) -> Result<Option<String>>;

    /// Apply `update` to the file's tag and persist it.
    fn rewrite(&self, path: &Path, update: &TagUpdate<'_>) -> Result<()>;
}

/// Concatenates tracks into the final chaptered container.
pub trait Encoder {
    fn encode(&self, job: &MergeJob) -> Result<()>;
}
