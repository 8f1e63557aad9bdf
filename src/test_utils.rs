//! Test utilities and fixtures for bookbinder tests.
//!
//! This module provides directory builders, in-memory stand-ins for the
//! three pipeline collaborators, and a writer for tiny valid MP3 files so
//! lofty has something real to parse.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{MockProbe, catalog_of};
//!
//! let mut catalog = catalog_of(&[("1.mp3", 0.0)]);
//! let probe = MockProbe::with_durations(&[("1.mp3", 60.0)]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::metadata::TagUpdate;
use crate::model::{Catalog, Track};
use crate::pipeline::{DurationProbe, Encoder, TagEditor};
use crate::tools::ffmpeg::MergeJob;

/// Create empty files with the given names in `dir`.
pub fn touch_all(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"").expect("Failed to create test file");
    }
}

/// Sorted names of the regular files in `dir`.
pub fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to list test directory")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// A resolved catalog rooted at `/books` that does not touch the disk.
///
/// Ordinals follow the slice order and titles are `"Chapter <n>"`.
pub fn catalog_of(entries: &[(&str, f64)]) -> Catalog {
    catalog_in(Path::new("/books"), entries)
}

/// Like [`catalog_of`], rooted at `dir`.
pub fn catalog_in(dir: &Path, entries: &[(&str, f64)]) -> Catalog {
    let tracks = entries
        .iter()
        .enumerate()
        .map(|(i, (name, secs))| {
            let ordinal = i as u32 + 1;
            Track {
                source_path: dir.join(name),
                canonical_name: name.to_string(),
                ordinal,
                duration_secs: *secs,
                chapter_title: format!("Chapter {}", ordinal),
            }
        })
        .collect();
    Catalog {
        dir: dir.to_path_buf(),
        tracks,
    }
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Duration probe answering from a fixed table keyed by file name.
#[derive(Debug, Default)]
pub struct MockProbe {
    durations: HashMap<String, f64>,
}

impl MockProbe {
    pub fn with_durations(entries: &[(&str, f64)]) -> Self {
        Self {
            durations: entries
                .iter()
                .map(|(name, secs)| (name.to_string(), *secs))
                .collect(),
        }
    }
}

impl DurationProbe for MockProbe {
    fn duration(&self, path: &Path) -> Result<f64> {
        self.durations
            .get(&name_of(path))
            .copied()
            .ok_or_else(|| Error::probe(path, "no duration in mock"))
    }
}

/// What one rewrite asked for: `(ordinal, total, author, album)`.
pub type RewriteRecord = (u32, u32, Option<String>, Option<String>);

/// Tag editor that keeps titles in memory and records every rewrite.
#[derive(Debug, Default)]
pub struct MockTags {
    titles: HashMap<String, String>,
    failing: Option<String>,
    rewrites: RefCell<Vec<(PathBuf, RewriteRecord)>>,
}

impl MockTags {
    pub fn with_titles(entries: &[(&str, &str)]) -> Self {
        Self {
            titles: entries
                .iter()
                .map(|(name, title)| (name.to_string(), title.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    /// Every read and rewrite of `name` fails.
    pub fn failing_on(name: &str) -> Self {
        Self {
            failing: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn rewritten(&self) -> Vec<(PathBuf, RewriteRecord)> {
        self.rewrites.borrow().clone()
    }

    fn check(&self, path: &Path) -> Result<()> {
        match &self.failing {
            Some(name) if *name == name_of(path) => Err(Error::tag(path, "mock tag failure")),
            _ => Ok(()),
        }
    }
}

impl TagEditor for MockTags {
    fn read_title(&self, path: &Path) -> Result<Option<String>> {
        self.check(path)?;
        Ok(self.titles.get(&name_of(path)).cloned())
    }

    fn rewrite(&self, path: &Path, update: &TagUpdate<'_>) -> Result<()> {
        self.check(path)?;
        self.rewrites.borrow_mut().push((
            path.to_path_buf(),
            (
                update.ordinal,
                update.total,
                update.author.map(str::to_string),
                update.album.map(str::to_string),
            ),
        ));
        Ok(())
    }
}

/// Encoder that records the job and snapshots the chapter file it was given.
#[derive(Debug, Default)]
pub struct MockEncoder {
    failure: Option<String>,
    job: RefCell<Option<MergeJob>>,
    artifact: RefCell<Option<String>>,
}

impl MockEncoder {
    /// Fails every encode with `stderr` as the diagnostic output.
    pub fn failing(stderr: &str) -> Self {
        Self {
            failure: Some(stderr.to_string()),
            ..Default::default()
        }
    }

    pub fn last_job(&self) -> Option<MergeJob> {
        self.job.borrow().clone()
    }

    /// Contents of the chapter file as it was while the encoder ran.
    pub fn artifact_contents(&self) -> Option<String> {
        self.artifact.borrow().clone()
    }
}

impl Encoder for MockEncoder {
    fn encode(&self, job: &MergeJob) -> Result<()> {
        *self.job.borrow_mut() = Some(job.clone());
        *self.artifact.borrow_mut() = std::fs::read_to_string(&job.chapters_file).ok();

        match &self.failure {
            Some(stderr) => Err(Error::Encode {
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// An executable `sh` script in `dir` standing in for an external tool.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-tool");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write fake tool");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake tool executable");
    path
}

/// Write a short, silent MPEG-1 Layer III stream (128 kbps, 44.1 kHz).
pub fn write_silent_mp3(path: &Path) {
    const FRAME_LEN: usize = 417;
    const FRAMES: usize = 20;

    let mut data = Vec::with_capacity(FRAME_LEN * FRAMES);
    for _ in 0..FRAMES {
        let mut frame = vec![0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
        data.extend_from_slice(&frame);
    }
    std::fs::write(path, data).expect("Failed to write test mp3");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_touch_all_and_listing() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["b.mp3", "a.mp3"]);
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        assert_eq!(dir_listing(dir.path()), vec!["a.mp3", "b.mp3"]);
    }

    #[test]
    fn test_catalog_of_defaults() {
        let catalog = catalog_of(&[("1.mp3", 60.0), ("2.mp3", 30.0)]);
        assert_eq!(catalog.dir, PathBuf::from("/books"));
        assert_eq!(catalog.tracks[1].ordinal, 2);
        assert_eq!(catalog.tracks[1].source_path, PathBuf::from("/books/2.mp3"));
        assert_eq!(catalog.tracks[1].chapter_title, "Chapter 2");
    }

    #[test]
    fn test_mock_probe_unknown_file() {
        let probe = MockProbe::with_durations(&[("1.mp3", 1.5)]);
        assert_eq!(probe.duration(Path::new("/x/1.mp3")).unwrap(), 1.5);
        assert!(probe.duration(Path::new("/x/2.mp3")).is_err());
    }

    #[test]
    fn test_mock_encoder_failure() {
        let encoder = MockEncoder::failing("boom");
        let job = MergeJob {
            inputs: vec![],
            chapters_file: PathBuf::from("/nowhere/chapters.txt"),
            output: PathBuf::from("/nowhere/out.m4b"),
        };
        assert!(encoder.encode(&job).is_err());
        assert_eq!(encoder.last_job(), Some(job));
        assert_eq!(encoder.artifact_contents(), None);
    }

    #[test]
    fn test_write_silent_mp3_is_readable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("1.mp3");
        write_silent_mp3(&path);

        let tagged = lofty::probe::Probe::open(&path).unwrap().read();
        assert!(tagged.is_ok());
    }
}
