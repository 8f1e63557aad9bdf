//! Core data models for one binding run.
//!
//! A [`Catalog`] is the ordered list of [`Track`]s found in the source
//! directory. It is built once per run, mutated in place while files are
//! renamed and durations/titles are resolved, and read-only afterwards.

use std::path::{Path, PathBuf};

/// One audio file under management.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Current filesystem location (updated as renames occur)
    pub source_path: PathBuf,
    /// Normalized file name assigned from `(ordinal, catalog length)`
    pub canonical_name: String,
    /// 1-based position in play order
    pub ordinal: u32,
    /// Playback length in seconds, resolved once
    pub duration_secs: f64,
    /// Display title, never empty once resolved
    pub chapter_title: String,
}

impl Track {
    /// A freshly discovered track, before ordering and resolution.
    pub fn discovered(path: impl Into<PathBuf>) -> Self {
        let source_path = path.into();
        let canonical_name = file_name(&source_path).to_string();
        Self {
            source_path,
            canonical_name,
            ordinal: 0,
            duration_secs: 0.0,
            chapter_title: String::new(),
        }
    }

    /// The file name component of the current path.
    pub fn file_name(&self) -> &str {
        file_name(&self.source_path)
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Ordered collection of tracks for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Directory all tracks live in
    pub dir: PathBuf,
    pub tracks: Vec<Track>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    /// Sum of all resolved durations in seconds.
    pub fn total_duration_secs(&self) -> f64 {
        self.tracks.iter().map(|t| t.duration_secs).sum()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
