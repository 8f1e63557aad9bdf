//! Chapter timeline construction.
//!
//! One chapter per track, in catalog order. A running cursor (seconds,
//! `f64`) is advanced by each duration; both chapter edges are rounded from
//! the cursor to whole milliseconds, so consecutive chapters always share an
//! edge and the last one ends at `round(sum(durations) * 1000)`.

mod ffmetadata;
mod simple;

pub use ffmetadata::{ChapterArtifact, GlobalMetadata, escape_value, render_ffmetadata};
pub use simple::render_simple;

use crate::model::Track;

/// One chapter: the half-open interval `[start_ms, end_ms)` plus a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterEntry {
    pub start_ms: u64,
    pub end_ms: u64,
    pub title: String,
}

impl ChapterEntry {
    /// Create a new chapter entry.
    pub fn new(title: impl Into<String>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            title: title.into(),
            start_ms,
            end_ms,
        }
    }
}

fn to_millis(secs: f64) -> u64 {
    (secs * 1000.0).round() as u64
}

/// Build the chapter timeline for tracks in play order.
pub fn build_timeline<'a>(tracks: impl IntoIterator<Item = &'a Track>) -> Vec<ChapterEntry> {
    let mut cursor = 0.0_f64;
    tracks
        .into_iter()
        .map(|track| {
            let start = cursor;
            cursor += track.duration_secs;
            ChapterEntry::new(track.chapter_title.clone(), to_millis(start), to_millis(cursor))
        })
        .collect()
}
