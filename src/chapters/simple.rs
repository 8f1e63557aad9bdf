//! Simple (OGM-style) chapter list, understood by some media servers.
//!
//! ```text
//! CHAPTER01=00:00:00.000
//! CHAPTER01NAME=Chapter 1
//! ```

use std::fmt::Write as _;

use super::ChapterEntry;

pub fn render_simple(chapters: &[ChapterEntry]) -> String {
    let mut out = String::new();
    for (i, chapter) in chapters.iter().enumerate() {
        let n = i + 1;
        let _ = writeln!(out, "CHAPTER{:02}={}", n, timestamp(chapter.start_ms));
        let _ = writeln!(out, "CHAPTER{:02}NAME={}", n, chapter.title);
    }
    out
}

/// `HH:MM:SS.mmm`
fn timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = ms % 3_600_000 / 60_000;
    let seconds = ms % 60_000 / 1000;
    let millis = ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
