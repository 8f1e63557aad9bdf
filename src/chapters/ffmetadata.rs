//! FFmpeg metadata (`;FFMETADATA1`) generation for M4B chapter markers.
//!
//! Layout:
//!
//! ```text
//! ;FFMETADATA1
//! title=<book title>
//! album=<book title>
//! artist=<author>
//! album_artist=<author>
//! genre=Audiobook
//! media_type=audiobook
//!
//! [CHAPTER]
//! TIMEBASE=1/1000
//! START=0
//! END=60000
//! title=<chapter title>
//!
//! ```

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::ChapterEntry;
use crate::error::{Error, Result};

/// Book-level values written above the chapter blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalMetadata<'a> {
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub genre: &'a str,
}

/// Render the complete metadata document.
pub fn render_ffmetadata(global: &GlobalMetadata<'_>, chapters: &[ChapterEntry]) -> String {
    let mut out = String::from(";FFMETADATA1\n");

    if let Some(title) = global.title {
        let title = escape_value(title);
        let _ = writeln!(out, "title={}", title);
        let _ = writeln!(out, "album={}", title);
    }
    if let Some(author) = global.author {
        let author = escape_value(author);
        let _ = writeln!(out, "artist={}", author);
        let _ = writeln!(out, "album_artist={}", author);
    }
    if !global.genre.is_empty() {
        let _ = writeln!(out, "genre={}", escape_value(global.genre));
    }
    out.push_str("media_type=audiobook\n\n");

    for chapter in chapters {
        out.push_str("[CHAPTER]\nTIMEBASE=1/1000\n");
        let _ = writeln!(out, "START={}", chapter.start_ms);
        let _ = writeln!(out, "END={}", chapter.end_ms);
        let _ = writeln!(out, "title={}\n", escape_value(&chapter.title));
    }

    out
}

/// Escape special characters in metadata values.
///
/// FFmpeg metadata values need to escape: = ; # \ and newlines. A newline
/// stays a newline when preceded by a backslash.
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '=' | ';' | '#' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }

    escaped
}

/// A chapter-metadata file that lives exactly as long as this value.
///
/// The file is created inside the track directory and deleted on drop,
/// whichever way the merge step exits.
#[derive(Debug)]
pub struct ChapterArtifact {
    file: NamedTempFile,
}

impl ChapterArtifact {
    /// Write `contents` to a fresh `<prefix>*.txt` file in `dir`.
    pub fn write(dir: &Path, prefix: &str, contents: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".txt")
            .tempfile_in(dir)
            .map_err(|e| Error::artifact(dir.join(prefix), e))?;

        file.write_all(contents.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| Error::artifact(file.path(), e))?;

        tracing::debug!(target: "chapters", path = %file.path().display(), "Wrote chapter metadata");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
