//! Duration and chapter-title resolution.
//!
//! Every track needs a duration (there is no default, a probe failure stops
//! the run) and a title. Titles come from the embedded tag when it has a
//! non-blank one, otherwise from the file name:
//!
//! - `"03_intro.mp3"` → `"intro"`
//! - `"07.mp3"` → `"Chapter 7"` (the configured fallback label)
//! - a name with no number and no text → the bare label

use std::path::Path;

use tracing::debug;

use crate::catalog::first_digit_run;
use crate::error::Result;
use crate::model::Catalog;
use crate::pipeline::{DurationProbe, TagEditor};

/// Used when the configured label is blank
const DEFAULT_LABEL: &str = "Chapter";

/// Fill in `duration_secs` and `chapter_title` for every track.
pub fn resolve(
    catalog: &mut Catalog,
    probe: &impl DurationProbe,
    tags: &impl TagEditor,
    fallback_label: &str,
) -> Result<()> {
    for track in &mut catalog.tracks {
        track.duration_secs = probe.duration(&track.source_path)?;
        track.chapter_title = resolve_title(&track.source_path, tags, fallback_label);

        debug!(
            target: "resolve",
            path = %track.source_path.display(),
            secs = track.duration_secs,
            title = %track.chapter_title,
            "Resolved track"
        );
    }
    Ok(())
}

/// Title for one file. Never fails and never returns an empty string.
pub fn resolve_title(path: &Path, tags: &impl TagEditor, fallback_label: &str) -> String {
    match tags.read_title(path) {
        Ok(Some(title)) if !title.trim().is_empty() => return title.trim().to_string(),
        Ok(_) => {}
        Err(e) => debug!(target: "resolve", path = %path.display(), error = %e, "No readable tag"),
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    title_from_file_name(file_name, fallback_label)
}

/// Derive a title from a file name by dropping the extension and any
/// leading `<digits><separators>` prefix.
pub fn title_from_file_name(file_name: &str, fallback_label: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let rest = stem
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start_matches(|c: char| matches!(c, '.' | '_' | '-') || c.is_whitespace());

    if !rest.is_empty() {
        return rest.to_string();
    }

    let label = match fallback_label.trim() {
        "" => DEFAULT_LABEL,
        label => label,
    };
    match leading_number(stem) {
        Some(number) => format!("{} {}", label, number),
        None => label.to_string(),
    }
}

/// The number a name starts with, without zero padding.
fn leading_number(s: &str) -> Option<String> {
    let digits = first_digit_run(s).filter(|d| s.starts_with(*d))?;
    Some(
        digits
            .parse::<u64>()
            .map(|n| n.to_string())
            .unwrap_or_else(|_| digits.to_string()),
    )
}
