//! Track catalog construction.
//!
//! Lists the source directory (non-recursive), keeps the audio files, orders
//! them by the number embedded in each file name and renames every file to
//! its canonical zero-padded name.
//!
//! # Guarantees
//! - Ordinals are exactly `1..=K` in play order.
//! - The sort is stable: equal indices keep directory-listing order, and the
//!   listing itself is sorted by file name.
//! - Building twice is a no-op the second time: zero renames, same ordinals.
//! - Existing files are never overwritten. A canonical name that is still
//!   held by a track waiting for its own rename is freed first by moving that
//!   track to a `~`-prefixed staging name, which keeps its digits.

mod index;
mod naming;

pub use index::extract_index;
pub(crate) use index::first_digit_run;
pub use naming::{CANONICAL_EXTENSION, canonical_name, pad_width};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::model::{Catalog, Track};

/// A record of one rename performed while normalizing names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// List the audio files directly inside `dir`, sorted by file name.
///
/// `extension` is compared case-insensitively and given without the dot.
pub fn discover(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::discovery(dir, e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if has_extension(entry.path(), extension) {
            found.push(entry.into_path());
        }
    }

    debug!(target: "catalog", dir = %dir.display(), count = found.len(), "Discovered audio files");
    Ok(found)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Order discovered files by their embedded index and assign ordinals.
///
/// Any file without a usable index aborts ordering before anything is renamed.
pub fn order(paths: Vec<PathBuf>) -> Result<Vec<Track>> {
    let mut indexed = Vec::with_capacity(paths.len());
    for path in paths {
        let track = Track::discovered(path);
        let index = extract_index(track.file_name())?;
        indexed.push((index, track));
    }

    // Vec::sort_by_key is stable
    indexed.sort_by_key(|(index, _)| *index);

    let total = indexed.len() as u32;
    Ok(indexed
        .into_iter()
        .enumerate()
        .map(|(position, (_, mut track))| {
            track.ordinal = position as u32 + 1;
            track.canonical_name = canonical_name(track.ordinal, total);
            track
        })
        .collect())
}

/// Rename every track in `dir` to its canonical name.
///
/// Returns the renames performed, in order. A failed rename aborts; earlier
/// renames are left in place.
pub fn normalize_names(dir: &Path, tracks: &mut [Track]) -> Result<Vec<MoveRecord>> {
    let mut moves = Vec::new();

    for i in 0..tracks.len() {
        let target = dir.join(&tracks[i].canonical_name);
        if tracks[i].source_path == target {
            continue;
        }

        if fs::symlink_metadata(&target).is_ok() {
            match occupant(tracks, i, &target) {
                Some(j) => {
                    let staged = staging_path(dir, tracks[j].file_name());
                    moves.push(rename(&tracks[j].source_path, &staged)?);
                    tracks[j].source_path = staged;
                }
                // Case-only change on a case-insensitive filesystem
                None if same_name_ignoring_case(&tracks[i].source_path, &target) => {}
                None => {
                    return Err(Error::Rename {
                        from: tracks[i].source_path.clone(),
                        to: target,
                        source: std::io::Error::new(
                            std::io::ErrorKind::AlreadyExists,
                            "destination is occupied by a file outside the catalog",
                        ),
                    });
                }
            }
        }

        moves.push(rename(&tracks[i].source_path, &target)?);
        tracks[i].source_path = target;
    }

    Ok(moves)
}

/// Index of a track after `current` whose file currently sits at `target`.
fn occupant(tracks: &[Track], current: usize, target: &Path) -> Option<usize> {
    let later = &tracks[current + 1..];
    later
        .iter()
        .position(|t| t.source_path == target)
        .or_else(|| {
            if same_name_ignoring_case(&tracks[current].source_path, target) {
                return None;
            }
            later
                .iter()
                .position(|t| same_name_ignoring_case(&t.source_path, target))
        })
        .map(|offset| current + 1 + offset)
}

fn same_name_ignoring_case(a: &Path, b: &Path) -> bool {
    match (
        a.file_name().and_then(|n| n.to_str()),
        b.file_name().and_then(|n| n.to_str()),
    ) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// First free `~…~name` path in `dir`.
fn staging_path(dir: &Path, file_name: &str) -> PathBuf {
    let mut name = format!("~{}", file_name);
    while fs::symlink_metadata(dir.join(&name)).is_ok() {
        name.insert(0, '~');
    }
    dir.join(name)
}

fn rename(from: &Path, to: &Path) -> Result<MoveRecord> {
    debug!(target: "catalog", from = %from.display(), to = %to.display(), "Renaming");
    fs::rename(from, to).map_err(|source| Error::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    Ok(MoveRecord {
        source: from.to_path_buf(),
        destination: to.to_path_buf(),
    })
}

/// Build the catalog for `dir`: discover, order, and normalize names.
pub fn build(dir: &Path, extension: &str) -> Result<(Catalog, Vec<MoveRecord>)> {
    let paths = discover(dir, extension)?;
    let mut tracks = order(paths)?;
    let moves = normalize_names(dir, &mut tracks)?;

    info!(
        target: "catalog",
        dir = %dir.display(),
        tracks = tracks.len(),
        renamed = moves.len(),
        "Catalog built"
    );

    Ok((
        Catalog {
            dir: dir.to_path_buf(),
            tracks,
        },
        moves,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{dir_listing, touch_all};
    use tempfile::tempdir;

    #[test]
    fn test_discover_filters_extension_case_insensitively() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["1.mp3", "2.MP3", "3.Mp3", "cover.jpg", "notes.txt"]);
        fs::create_dir(dir.path().join("4.mp3")).unwrap();

        let found = discover(dir.path(), "mp3").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();

        assert_eq!(names, vec!["1.mp3", "2.MP3", "3.Mp3"]);
    }

    #[test]
    fn test_discover_is_not_recursive() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["1.mp3"]);
        let sub = dir.path().join("disc2");
        fs::create_dir(&sub).unwrap();
        touch_all(&sub, &["2.mp3"]);

        assert_eq!(discover(dir.path(), "mp3").unwrap().len(), 1);
    }

    #[test]
    fn test_discover_missing_directory() {
        let dir = tempdir().unwrap();
        let err = discover(&dir.path().join("gone"), "mp3").unwrap_err();
        assert!(matches!(err, Error::Discovery { .. }));
    }

    #[test]
    fn test_order_is_stable_for_equal_indices() {
        let tracks = order(vec![
            PathBuf::from("/b/1a.mp3"),
            PathBuf::from("/b/0z.mp3"),
            PathBuf::from("/b/1b.mp3"),
        ])
        .unwrap();

        let names: Vec<_> = tracks.iter().map(|t| t.file_name()).collect();
        assert_eq!(names, vec!["0z.mp3", "1a.mp3", "1b.mp3"]);
        let ordinals: Vec<_> = tracks.iter().map(|t| t.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
    }

    #[test]
    fn test_order_fails_without_index() {
        let err = order(vec![PathBuf::from("/b/1.mp3"), PathBuf::from("/b/chapter.mp3")])
            .unwrap_err();
        assert!(matches!(err, Error::IndexParse(_)));
    }

    #[test]
    fn test_build_scenario_renames_in_index_order() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("02b.mp3"), b"b").unwrap();
        std::fs::write(dir.path().join("10a.mp3"), b"a").unwrap();
        std::fs::write(dir.path().join("01c.mp3"), b"c").unwrap();

        let (catalog, moves) = build(dir.path(), "mp3").unwrap();

        assert_eq!(moves.len(), 3);
        assert_eq!(dir_listing(dir.path()), vec!["1.mp3", "2.mp3", "3.mp3"]);
        assert_eq!(fs::read(dir.path().join("1.mp3")).unwrap(), b"c");
        assert_eq!(fs::read(dir.path().join("2.mp3")).unwrap(), b"b");
        assert_eq!(fs::read(dir.path().join("3.mp3")).unwrap(), b"a");

        let ordinals: Vec<_> = catalog.iter().map(|t| t.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert_eq!(catalog.tracks[0].source_path, dir.path().join("1.mp3"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["b 3.mp3", "a 1.mp3", "c 20.mp3", "x 7.mp3"]);

        let (first, first_moves) = build(dir.path(), "mp3").unwrap();
        let (second, second_moves) = build(dir.path(), "mp3").unwrap();

        assert_eq!(first_moves.len(), 4);
        assert!(second_moves.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_widens_names_for_ten_tracks() {
        let dir = tempdir().unwrap();
        let names: Vec<String> = (1..=10).map(|i| format!("{}.mp3", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        touch_all(dir.path(), &refs);

        build(dir.path(), "mp3").unwrap();

        let expected: Vec<String> = (1..=10).map(|i| format!("{:02}.mp3", i)).collect();
        assert_eq!(dir_listing(dir.path()), expected);
    }

    #[test]
    fn test_build_never_clobbers_pending_track() {
        // "0a" and "0b" sort before "1.mp3", whose name is the first target
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("0a.mp3"), b"first").unwrap();
        std::fs::write(dir.path().join("0b.mp3"), b"second").unwrap();
        std::fs::write(dir.path().join("1.mp3"), b"third").unwrap();

        let (catalog, _) = build(dir.path(), "mp3").unwrap();

        assert_eq!(dir_listing(dir.path()), vec!["1.mp3", "2.mp3", "3.mp3"]);
        assert_eq!(fs::read(dir.path().join("1.mp3")).unwrap(), b"first");
        assert_eq!(fs::read(dir.path().join("2.mp3")).unwrap(), b"second");
        assert_eq!(fs::read(dir.path().join("3.mp3")).unwrap(), b"third");
        assert_eq!(catalog.tracks[2].source_path, dir.path().join("3.mp3"));
    }

    #[test]
    fn test_build_missing_index_renames_nothing() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["02.mp3", "chapter.mp3", "05.mp3"]);

        let err = build(dir.path(), "mp3").unwrap_err();

        assert!(matches!(err, Error::IndexParse(_)));
        assert_eq!(
            dir_listing(dir.path()),
            vec!["02.mp3", "05.mp3", "chapter.mp3"]
        );
    }

    #[test]
    fn test_build_refuses_target_held_outside_catalog() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("1.mp3")).unwrap();
        touch_all(dir.path(), &["a5.mp3", "b7.mp3"]);

        let err = build(dir.path(), "mp3").unwrap_err();

        match err {
            Error::Rename { from, to, source } => {
                assert_eq!(from, dir.path().join("a5.mp3"));
                assert_eq!(to, dir.path().join("1.mp3"));
                assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(dir_listing(dir.path()), vec!["a5.mp3", "b7.mp3"]);
        assert!(dir.path().join("1.mp3").is_dir());
    }

    #[test]
    fn test_build_lowercases_extension() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["01 Intro.MP3", "02 End.mp3"]);

        build(dir.path(), "mp3").unwrap();

        assert_eq!(dir_listing(dir.path()), vec!["1.mp3", "2.mp3"]);
    }

    #[test]
    fn test_staging_path_avoids_existing() {
        let dir = tempdir().unwrap();
        touch_all(dir.path(), &["~1.mp3"]);
        assert_eq!(staging_path(dir.path(), "1.mp3"), dir.path().join("~~1.mp3"));
    }
}
