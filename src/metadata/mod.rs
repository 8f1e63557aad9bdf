//! Audio file tag reading and rewriting.
//!
//! Uses the lofty crate for format-independent metadata access. For MP3
//! files the primary tag is ID3v2.
//!
//! Rewriting gives every track audiobook semantics:
//! - album artist cleared
//! - track number set to `ordinal/total`
//! - disc number set to `1`
//! - comments removed
//! - artist set to the author and album to the book title, when known

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt};
use std::path::Path;
use tracing::debug;

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::model::Catalog;
use crate::pipeline::TagEditor;

/// Field values written to one track's tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUpdate<'a> {
    pub ordinal: u32,
    pub total: u32,
    pub author: Option<&'a str>,
    pub album: Option<&'a str>,
}

/// lofty-backed [`TagEditor`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTags;

impl TagEditor for LoftyTags {
    fn read_title(&self, path: &Path) -> Result<Option<String>> {
        let tagged_file = Probe::open(path)
            .and_then(|p| p.read())
            .map_err(|e| Error::tag(path, format!("Failed to read file metadata: {}", e)))?;

        // Get the primary tag, or fall back to the first available tag
        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag());

        Ok(tag
            .and_then(|t| t.title().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty()))
    }

    fn rewrite(&self, path: &Path, update: &TagUpdate<'_>) -> Result<()> {
        let mut tagged_file = Probe::open(path)
            .and_then(|p| p.read())
            .map_err(|e| Error::tag(path, format!("Failed to open file for writing: {}", e)))?;

        let tag_type = tagged_file.primary_tag_type();
        if tagged_file.tag(tag_type).is_none() {
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file
            .tag_mut(tag_type)
            .ok_or_else(|| Error::tag(path, "no writable tag for this format"))?;

        apply_update(tag, update);

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| Error::tag(path, format!("Failed to write tags to file: {}", e)))?;

        debug!(target: "tags", path = %path.display(), ordinal = update.ordinal, "Tag rewritten");
        Ok(())
    }
}

/// Apply an update to an in-memory tag.
pub fn apply_update(tag: &mut Tag, update: &TagUpdate<'_>) {
    tag.remove_key(&ItemKey::AlbumArtist);
    tag.set_track(update.ordinal);
    tag.set_track_total(update.total);
    tag.set_disk(1);
    tag.remove_disk_total();
    tag.remove_comment();

    if let Some(author) = update.author {
        tag.set_artist(author.to_string());
    }
    if let Some(album) = update.album {
        tag.set_album(album.to_string());
    }
}

/// Rewrite the tag of every track in the catalog, in play order.
///
/// The first failure aborts; tracks already rewritten stay rewritten.
pub fn rewrite_all(catalog: &Catalog, editor: &impl TagEditor, config: &RunConfig) -> Result<()> {
    let total = catalog.len() as u32;
    for track in catalog {
        let update = TagUpdate {
            ordinal: track.ordinal,
            total,
            author: config.author.as_deref(),
            album: config.title.as_deref(),
        };
        editor.rewrite(&track.source_path, &update)?;
    }
    Ok(())
}
