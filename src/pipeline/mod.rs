//! The binding pipeline.
//!
//! One synchronous pass over a single directory:
//!
//! 1. build the catalog (discover, order, rename)
//! 2. probe durations and resolve chapter titles
//! 3. rewrite every track's tag
//! 4. write chapter metadata and hand everything to the encoder
//!
//! The first error ends the run. Files already renamed stay renamed, which
//! is safe because catalog construction is idempotent.

mod traits;

pub use traits::*;

use std::path::PathBuf;

use tracing::info;

use crate::catalog;
use crate::config::{RunConfig, Settings};
use crate::error::{Error, Result};
use crate::merge::merge;
use crate::metadata::rewrite_all;
use crate::resolve::resolve;

/// A configured pipeline, generic over its external collaborators.
pub struct Pipeline<P, T, E> {
    pub probe: P,
    pub tags: T,
    pub encoder: E,
    pub settings: Settings,
}

impl<P, T, E> Pipeline<P, T, E>
where
    P: DurationProbe,
    T: TagEditor,
    E: Encoder,
{
    pub fn new(probe: P, tags: T, encoder: E, settings: Settings) -> Self {
        Self {
            probe,
            tags,
            encoder,
            settings,
        }
    }

    /// Run the whole pipeline and return the path of the finished book.
    pub fn run(&self, config: RunConfig) -> Result<PathBuf> {
        let dir = &config.source_dir;
        println!("Processing MP3 files in: {}", dir.display());

        let (mut catalog, moves) = catalog::build(dir, &self.settings.library.extension)?;
        if catalog.is_empty() {
            return Err(Error::discovery(dir, "no MP3 files found in directory"));
        }
        println!("Found {} MP3 files", catalog.len());
        for record in &moves {
            info!(
                target: "catalog",
                from = %record.source.display(),
                to = %record.destination.display(),
                "Renamed"
            );
        }

        resolve(
            &mut catalog,
            &self.probe,
            &self.tags,
            &self.settings.chapters.fallback_label,
        )?;
        info!(
            target: "resolve",
            tracks = catalog.len(),
            total_secs = catalog.total_duration_secs(),
            "Durations resolved"
        );

        println!("Updating metadata tags...");
        rewrite_all(&catalog, &self.tags, &config)?;

        println!("Merging files to M4B format...");
        let output = merge(&catalog, &config, &self.settings, &self.encoder)?;
        println!("Audiobook processing completed successfully!");
        Ok(output)
    }
}
