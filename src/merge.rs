//! Merge orchestration.
//!
//! Writes the chapter-metadata artifact(s) next to the tracks, hands the
//! ordered track list to the encoder and removes the artifacts again,
//! whether or not the encoder succeeded.

use std::path::PathBuf;

use crate::chapters::{ChapterArtifact, GlobalMetadata, build_timeline, render_ffmetadata, render_simple};
use crate::config::{RunConfig, Settings};
use crate::error::{Error, Result};
use crate::model::Catalog;
use crate::pipeline::Encoder;
use crate::tools::ffmpeg::{MergeJob, output_path};

/// Merge the catalog into one chaptered container and return its path.
pub fn merge(
    catalog: &Catalog,
    config: &RunConfig,
    settings: &Settings,
    encoder: &impl Encoder,
) -> Result<PathBuf> {
    if catalog.is_empty() {
        return Err(Error::discovery(&catalog.dir, "no files to merge"));
    }

    println!("Creating chapters metadata...");
    let chapters = build_timeline(catalog);
    let global = GlobalMetadata {
        title: config.title.as_deref(),
        author: config.author.as_deref(),
        genre: &settings.chapters.genre,
    };

    let artifact = ChapterArtifact::write(
        &catalog.dir,
        "chapters",
        &render_ffmetadata(&global, &chapters),
    )?;
    let _simple = if settings.chapters.simple_chapters {
        Some(ChapterArtifact::write(
            &catalog.dir,
            "chapters_simple",
            &render_simple(&chapters),
        )?)
    } else {
        None
    };

    let output = output_path(
        &catalog.dir,
        config.author.as_deref(),
        config.title.as_deref(),
    );
    let job = MergeJob {
        inputs: catalog.iter().map(|t| t.source_path.clone()).collect(),
        chapters_file: artifact.path().to_path_buf(),
        output: output.clone(),
    };

    println!("Creating M4B file with chapters: {}", output.display());
    encoder.encode(&job)?;
    Ok(output)
}
