//! Argument definitions and the command handler.

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{self, RunConfig};
use crate::metadata::LoftyTags;
use crate::pipeline::Pipeline;
use crate::tools::{self, Ffmpeg, Ffprobe};

/// Bind a directory of MP3 files into a chaptered M4B audiobook
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the MP3 files
    #[arg(short, long, env = "BOOKBINDER_INPUT")]
    pub input: Option<PathBuf>,

    /// Book author (written to tags and the output name)
    #[arg(short, long, env = "BOOKBINDER_AUTHOR")]
    pub author: Option<String>,

    /// Book title (written to tags and the output name)
    #[arg(short, long, env = "BOOKBINDER_TITLE")]
    pub title: Option<String>,
}

/// Run the pipeline for the parsed arguments and return the output path.
pub fn run_command(cli: &Cli) -> anyhow::Result<PathBuf> {
    let settings = config::load();
    debug!(target: "cli", ?settings, "Settings loaded");

    let run = RunConfig::new(cli.input.clone(), cli.author.clone(), cli.title.clone())?;
    info!(
        target: "cli",
        dir = %run.source_dir.display(),
        author = run.author.as_deref().unwrap_or("-"),
        title = run.title.as_deref().unwrap_or("-"),
        "Starting run"
    );

    tools::ensure_available(&[&settings.tools.ffprobe, &settings.tools.ffmpeg])?;

    let probe = Ffprobe::new(settings.tools.ffprobe.clone(), settings.tools.probe_timeout());
    let encoder = Ffmpeg::new(
        settings.tools.ffmpeg.clone(),
        settings.tools.encode_timeout(),
        settings.encoder.clone(),
    );

    let output = Pipeline::new(probe, LoftyTags, encoder, settings).run(run)?;
    Ok(output)
}
