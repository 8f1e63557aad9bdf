//! Bookbinder - turns a directory of numbered MP3 files into one chaptered
//! M4B audiobook.
//!
//! Tracks are ordered by the number in their file name, renamed to
//! zero-padded canonical names, re-tagged, and merged by ffmpeg with one
//! chapter per track.

pub mod catalog;
pub mod chapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod merge;
pub mod metadata;
pub mod model;
pub mod pipeline;
pub mod resolve;
#[cfg(test)]
pub mod test_utils;
pub mod tools;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?)
        .init();

    let output = cli::run_command(&args)?;
    tracing::info!(target: "bookbinder", output = %output.display(), "Done");
    Ok(())
}
