//! Command-line interface for bookbinder.
//!
//! Turns a directory of numbered MP3 files into one chaptered M4B
//! audiobook. There are no subcommands; the three inputs are flags that can
//! also come from the environment.

mod commands;

pub use commands::{Cli, run_command};
