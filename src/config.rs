//! Configuration.
//!
//! Two layers:
//! - [`RunConfig`]: the per-run inputs (source directory, author, title),
//!   built once from the command line and passed by value into the pipeline.
//! - [`Settings`]: tool and encoder settings read from a TOML file:
//!   - `$BOOKBINDER_CONFIG` if set
//!   - Windows: %APPDATA%\bookbinder\config.toml
//!   - macOS: ~/Library/Application Support/bookbinder/config.toml
//!   - Linux: ~/.config/bookbinder/config.toml
//!
//! The settings file is optional. A missing or broken file is logged and
//! replaced by defaults; it never stops a run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable overriding the settings file location
pub const CONFIG_PATH_ENV: &str = "BOOKBINDER_CONFIG";

// ============================================================================
// Run configuration
// ============================================================================

/// Immutable inputs for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source_dir: PathBuf,
    pub author: Option<String>,
    pub title: Option<String>,
}

impl RunConfig {
    /// Build a run configuration, validating the source directory.
    ///
    /// Blank author/title values are treated as absent.
    pub fn new(
        source_dir: Option<PathBuf>,
        author: Option<String>,
        title: Option<String>,
    ) -> Result<Self> {
        let source_dir = source_dir.ok_or_else(|| Error::config("input directory is required"))?;

        if !source_dir.exists() {
            return Err(Error::config(format!(
                "input directory does not exist: {}",
                source_dir.display()
            )));
        }
        if !source_dir.is_dir() {
            return Err(Error::config(format!(
                "input path is not a directory: {}",
                source_dir.display()
            )));
        }

        Ok(Self {
            source_dir,
            author: non_blank(author),
            title: non_blank(title),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Settings file
// ============================================================================

/// Tool and encoder settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// External programs
    pub tools: ToolsConfig,

    /// Output stream parameters
    pub encoder: EncoderConfig,

    /// Chapter metadata options
    pub chapters: ChaptersConfig,

    /// Track discovery
    pub library: LibraryConfig,
}

/// External program locations and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Duration probe executable
    pub ffprobe: String,

    /// Encoder executable
    pub ffmpeg: String,

    /// Per-file probe limit in seconds (absent = wait forever)
    pub probe_timeout_secs: Option<u64>,

    /// Merge limit in seconds (absent = wait forever)
    pub encode_timeout_secs: Option<u64>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffprobe: "ffprobe".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            probe_timeout_secs: None,
            encode_timeout_secs: None,
        }
    }
}

impl ToolsConfig {
    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_secs.map(Duration::from_secs)
    }

    pub fn encode_timeout(&self) -> Option<Duration> {
        self.encode_timeout_secs.map(Duration::from_secs)
    }
}

/// Output stream parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Audio codec passed to `-c:a`
    pub codec: String,

    /// Audio bitrate passed to `-b:a`
    pub bitrate: String,

    /// Sample rate in Hz passed to `-ar`
    pub sample_rate: u32,

    /// Move the moov atom to the front of the file
    pub faststart: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            codec: "aac".to_string(),
            bitrate: "128k".to_string(),
            sample_rate: 44100,
            faststart: true,
        }
    }
}

/// Chapter metadata options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaptersConfig {
    /// Label used for chapters whose file name carries no text, e.g. "Chapter 7"
    pub fallback_label: String,

    /// Value of the global `genre=` line
    pub genre: String,

    /// Also write the `CHAPTERnn=` style chapters file
    pub simple_chapters: bool,
}

impl Default for ChaptersConfig {
    fn default() -> Self {
        Self {
            fallback_label: "Chapter".to_string(),
            genre: "Audiobook".to_string(),
            simple_chapters: false,
        }
    }
}

/// Track discovery options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Audio file extension without the dot (matched case-insensitively)
    pub extension: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            extension: "mp3".to_string(),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the full path to the settings file
pub fn config_path() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(p));
    }
    dirs::config_dir().map(|d| d.join("bookbinder").join("config.toml"))
}

/// Load settings from disk
///
/// Returns defaults if the file doesn't exist or can't be parsed.
pub fn load() -> Settings {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Settings::default();
    };
    load_from(&path)
}

/// Load settings from a specific file, falling back to defaults.
pub fn load_from(path: &Path) -> Settings {
    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Settings::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(settings) => {
                tracing::info!("Loaded config from {:?}", path);
                settings
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Settings::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Settings::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
