//! Configuration settings for FileBatch
//!
//! Defines the CLI arguments, the optional JSON settings file and the
//! conversion of both into copy options.

use crate::error::{FileBatchError, IoResultExt, Result};
use crate::fs::{CopyOptions, MAX_BUFFER_SIZE};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// FileBatch - audited verify/copy/delete/move over named files
#[derive(Parser, Debug, Clone)]
#[command(name = "filebatch")]
#[command(author = "FileBatch Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify, copy, delete and move named files between two directories")]
#[command(long_about = r#"
FileBatch runs verify, copy, delete and move operations over an explicit
list of file names and reports a per-file audit log plus an overall status.

Examples:
  filebatch verify /inbox a.csv b.csv --all       # every file must exist
  filebatch copy /inbox /archive a.csv b.csv      # refuses to overwrite
  filebatch move /inbox /archive a.csv --overwrite
  filebatch delete /tmp/out --files-from list.txt
  filebatch run nightly.json --format json        # run a batch plan
"#)]
pub struct CliArgs {
    /// Settings file (JSON)
    #[arg(long, global = true, env = "FILEBATCH_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Buffer size for copies (e.g., 64K, 1M); overrides the settings file
    #[arg(short = 'b', long, global = true, value_name = "SIZE")]
    pub buffer_size: Option<String>,

    /// Output format for the status report
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Also write the status report as JSON to this path
    #[arg(long, global = true, value_name = "PATH")]
    pub status_file: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only, no status report)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Operation to run
    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    /// Log level used when `RUST_LOG` is not set
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// File names given on the command line and/or in a list file
#[derive(Args, Debug, Clone, Default)]
pub struct FileArgs {
    /// File names relative to the directories
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Read additional file names from PATH, one per line
    #[arg(long, value_name = "PATH")]
    pub files_from: Option<PathBuf>,
}

impl FileArgs {
    /// Positional names followed by the names from `--files-from`
    pub fn collect(&self) -> Result<Vec<String>> {
        let mut files = self.files.clone();
        if let Some(path) = &self.files_from {
            files.extend(read_file_list(path)?);
        }
        Ok(files)
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Check which files exist in a directory
    #[command(name = "verify")]
    Verify {
        /// Directory to look in
        source: PathBuf,

        #[command(flatten)]
        files: FileArgs,

        /// Require every file to exist (default: at least one)
        #[arg(short, long)]
        all: bool,
    },

    /// Copy files from SOURCE to DESTINATION
    #[command(name = "copy")]
    Copy {
        /// Directory to copy from
        source: PathBuf,

        /// Directory to copy into
        destination: PathBuf,

        #[command(flatten)]
        files: FileArgs,

        /// Replace files that already exist at the destination
        #[arg(long)]
        overwrite: bool,
    },

    /// Delete files from a directory
    #[command(name = "delete")]
    Delete {
        /// Directory to delete from
        source: PathBuf,

        #[command(flatten)]
        files: FileArgs,
    },

    /// Move files from SOURCE to DESTINATION (copy, confirm, delete)
    #[command(name = "move")]
    Move {
        /// Directory to move from
        source: PathBuf,

        /// Directory to move into
        destination: PathBuf,

        #[command(flatten)]
        files: FileArgs,

        /// Replace files that already exist at the destination
        #[arg(long)]
        overwrite: bool,
    },

    /// Run a JSON batch plan
    #[command(name = "run")]
    Run {
        /// Plan file
        plan: PathBuf,

        /// Keep going after a failed step
        #[arg(long)]
        continue_on_failure: bool,
    },
}

/// Output format for the status report
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Settings file contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Copy buffer size (e.g., "64K", "1M")
    pub buffer_size: String,
    /// Preserve permissions on copied files
    pub preserve_permissions: bool,
    /// Preserve modification/access time on copied files
    pub preserve_mtime: bool,
    /// fsync each copied file
    pub sync: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            buffer_size: "1M".to_string(),
            preserve_permissions: true,
            preserve_mtime: true,
            sync: false,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing keys take defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FileBatchError::config(format!("{}: {}", path.display(), e)))
    }

    /// Settings from `--config` (if any) with CLI overrides applied
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let mut settings = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(size) = &args.buffer_size {
            settings.buffer_size = size.clone();
        }
        Ok(settings)
    }

    /// Copy options described by these settings
    pub fn copy_options(&self) -> Result<CopyOptions> {
        let buffer_size = parse_size(&self.buffer_size)
            .map_err(|e| FileBatchError::config(format!("Invalid buffer size: {}", e)))?;
        if buffer_size == 0 {
            return Err(FileBatchError::config("Buffer size must be greater than zero"));
        }
        if buffer_size > MAX_BUFFER_SIZE as u64 {
            return Err(FileBatchError::config(format!(
                "Buffer size {} exceeds the limit of {} bytes",
                self.buffer_size, MAX_BUFFER_SIZE
            )));
        }

        Ok(CopyOptions {
            buffer_size: buffer_size as usize,
            preserve_permissions: self.preserve_permissions,
            preserve_mtime: self.preserve_mtime,
            sync: self.sync,
        })
    }
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(['G', 'B']), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(['M', 'B']), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(['K', 'B']), 1024u64)
    } else if size.ends_with('B') {
        (size.trim_end_matches('B'), 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if !num.is_finite() {
        return Err(format!("Size is not finite: {}", num_str));
    }

    if num < 0.0 {
        return Err(format!("Negative size: {}", num_str));
    }

    Ok((num * multiplier as f64) as u64)
}

/// Read file names from a list file.
///
/// One name per line; surrounding whitespace is trimmed, blank lines and
/// lines starting with `#` are skipped.
pub fn read_file_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).with_path(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
