use clap::{Parser, Subcommand};
use std::path::PathBuf;

use anyhow::Result;

use crate::config::{Settings, load_settings};

#[derive(Parser, Debug)]
#[command(name = "ziplens")]
#[command(version)]
#[command(about = "Browse and safely preview zip archive contents", long_about = None)]
#[command(after_help = "Examples:\n  \
  ziplens roots                     list archives under the current directory\n  \
  ziplens ls data.zip docs          list the docs/ directory inside data.zip\n  \
  ziplens cat data.zip docs/a.md    preview an entry as text\n  \
  ziplens watch .                   keep caches coherent as archives change")]
pub struct Cli {
    /// TOML config file with preview limits
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Maximum previewable file size in megabytes
    #[arg(long, value_name = "MB", global = true)]
    pub max_size_mb: Option<u64>,

    /// Maximum compression ratio before bomb rejection
    #[arg(long, value_name = "RATIO", global = true)]
    pub max_ratio: Option<u64>,

    /// Maximum number of cached text previews
    #[arg(long, value_name = "N", global = true)]
    pub cache_entries: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List archives discovered under a directory
    Roots {
        /// Directory to scan (default: current directory)
        dir: Option<PathBuf>,
    },
    /// List the children of a directory inside an archive
    Ls {
        archive: PathBuf,
        /// Archive-internal directory (default: archive root)
        path: Option<String>,
    },
    /// Preview an archive entry as text
    Cat {
        archive: PathBuf,
        path: String,
    },
    /// Extract an entry's raw bytes
    Extract {
        archive: PathBuf,
        path: String,
        /// Output file (default: stdout)
        #[arg(short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Watch a directory and keep archive caches coherent
    Watch {
        /// Directory to watch (default: current directory)
        dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Effective settings: config file (if any) with CLI flags layered on
    /// top.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => Settings::default(),
        };
        if self.max_size_mb.is_some() {
            settings.max_file_size_mb = self.max_size_mb;
        }
        if self.max_ratio.is_some() {
            settings.max_compression_ratio = self.max_ratio;
        }
        if self.cache_entries.is_some() {
            settings.max_cached_previews = self.cache_entries;
        }
        Ok(settings)
    }
}
