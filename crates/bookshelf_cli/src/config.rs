//! Runtime configuration resolved from flags and environment.
//!
//! # Invariants
//! - `log_dir` is always absolute; relative inputs resolve against the
//!   working directory.
//! - `--memory` wins over `--db`.

use anyhow::{Context, Result};
use bookshelf_core::{default_log_level, TitleConflictCheck};
use clap::Args;
use std::path::{Path, PathBuf};

const DEFAULT_DB_FILE: &str = "bookshelf.sqlite3";
const DEFAULT_LOG_SUBDIR: &str = "logs";

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// SQLite database file
    #[arg(long, global = true, env = "BOOKSHELF_DB", default_value = DEFAULT_DB_FILE)]
    pub db: PathBuf,

    /// Use a throwaway in-memory database
    #[arg(long, global = true)]
    pub memory: bool,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "BOOKSHELF_LOG_LEVEL", default_value = default_log_level())]
    pub log_level: String,

    /// Directory for rolling log files [default: ./logs]
    #[arg(long, global = true, env = "BOOKSHELF_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Ignore the book being updated when checking title conflicts
    #[arg(long, global = true)]
    pub exclude_self_on_update: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db: DbLocation,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub conflict_check: TitleConflictCheck,
}

impl AppConfig {
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot resolve working directory")?;
        Ok(Self::resolve(args, &cwd))
    }

    fn resolve(args: &GlobalArgs, cwd: &Path) -> Self {
        let db = if args.memory {
            DbLocation::Memory
        } else {
            DbLocation::File(args.db.clone())
        };
        let log_dir = match &args.log_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd.join(DEFAULT_LOG_SUBDIR),
        };
        let conflict_check = if args.exclude_self_on_update {
            TitleConflictCheck::ExcludeSelf
        } else {
            TitleConflictCheck::AnyMatch
        };

        Self {
            db,
            log_level: args.log_level.trim().to_ascii_lowercase(),
            log_dir,
            conflict_check,
        }
    }
}
