//! Error types for argument assembly, batching and process supervision
//!
//! Configuration errors abort the run before any process is spawned.
//! Resource errors abort the run with the underlying OS error text.
//! Child failures are not errors: they travel as `supervisor::Outcome`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RrError {
    #[error("Bad regex {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Can't obey -n {max_count}, initial command is too long ({words} words)")]
    PrefixTooLong { max_count: usize, words: usize },

    #[error("Command of {len} bytes does not fit in a command line of {budget} bytes")]
    CommandTooLong { len: usize, budget: usize },

    #[error("Argument of {len} bytes does not fit in a command line of {budget} bytes")]
    ArgumentTooLong { len: usize, budget: usize },

    #[error("{mode} requires arguments")]
    NoArguments { mode: &'static str },

    #[error("rr requires a cmd")]
    MissingCommand,

    #[error("Can't read directory: {}", .0.display())]
    ListIsDirectory(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    ListFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to exec {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("waitpid: {0}")]
    Wait(#[source] nix::Error),

    #[error("waitpid returned {0} (shouldn't happen)")]
    UnexpectedWaitStatus(String),

    #[error("Failed to compute argument size limit: {0}")]
    Budget(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RrError>;
