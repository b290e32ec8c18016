use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a `resume` or `reset` run.
///
/// Node numbers are the 1-based slot index, matching the `V<index>`
/// directory name.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("locate tool directory: {0}")]
    ToolDir(#[source] io::Error),

    #[error("read config {}: {source}", path.display())]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("parse config {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("invalid network mode {mode:?}: {reason}")]
    InvalidModeFormat { mode: String, reason: &'static str },

    #[error("stage node {node}: copy {} -> {}: {source}", from.display(), to.display())]
    StageCopy {
        node: usize,
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("stage node {node}: update genesis {}: {reason}", path.display())]
    StageGenesis {
        node: usize,
        path: PathBuf,
        reason: String,
    },

    #[error("stage node {node}: remove {}: {source}", path.display())]
    StageCleanup {
        node: usize,
        path: PathBuf,
        source: io::Error,
    },

    #[error("spawn node {node} ({}): {source}", dir.display())]
    Spawn {
        node: usize,
        dir: PathBuf,
        source: io::Error,
    },

    #[error("wait for node {node} ({}): {source}", dir.display())]
    Wait {
        node: usize,
        dir: PathBuf,
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, NetError>;
