//! Load request and completion types

use std::path::PathBuf;

use super::types::Picture;

/// Request sent to load workers
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadRequest {
    /// Decode and resize the picture at `path` for cache slot `pos`
    Load { pos: usize, path: PathBuf },

    /// Stop the worker that receives it
    Shutdown,
}

impl LoadRequest {
    #[must_use]
    pub fn load(pos: usize, path: impl Into<PathBuf>) -> Self {
        Self::Load {
            pos,
            path: path.into(),
        }
    }
}

/// Errors from loading a single picture.
///
/// Cloneable so the cache can hand a failed entry to every reader.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("cannot open {path}: {detail}")]
    Open { path: PathBuf, detail: String },

    #[error("cannot decode {path}: {detail}")]
    Decode { path: PathBuf, detail: String },

    #[error("cannot resize {path}: {detail}")]
    Resize { path: PathBuf, detail: String },

    #[error("loader panicked on {path}: {detail}")]
    Panicked { path: PathBuf, detail: String },
}

impl LoadError {
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. }
            | Self::Decode { path, .. }
            | Self::Resize { path, .. }
            | Self::Panicked { path, .. } => path,
        }
    }
}

pub type LoadResult = Result<Picture, LoadError>;

/// Result of one load, delivered to the completion handler on a worker thread
#[derive(Debug)]
pub struct LoadCompletion {
    pub pos: usize,
    pub path: PathBuf,
    pub result: LoadResult,
}
