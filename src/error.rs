//! Build errors

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while turning the source document into a site
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid date format: {0:?} (expected a leading YYYY-MM-DD)")]
    DateFormat(String),

    #[error("Malformed post #{index} ({title:?}): {reason}")]
    MalformedPost {
        index: usize,
        title: String,
        reason: String,
    },

    #[error("Missing {what}: {path:?}")]
    MissingFile { what: &'static str, path: PathBuf },

    #[error("Filesystem error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    pub fn missing(what: &'static str, path: impl AsRef<Path>) -> Self {
        Self::MissingFile {
            what,
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn fs(path: impl AsRef<Path>) -> impl FnOnce(io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Filesystem { path, source }
    }
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;
