//! Copying asset trees and files into an output directory

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{BuildError, Result};

/// Copy `src` into `dest` depth-first, keeping relative paths.
///
/// Returns the number of files copied.
pub fn copy_dir(src: &Path, dest: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Err(BuildError::missing("directory", src));
    }

    fs::create_dir_all(dest).map_err(BuildError::fs(dest))?;

    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            BuildError::Filesystem {
                path,
                source: e.into(),
            }
        })?;

        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(BuildError::fs(&target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(BuildError::fs(&target))?;
            copied += 1;
        }
    }

    tracing::debug!("Copied {} files from {:?} to {:?}", copied, src, dest);
    Ok(copied)
}

/// Copy a single required file
pub fn copy_file(src: &Path, dest: &Path, what: &'static str) -> Result<()> {
    if !src.is_file() {
        return Err(BuildError::missing(what, src));
    }
    fs::copy(src, dest).map_err(BuildError::fs(dest))?;
    Ok(())
}

/// Append `contents` to an existing file
pub fn append_to_file(path: &Path, contents: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(BuildError::fs(path))?;
    file.write_all(contents.as_bytes())
        .map_err(BuildError::fs(path))?;
    Ok(())
}
