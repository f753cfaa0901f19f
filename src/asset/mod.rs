//! Static assets: the public directory is copied byte for byte into the
//! output tree under the same name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jwalk::WalkDir;
use rayon::prelude::*;

use crate::config::SiteConfig;
use crate::log;
use crate::logger::ProgressLine;

/// Every regular file under the public directory.
pub fn collect_public_files(config: &SiteConfig) -> Vec<PathBuf> {
    files_under(&config.public_dir())
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .skip_hidden(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect()
}

/// Copy the whole public directory. Returns the number of files copied.
pub fn copy_public(config: &SiteConfig, files: &[PathBuf], progress: Option<&ProgressLine>) -> Result<usize> {
    files.par_iter().try_for_each(|path| {
        copy_public_file(config, path)
            .with_context(|| format!("failed to copy {}", path.display()))?;
        if let Some(p) = progress {
            p.inc("public");
        }
        Ok::<_, anyhow::Error>(())
    })?;
    Ok(files.len())
}

/// Copy one public file to its output location.
///
/// A directory copies the files below it; an empty one copies nothing.
/// Returns `Ok(false)` when nothing was copied, e.g. the source vanished
/// before it could be read.
pub fn copy_public_file(config: &SiteConfig, source: &Path) -> io::Result<bool> {
    if source.is_dir() {
        let mut copied = false;
        for file in files_under(source) {
            copied |= copy_public_file(config, &file)?;
        }
        return Ok(copied);
    }
    let Some(dest) = public_output_path(config, source) else {
        return Ok(false);
    };
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::copy(source, &dest) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            crate::debug!("public"; "vanished before copy: {}", source.display());
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Delete the output copy of a removed public file or directory, if any.
pub fn remove_public_file(config: &SiteConfig, source: &Path) -> io::Result<bool> {
    let Some(dest) = public_output_path(config, source) else {
        return Ok(false);
    };
    let removed = if dest.is_dir() {
        fs::remove_dir_all(&dest)
    } else {
        fs::remove_file(&dest)
    };
    match removed {
        Ok(()) => {
            log!("public"; "removed {}", dest.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Where `source` (under the public dir) lands in the output tree.
pub fn public_output_path(config: &SiteConfig, source: &Path) -> Option<PathBuf> {
    let rel = source.strip_prefix(config.public_dir()).ok()?;
    Some(config.public_output_dir().join(rel))
}
