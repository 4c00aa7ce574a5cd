use crate::utils::error::{LaunchError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Tool and cache directories that never belong on the shared volume.
pub const DEFAULT_EXCLUDES: [&str; 9] = [
    "latch",
    ".latch",
    "nextflow",
    ".nextflow",
    "work",
    "results",
    "miniconda",
    "anaconda3",
    "mambaforge",
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub dirs: usize,
    pub skipped_links: usize,
}

/// Copies `src` into `dest`, merging with whatever `dest` already holds.
///
/// Entries whose file name is in `exclude` are skipped at every depth.
/// Symlinks are followed; links whose target is missing are skipped.
pub fn copy_tree(src: &Path, dest: &Path, exclude: &[String]) -> Result<CopyStats> {
    let mut stats = CopyStats::default();
    let walker = WalkDir::new(src)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry, exclude));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_dangling(&e) => {
                tracing::debug!("Skipping dangling symlink {}", display_path(&e));
                stats.skipped_links += 1;
                continue;
            }
            Err(e) => {
                let path = display_path(&e);
                return Err(LaunchError::WorkdirCopyError {
                    path,
                    source: e.into(),
                });
            }
        };

        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let to = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&to).map_err(|e| copy_error(&to, e))?;
            stats.dirs += 1;
        } else {
            fs::copy(entry.path(), &to).map_err(|e| copy_error(entry.path(), e))?;
            stats.files += 1;
        }
    }

    tracing::debug!(
        "Copied {} files in {} directories from {} to {} ({} dangling links skipped)",
        stats.files,
        stats.dirs,
        src.display(),
        dest.display(),
        stats.skipped_links
    );
    Ok(stats)
}

fn copy_error(path: &Path, source: std::io::Error) -> LaunchError {
    LaunchError::WorkdirCopyError {
        path: path.display().to_string(),
        source,
    }
}

fn is_excluded(entry: &DirEntry, exclude: &[String]) -> bool {
    exclude
        .iter()
        .any(|ex| entry.file_name() == ex.as_str())
}

/// A followed symlink whose target does not exist.
fn is_dangling(err: &walkdir::Error) -> bool {
    let not_found = err
        .io_error()
        .map_or(false, |e| e.kind() == ErrorKind::NotFound);
    let is_link = err
        .path()
        .and_then(|p| fs::symlink_metadata(p).ok())
        .map_or(false, |m| m.file_type().is_symlink());
    err.depth() > 0 && not_found && is_link
}

fn display_path(err: &walkdir::Error) -> String {
    err.path()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}
