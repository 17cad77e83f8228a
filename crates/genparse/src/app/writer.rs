//! Materialize extracted files on disk.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::GeneratedFile;

/// Outcome of writing a file set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<(String, DomainError)>,
}

/// Write each file below `out_dir`, preserving its directory structure.
///
/// Absolute paths and paths with `..` are skipped, as are paths that would
/// need a written file to be a directory or the reverse. A later file with
/// the same path overwrites an earlier one.
pub fn write_files(files: &[GeneratedFile], out_dir: &Path) -> Result<WriteReport> {
    let mut report = WriteReport::default();

    for file in files {
        let relative = match safe_relative_path(&file.path) {
            Ok(relative) => relative,
            Err(err) => {
                warn!(path = %file.path, error = %err, "skipping file");
                report.skipped.push((file.path.clone(), err));
                continue;
            }
        };

        if clashes_with_existing(out_dir, &relative) {
            let err = DomainError::PathConflict(file.path.clone());
            warn!(path = %file.path, error = %err, "skipping file");
            report.skipped.push((file.path.clone(), err));
            continue;
        }

        let target = out_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&target, &file.content)
            .with_context(|| format!("failed to write {}", target.display()))?;
        report.written.push(target);
    }

    info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        out_dir = %out_dir.display(),
        "files written"
    );
    Ok(report)
}

/// True when a parent of `relative` is a file, or `relative` is a directory.
fn clashes_with_existing(out_dir: &Path, relative: &Path) -> bool {
    if out_dir.join(relative).is_dir() {
        return true;
    }
    relative
        .ancestors()
        .skip(1)
        .filter(|parent| !parent.as_os_str().is_empty())
        .any(|parent| out_dir.join(parent).is_file())
}

/// Resolve a generated path to a relative path that stays inside its root.
pub fn safe_relative_path(path: &str) -> Result<PathBuf, DomainError> {
    let candidate = Path::new(path);
    let mut relative = PathBuf::new();

    for component in candidate.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(DomainError::UnsafePath(path.to_owned()));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(DomainError::EmptyPath);
    }
    Ok(relative)
}
