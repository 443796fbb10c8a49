//! Template file copying that honors each spec's [`MergeMode`]

use super::locator::{CopySpec, MergeMode};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// A file that could not be copied
#[derive(Debug)]
pub struct FileError {
    pub path: PathBuf,
    pub error: Error,
}

/// Outcome of applying one or more copy specs
#[derive(Debug, Default)]
pub struct MergeReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub errors: Vec<FileError>,
}

impl MergeReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn absorb(&mut self, other: MergeReport) {
        self.written.extend(other.written);
        self.skipped.extend(other.skipped);
        self.errors.extend(other.errors);
    }
}

/// True when `dir` is missing or has no entries
pub async fn is_empty_dir(dir: &Path) -> Result<bool> {
    match fs::read_dir(dir).await {
        Ok(mut entries) => Ok(entries
            .next_entry()
            .await
            .map_err(|e| Error::read(dir, e))?
            .is_none()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(Error::read(dir, e)),
    }
}

/// Apply every spec in order. Per-file failures are collected and the remaining
/// files still copy; a precondition failure (missing source, non-empty
/// destination) stops the plan.
pub async fn apply(specs: &[CopySpec]) -> Result<MergeReport> {
    let mut report = MergeReport::default();
    for spec in specs {
        report.absorb(apply_spec(spec).await?);
    }
    Ok(report)
}

/// Apply a single spec. Per-file failures land in the report; only precondition
/// failures are returned as `Err`.
pub async fn apply_spec(spec: &CopySpec) -> Result<MergeReport> {
    let metadata = fs::metadata(&spec.source)
        .await
        .map_err(|_| Error::TemplateMissing(spec.source.clone()))?;

    if spec.mode == MergeMode::FailIfNonEmpty && !is_empty_dir(&spec.dest).await? {
        return Err(Error::DestinationNotEmpty(spec.dest.clone()));
    }

    let mut report = MergeReport::default();
    if metadata.is_dir() {
        fs::create_dir_all(&spec.dest)
            .await
            .map_err(|e| Error::io(format!("Failed to create {}", spec.dest.display()), e))?;

        for entry in WalkDir::new(&spec.source).min_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(&spec.source).to_path_buf();
                    report.errors.push(FileError {
                        error: Error::io(
                            format!("Failed to walk {}", path.display()),
                            std::io::Error::other(e),
                        ),
                        path,
                    });
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(&spec.source) else {
                continue;
            };
            let target = spec.dest.join(relative);

            if entry.file_type().is_dir() {
                if let Err(e) = fs::create_dir_all(&target).await {
                    report.errors.push(FileError {
                        error: Error::io(format!("Failed to create {}", target.display()), e),
                        path: target,
                    });
                }
                continue;
            }

            copy_file(entry.path(), &target, spec.mode, &mut report).await;
        }
    } else {
        copy_file(&spec.source, &spec.dest, spec.mode, &mut report).await;
    }

    Ok(report)
}

async fn copy_file(source: &Path, target: &Path, mode: MergeMode, report: &mut MergeReport) {
    if mode == MergeMode::SkipExisting {
        match fs::try_exists(target).await {
            Ok(true) => {
                tracing::debug!(path = %target.display(), "exists, skipped");
                report.skipped.push(target.to_path_buf());
                return;
            }
            Ok(false) => {}
            Err(e) => {
                report.errors.push(FileError {
                    path: target.to_path_buf(),
                    error: Error::read(target, e),
                });
                return;
            }
        }
    }

    if let Some(parent) = target.parent() {
        if let Err(e) = fs::create_dir_all(parent).await {
            report.errors.push(FileError {
                path: target.to_path_buf(),
                error: Error::io(format!("Failed to create {}", parent.display()), e),
            });
            return;
        }
    }

    match fs::copy(source, target).await {
        Ok(_) => {
            tracing::debug!(path = %target.display(), "written");
            report.written.push(target.to_path_buf());
        }
        Err(e) => {
            tracing::warn!(path = %target.display(), error = %e, "copy failed");
            report.errors.push(FileError {
                path: target.to_path_buf(),
                error: Error::write(target, e),
            });
        }
    }
}
