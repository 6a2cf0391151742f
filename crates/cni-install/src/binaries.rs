//! Installs plugin artifacts into the host's CNI binary directories
//!
//! Every regular file directly under the source directory is an artifact. It
//! lands in each target directory as `prefix + filename`, written through the
//! atomic replace so the kubelet never executes a half-written binary. A
//! destination that already holds identical bytes is left alone; content, not
//! timestamps, decides.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use cni_fs::io;
use tracing::debug;

use crate::{Error, Result};

/// Mode applied to every installed artifact.
pub const BINARY_MODE: u32 = 0o755;

/// An artifact loaded from the source directory.
#[derive(Debug)]
struct Artifact {
    /// Destination file name, prefix included
    name: String,
    content: Vec<u8>,
}

/// A target directory that could not be fully synchronized.
#[derive(Debug)]
pub struct TargetFailure {
    pub target_dir: PathBuf,
    pub error: Error,
}

/// Result of a synchronization pass
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Destination names written in at least one target directory
    pub copied: BTreeSet<String>,
    /// Target directories where copying stopped early
    pub failed: Vec<TargetFailure>,
}

impl SyncReport {
    /// Whether every target directory was processed without error.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether every target already held the current artifacts.
    pub fn is_current(&self) -> bool {
        self.is_success() && self.copied.is_empty()
    }

    /// Collapse into the copied set, or the first target failure.
    pub fn into_result(self) -> Result<BTreeSet<String>> {
        match self.failed.into_iter().next() {
            None => Ok(self.copied),
            Some(failure) => Err(Error::BinarySync {
                target_dir: failure.target_dir,
                source: Box::new(failure.error),
            }),
        }
    }
}

/// Copy every artifact in `source_dir` into each of `target_dirs`.
///
/// Target directories are created when missing. A failure inside one target
/// stops the remaining copies for that target and is recorded in
/// [`SyncReport::failed`]; the other targets are still processed and nothing
/// already written is rolled back.
///
/// # Errors
///
/// Returns an error without touching any target when the source directory
/// cannot be listed or one of its files cannot be read.
pub fn sync_binaries(
    source_dir: &Path,
    target_dirs: &[PathBuf],
    prefix: &str,
) -> Result<SyncReport> {
    let artifacts = load_artifacts(source_dir, prefix)?;
    let mut report = SyncReport::default();

    for target_dir in target_dirs {
        if let Err(error) = sync_target(target_dir, &artifacts, &mut report.copied) {
            debug!(target_dir = %target_dir.display(), %error, "binary sync stopped for target");
            report.failed.push(TargetFailure {
                target_dir: target_dir.clone(),
                error,
            });
        }
    }

    debug!(
        copied = report.copied.len(),
        failed = report.failed.len(),
        "binary sync finished"
    );
    Ok(report)
}

/// Destination names that [`sync_binaries`] would write, without writing.
///
/// A missing target directory is not created; every artifact counts as stale
/// there.
pub fn stale_binaries(
    source_dir: &Path,
    target_dirs: &[PathBuf],
    prefix: &str,
) -> Result<BTreeSet<String>> {
    let artifacts = load_artifacts(source_dir, prefix)?;
    let mut stale = BTreeSet::new();

    for target_dir in target_dirs {
        for artifact in &artifacts {
            let dest = target_dir.join(&artifact.name);
            let current = io::read_optional(&dest)?;
            if current.as_deref() != Some(artifact.content.as_slice()) {
                debug!(file = %dest.display(), "binary is stale");
                stale.insert(artifact.name.clone());
            }
        }
    }

    Ok(stale)
}

fn load_artifacts(source_dir: &Path, prefix: &str) -> Result<Vec<Artifact>> {
    io::regular_files(source_dir)?
        .into_iter()
        .map(|path| {
            let content = io::read_bytes(&path)?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Artifact {
                name: format!("{prefix}{filename}"),
                content,
            })
        })
        .collect()
}

fn sync_target(
    target_dir: &Path,
    artifacts: &[Artifact],
    copied: &mut BTreeSet<String>,
) -> Result<()> {
    io::ensure_dir(target_dir)?;

    for artifact in artifacts {
        let dest = target_dir.join(&artifact.name);

        if io::read_optional(&dest)?.as_deref() == Some(artifact.content.as_slice()) {
            ensure_executable(&dest)?;
            debug!(file = %dest.display(), "binary already current");
            continue;
        }

        io::write_atomic(&dest, &artifact.content, Some(BINARY_MODE))?;
        debug!(
            file = %dest.display(),
            checksum = %cni_fs::compute_checksum(&artifact.content),
            "installed binary"
        );
        copied.insert(artifact.name.clone());
    }

    Ok(())
}

/// Restore execute bits on a file whose content is already current.
fn ensure_executable(path: &Path) -> Result<()> {
    if let Some(mode) = io::file_mode(path)? {
        if mode & BINARY_MODE != BINARY_MODE {
            io::set_mode(path, BINARY_MODE)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(dir: &str) -> TargetFailure {
        TargetFailure {
            target_dir: PathBuf::from(dir),
            error: Error::NoTrustMaterial,
        }
    }

    #[test]
    fn empty_report_is_current() {
        let report = SyncReport::default();
        assert!(report.is_success());
        assert!(report.is_current());
        assert!(report.into_result().unwrap().is_empty());
    }

    #[test]
    fn report_with_copies_is_not_current() {
        let report = SyncReport {
            copied: BTreeSet::from(["my-plugin".to_string()]),
            failed: Vec::new(),
        };
        assert!(report.is_success());
        assert!(!report.is_current());
    }

    #[test]
    fn into_result_reports_first_failed_target() {
        let report = SyncReport {
            copied: BTreeSet::from(["plugin".to_string()]),
            failed: vec![failure("/a"), failure("/b")],
        };

        match report.into_result() {
            Err(Error::BinarySync { target_dir, .. }) => {
                assert_eq!(target_dir, PathBuf::from("/a"))
            }
            other => panic!("expected BinarySync error, got {:?}", other),
        }
    }
}
