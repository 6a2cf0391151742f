//! Reconciles the kubeconfig on disk with the expected content

use std::path::Path;

use cni_fs::io;
use tracing::debug;

use super::{KubeConfig, build_kubeconfig};
use crate::{Error, InstallConfig, Result};

/// State of the kubeconfig file relative to the expected content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KubeconfigStatus {
    /// On disk and byte-identical
    Current,
    /// Not on disk
    Missing,
    /// On disk with different content
    Stale,
}

/// What a reconcile pass did to the kubeconfig file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KubeconfigOutcome {
    Created,
    Replaced,
    Unchanged,
}

/// Compare the file on disk against `expected` without writing.
///
/// Only I/O failures other than "not found" are errors.
pub fn inspect_kubeconfig(cfg: &InstallConfig, expected: &KubeConfig) -> Result<KubeconfigStatus> {
    let status = match io::read_optional(&cfg.kubeconfig_path())? {
        None => KubeconfigStatus::Missing,
        Some(existing) if existing == expected.as_bytes() => KubeconfigStatus::Current,
        Some(_) => KubeconfigStatus::Stale,
    };
    Ok(status)
}

/// Non-mutating readiness check.
///
/// # Errors
///
/// [`Error::KubeconfigMissing`] when there is no file, [`Error::KubeconfigDrift`]
/// when its content differs from `expected`.
pub fn check_existing_kubeconfig(cfg: &InstallConfig, expected: &KubeConfig) -> Result<()> {
    let path = cfg.kubeconfig_path();
    match io::read_optional(&path)? {
        None => Err(Error::KubeconfigMissing { path }),
        Some(existing) if existing == expected.as_bytes() => Ok(()),
        Some(existing) => Err(Error::KubeconfigDrift {
            path,
            expected: expected.checksum(),
            found: cni_fs::compute_checksum(&existing),
        }),
    }
}

/// Bring an existing kubeconfig file up to date.
///
/// Identical content is left in place (only an overly permissive mode is
/// tightened). Different content is replaced atomically, keeping the prior
/// mode unless it allows more than `cfg.kubeconfig_mode`.
///
/// # Errors
///
/// [`Error::KubeconfigMissing`] when there is no file yet: callers decide
/// whether that is fatal or a cue for [`write_kubeconfig`].
pub fn ensure_kubeconfig(cfg: &InstallConfig, expected: &KubeConfig) -> Result<KubeconfigOutcome> {
    let path = cfg.kubeconfig_path();
    let Some(existing) = io::read_optional(&path)? else {
        return Err(Error::KubeconfigMissing { path });
    };
    let prior_mode = io::file_mode(&path)?;

    if existing == expected.as_bytes() {
        if let Some(mode) = prior_mode {
            tighten_mode(&path, mode, cfg.kubeconfig_mode)?;
        }
        debug!(path = %path.display(), "kubeconfig already current");
        return Ok(KubeconfigOutcome::Unchanged);
    }

    let mode = prior_mode
        .map(|mode| restricted_mode(mode, cfg.kubeconfig_mode))
        .unwrap_or(cfg.kubeconfig_mode);
    io::write_atomic(&path, expected.as_bytes(), Some(mode))?;

    debug!(
        path = %path.display(),
        previous = %cni_fs::compute_checksum(&existing),
        current = %expected.checksum(),
        "replaced stale kubeconfig"
    );
    Ok(KubeconfigOutcome::Replaced)
}

/// Write `expected` unconditionally with `cfg.kubeconfig_mode`.
pub fn write_kubeconfig(cfg: &InstallConfig, expected: &KubeConfig) -> Result<()> {
    let path = cfg.kubeconfig_path();
    io::write_atomic(&path, expected.as_bytes(), Some(cfg.kubeconfig_mode))?;
    debug!(path = %path.display(), checksum = %expected.checksum(), "wrote kubeconfig");
    Ok(())
}

/// Build the expected kubeconfig and reconcile it, creating the file when it
/// does not exist yet.
pub fn install_kubeconfig(cfg: &InstallConfig) -> Result<KubeconfigOutcome> {
    let expected = build_kubeconfig(cfg)?;
    match ensure_kubeconfig(cfg, &expected) {
        Err(Error::KubeconfigMissing { .. }) => {
            write_kubeconfig(cfg, &expected)?;
            Ok(KubeconfigOutcome::Created)
        }
        other => other,
    }
}

/// `mode` if it grants nothing beyond `limit`, otherwise `limit`.
fn restricted_mode(mode: u32, limit: u32) -> u32 {
    if mode & !limit == 0 { mode } else { limit }
}

fn tighten_mode(path: &Path, mode: u32, limit: u32) -> Result<()> {
    let restricted = restricted_mode(mode, limit);
    if restricted != mode {
        debug!(path = %path.display(), from = mode, to = restricted, "tightening kubeconfig mode");
        io::set_mode(path, restricted)?;
    }
    Ok(())
}
