//! Node-local installation of a CNI plugin and its Kubernetes credentials
//!
//! This crate holds the installer's two decision engines:
//!
//! - **Binary synchronization** ([`binaries`]): copy plugin artifacts into the
//!   host directories the kubelet scans, skipping writes whose content is
//!   already in place, and report which destination files changed.
//! - **Kubeconfig provisioning** ([`kubeconfig`]): derive the exact bytes of
//!   the plugin's kubeconfig from an [`InstallConfig`], compare them against
//!   the file on disk and rewrite it when it has drifted.
//!
//! # Architecture
//!
//! ```text
//!              cni-install-cli
//!                    |
//!               cni-install
//!                    |
//!                 cni-fs
//! ```
//!
//! Both engines are synchronous and keep no state between calls; the host
//! filesystem is the only state of record. Every write goes through
//! [`cni_fs::io::write_atomic`]. Nothing here retries: callers re-run a pass
//! when an operation returns an error.
//!
//! # Example
//!
//! ```no_run
//! use cni_install::{InstallConfig, binaries, kubeconfig};
//!
//! fn pass(cfg: &InstallConfig) -> cni_install::Result<()> {
//!     let copied = binaries::sync_binaries(
//!         &cfg.cni_bin_source_dir,
//!         &cfg.cni_bin_target_dirs,
//!         &cfg.binary_prefix,
//!     )?
//!     .into_result()?;
//!     let outcome = kubeconfig::install_kubeconfig(cfg)?;
//!     println!("copied {:?}, kubeconfig {:?}", copied, outcome);
//!     Ok(())
//! }
//! ```

pub mod binaries;
pub mod config;
pub mod error;
pub mod kubeconfig;

pub use binaries::{SyncReport, TargetFailure, stale_binaries, sync_binaries};
pub use config::InstallConfig;
pub use error::{Error, Result};
pub use kubeconfig::{
    KubeConfig, KubeconfigOutcome, KubeconfigStatus, build_kubeconfig, check_existing_kubeconfig,
    ensure_kubeconfig, inspect_kubeconfig, install_kubeconfig, write_kubeconfig,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn error_kubeconfig_missing_displays_path() {
        let path = PathBuf::from("/host/etc/cni/net.d/ZZZ-cni-kubeconfig");
        let error = Error::KubeconfigMissing { path };

        let display = format!("{}", error);
        assert!(
            display.contains("/host/etc/cni/net.d/ZZZ-cni-kubeconfig"),
            "Error display should contain the path, got: {}",
            display
        );
        assert!(error.is_drift());
        assert!(error.is_missing_kubeconfig());
    }
}
