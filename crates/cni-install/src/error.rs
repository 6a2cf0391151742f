//! Error types for cni-install

use std::path::PathBuf;

/// Result type for cni-install operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while installing binaries or provisioning the
/// kubeconfig
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Kubernetes service host and/or port not configured
    #[error("Kubernetes service address incomplete: {missing} not set")]
    MissingServiceAddress { missing: &'static str },

    /// Neither a CA bundle nor skip-tls-verify was configured
    #[error("No TLS trust material configured: set a CA file or enable skip-tls-verify")]
    NoTrustMaterial,

    /// The mounted service account token file is empty
    #[error("Service account token at {path} is empty")]
    EmptyToken { path: PathBuf },

    /// The mounted service account token is not valid UTF-8
    #[error("Service account token at {path} is not valid UTF-8")]
    InvalidToken { path: PathBuf },

    /// No kubeconfig on disk yet
    #[error("Kubeconfig not found at {path}")]
    KubeconfigMissing { path: PathBuf },

    /// Kubeconfig on disk differs from the expected content
    #[error("Kubeconfig at {path} has drifted: expected {expected}, found {found}")]
    KubeconfigDrift {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// Installing binaries into one target directory failed
    #[error("Failed to install binaries into {target_dir}: {source}")]
    BinarySync {
        target_dir: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Filesystem error from cni-fs
    #[error(transparent)]
    Fs(#[from] cni_fs::Error),

    /// Kubeconfig serialization error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether this error reports kubeconfig drift (missing or mismatched)
    /// rather than a fault. Readiness checks use it to request a reconcile.
    pub fn is_drift(&self) -> bool {
        matches!(
            self,
            Self::KubeconfigMissing { .. } | Self::KubeconfigDrift { .. }
        )
    }

    pub fn is_missing_kubeconfig(&self) -> bool {
        matches!(self, Self::KubeconfigMissing { .. })
    }

    /// Whether this error comes from the installer configuration itself.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::MissingServiceAddress { .. }
                | Self::NoTrustMaterial
                | Self::EmptyToken { .. }
                | Self::InvalidToken { .. }
        )
    }
}
