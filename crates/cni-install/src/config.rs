//! Installer configuration
//!
//! [`InstallConfig`] is built fresh for every pass by the driver, either from
//! defaults, a config file loaded through [`cni_fs::ConfigStore`], command line
//! flags, or a mix of the three.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// File name used when `kubeconfig_filename` is empty. Must stay stable across
/// releases so drift detection keeps finding the file.
pub const DEFAULT_KUBECONFIG_FILENAME: &str = "ZZZ-cni-kubeconfig";

/// Most permissive mode a kubeconfig file may carry by default.
pub const DEFAULT_KUBECONFIG_MODE: u32 = 0o600;

/// Name of the token file inside the mounted service account directory.
pub const TOKEN_FILENAME: &str = "token";

pub const DEFAULT_SERVICE_PROTOCOL: &str = "https";

/// Everything one installer pass needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Directory holding the kubeconfig (the host's CNI net.d, as mounted)
    pub mounted_cni_net_dir: PathBuf,
    /// Kubeconfig file name; empty falls back to [`DEFAULT_KUBECONFIG_FILENAME`]
    pub kubeconfig_filename: String,
    /// Upper bound on the kubeconfig permission bits
    pub kubeconfig_mode: u32,
    /// CA bundle to pin; `None` or empty means no pinned CA
    pub kube_ca_file: Option<PathBuf>,
    /// URL scheme of the API server; empty falls back to `https`
    pub k8s_service_protocol: String,
    pub k8s_service_host: String,
    pub k8s_service_port: String,
    /// Emit `insecure-skip-tls-verify`. Takes precedence over `kube_ca_file`.
    pub skip_tls_verify: bool,
    /// Directory with the mounted service account `token`
    pub service_account_token_path: PathBuf,
    /// Directory holding the plugin artifacts to install
    pub cni_bin_source_dir: PathBuf,
    /// Host directories that receive the artifacts
    pub cni_bin_target_dirs: Vec<PathBuf>,
    /// Prepended to every installed artifact name
    pub binary_prefix: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            mounted_cni_net_dir: PathBuf::from("/host/etc/cni/net.d"),
            kubeconfig_filename: DEFAULT_KUBECONFIG_FILENAME.to_string(),
            kubeconfig_mode: DEFAULT_KUBECONFIG_MODE,
            kube_ca_file: None,
            k8s_service_protocol: DEFAULT_SERVICE_PROTOCOL.to_string(),
            k8s_service_host: String::new(),
            k8s_service_port: String::new(),
            skip_tls_verify: false,
            service_account_token_path: PathBuf::from(
                "/var/run/secrets/kubernetes.io/serviceaccount",
            ),
            cni_bin_source_dir: PathBuf::from("/opt/cni/bin"),
            cni_bin_target_dirs: vec![PathBuf::from("/host/opt/cni/bin")],
            binary_prefix: String::new(),
        }
    }
}

impl InstallConfig {
    /// Load a config file (TOML, JSON or YAML by extension). Missing keys
    /// keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(cni_fs::ConfigStore::new().load(path)?)
    }

    /// Full path of the kubeconfig file.
    pub fn kubeconfig_path(&self) -> PathBuf {
        let filename = if self.kubeconfig_filename.is_empty() {
            DEFAULT_KUBECONFIG_FILENAME
        } else {
            &self.kubeconfig_filename
        };
        self.mounted_cni_net_dir.join(filename)
    }

    /// Full path of the service account token file.
    pub fn token_path(&self) -> PathBuf {
        self.service_account_token_path.join(TOKEN_FILENAME)
    }

    pub fn service_protocol(&self) -> &str {
        if self.k8s_service_protocol.is_empty() {
            DEFAULT_SERVICE_PROTOCOL
        } else {
            &self.k8s_service_protocol
        }
    }

    /// The CA bundle path, treating an empty path as unset.
    pub fn ca_file(&self) -> Option<&Path> {
        self.kube_ca_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}
