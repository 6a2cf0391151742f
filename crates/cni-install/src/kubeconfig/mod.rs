//! Kubeconfig provisioning for the installed plugin
//!
//! This module provides:
//! - **build**: derive the exact kubeconfig bytes from an [`InstallConfig`]
//! - **inspect / check**: compare the file on disk against those bytes
//!   without writing
//! - **ensure / write / install**: bring the file on disk up to date
//!
//! The file cycles between current and stale as service account tokens
//! rotate; every pass rebuilds the expected content and reconciles.

mod document;
mod reconcile;

pub use document::{
    CLUSTER_NAME, CONTEXT_NAME, Cluster, Context, HEADER, KubeconfigDocument, NamedCluster,
    NamedContext, NamedUser, USER_NAME, User,
};
pub use reconcile::{
    KubeconfigOutcome, KubeconfigStatus, check_existing_kubeconfig, ensure_kubeconfig,
    inspect_kubeconfig, install_kubeconfig, write_kubeconfig,
};

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cni_fs::io;
use tracing::debug;

use crate::{Error, InstallConfig, Result};

/// A fully rendered kubeconfig
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeConfig {
    /// API server URL the kubeconfig points at
    pub server: String,
    /// Complete file content, byte for byte what goes on disk
    pub full: String,
}

impl KubeConfig {
    pub fn as_bytes(&self) -> &[u8] {
        self.full.as_bytes()
    }

    /// Canonical `sha256:<hex>` digest of [`Self::full`].
    pub fn checksum(&self) -> String {
        cni_fs::compute_checksum(self.as_bytes())
    }

    /// Parse [`Self::full`] back into its document form.
    pub fn document(&self) -> Result<KubeconfigDocument> {
        Ok(serde_yaml::from_str(&self.full)?)
    }
}

/// Build the kubeconfig the plugin should find on disk.
///
/// The result is a pure function of the server address, TLS material, token
/// and the fixed entry names: identical inputs give identical bytes, which is
/// what makes it usable as the drift oracle. The token is read on every call.
///
/// # Errors
///
/// - [`Error::MissingServiceAddress`] when host or port is empty
/// - [`Error::NoTrustMaterial`] when neither skip-tls-verify nor a CA file is set
/// - [`Error::Fs`] when the token or CA file cannot be read
/// - [`Error::EmptyToken`] / [`Error::InvalidToken`] for unusable tokens
pub fn build_kubeconfig(cfg: &InstallConfig) -> Result<KubeConfig> {
    let server = server_url(cfg)?;

    if !cfg.skip_tls_verify && cfg.ca_file().is_none() {
        return Err(Error::NoTrustMaterial);
    }

    let token = read_token(&cfg.token_path())?;

    let cluster = match cfg.ca_file() {
        _ if cfg.skip_tls_verify => Cluster {
            server: server.clone(),
            certificate_authority_data: None,
            insecure_skip_tls_verify: Some(true),
        },
        Some(ca_file) => Cluster {
            server: server.clone(),
            certificate_authority_data: Some(STANDARD.encode(io::read_bytes(ca_file)?)),
            insecure_skip_tls_verify: None,
        },
        None => return Err(Error::NoTrustMaterial),
    };

    let full = KubeconfigDocument::new(cluster, token).render()?;
    let kubeconfig = KubeConfig { server, full };

    debug!(
        server = %kubeconfig.server,
        skip_tls_verify = cfg.skip_tls_verify,
        checksum = %kubeconfig.checksum(),
        "built kubeconfig"
    );
    Ok(kubeconfig)
}

/// `<protocol>://<host>:<port>`, bracketing IPv6 literals.
fn server_url(cfg: &InstallConfig) -> Result<String> {
    let host = cfg.k8s_service_host.trim();
    let port = cfg.k8s_service_port.trim();

    let missing = match (host.is_empty(), port.is_empty()) {
        (true, true) => Some("k8s_service_host and k8s_service_port"),
        (true, false) => Some("k8s_service_host"),
        (false, true) => Some("k8s_service_port"),
        (false, false) => None,
    };
    if let Some(missing) = missing {
        return Err(Error::MissingServiceAddress { missing });
    }

    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_string()
    };

    Ok(format!("{}://{}:{}", cfg.service_protocol(), host, port))
}

fn read_token(path: &Path) -> Result<String> {
    let raw = io::read_bytes(path)?;
    let token = String::from_utf8(raw).map_err(|_| Error::InvalidToken {
        path: path.to_path_buf(),
    })?;

    let token = token.trim_end();
    if token.is_empty() {
        return Err(Error::EmptyToken {
            path: path.to_path_buf(),
        });
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cfg(protocol: &str, host: &str, port: &str) -> InstallConfig {
        InstallConfig {
            k8s_service_protocol: protocol.to_string(),
            k8s_service_host: host.to_string(),
            k8s_service_port: port.to_string(),
            ..Default::default()
        }
    }

    #[rstest]
    #[case("", "10.96.0.1", "443", "https://10.96.0.1:443")]
    #[case("http", "10.96.0.1", "8080", "http://10.96.0.1:8080")]
    #[case("https", "kubernetes.default.svc", "443", "https://kubernetes.default.svc:443")]
    #[case("https", "fd00:10:96::1", "443", "https://[fd00:10:96::1]:443")]
    #[case("https", "[fd00::1]", "6443", "https://[fd00::1]:6443")]
    fn server_url_composition(
        #[case] protocol: &str,
        #[case] host: &str,
        #[case] port: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(server_url(&cfg(protocol, host, port)).unwrap(), expected);
    }

    #[rstest]
    #[case("", "", "k8s_service_host and k8s_service_port")]
    #[case("", "443", "k8s_service_host")]
    #[case("10.96.0.1", "", "k8s_service_port")]
    fn server_url_requires_host_and_port(
        #[case] host: &str,
        #[case] port: &str,
        #[case] expected_missing: &str,
    ) {
        match server_url(&cfg("https", host, port)) {
            Err(Error::MissingServiceAddress { missing }) => assert_eq!(missing, expected_missing),
            other => panic!("expected MissingServiceAddress, got {:?}", other),
        }
    }

    #[test]
    fn read_token_trims_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "abc\n").unwrap();

        assert_eq!(read_token(&path).unwrap(), "abc");
    }

    #[test]
    fn read_token_rejects_blank_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "\n").unwrap();

        assert!(matches!(read_token(&path), Err(Error::EmptyToken { .. })));
    }

    #[test]
    fn read_token_rejects_non_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(read_token(&path), Err(Error::InvalidToken { .. })));
    }
}
