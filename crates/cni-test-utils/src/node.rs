//! [`TestNode`] builder for installer test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Token written by [`TestNode::with_token`] when no other value matters.
pub const TEST_TOKEN: &str = "service_account_token_string";

/// A syntactically plausible CA bundle. Its content is only ever embedded,
/// never parsed.
pub const TEST_CA_PEM: &str = "-----BEGIN CERTIFICATE-----
MIIC5zCCAc+gAwIBAgIBATANBgkqhkiG9w0BAQsFADAVMRMwEQYDVQQDEwptaW5p
a3ViZUNBMB4XDTE5MDgxMzE3MjEwOVoXDTI5MDgxMTE3MjEwOVowFTETMBEGA1UE
AxMKbWluaWt1YmVDQTCCASIwDQYJKoZIhvcNAQEBBQADggEPADCCAQoCggEBAMm2
-----END CERTIFICATE-----
";

/// A temporary directory laid out like the slice of a node the installer
/// touches.
///
/// ```text
/// <root>/src/                 artifacts to install
/// <root>/targets/<name>/      host binary directories (created lazily)
/// <root>/net.d/               mounted CNI net.d (not created)
/// <root>/serviceaccount/      mounted token directory
/// <root>/kube-ca.crt          CA bundle
/// ```
///
/// # Example
///
/// ```rust
/// use cni_test_utils::TestNode;
///
/// let node = TestNode::new().with_token("abc").with_source("plugin-bin", "v1");
/// node.assert_file_contents(&node.source_dir().join("plugin-bin"), "v1");
/// node.assert_file_not_exists(&node.target_dir("bin").join("plugin-bin"));
/// ```
pub struct TestNode {
    temp_dir: TempDir,
}

impl Default for TestNode {
    fn default() -> Self {
        Self::new()
    }
}

impl TestNode {
    /// Create a node with an empty source directory.
    pub fn new() -> Self {
        let node = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(node.source_dir()).unwrap();
        node
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root().join("src")
    }

    /// Path of a target directory. Not created.
    pub fn target_dir(&self, name: &str) -> PathBuf {
        self.root().join("targets").join(name)
    }

    /// Mounted net.d directory. Not created.
    pub fn net_dir(&self) -> PathBuf {
        self.root().join("net.d")
    }

    pub fn token_dir(&self) -> PathBuf {
        self.root().join("serviceaccount")
    }

    pub fn ca_path(&self) -> PathBuf {
        self.root().join("kube-ca.crt")
    }

    /// Add an artifact to the source directory.
    pub fn with_source(self, name: &str, contents: &str) -> Self {
        fs::write(self.source_dir().join(name), contents).unwrap();
        self
    }

    /// Place a pre-existing file in a target directory, creating it.
    pub fn with_existing(self, target: &str, name: &str, contents: &str) -> Self {
        let dir = self.target_dir(target);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
        self
    }

    /// Write the mounted service account token.
    pub fn with_token(self, token: &str) -> Self {
        self.write_token(token);
        self
    }

    /// Overwrite the token in place, as a rotation would.
    pub fn write_token(&self, token: &str) {
        fs::create_dir_all(self.token_dir()).unwrap();
        fs::write(self.token_dir().join("token"), token).unwrap();
    }

    /// Write [`TEST_CA_PEM`] to [`Self::ca_path`].
    pub fn with_ca(self) -> Self {
        fs::write(self.ca_path(), TEST_CA_PEM).unwrap();
        self
    }

    /// Read a file as UTF-8.
    ///
    /// # Panics
    /// Panics with the path if it cannot be read.
    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Could not read file {}: {}", path.display(), e))
    }

    /// Assert that the file at `path` holds exactly `expected`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or differs.
    pub fn assert_file_contents(&self, path: &Path, expected: &str) {
        let actual = self.read(path);
        assert_eq!(
            actual,
            expected,
            "Unexpected contents in {}",
            path.display()
        );
    }

    /// Assert that `path` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &Path) {
        assert!(
            !path.exists(),
            "Expected file NOT to exist: {}",
            path.display()
        );
    }

    /// Names of the files in a directory, sorted.
    pub fn file_names(&self, dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap_or_else(|e| panic!("Could not list {}: {}", dir.display(), e))
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
