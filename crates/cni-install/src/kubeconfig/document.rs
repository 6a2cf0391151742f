//! Serialized shape of the plugin kubeconfig
//!
//! Structs rather than maps so that field order, and therefore the bytes on
//! disk, never depend on hash iteration order.

use serde::{Deserialize, Serialize};

pub const CLUSTER_NAME: &str = "local";
pub const USER_NAME: &str = "cni-plugin";
pub const CONTEXT_NAME: &str = "cni-plugin-context";

/// Comment line written above the YAML document.
pub const HEADER: &str = "# Kubeconfig file for the CNI plugin.\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeconfigDocument {
    pub api_version: String,
    pub kind: String,
    pub clusters: Vec<NamedCluster>,
    pub users: Vec<NamedUser>,
    pub contexts: Vec<NamedContext>,
    #[serde(rename = "current-context")]
    pub current_context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cluster {
    pub server: String,
    /// Base64 encoded CA bundle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_skip_tls_verify: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedUser {
    pub name: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub cluster: String,
    pub user: String,
}

impl KubeconfigDocument {
    /// Single cluster, single user document with a context binding them.
    pub fn new(cluster: Cluster, token: String) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "Config".to_string(),
            clusters: vec![NamedCluster {
                name: CLUSTER_NAME.to_string(),
                cluster,
            }],
            users: vec![NamedUser {
                name: USER_NAME.to_string(),
                user: User { token },
            }],
            contexts: vec![NamedContext {
                name: CONTEXT_NAME.to_string(),
                context: Context {
                    cluster: CLUSTER_NAME.to_string(),
                    user: USER_NAME.to_string(),
                },
            }],
            current_context: CONTEXT_NAME.to_string(),
        }
    }

    /// Header comment followed by the YAML document.
    pub fn render(&self) -> Result<String, serde_yaml::Error> {
        Ok(format!("{}{}", HEADER, serde_yaml::to_string(self)?))
    }
}
