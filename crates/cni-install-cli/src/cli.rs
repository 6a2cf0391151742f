//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use cni_install::InstallConfig;

/// CNI node installer - install plugin binaries and the plugin kubeconfig
#[derive(Parser, Debug)]
#[command(name = "cni-install")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Installer config file (TOML, JSON or YAML); flags override its values
    #[arg(long, global = true, env = "CNI_INSTALL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub install: InstallArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run one installation pass: sync binaries, then reconcile the kubeconfig
    Install,

    /// Report stale binaries and kubeconfig drift without writing anything
    ///
    /// Exits non-zero when anything needs a reconcile.
    Check,

    /// Print the kubeconfig the installer would write
    ShowKubeconfig,
}

/// Overrides for [`InstallConfig`] fields
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallArgs {
    /// Directory holding the kubeconfig (host net.d as mounted)
    #[arg(long, global = true, env = "MOUNTED_CNI_NET_DIR")]
    pub mounted_cni_net_dir: Option<PathBuf>,

    /// Kubeconfig file name
    #[arg(long, global = true, env = "KUBECONFIG_FILENAME")]
    pub kubeconfig_filename: Option<String>,

    /// Most permissive kubeconfig mode, in octal
    #[arg(long, global = true, env = "KUBECONFIG_MODE", value_parser = parse_mode)]
    pub kubeconfig_mode: Option<u32>,

    /// CA bundle to embed in the kubeconfig
    #[arg(long, global = true, env = "KUBE_CA_FILE")]
    pub kube_ca_file: Option<PathBuf>,

    /// API server URL scheme
    #[arg(long, global = true, env = "KUBERNETES_SERVICE_PROTOCOL")]
    pub k8s_service_protocol: Option<String>,

    /// API server host
    #[arg(long, global = true, env = "KUBERNETES_SERVICE_HOST")]
    pub k8s_service_host: Option<String>,

    /// API server port
    #[arg(long, global = true, env = "KUBERNETES_SERVICE_PORT")]
    pub k8s_service_port: Option<String>,

    /// Disable TLS verification of the API server (`--skip-tls-verify=false`
    /// re-enables it over a config file)
    #[arg(
        long,
        global = true,
        env = "SKIP_TLS_VERIFY",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub skip_tls_verify: Option<bool>,

    /// Directory with the mounted service account token
    #[arg(long, global = true, env = "SERVICE_ACCOUNT_TOKEN_PATH")]
    pub service_account_token_path: Option<PathBuf>,

    /// Directory holding the plugin binaries to install
    #[arg(long, global = true, env = "CNI_BIN_SOURCE_DIR")]
    pub cni_bin_source_dir: Option<PathBuf>,

    /// Host directory receiving the binaries (repeatable)
    #[arg(
        long = "cni-bin-target-dir",
        global = true,
        env = "CNI_BIN_TARGET_DIRS",
        value_delimiter = ','
    )]
    pub cni_bin_target_dirs: Vec<PathBuf>,

    /// Prefix for installed binary names
    #[arg(long, global = true, env = "CNI_BINARY_PREFIX")]
    pub binary_prefix: Option<String>,
}

impl InstallArgs {
    /// Apply every override that was given on top of `cfg`.
    pub fn apply(self, cfg: &mut InstallConfig) {
        if let Some(dir) = self.mounted_cni_net_dir {
            cfg.mounted_cni_net_dir = dir;
        }
        if let Some(filename) = self.kubeconfig_filename {
            cfg.kubeconfig_filename = filename;
        }
        if let Some(mode) = self.kubeconfig_mode {
            cfg.kubeconfig_mode = mode;
        }
        if let Some(ca) = self.kube_ca_file {
            cfg.kube_ca_file = Some(ca);
        }
        if let Some(protocol) = self.k8s_service_protocol {
            cfg.k8s_service_protocol = protocol;
        }
        if let Some(host) = self.k8s_service_host {
            cfg.k8s_service_host = host;
        }
        if let Some(port) = self.k8s_service_port {
            cfg.k8s_service_port = port;
        }
        if let Some(skip) = self.skip_tls_verify {
            cfg.skip_tls_verify = skip;
        }
        if let Some(path) = self.service_account_token_path {
            cfg.service_account_token_path = path;
        }
        if let Some(dir) = self.cni_bin_source_dir {
            cfg.cni_bin_source_dir = dir;
        }
        if !self.cni_bin_target_dirs.is_empty() {
            cfg.cni_bin_target_dirs = self.cni_bin_target_dirs;
        }
        if let Some(prefix) = self.binary_prefix {
            cfg.binary_prefix = prefix;
        }
    }
}

fn parse_mode(value: &str) -> Result<u32, String> {
    let digits = value.trim_start_matches("0o");
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
        .ok_or_else(|| format!("invalid octal mode: {value}"))
}
