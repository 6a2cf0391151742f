//! CNI node installer CLI
//!
//! Runs one pass of the installer against the host filesystem and exits.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use cni_install::InstallConfig;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("failed to initialize logging: {e}")))?;

    let cfg = resolve_config(&cli)?;
    tracing::debug!(?cfg, "resolved install config");

    match cli.command {
        Commands::Install => commands::run_install(&cfg),
        Commands::Check => commands::run_check(&cfg),
        Commands::ShowKubeconfig => commands::run_show_kubeconfig(&cfg),
    }
}

/// Defaults, then the config file if any, then flags and environment.
fn resolve_config(cli: &Cli) -> Result<InstallConfig> {
    let mut cfg = match &cli.config {
        Some(path) => InstallConfig::load(path)?,
        None => InstallConfig::default(),
    };
    cli.install.clone().apply(&mut cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("install.toml");
        fs::write(
            &path,
            "k8s_service_host = \"10.96.0.1\"\nk8s_service_port = \"443\"\nbinary_prefix = \"file-\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "cni-install",
            "--config",
            path.to_str().unwrap(),
            "--k8s-service-port",
            "6443",
            "install",
        ])
        .unwrap();
        let cfg = resolve_config(&cli).unwrap();

        assert_eq!(cfg.k8s_service_host, "10.96.0.1");
        assert_eq!(cfg.k8s_service_port, "6443");
        assert_eq!(cfg.binary_prefix, "file-");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");

        let cli = Cli::try_parse_from(["cni-install", "--config", path.to_str().unwrap(), "check"])
            .unwrap();

        assert!(resolve_config(&cli).is_err());
    }
}
