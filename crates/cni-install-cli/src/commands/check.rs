//! Non-mutating readiness check

use colored::Colorize;
use cni_install::{InstallConfig, build_kubeconfig, check_existing_kubeconfig, stale_binaries};
use tracing::info;

use crate::error::{CliError, Result};

/// Report stale binaries and kubeconfig drift. Writes nothing.
pub fn run_check(cfg: &InstallConfig) -> Result<()> {
    let mut problems = Vec::new();

    let stale = stale_binaries(
        &cfg.cni_bin_source_dir,
        &cfg.cni_bin_target_dirs,
        &cfg.binary_prefix,
    )?;
    for name in &stale {
        println!("{} binary {}", "stale".yellow().bold(), name);
    }
    if !stale.is_empty() {
        problems.push(format!("{} stale binaries", stale.len()));
    }

    let expected = build_kubeconfig(cfg)?;
    match check_existing_kubeconfig(cfg, &expected) {
        Ok(()) => println!("{} kubeconfig {}", "ok".green().bold(), cfg.kubeconfig_path().display()),
        Err(e) if e.is_drift() => {
            println!("{} {}", "drift".yellow().bold(), e);
            problems.push(e.to_string());
        }
        Err(e) => return Err(e.into()),
    }

    if problems.is_empty() {
        info!("node is installed and current");
        Ok(())
    } else {
        Err(CliError::NotReady {
            message: problems.join("; "),
        })
    }
}
