//! One installation pass

use colored::Colorize;
use cni_install::{InstallConfig, KubeconfigOutcome, install_kubeconfig, sync_binaries};
use tracing::{info, warn};

use crate::error::Result;

/// Sync binaries, then reconcile the kubeconfig.
///
/// The two steps are independent: a binary failure is reported after the
/// kubeconfig has still been reconciled.
pub fn run_install(cfg: &InstallConfig) -> Result<()> {
    let binaries = sync_binaries(
        &cfg.cni_bin_source_dir,
        &cfg.cni_bin_target_dirs,
        &cfg.binary_prefix,
    )
    .and_then(|report| {
        for failure in &report.failed {
            warn!(
                target_dir = %failure.target_dir.display(),
                error = %failure.error,
                "failed to install binaries"
            );
        }
        report.into_result()
    });

    match &binaries {
        Ok(copied) if copied.is_empty() => {
            info!("binaries already current");
            println!("{} binaries already current", "ok".green().bold());
        }
        Ok(copied) => {
            info!(count = copied.len(), "installed binaries");
            for name in copied {
                println!("{} {}", "installed".green().bold(), name);
            }
        }
        Err(e) => warn!(error = %e, "binary sync failed"),
    }

    let path = cfg.kubeconfig_path();
    let outcome = install_kubeconfig(cfg)?;
    info!(path = %path.display(), ?outcome, "kubeconfig reconciled");
    let label = match outcome {
        KubeconfigOutcome::Created => "created".green().bold(),
        KubeconfigOutcome::Replaced => "replaced".yellow().bold(),
        KubeconfigOutcome::Unchanged => "ok".green().bold(),
    };
    println!("{} kubeconfig {}", label, path.display());

    binaries?;
    Ok(())
}
