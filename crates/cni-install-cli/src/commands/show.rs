use cni_install::{InstallConfig, build_kubeconfig};

use crate::error::Result;

/// Print the kubeconfig that `install` would write.
pub fn run_show_kubeconfig(cfg: &InstallConfig) -> Result<()> {
    let kubeconfig = build_kubeconfig(cfg)?;
    print!("{}", kubeconfig.full);
    Ok(())
}
