//! Command implementations
//!
//! Each command runs a single pass and returns. Looping, watching and retry
//! scheduling belong to whatever supervises this process.

mod check;
mod install;
mod show;

pub use check::run_check;
pub use install::run_install;
pub use show::run_show_kubeconfig;
