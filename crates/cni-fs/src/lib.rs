//! Filesystem primitives for the CNI node installer
//!
//! Provides the atomic replace used for every file the installer lays down on
//! the host, plus reads that distinguish "absent" from "unreadable",
//! content checksums and a format-agnostic config store.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;

pub use checksum::compute_checksum;
pub use config::ConfigStore;
pub use error::{Error, Result};
