//! Shared test utilities for the cni-installer workspace.
//!
//! This crate provides standardised fixtures so each crate's test suite does
//! not rebuild the same node layout by hand. It is a dev-dependency only,
//! never published.
//!
//! # Modules
//!
//! - [`node`]: [`TestNode`] builder for a fake node filesystem

pub mod node;

pub use node::{TEST_CA_PEM, TEST_TOKEN, TestNode};
