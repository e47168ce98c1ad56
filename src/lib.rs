//! envstrap - one-time conda environment bootstrap
//!
//! Registers channels, creates an environment from a pinned dependency spec,
//! resolves the environment root, and installs activation/deactivation hook
//! scripts under its configuration root.

pub mod bootstrap;
pub mod cmd;
pub mod conda;
pub mod hooks;
pub mod paths;
pub mod profile;
