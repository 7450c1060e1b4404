//! # vault-cli
//!
//! Command-line front end for ArkVault. Argument definitions live in
//! [`cli`]; [`commands::run`] executes them against a vault.

pub mod cli;
pub mod commands;
mod output;
mod profile;

pub use cli::{Cli, Command};
pub use commands::run;
