//! # obdm-cli
//!
//! Subcommand handlers for the `obdm` binary. Each subcommand lives in
//! its own module with a clap `Args` struct and a `run_*` entry point
//! returning the process exit code.

pub mod extract;
pub mod matrix;
