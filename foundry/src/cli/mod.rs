//! CLI module
//!
//! Argument definitions for the `foundry` binary.

pub mod args;

pub use args::{Cli, Commands};
