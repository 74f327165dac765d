//! Time tracker CLI library.
//!
//! This crate provides the CLI interface for the time tracker.

mod cli;
pub mod commands;
mod config;
pub mod ticker;

pub use cli::{Cli, Commands};
pub use config::Config;
