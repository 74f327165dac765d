//! CLI subcommand implementations.

pub mod delete;
pub mod list;
pub mod stats;
pub mod status;
pub mod timer;
pub mod util;
pub mod watch;
