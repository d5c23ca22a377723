pub mod args;
pub mod commands;

pub use args::{Cli, Commands, RunArgs, SnapshotArgs};
pub use commands::run;
