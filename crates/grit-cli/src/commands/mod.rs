//! CLI subcommands.

pub mod curves;
pub mod generate;
pub mod process;
pub mod verify;
