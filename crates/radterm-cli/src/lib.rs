//! Command implementations shared by the `termtool` and `gatetool` binaries.

pub mod commands;
pub mod curated_dir;
