//! ips-patcher library
//!
//! Command definitions and helpers behind the `ips-patcher` binary.

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;
