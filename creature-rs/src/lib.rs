//! Creature-RS library
//!
//! Command implementations and output helpers behind the `creature-rs` binary.

pub mod cli;
pub mod commands;
pub mod utils;
