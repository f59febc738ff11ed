//! Shared utilities for the creature-rs CLI

pub mod table;
pub mod tree;

pub use table::*;
pub use tree::*;
