//! Skelanim CLI library
//!
//! Command implementations and output helpers behind the `skelanim` binary.

pub mod cli;
pub mod commands;
pub mod utils;
