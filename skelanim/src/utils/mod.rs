//! Shared utilities for the skelanim CLI

pub mod table;
pub mod tree;

pub use table::*;
pub use tree::*;
