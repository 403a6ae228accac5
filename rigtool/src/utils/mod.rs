//! Shared utilities for the rigtool CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
