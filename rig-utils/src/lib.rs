//! Small helpers shared by the rig-rs format crates.

pub mod debug;
