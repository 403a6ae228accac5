//! Command implementations

pub mod clip;
pub mod sm;

use anyhow::{Context, Result};
use rig_anim::ResourceId;
use std::path::Path;

/// Read a whole file with a path-bearing error
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to open file: {}", path.display()))
}

/// Identifier for a file: explicit `--uid`, else a numeric file stem, else 0
pub fn resource_id_for(path: &Path, uid: Option<u64>) -> ResourceId {
    uid.or_else(|| path.file_stem()?.to_str()?.parse().ok())
        .map_or(ResourceId(0), ResourceId)
}

/// Display name for a file: its stem
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
}
