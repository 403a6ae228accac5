//! Optional versioned header in front of clip and state-machine payloads.
//!
//! The header is a 4-byte magic followed by a `u8` schema version. Payloads
//! without it are read as the bare layout, so files written by older tools
//! keep loading.

use bytes::{BufMut, BytesMut};
use log::debug;
use rig_data::reader::DataReader;

use crate::error::{AnimError, Result};

/// Highest schema version this build reads and the one it writes
pub const SCHEMA_VERSION: u8 = 1;

pub const CLIP_MAGIC: [u8; 4] = *b"RCLP";
pub const STATE_MACHINE_MAGIC: [u8; 4] = *b"RSMD";

/// Size of magic plus version
pub const HEADER_SIZE: usize = 5;

pub fn write_header(out: &mut BytesMut, magic: [u8; 4]) {
    out.put_slice(&magic);
    out.put_u8(SCHEMA_VERSION);
}

/// Whether `data` starts with the given magic
pub fn has_header(data: &[u8], magic: [u8; 4]) -> bool {
    data.starts_with(&magic)
}

/// Consume the header if one is present and return its version.
///
/// Returns `Ok(None)` for a bare payload. A header with a version outside
/// `1..=SCHEMA_VERSION` is rejected.
pub fn read_header(reader: &mut DataReader<'_>, magic: [u8; 4]) -> Result<Option<u8>> {
    if reader.peek_bytes(magic.len()) != Some(&magic[..]) {
        return Ok(None);
    }

    reader.read_bytes(magic.len())?;
    let version = reader.read_u8()?;
    if version == 0 || version > SCHEMA_VERSION {
        return Err(AnimError::UnsupportedVersion(version));
    }

    debug!(
        "{} payload, schema version {version}",
        String::from_utf8_lossy(&magic)
    );
    Ok(Some(version))
}
