//! Binary encoding of animation clips.
//!
//! Layout (little-endian):
//!
//! ```text
//! u32 entry_count
//! entry_count x {
//!     u32 name_len, u8[name_len] node name (UTF-8)
//!     u8  track type (0 = translation, 1 = rotation)
//!     u32 keyframe_count
//!     f32[keyframe_count] timestamps
//!     f32[keyframe_count * 3 | 4] values (x, y, z[, w])
//! }
//! ```
//!
//! Each entry carries one track, so a node animated in both properties has
//! two entries. Empty tracks are not written. The clip identifier and name
//! live outside the payload.

use std::collections::BTreeMap;

use bytes::{Bytes, BytesMut};
use glam::{Quat, Vec3};
use log::{debug, trace};
use rig_data::error::RigDataError;
use rig_data::prelude::*;

use crate::channel::{Channel, Track, TrackType};
use crate::clip::AnimationClip;
use crate::envelope::{self, CLIP_MAGIC};
use crate::error::{AnimError, Result};
use crate::resource::ResourceId;

/// Smallest possible entry: name length, track tag and keyframe count
const MIN_ENTRY_SIZE: usize = 4 + 1 + 4;

/// Encode `clip` in the bare layout
pub fn encode_clip(clip: &AnimationClip) -> Result<Bytes> {
    let mut out = BytesMut::with_capacity(encoded_len(clip));
    write_entries(clip, &mut out)?;
    Ok(out.freeze())
}

/// Encode `clip` behind the `RCLP` envelope
pub fn encode_clip_with_header(clip: &AnimationClip) -> Result<Bytes> {
    let mut out = BytesMut::with_capacity(envelope::HEADER_SIZE + encoded_len(clip));
    envelope::write_header(&mut out, CLIP_MAGIC);
    write_entries(clip, &mut out)?;
    Ok(out.freeze())
}

/// Size of the bare encoding in bytes
pub fn encoded_len(clip: &AnimationClip) -> usize {
    let mut size = 4;
    for (node, channel) in clip.channels() {
        for track in [TrackType::Translation, TrackType::Rotation] {
            if channel.has_track(track) {
                let keys = match track {
                    TrackType::Translation => channel.position_track().len(),
                    TrackType::Rotation => channel.rotation_track().len(),
                };
                size += node.rig_size() + 1 + 4 + keys * track.keyframe_size();
            }
        }
    }
    size
}

fn write_entries(clip: &AnimationClip, out: &mut BytesMut) -> Result<()> {
    write_count(out, clip.track_count())?;
    for (node, channel) in clip.channels() {
        write_track(out, node, TrackType::Translation, channel.position_track())?;
        write_track(out, node, TrackType::Rotation, channel.rotation_track())?;
    }
    Ok(())
}

fn write_track<T: RigDataW>(
    out: &mut BytesMut,
    node: &str,
    track_type: TrackType,
    track: Track<'_, T>,
) -> Result<()> {
    if track.is_empty() {
        return Ok(());
    }

    node.rig_write(out)?;
    out.put_u8(track_type.into());
    write_count(out, track.len())?;
    for timestamp in track.timestamps {
        timestamp.rig_write(out)?;
    }
    for value in track.values {
        value.rig_write(out)?;
    }
    Ok(())
}

#[derive(Default)]
struct PendingChannel {
    positions: Option<(Vec<f32>, Vec<Vec3>)>,
    rotations: Option<(Vec<f32>, Vec<Quat>)>,
}

/// Decode a clip payload, with or without the envelope.
///
/// Any malformed input fails the whole decode; no partially populated clip
/// is ever returned.
pub fn decode_clip(uid: ResourceId, name: &str, data: &[u8]) -> Result<AnimationClip> {
    let mut reader = DataReader::new(data);
    envelope::read_header(&mut reader, CLIP_MAGIC)?;

    let entry_count = reader.read_count(MIN_ENTRY_SIZE)?;
    let mut pending: BTreeMap<String, PendingChannel> = BTreeMap::new();

    for index in 0..entry_count {
        let node = read_name(&mut reader)?;
        let track_type = TrackType::try_from(reader.read_u8()?)?;
        let count = reader.read_count(track_type.keyframe_size())?;
        let timestamps: Vec<f32> = read_counted_vec(&mut reader, count, 4)?;
        trace!("entry {index}: node '{node}', {track_type} track, {count} keyframes");

        let slot = pending.entry(node).or_default();
        // A zero-keyframe entry carries no track.
        if count == 0 {
            continue;
        }
        let duplicate = match track_type {
            TrackType::Translation => slot.positions.is_some(),
            TrackType::Rotation => slot.rotations.is_some(),
        };
        if duplicate {
            return Err(AnimError::ParseError(format!(
                "entry {index} repeats the {track_type} track of an already decoded node"
            )));
        }

        match track_type {
            TrackType::Translation => {
                let values = read_counted_vec(&mut reader, count, 12)?;
                slot.positions = Some((timestamps, values));
            }
            TrackType::Rotation => {
                let values = read_counted_vec(&mut reader, count, 16)?;
                slot.rotations = Some((timestamps, values));
            }
        }
    }

    if !reader.is_empty() {
        return Err(AnimError::ParseError(format!(
            "{} trailing bytes after the last channel entry",
            reader.remaining()
        )));
    }

    let mut clip = AnimationClip::new(uid, name);
    for (node, tracks) in pending {
        let mut channel = Channel::new();
        if let Some((timestamps, values)) = tracks.positions {
            channel = channel.with_positions(timestamps, values)?;
        }
        if let Some((timestamps, values)) = tracks.rotations {
            channel = channel.with_rotations(timestamps, values)?;
        }
        clip.insert_channel(node, channel)?;
    }

    debug!(
        "Decoded clip {uid} '{name}': {} channels, duration {:.3}s",
        clip.channel_count(),
        clip.duration()
    );
    Ok(clip)
}

/// Read a length-prefixed name, reporting bad UTF-8 as an invalid name
pub(crate) fn read_name(reader: &mut DataReader<'_>) -> Result<String> {
    reader.read_string().map_err(|e| match e {
        RigDataError::InvalidUtf8 { offset } => AnimError::InvalidName { offset },
        other => AnimError::Data(other),
    })
}
