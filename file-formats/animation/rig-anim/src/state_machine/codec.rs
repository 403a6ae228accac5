//! Binary encoding of state machine definitions.
//!
//! ```text
//! u32 clip_count        clip_count x { u64 uid, u8 loop, u32 len, name }
//! u32 state_count       state_count x { u32 len, name, u32 len, clip_name }
//! u32 transition_count  transition_count x {
//!     u32 len, from, u32 len, to, u32 len, trigger, u32 blend_time_ms
//! }
//! ```
//!
//! Decoding replays the records through the definition's mutators, so a
//! payload with duplicate names is rejected exactly like the equivalent
//! edits would be.

use bytes::{Bytes, BytesMut};
use log::debug;
use rig_data::prelude::*;

use super::definition::StateMachine;
use crate::codec::read_name;
use crate::envelope::{self, STATE_MACHINE_MAGIC};
use crate::error::{AnimError, Result};
use crate::resource::ResourceId;

const MIN_CLIP_SIZE: usize = 8 + 1 + 4;
const MIN_STATE_SIZE: usize = 4 + 4;
const MIN_TRANSITION_SIZE: usize = 4 + 4 + 4 + 4;

pub fn encode_state_machine(sm: &StateMachine) -> Result<Bytes> {
    let mut out = BytesMut::with_capacity(encoded_len(sm));
    write_body(sm, &mut out)?;
    Ok(out.freeze())
}

/// Encode behind the `RSMD` envelope
pub fn encode_state_machine_with_header(sm: &StateMachine) -> Result<Bytes> {
    let mut out = BytesMut::with_capacity(envelope::HEADER_SIZE + encoded_len(sm));
    envelope::write_header(&mut out, STATE_MACHINE_MAGIC);
    write_body(sm, &mut out)?;
    Ok(out.freeze())
}

pub fn encoded_len(sm: &StateMachine) -> usize {
    let clips: usize = sm.clips().iter().map(|c| 8 + 1 + c.name.rig_size()).sum();
    let states: usize = sm
        .states()
        .iter()
        .map(|s| s.name.rig_size() + s.clip_name.rig_size())
        .sum();
    let transitions: usize = sm
        .transitions()
        .iter()
        .map(|t| t.from.rig_size() + t.to.rig_size() + t.trigger.rig_size() + 4)
        .sum();
    12 + clips + states + transitions
}

fn write_body(sm: &StateMachine, out: &mut BytesMut) -> Result<()> {
    write_count(out, sm.clips().len())?;
    for clip in sm.clips() {
        clip.uid.0.rig_write(out)?;
        clip.looping.rig_write(out)?;
        clip.name.rig_write(out)?;
    }

    write_count(out, sm.states().len())?;
    for state in sm.states() {
        state.name.rig_write(out)?;
        state.clip_name.rig_write(out)?;
    }

    write_count(out, sm.transitions().len())?;
    for transition in sm.transitions() {
        transition.from.rig_write(out)?;
        transition.to.rig_write(out)?;
        transition.trigger.rig_write(out)?;
        transition.blend_time_ms.rig_write(out)?;
    }
    Ok(())
}

/// Decode a state machine payload, with or without the envelope
pub fn decode_state_machine(uid: ResourceId, name: &str, data: &[u8]) -> Result<StateMachine> {
    let mut reader = DataReader::new(data);
    envelope::read_header(&mut reader, STATE_MACHINE_MAGIC)?;
    let mut sm = StateMachine::new(uid, name);

    let clip_count = reader.read_count(MIN_CLIP_SIZE)?;
    for _ in 0..clip_count {
        let clip_uid = ResourceId(reader.read_u64_le()?);
        let looping = bool::rig_read(&mut reader)?;
        let clip_name = read_name(&mut reader)?;
        sm.add_clip(clip_uid, clip_name, looping)?;
    }

    let state_count = reader.read_count(MIN_STATE_SIZE)?;
    for _ in 0..state_count {
        let state_name = read_name(&mut reader)?;
        let clip_name = read_name(&mut reader)?;
        sm.add_state(state_name, clip_name)?;
    }

    let transition_count = reader.read_count(MIN_TRANSITION_SIZE)?;
    for _ in 0..transition_count {
        let from = read_name(&mut reader)?;
        let to = read_name(&mut reader)?;
        let trigger = read_name(&mut reader)?;
        let blend_time_ms = reader.read_u32_le()?;
        sm.add_transition(from, to, trigger, blend_time_ms)?;
    }

    if !reader.is_empty() {
        return Err(AnimError::ParseError(format!(
            "{} trailing bytes after the last transition",
            reader.remaining()
        )));
    }

    debug!(
        "Decoded state machine {uid} '{name}': {} clips, {} states, {} transitions",
        clip_count, state_count, transition_count
    );
    Ok(sm)
}
