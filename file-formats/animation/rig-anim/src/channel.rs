//! Per-node keyframe tracks

use std::fmt;

use custom_debug::Debug;
use glam::{Quat, Vec3};
use rig_utils::debug;

use crate::error::{AnimError, Result};

/// Track tag used by the clip binary format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackType {
    Translation = 0,
    Rotation = 1,
}

impl TrackType {
    /// Number of f32 components per keyframe value
    pub fn components(self) -> usize {
        match self {
            Self::Translation => 3,
            Self::Rotation => 4,
        }
    }

    /// Encoded size of one keyframe: timestamp plus value
    pub fn keyframe_size(self) -> usize {
        4 * (1 + self.components())
    }
}

impl TryFrom<u8> for TrackType {
    type Error = AnimError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Translation),
            1 => Ok(Self::Rotation),
            other => Err(AnimError::InvalidTrackType(other)),
        }
    }
}

impl From<TrackType> for u8 {
    fn from(value: TrackType) -> Self {
        value as Self
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translation => write!(f, "translation"),
            Self::Rotation => write!(f, "rotation"),
        }
    }
}

/// Borrowed view of one keyframe track
#[derive(Clone, Copy)]
pub struct Track<'a, T> {
    pub timestamps: &'a [f32],
    pub values: &'a [T],
}

impl<T> Track<'_, T> {
    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn last_timestamp(&self) -> Option<f32> {
        self.timestamps.last().copied()
    }
}

/// Keyframe data for a single animated scene node.
///
/// Either track may be empty, which means the node is not animated in that
/// property. Tracks are fixed once the channel is built.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    #[debug(with = debug::trimmed_collection_fmt)]
    pos_timestamps: Vec<f32>,
    #[debug(with = debug::trimmed_collection_fmt)]
    positions: Vec<Vec3>,
    #[debug(with = debug::trimmed_collection_fmt)]
    rot_timestamps: Vec<f32>,
    #[debug(with = debug::trimmed_collection_fmt)]
    rotations: Vec<Quat>,
}

impl Channel {
    /// Channel with both tracks empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the position track
    pub fn with_positions(mut self, timestamps: Vec<f32>, values: Vec<Vec3>) -> Result<Self> {
        validate_track(TrackType::Translation, &timestamps, values.len())?;
        self.pos_timestamps = timestamps;
        self.positions = values;
        Ok(self)
    }

    /// Attach the rotation track
    pub fn with_rotations(mut self, timestamps: Vec<f32>, values: Vec<Quat>) -> Result<Self> {
        validate_track(TrackType::Rotation, &timestamps, values.len())?;
        self.rot_timestamps = timestamps;
        self.rotations = values;
        Ok(self)
    }

    /// Position keyframes
    pub fn position_track(&self) -> Track<'_, Vec3> {
        Track {
            timestamps: &self.pos_timestamps,
            values: &self.positions,
        }
    }

    /// Rotation keyframes
    pub fn rotation_track(&self) -> Track<'_, Quat> {
        Track {
            timestamps: &self.rot_timestamps,
            values: &self.rotations,
        }
    }

    /// True when `track` has at least one keyframe
    pub fn has_track(&self, track: TrackType) -> bool {
        match track {
            TrackType::Translation => !self.pos_timestamps.is_empty(),
            TrackType::Rotation => !self.rot_timestamps.is_empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pos_timestamps.is_empty() && self.rot_timestamps.is_empty()
    }

    /// Keyframes across both tracks
    pub fn keyframe_count(&self) -> usize {
        self.pos_timestamps.len() + self.rot_timestamps.len()
    }

    /// Last timestamp across both tracks, `None` for an empty channel
    pub fn last_timestamp(&self) -> Option<f32> {
        match (self.pos_timestamps.last(), self.rot_timestamps.last()) {
            (Some(&pos), Some(&rot)) => Some(pos.max(rot)),
            (Some(&last), None) | (None, Some(&last)) => Some(last),
            (None, None) => None,
        }
    }

    /// Last timestamp across both tracks, 0 for an empty channel
    pub fn end_time(&self) -> f32 {
        self.last_timestamp().unwrap_or(0.0)
    }

    /// Re-check the structural invariants
    pub fn validate(&self) -> Result<()> {
        validate_track(
            TrackType::Translation,
            &self.pos_timestamps,
            self.positions.len(),
        )?;
        validate_track(
            TrackType::Rotation,
            &self.rot_timestamps,
            self.rotations.len(),
        )
    }
}

fn validate_track(track: TrackType, timestamps: &[f32], value_count: usize) -> Result<()> {
    if timestamps.len() != value_count {
        return Err(AnimError::ValidationError(format!(
            "{track} track has {} timestamps but {value_count} values",
            timestamps.len()
        )));
    }

    if let Some(bad) = timestamps.iter().position(|t| !t.is_finite()) {
        return Err(AnimError::ValidationError(format!(
            "{track} track timestamp {bad} is not finite"
        )));
    }

    if let Some(bad) = timestamps.windows(2).position(|pair| pair[1] < pair[0]) {
        return Err(AnimError::ValidationError(format!(
            "{track} track timestamps decrease at keyframe {}",
            bad + 1
        )));
    }

    Ok(())
}
