//! Animation clips: a named bundle of per-node channels

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::channel::Channel;
use crate::codec::{decode_clip, encode_clip};
use crate::error::{AnimError, Result};
use crate::resource::{Resource, ResourceCategory, ResourceId};

/// A loaded animation clip.
///
/// Channels are keyed by scene node name and must match scene node names
/// exactly to have any effect. The duration is derived from the tracks
/// whenever the channel set changes and is never stored on disk.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationClip {
    uid: ResourceId,
    name: String,
    channels: BTreeMap<String, Channel>,
    duration: f32,
}

impl AnimationClip {
    /// Create a clip with no channels
    pub fn new(uid: ResourceId, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            channels: BTreeMap::new(),
            duration: 0.0,
        }
    }

    /// Build a clip from a set of channels, rejecting duplicate node names
    pub fn from_channels<I, S>(uid: ResourceId, name: impl Into<String>, channels: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Channel)>,
        S: Into<String>,
    {
        let mut clip = Self::new(uid, name);
        for (node, channel) in channels {
            clip.insert_channel(node, channel)?;
        }
        Ok(clip)
    }

    /// Add the channel for `node`. Each node may appear only once.
    pub fn insert_channel(&mut self, node: impl Into<String>, channel: Channel) -> Result<()> {
        let node = node.into();
        if self.channels.contains_key(&node) {
            return Err(AnimError::DuplicateName {
                kind: "channel",
                name: node,
            });
        }
        channel.validate()?;
        self.channels.insert(node, channel);
        self.duration = compute_duration(&self.channels);
        Ok(())
    }

    /// Resource identifier of the clip
    pub fn uid(&self) -> ResourceId {
        self.uid
    }

    /// Display name of the clip
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Largest final timestamp over every track, 0 with no channels
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Channel animating `node`
    pub fn channel(&self, node: &str) -> Option<&Channel> {
        self.channels.get(node)
    }

    /// Channels ordered by node name
    pub fn channels(&self) -> impl Iterator<Item = (&str, &Channel)> {
        self.channels.iter().map(|(name, channel)| (name.as_str(), channel))
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// Number of animated nodes
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of non-empty tracks, i.e. entries in the encoded form
    pub fn track_count(&self) -> usize {
        self.channels
            .values()
            .map(|c| {
                usize::from(!c.position_track().is_empty())
                    + usize::from(!c.rotation_track().is_empty())
            })
            .sum()
    }

    pub fn keyframe_count(&self) -> usize {
        self.channels.values().map(Channel::keyframe_count).sum()
    }

    /// Re-check every channel, naming the first bad one
    pub fn validate(&self) -> Result<()> {
        for (node, channel) in &self.channels {
            channel
                .validate()
                .map_err(|e| AnimError::ValidationError(format!("channel '{node}': {e}")))?;
        }
        Ok(())
    }
}

pub(crate) fn compute_duration(channels: &BTreeMap<String, Channel>) -> f32 {
    channels
        .values()
        .filter_map(Channel::last_timestamp)
        .reduce(f32::max)
        .unwrap_or(0.0)
}

impl Resource for AnimationClip {
    const CATEGORY: ResourceCategory = ResourceCategory::Animation;

    fn uid(&self) -> ResourceId {
        self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self) -> Result<Bytes> {
        encode_clip(self)
    }

    fn decode(uid: ResourceId, name: &str, data: &[u8]) -> Result<Self> {
        decode_clip(uid, name, data)
    }
}
