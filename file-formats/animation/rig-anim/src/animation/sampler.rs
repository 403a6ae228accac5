//! Playback state and per-node pose sampling for a single clip

use glam::{Quat, Vec3};
use log::{debug, trace};

use super::interpolation::sample_track;
use crate::channel::Channel;
use crate::clip::AnimationClip;
use crate::resource::ResourceId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Tunables applied on every update
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackSettings {
    /// Multiplier on elapsed time. Negative values behave as 0.
    pub speed: f32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

impl PlaybackSettings {
    fn effective_speed(&self) -> f32 {
        if self.speed > 0.0 { self.speed } else { 0.0 }
    }
}

/// Local transform of one node at the sampled time. A property the channel
/// does not animate is `None` and should be left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodePose {
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
}

impl NodePose {
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none()
    }
}

/// Sample both tracks of a channel at `time`
pub fn sample_channel(channel: &Channel, time: f32) -> NodePose {
    NodePose {
        position: sample_track(channel.position_track(), time),
        rotation: sample_track(channel.rotation_track(), time),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundClip {
    uid: ResourceId,
    duration: f32,
}

/// Time cursor over one bound clip.
///
/// The sampler stores only the clip identity and duration. The clip data is
/// passed back in when sampling so the sampler never outlives or pins it.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSampler {
    state: PlaybackState,
    bound: Option<BoundClip>,
    looping: bool,
    current_time: f32,
    settings: PlaybackSettings,
}

impl PlaybackSampler {
    /// Stopped sampler with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: PlaybackSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Bind `clip` and start playing from time 0
    pub fn play(&mut self, clip: &AnimationClip, looping: bool) {
        debug!(
            "Playing clip {} '{}' (duration {:.3}s, looping {looping})",
            clip.uid(),
            clip.name(),
            clip.duration()
        );
        self.bound = Some(BoundClip {
            uid: clip.uid(),
            duration: clip.duration(),
        });
        self.looping = looping;
        self.current_time = 0.0;
        self.state = PlaybackState::Playing;
    }

    /// Unbind the clip and rewind
    pub fn stop(&mut self) {
        if let Some(bound) = self.bound.take() {
            debug!("Stopped clip {}", bound.uid);
        }
        self.current_time = 0.0;
        self.state = PlaybackState::Stopped;
    }

    /// Returns `false` unless the sampler was playing
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        self.state = PlaybackState::Paused;
        true
    }

    /// Returns `false` unless the sampler was paused
    pub fn resume(&mut self) -> bool {
        if self.state != PlaybackState::Paused {
            return false;
        }
        self.state = PlaybackState::Playing;
        true
    }

    /// Advance the clock by `dt` seconds scaled by the playback speed
    pub fn update(&mut self, dt: f32) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(bound) = self.bound else {
            return;
        };
        // Also rejects NaN
        if !(bound.duration > 0.0) {
            return;
        }

        self.current_time += dt.max(0.0) * self.settings.effective_speed();
        if self.current_time > bound.duration {
            if self.looping {
                self.current_time %= bound.duration;
            } else {
                self.current_time = bound.duration;
                self.state = PlaybackState::Stopped;
                debug!("Clip {} reached its end", bound.uid);
            }
        }
    }

    /// Sample the pose of `node` from `clip` at the current time.
    ///
    /// Returns `None` when nothing is bound, when `clip` is not the bound
    /// clip, or when the clip has no channel for `node`.
    pub fn sample_node(&self, clip: &AnimationClip, node: &str) -> Option<NodePose> {
        let bound = self.bound?;
        if bound.uid != clip.uid() {
            debug!(
                "Sampling clip {} but clip {} is bound, ignoring",
                clip.uid(),
                bound.uid
            );
            return None;
        }

        let channel = clip.channel(node)?;
        let pose = sample_channel(channel, self.current_time);
        trace!("{node} @ {:.4}: {pose:?}", self.current_time);
        Some(pose)
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Playback position in seconds
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Clip the sampler is bound to, if any
    pub fn bound_clip(&self) -> Option<ResourceId> {
        self.bound.map(|b| b.uid)
    }

    /// Whether the bound clip wraps at its end
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Current time as a fraction of the clip duration, 0 when degenerate
    pub fn normalized_time(&self) -> f32 {
        match self.bound {
            Some(bound) if bound.duration > 0.0 => self.current_time / bound.duration,
            _ => 0.0,
        }
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Set the playback rate. Negative speeds clamp to 0.
    pub fn set_speed(&mut self, speed: f32) {
        self.settings.speed = if speed > 0.0 { speed } else { 0.0 };
    }
}
