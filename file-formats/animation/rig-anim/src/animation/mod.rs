//! Clip playback: keyframe interpolation and the time-driven sampler

pub mod interpolation;
pub mod sampler;

pub use interpolation::{Interpolate, lerp_position, sample_track, slerp_rotation};
pub use sampler::{NodePose, PlaybackSampler, PlaybackSettings, PlaybackState, sample_channel};
