//! Skeletal animation for rig assets.
//!
//! Keyframe clips and their binary codec, time-driven sampling, skinning
//! palettes, and animation state machines that crossfade between clips.
//!
//! ```rust
//! use glam::Vec3;
//! use rig_anim::{AnimationClip, Channel, PlaybackSampler, ResourceId};
//!
//! let hip = Channel::new()
//!     .with_positions(vec![0.0, 1.0, 2.0], vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0])?;
//! let clip = AnimationClip::from_channels(ResourceId(1), "walk", [("Hip", hip)])?;
//!
//! let mut sampler = PlaybackSampler::new();
//! sampler.play(&clip, false);
//! sampler.update(1.5);
//! let pose = sampler.sample_node(&clip, "Hip").unwrap();
//! assert_eq!(pose.position, Some(Vec3::new(1.5, 0.0, 0.0)));
//! # Ok::<(), rig_anim::AnimError>(())
//! ```

// Re-export main components
pub mod animation;
pub mod cache;
pub mod channel;
pub mod clip;
pub mod codec;
pub mod component;
pub mod diagnostics;
pub mod envelope;
pub mod error;
#[cfg(feature = "gltf")]
pub mod import;
pub mod resource;
pub mod scene;
pub mod skinning;
pub mod state_machine;

// Re-export common types
pub use animation::{NodePose, PlaybackSampler, PlaybackSettings, PlaybackState};
pub use cache::{ClipCache, ClipGuard, ClipProvider, ClipSet, ClipSource, DirectorySource, MemorySource};
pub use channel::{Channel, Track, TrackType};
pub use clip::AnimationClip;
pub use codec::{decode_clip, encode_clip, encode_clip_with_header};
pub use component::{AnimationComponent, ComponentConfig};
pub use error::{AnimError, Result};
pub use resource::{CATEGORY_DIVISOR, Resource, ResourceCategory, ResourceId};
pub use scene::{FlatScene, SceneGraph};
pub use skinning::{BoneInfluence, MAX_BONES, Palette, Skin, SkinnedVertex, SkinningOptions};
pub use state_machine::{StateMachine, StateMachineInstance, Transition};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
