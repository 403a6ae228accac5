//! Runtime evaluation of a state machine: active state, triggers and
//! crossfades between state clips

use log::{debug, warn};

use super::definition::{ClipInfo, StateMachine};
use crate::animation::interpolation::{lerp_position, slerp_rotation};
use crate::animation::sampler::{NodePose, PlaybackSampler, PlaybackSettings};
use crate::cache::ClipProvider;
use crate::error::{AnimError, Result};
use crate::resource::ResourceId;

#[derive(Debug, Clone)]
struct Crossfade {
    target_state: String,
    sampler: PlaybackSampler,
    elapsed_ms: f32,
    duration_ms: f32,
}

impl Crossfade {
    fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }
}

/// Live instance of a [`StateMachine`].
///
/// The instance drives one sampler for the active state and, while a
/// transition is blending, a second one for the target state. Clip data is
/// looked up through a [`ClipProvider`] on every call; a clip that is not
/// available yet is bound as soon as it shows up.
#[derive(Debug, Clone)]
pub struct StateMachineInstance {
    definition: StateMachine,
    active_state: Option<String>,
    sampler: PlaybackSampler,
    crossfade: Option<Crossfade>,
    settings: PlaybackSettings,
}

impl StateMachineInstance {
    pub fn new(definition: StateMachine) -> Self {
        Self::with_settings(definition, PlaybackSettings::default())
    }

    pub fn with_settings(definition: StateMachine, settings: PlaybackSettings) -> Self {
        let active_state = definition.entry_state().map(|s| s.name.clone());
        Self {
            definition,
            active_state,
            sampler: PlaybackSampler::with_settings(settings),
            crossfade: None,
            settings,
        }
    }

    pub fn definition(&self) -> &StateMachine {
        &self.definition
    }

    pub fn active_state(&self) -> Option<&str> {
        self.active_state.as_deref()
    }

    /// State being blended towards, if a crossfade is running
    pub fn target_state(&self) -> Option<&str> {
        self.crossfade.as_ref().map(|c| c.target_state.as_str())
    }

    pub fn is_blending(&self) -> bool {
        self.crossfade.is_some()
    }

    /// Crossfade progress in `[0, 1]`, `None` when not blending
    pub fn blend_progress(&self) -> Option<f32> {
        self.crossfade.as_ref().map(Crossfade::progress)
    }

    pub fn sampler(&self) -> &PlaybackSampler {
        &self.sampler
    }

    /// Clip alias of the active state
    pub fn active_clip(&self) -> Option<&ClipInfo> {
        self.definition.clip_for_state(self.active_state.as_deref()?)
    }

    /// Jump to `state` without blending, cancelling any crossfade
    pub fn set_active_state(&mut self, state: &str, clips: &impl ClipProvider) -> Result<()> {
        if self.definition.state(state).is_none() {
            return Err(AnimError::NotFound {
                kind: "state",
                name: state.to_string(),
            });
        }
        self.crossfade = None;
        self.switch_to(state.to_string(), clips);
        Ok(())
    }

    /// Fire `trigger` from the active state.
    ///
    /// Returns `false` when ignored: no active state, a crossfade already
    /// running, no matching transition, or a transition to a state that does
    /// not exist. A zero blend time switches immediately.
    pub fn fire(&mut self, trigger: &str, clips: &impl ClipProvider) -> bool {
        self.ensure_active_state();

        if let Some(crossfade) = &self.crossfade {
            debug!(
                "Trigger '{trigger}' ignored while blending to '{}'",
                crossfade.target_state
            );
            return false;
        }
        let Some(active) = self.active_state.as_deref() else {
            debug!("Trigger '{trigger}' ignored, no active state");
            return false;
        };
        let Some(transition) = self.definition.transition_for(active, trigger) else {
            debug!("No transition from '{active}' on '{trigger}'");
            return false;
        };
        if self.definition.state(&transition.to).is_none() {
            warn!(
                "Transition {transition} targets unknown state '{}'",
                transition.to
            );
            return false;
        }

        let target = transition.to.clone();
        let blend_time_ms = transition.blend_time_ms;
        debug!("'{trigger}': {active} -> {target} over {blend_time_ms} ms");

        if blend_time_ms == 0 {
            self.switch_to(target, clips);
            return true;
        }

        let mut sampler = PlaybackSampler::with_settings(self.settings);
        bind_state_clip(&self.definition, &target, &mut sampler, clips);
        self.crossfade = Some(Crossfade {
            target_state: target,
            sampler,
            elapsed_ms: 0.0,
            duration_ms: blend_time_ms as f32,
        });
        true
    }

    /// Advance both samplers and the crossfade clock by `dt` seconds
    pub fn update(&mut self, dt: f32, clips: &impl ClipProvider) {
        self.ensure_active_state();

        if let Some(active) = self.active_state.as_deref() {
            bind_state_clip(&self.definition, active, &mut self.sampler, clips);
        }
        self.sampler.update(dt);

        let Some(crossfade) = &mut self.crossfade else {
            return;
        };
        bind_state_clip(
            &self.definition,
            &crossfade.target_state,
            &mut crossfade.sampler,
            clips,
        );
        crossfade.sampler.update(dt);
        crossfade.elapsed_ms += dt.max(0.0) * 1000.0;

        if crossfade.elapsed_ms >= crossfade.duration_ms {
            if let Some(finished) = self.crossfade.take() {
                debug!("Crossfade to '{}' complete", finished.target_state);
                self.active_state = Some(finished.target_state);
                self.sampler = finished.sampler;
            }
        }
    }

    /// Pose of `node`, blended across an active crossfade
    pub fn sample_node(&self, node: &str, clips: &impl ClipProvider) -> Option<NodePose> {
        let current = self
            .active_clip()
            .and_then(|info| clips.clip(info.uid))
            .and_then(|clip| self.sampler.sample_node(clip, node));

        let Some(crossfade) = &self.crossfade else {
            return current;
        };
        let target = self
            .definition
            .clip_for_state(&crossfade.target_state)
            .and_then(|info| clips.clip(info.uid))
            .and_then(|clip| crossfade.sampler.sample_node(clip, node));

        let t = crossfade.progress();
        let pose = match (current, target) {
            (None, None) => return None,
            (Some(pose), None) | (None, Some(pose)) => pose,
            (Some(a), Some(b)) => NodePose {
                position: blend(a.position, b.position, |x, y| lerp_position(x, y, t)),
                rotation: blend(a.rotation, b.rotation, |x, y| slerp_rotation(x, y, t)),
            },
        };
        Some(pose)
    }

    /// Clip identifiers the instance needs for the current tick
    pub fn required_clips(&self) -> Vec<ResourceId> {
        let mut required = Vec::with_capacity(2);
        if let Some(info) = self.active_clip() {
            required.push(info.uid);
        }
        if let Some(info) = self
            .crossfade
            .as_ref()
            .and_then(|c| self.definition.clip_for_state(&c.target_state))
        {
            if !required.contains(&info.uid) {
                required.push(info.uid);
            }
        }
        required
    }

    fn ensure_active_state(&mut self) {
        if self.active_state.is_none() {
            self.active_state = self.definition.entry_state().map(|s| s.name.clone());
        }
    }

    fn switch_to(&mut self, state: String, clips: &impl ClipProvider) {
        self.sampler.stop();
        bind_state_clip(&self.definition, &state, &mut self.sampler, clips);
        self.active_state = Some(state);
    }
}

/// Bind the clip of `state` to `sampler` unless it is already bound
fn bind_state_clip(
    definition: &StateMachine,
    state: &str,
    sampler: &mut PlaybackSampler,
    clips: &impl ClipProvider,
) {
    let Some(info) = definition.clip_for_state(state) else {
        return;
    };
    if sampler.bound_clip() == Some(info.uid) {
        return;
    }
    if let Some(clip) = clips.clip(info.uid) {
        sampler.play(clip, info.looping);
    }
}

fn blend<T: Copy>(a: Option<T>, b: Option<T>, mix: impl Fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(mix(a, b)),
        (a, b) => a.or(b),
    }
}
