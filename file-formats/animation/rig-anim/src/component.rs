//! Per-entity animation driver tying clips, state machines, the scene and
//! skinning together

use log::{debug, trace};

use crate::animation::sampler::{NodePose, PlaybackSampler, PlaybackSettings, PlaybackState};
use crate::cache::{ClipCache, ClipProvider, ClipSet};
use crate::error::{AnimError, Result};
use crate::resource::ResourceId;
use crate::scene::SceneGraph;
use crate::skinning::{MAX_BONES, Palette, Skin, SkinningOptions};
use crate::state_machine::{StateMachine, StateMachineInstance};

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentConfig {
    pub settings: PlaybackSettings,
    pub skinning: SkinningOptions,
    /// Per-skin bone limit, never above [`MAX_BONES`]
    pub max_bones: usize,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            settings: PlaybackSettings::default(),
            skinning: SkinningOptions::default(),
            max_bones: MAX_BONES,
        }
    }
}

/// Animation state owned by one animated entity.
///
/// Either a single clip plays directly through the component's sampler, or
/// an attached state machine decides which clips play. Every
/// [`tick`](Self::tick) syncs the held clip references with what playback
/// needs, advances time, writes poses to the scene and rebuilds the skinning
/// palettes.
#[derive(Debug)]
pub struct AnimationComponent {
    skeleton_nodes: Vec<String>,
    sampler: PlaybackSampler,
    direct_clip: Option<ResourceId>,
    machine: Option<StateMachineInstance>,
    machine_paused: bool,
    skins: Vec<Skin>,
    palettes: Vec<Palette>,
    clips: ClipSet,
    config: ComponentConfig,
}

impl AnimationComponent {
    /// `skeleton_nodes` are the scene node names sampled every tick
    pub fn new(skeleton_nodes: Vec<String>) -> Self {
        Self::with_config(skeleton_nodes, ComponentConfig::default())
    }

    pub fn with_config(skeleton_nodes: Vec<String>, config: ComponentConfig) -> Self {
        Self {
            skeleton_nodes,
            sampler: PlaybackSampler::with_settings(config.settings),
            direct_clip: None,
            machine: None,
            machine_paused: false,
            skins: Vec::new(),
            palettes: Vec::new(),
            clips: ClipSet::new(),
            config,
        }
    }

    pub fn skeleton_nodes(&self) -> &[String] {
        &self.skeleton_nodes
    }

    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    pub fn sampler(&self) -> &PlaybackSampler {
        &self.sampler
    }

    pub fn state_machine(&self) -> Option<&StateMachineInstance> {
        self.machine.as_ref()
    }

    /// Play one clip directly, replacing any attached state machine
    pub fn play(&mut self, cache: &ClipCache, uid: ResourceId, looping: bool) -> Result<()> {
        let guard = cache.request(uid)?;
        if self.machine.take().is_some() {
            debug!("Direct playback of clip {uid} replaces the state machine");
        }
        self.sampler.play(&guard, looping);
        self.direct_clip = Some(uid);
        self.clips.clear();
        self.clips.insert(guard);
        Ok(())
    }

    /// Stop all playback and release every held clip
    pub fn stop(&mut self) {
        self.sampler.stop();
        self.direct_clip = None;
        self.machine = None;
        self.machine_paused = false;
        self.clips.clear();
    }

    pub fn pause(&mut self) -> bool {
        if self.machine.is_some() {
            let was_paused = self.machine_paused;
            self.machine_paused = true;
            return !was_paused;
        }
        self.sampler.pause()
    }

    pub fn resume(&mut self) -> bool {
        if self.machine.is_some() {
            let was_paused = self.machine_paused;
            self.machine_paused = false;
            return was_paused;
        }
        self.sampler.resume()
    }

    pub fn is_playing(&self) -> bool {
        match &self.machine {
            Some(_) => !self.machine_paused,
            None => self.sampler.state() == PlaybackState::Playing,
        }
    }

    /// Let `definition` drive playback from its entry state
    pub fn attach_state_machine(&mut self, definition: StateMachine) {
        debug!("Attached state machine '{}'", definition.name());
        self.sampler.stop();
        self.direct_clip = None;
        self.machine_paused = false;
        self.machine = Some(StateMachineInstance::with_settings(
            definition,
            self.config.settings,
        ));
    }

    pub fn detach_state_machine(&mut self) -> Option<StateMachineInstance> {
        self.machine.take()
    }

    /// Forward a trigger to the attached state machine
    pub fn fire(&mut self, trigger: &str) -> bool {
        match self.machine.as_mut() {
            Some(machine) => machine.fire(trigger, &self.clips),
            None => {
                debug!("Trigger '{trigger}' ignored, no state machine attached");
                false
            }
        }
    }

    /// Register a skin; returns its palette index
    pub fn add_skin(&mut self, skin: Skin) -> Result<usize> {
        let max = self.config.max_bones.min(MAX_BONES);
        if skin.bone_count() > max {
            return Err(AnimError::BoneCountExceeded {
                count: skin.bone_count(),
                max,
            });
        }
        self.skins.push(skin);
        self.palettes.push(Palette::new());
        Ok(self.skins.len() - 1)
    }

    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }

    /// Palettes from the last tick, one per skin
    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    /// Clip identifiers playback needs right now
    pub fn required_clips(&self) -> Vec<ResourceId> {
        match (&self.machine, self.direct_clip) {
            (Some(machine), _) => machine.required_clips(),
            (None, Some(uid)) => vec![uid],
            (None, None) => Vec::new(),
        }
    }

    /// Pose of one node at the current time
    pub fn sample_node(&self, node: &str) -> Option<NodePose> {
        if let Some(machine) = &self.machine {
            return machine.sample_node(node, &self.clips);
        }
        let clip = self.clips.clip(self.direct_clip?)?;
        self.sampler.sample_node(clip, node)
    }

    /// Advance by `dt` seconds and publish poses and palettes
    pub fn tick<S: SceneGraph + ?Sized>(&mut self, dt: f32, cache: &ClipCache, scene: &mut S) {
        let required = self.required_clips();
        self.clips.sync(cache, &required);

        match self.machine.as_mut() {
            Some(machine) => {
                if !self.machine_paused {
                    machine.update(dt, &self.clips);
                }
            }
            None => self.sampler.update(dt),
        }

        let mut posed = 0;
        for node in &self.skeleton_nodes {
            if let Some(pose) = self.sample_node(node) {
                if !pose.is_empty() {
                    scene.set_local_pose(node, pose.position, pose.rotation);
                    posed += 1;
                }
            }
        }
        trace!("Tick {dt:.4}s posed {posed} of {} nodes", self.skeleton_nodes.len());

        for (skin, palette) in self.skins.iter().zip(self.palettes.iter_mut()) {
            skin.update_palette(&*scene, palette);
        }
    }
}
