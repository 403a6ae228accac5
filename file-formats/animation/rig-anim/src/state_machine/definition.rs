//! Animation state machine graph: clip aliases, states and transitions

use std::fmt;

use bytes::Bytes;
use log::debug;

use super::codec::{decode_state_machine, encode_state_machine};
use crate::error::{AnimError, Result};
use crate::resource::{Resource, ResourceCategory, ResourceId};

/// Name to clip resource alias
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct ClipInfo {
    pub uid: ResourceId,
    pub name: String,
    pub looping: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct StateInfo {
    pub name: String,
    pub clip_name: String,
}

/// Edge between two states, taken when `trigger` fires in `from`.
/// `(from, trigger)` identifies a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub trigger: String,
    pub blend_time_ms: u32,
}

impl Transition {
    /// Transition from `from` to `to`, fired by `trigger`
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        trigger: impl Into<String>,
        blend_time_ms: u32,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            trigger: trigger.into(),
            blend_time_ms,
        }
    }

    fn key(&self) -> String {
        transition_key(&self.from, &self.trigger)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --[{}]--> {} ({} ms)",
            self.from, self.trigger, self.to, self.blend_time_ms
        )
    }
}

fn transition_key(from: &str, trigger: &str) -> String {
    format!("{from}/{trigger}")
}

/// Definition of an animation state machine.
///
/// All edits go through the mutators below, which keep names unique within
/// their set and carry renames through to every reference. References to
/// clips and states that do not exist yet are accepted so a graph can be
/// built in any order; [`StateMachine::validate`] reports them. The first
/// state added is the entry state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct StateMachine {
    uid: ResourceId,
    name: String,
    clips: Vec<ClipInfo>,
    states: Vec<StateInfo>,
    transitions: Vec<Transition>,
}

impl StateMachine {
    /// Empty state machine with no clips, states or transitions
    pub fn new(uid: ResourceId, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            clips: Vec::new(),
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Resource identifier of the definition
    pub fn uid(&self) -> ResourceId {
        self.uid
    }

    /// Display name of the definition
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clip aliases in insertion order
    pub fn clips(&self) -> &[ClipInfo] {
        &self.clips
    }

    /// States in insertion order; the first is the entry state
    pub fn states(&self) -> &[StateInfo] {
        &self.states
    }

    /// Transitions in insertion order
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Clip alias by name
    pub fn clip(&self, name: &str) -> Option<&ClipInfo> {
        self.clips.iter().find(|c| c.name == name)
    }

    /// State by name
    pub fn state(&self, name: &str) -> Option<&StateInfo> {
        self.states.iter().find(|s| s.name == name)
    }

    /// Clip alias played by the named state
    pub fn clip_for_state(&self, state: &str) -> Option<&ClipInfo> {
        self.state(state).and_then(|s| self.clip(&s.clip_name))
    }

    /// Transition leaving `from` on `trigger`
    pub fn transition_for(&self, from: &str, trigger: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|t| t.from == from && t.trigger == trigger)
    }

    /// Distinct trigger names in first-use order
    pub fn triggers(&self) -> Vec<&str> {
        let mut triggers: Vec<&str> = Vec::new();
        for transition in &self.transitions {
            if !triggers.contains(&transition.trigger.as_str()) {
                triggers.push(&transition.trigger);
            }
        }
        triggers
    }

    /// First state added, where playback starts
    pub fn entry_state(&self) -> Option<&StateInfo> {
        self.states.first()
    }

    /// Register a clip alias. Alias names must be unique.
    pub fn add_clip(&mut self, uid: ResourceId, name: impl Into<String>, looping: bool) -> Result<()> {
        let name = name.into();
        if self.clip(&name).is_some() {
            return Err(AnimError::DuplicateName { kind: "clip", name });
        }
        debug!("{}: added clip '{name}' -> {uid}", self.name);
        self.clips.push(ClipInfo { uid, name, looping });
        Ok(())
    }

    /// Replace the clip alias `old_name`. States playing it follow a rename.
    pub fn edit_clip_info(
        &mut self,
        old_name: &str,
        new_name: impl Into<String>,
        uid: ResourceId,
        looping: bool,
    ) -> Result<()> {
        let new_name = new_name.into();
        let index = self.clip_index(old_name)?;
        if new_name != old_name && self.clip(&new_name).is_some() {
            return Err(AnimError::DuplicateName {
                kind: "clip",
                name: new_name,
            });
        }

        if new_name != old_name {
            for state in self.states.iter_mut().filter(|s| s.clip_name == old_name) {
                state.clip_name.clone_from(&new_name);
            }
        }
        self.clips[index] = ClipInfo {
            uid,
            name: new_name,
            looping,
        };
        Ok(())
    }

    /// Remove a clip alias. Fails while a state still plays it.
    pub fn remove_clip(&mut self, name: &str) -> Result<ClipInfo> {
        let index = self.clip_index(name)?;
        if let Some(state) = self.states.iter().find(|s| s.clip_name == name) {
            return Err(AnimError::ValidationError(format!(
                "clip '{name}' is still used by state '{}'",
                state.name
            )));
        }
        Ok(self.clips.remove(index))
    }

    /// Add a state playing the clip alias `clip_name`. State names must be unique.
    pub fn add_state(&mut self, name: impl Into<String>, clip_name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.state(&name).is_some() {
            return Err(AnimError::DuplicateName { kind: "state", name });
        }
        debug!("{}: added state '{name}'", self.name);
        self.states.push(StateInfo {
            name,
            clip_name: clip_name.into(),
        });
        Ok(())
    }

    /// Rename and/or repoint a state. Transitions follow a rename.
    pub fn edit_state(
        &mut self,
        old_name: &str,
        new_name: impl Into<String>,
        clip_name: impl Into<String>,
    ) -> Result<()> {
        let new_name = new_name.into();
        let index = self.state_index(old_name)?;
        if new_name != old_name && self.state(&new_name).is_some() {
            return Err(AnimError::DuplicateName {
                kind: "state",
                name: new_name,
            });
        }

        if new_name != old_name {
            // Renaming can merge two transition identities
            for transition in &self.transitions {
                if transition.from == old_name
                    && self.transition_for(&new_name, &transition.trigger).is_some()
                {
                    return Err(AnimError::DuplicateName {
                        kind: "transition",
                        name: transition_key(&new_name, &transition.trigger),
                    });
                }
            }
            for transition in &mut self.transitions {
                if transition.from == old_name {
                    transition.from.clone_from(&new_name);
                }
                if transition.to == old_name {
                    transition.to.clone_from(&new_name);
                }
            }
        }
        self.states[index] = StateInfo {
            name: new_name,
            clip_name: clip_name.into(),
        };
        Ok(())
    }

    /// Remove a state together with every transition touching it
    pub fn remove_state(&mut self, name: &str) -> Result<StateInfo> {
        let index = self.state_index(name)?;
        self.transitions.retain(|t| t.from != name && t.to != name);
        Ok(self.states.remove(index))
    }

    /// Add a transition. Each `(from, trigger)` pair may appear once.
    pub fn add_transition(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        trigger: impl Into<String>,
        blend_time_ms: u32,
    ) -> Result<()> {
        let transition = Transition::new(from, to, trigger, blend_time_ms);
        if self
            .transition_for(&transition.from, &transition.trigger)
            .is_some()
        {
            return Err(AnimError::DuplicateName {
                kind: "transition",
                name: transition.key(),
            });
        }
        debug!("{}: added transition {transition}", self.name);
        self.transitions.push(transition);
        Ok(())
    }

    /// Replace the transition identified by `(from, trigger)`
    pub fn edit_transition(&mut self, from: &str, trigger: &str, new: Transition) -> Result<()> {
        let index = self
            .transitions
            .iter()
            .position(|t| t.from == from && t.trigger == trigger)
            .ok_or_else(|| AnimError::NotFound {
                kind: "transition",
                name: transition_key(from, trigger),
            })?;

        let same_identity = new.from == from && new.trigger == trigger;
        if !same_identity && self.transition_for(&new.from, &new.trigger).is_some() {
            return Err(AnimError::DuplicateName {
                kind: "transition",
                name: new.key(),
            });
        }
        self.transitions[index] = new;
        Ok(())
    }

    /// Remove the transition leaving `from` on `trigger`
    pub fn remove_transition(&mut self, from: &str, trigger: &str) -> Result<Transition> {
        let index = self
            .transitions
            .iter()
            .position(|t| t.from == from && t.trigger == trigger)
            .ok_or_else(|| AnimError::NotFound {
                kind: "transition",
                name: transition_key(from, trigger),
            })?;
        Ok(self.transitions.remove(index))
    }

    /// Every dangling reference in the graph, in definition order
    pub fn validation_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for state in &self.states {
            if self.clip(&state.clip_name).is_none() {
                issues.push(format!(
                    "state '{}' plays unknown clip '{}'",
                    state.name, state.clip_name
                ));
            }
        }
        for transition in &self.transitions {
            if self.state(&transition.from).is_none() {
                issues.push(format!(
                    "transition '{}' starts at unknown state '{}'",
                    transition.key(),
                    transition.from
                ));
            }
            if self.state(&transition.to).is_none() {
                issues.push(format!(
                    "transition '{}' targets unknown state '{}'",
                    transition.key(),
                    transition.to
                ));
            }
        }
        issues
    }

    /// Fail with every dangling reference joined into one message
    pub fn validate(&self) -> Result<()> {
        let issues = self.validation_issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(AnimError::ValidationError(issues.join("; ")))
        }
    }

    fn clip_index(&self, name: &str) -> Result<usize> {
        self.clips
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| AnimError::NotFound {
                kind: "clip",
                name: name.to_string(),
            })
    }

    fn state_index(&self, name: &str) -> Result<usize> {
        self.states
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| AnimError::NotFound {
                kind: "state",
                name: name.to_string(),
            })
    }
}

impl Resource for StateMachine {
    const CATEGORY: ResourceCategory = ResourceCategory::StateMachine;

    fn uid(&self) -> ResourceId {
        self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self) -> Result<Bytes> {
        encode_state_machine(self)
    }

    fn decode(uid: ResourceId, name: &str, data: &[u8]) -> Result<Self> {
        decode_state_machine(uid, name, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn locomotion() -> StateMachine {
        let mut sm = StateMachine::new(ResourceId(5_000_000_000_000_000_001), "locomotion");
        sm.add_clip(ResourceId(1), "idle", true).unwrap();
        sm.add_clip(ResourceId(2), "run", true).unwrap();
        sm.add_state("Idle", "idle").unwrap();
        sm.add_state("Run", "run").unwrap();
        sm.add_transition("Idle", "Run", "go", 200).unwrap();
        sm.add_transition("Run", "Idle", "halt", 150).unwrap();
        sm
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut sm = locomotion();
        assert!(matches!(
            sm.add_clip(ResourceId(3), "idle", false),
            Err(AnimError::DuplicateName { kind: "clip", .. })
        ));
        assert!(matches!(
            sm.add_state("Idle", "run"),
            Err(AnimError::DuplicateName { kind: "state", .. })
        ));
        assert!(matches!(
            sm.add_transition("Idle", "Idle", "go", 0),
            Err(AnimError::DuplicateName { kind: "transition", .. })
        ));
        // same trigger from a different state is fine
        sm.add_transition("Run", "Run", "go", 0).unwrap();
    }

    #[test]
    fn test_entry_state_is_first_added() {
        let sm = locomotion();
        assert_eq!(sm.entry_state().unwrap().name, "Idle");
        assert_eq!(sm.clip_for_state("Run").unwrap().uid, ResourceId(2));
    }

    #[test]
    fn test_rename_state_updates_transitions() {
        let mut sm = locomotion();
        sm.edit_state("Run", "Sprint", "run").unwrap();
        assert_eq!(sm.transition_for("Idle", "go").unwrap().to, "Sprint");
        assert!(sm.transition_for("Sprint", "halt").is_some());
        assert!(sm.validate().is_ok());
    }

    #[test]
    fn test_rename_clip_updates_states() {
        let mut sm = locomotion();
        sm.edit_clip_info("run", "jog", ResourceId(9), false).unwrap();
        assert_eq!(sm.state("Run").unwrap().clip_name, "jog");
        assert_eq!(sm.clip("jog").unwrap().uid, ResourceId(9));
        assert!(sm.clip("run").is_none());
    }

    #[test]
    fn test_edit_transition() {
        let mut sm = locomotion();
        sm.edit_transition("Idle", "go", Transition::new("Idle", "Run", "start", 0))
            .unwrap();
        assert!(sm.transition_for("Idle", "go").is_none());
        assert_eq!(sm.transition_for("Idle", "start").unwrap().blend_time_ms, 0);

        assert!(matches!(
            sm.edit_transition("Idle", "missing", Transition::new("Idle", "Run", "x", 0)),
            Err(AnimError::NotFound { kind: "transition", .. })
        ));
        assert!(matches!(
            sm.edit_transition("Idle", "start", Transition::new("Run", "Idle", "halt", 0)),
            Err(AnimError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_remove_state_drops_transitions() {
        let mut sm = locomotion();
        sm.remove_state("Run").unwrap();
        assert!(sm.transitions().is_empty());
        assert!(sm.remove_clip("run").is_ok());
        assert!(sm.remove_clip("idle").is_err());
    }

    #[test]
    fn test_validation_reports_dangling_references() {
        let mut sm = locomotion();
        sm.add_state("Jump", "jump").unwrap();
        sm.add_transition("Idle", "Fly", "flap", 0).unwrap();
        let issues = sm.validation_issues();
        assert_eq!(issues, vec![
            "state 'Jump' plays unknown clip 'jump'".to_string(),
            "transition 'Idle/flap' targets unknown state 'Fly'".to_string(),
        ]);
        assert!(sm.validate().is_err());
    }

    #[test]
    fn test_empty_names_are_ordinary_names() {
        let mut sm = locomotion();
        sm.add_state("", "idle").unwrap();
        sm.add_transition("Idle", "Run", "", 0).unwrap();
        assert!(matches!(
            sm.add_transition("Idle", "Idle", "", 0),
            Err(AnimError::DuplicateName { kind: "transition", .. })
        ));
    }

    #[test]
    fn test_triggers() {
        let mut sm = locomotion();
        sm.add_transition("Run", "Run", "go", 0).unwrap();
        assert_eq!(sm.triggers(), vec!["go", "halt"]);
    }
}
