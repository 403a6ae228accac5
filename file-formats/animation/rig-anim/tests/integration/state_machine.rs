use std::collections::HashMap;

use pretty_assertions::assert_eq;
use rig_anim::state_machine::{decode_state_machine, encode_state_machine};
use rig_anim::{AnimError, AnimationClip, ResourceCategory, ResourceId, StateMachine, StateMachineInstance};
use test_case::test_case;

use crate::common::{clip_id, constant_clip};

fn locomotion() -> StateMachine {
    let uid = ResourceId::new(ResourceCategory::StateMachine, 1).unwrap();
    let mut sm = StateMachine::new(uid, "locomotion");
    sm.add_clip(clip_id(1), "idle", true).unwrap();
    sm.add_clip(clip_id(2), "run", true).unwrap();
    sm.add_state("Idle", "idle").unwrap();
    sm.add_state("Run", "run").unwrap();
    sm.add_transition("Idle", "Run", "go", 200).unwrap();
    sm.add_transition("Run", "Idle", "halt", 0).unwrap();
    sm
}

fn clips() -> HashMap<ResourceId, AnimationClip> {
    HashMap::from([
        (clip_id(1), constant_clip(clip_id(1), "idle", 0.0)),
        (clip_id(2), constant_clip(clip_id(2), "run", 4.0)),
    ])
}

#[test]
fn test_idle_to_run_crossfade() {
    let clips = clips();
    let mut instance = StateMachineInstance::new(locomotion());
    instance.update(0.0, &clips);
    assert!(instance.fire("go", &clips));

    instance.update(0.1, &clips);
    assert_eq!(instance.active_state(), Some("Idle"));
    assert_eq!(instance.target_state(), Some("Run"));
    let progress = instance.blend_progress().unwrap();
    assert!((progress - 0.5).abs() < 1e-3);
    let x = instance.sample_node("Hip", &clips).unwrap().position.unwrap().x;
    assert!((x - 2.0).abs() < 1e-2);

    instance.update(0.11, &clips);
    assert_eq!(instance.active_state(), Some("Run"));
    assert_eq!(instance.blend_progress(), None);
    let x = instance.sample_node("Hip", &clips).unwrap().position.unwrap().x;
    assert_eq!(x, 4.0);

    // zero blend back
    assert!(instance.fire("halt", &clips));
    assert_eq!(instance.active_state(), Some("Idle"));
}

#[test]
fn test_round_trip_after_edits() {
    let mut sm = locomotion();
    sm.edit_state("Run", "Sprint", "run").unwrap();
    sm.edit_clip_info("idle", "rest", clip_id(7), false).unwrap();
    sm.add_transition("Sprint", "Sprint", "boost", 50).unwrap();

    let bytes = encode_state_machine(&sm).unwrap();
    let decoded = decode_state_machine(sm.uid(), sm.name(), &bytes).unwrap();
    assert_eq!(decoded, sm);
    assert!(decoded.validate().is_ok());
    assert_eq!(decoded.state("Idle").unwrap().clip_name, "rest");
}

#[test_case("Idle", "go", true ; "matching transition")]
#[test_case("Idle", "halt", false ; "trigger from another state")]
#[test_case("Run", "halt", true ; "zero blend")]
#[test_case("Run", "jump", false ; "unknown trigger")]
fn test_fire_from_state(state: &str, trigger: &str, taken: bool) {
    let clips = clips();
    let mut instance = StateMachineInstance::new(locomotion());
    instance.set_active_state(state, &clips).unwrap();
    assert_eq!(instance.fire(trigger, &clips), taken);
}

#[test]
fn test_duplicate_transition_identity() {
    let mut sm = locomotion();
    assert!(matches!(
        sm.add_transition("Idle", "Run", "go", 10),
        Err(AnimError::DuplicateName { kind: "transition", .. })
    ));
}

#[test]
fn test_empty_machine_has_no_state() {
    let clips = clips();
    let mut instance = StateMachineInstance::new(StateMachine::new(ResourceId(1), "empty"));
    instance.update(0.5, &clips);
    assert_eq!(instance.active_state(), None);
    assert!(instance.required_clips().is_empty());
    assert!(!instance.fire("go", &clips));
}
