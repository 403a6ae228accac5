use glam::{Mat4, Quat, Vec3};
use rig_anim::{
    AnimationComponent, ClipCache, DirectorySource, FlatScene, MemorySource, ResourceId, Skin,
    StateMachine, encode_clip_with_header,
};

use crate::common::{clip_id, constant_clip, hip_clip};

fn scene() -> FlatScene {
    let mut scene = FlatScene::new();
    scene.add_node("Hip", Vec3::ZERO, Quat::IDENTITY);
    scene
}

#[test]
fn test_component_drives_state_machine() {
    let mut source = MemorySource::new();
    source.insert_clip(&constant_clip(clip_id(1), "idle", 0.0)).unwrap();
    source.insert_clip(&constant_clip(clip_id(2), "run", 4.0)).unwrap();
    let cache = ClipCache::new(source);

    let mut sm = StateMachine::new(ResourceId(1), "locomotion");
    sm.add_clip(clip_id(1), "idle", true).unwrap();
    sm.add_clip(clip_id(2), "run", true).unwrap();
    sm.add_state("Idle", "idle").unwrap();
    sm.add_state("Run", "run").unwrap();
    sm.add_transition("Idle", "Run", "go", 200).unwrap();

    let mut scene = scene();
    let mut component = AnimationComponent::new(vec!["Hip".into()]);
    component.attach_state_machine(sm);

    component.tick(0.0, &cache, &mut scene);
    assert_eq!(cache.refcount(clip_id(1)), 1);
    assert_eq!(cache.resident_count(), 1);

    assert!(component.fire("go"));
    component.tick(0.1, &cache, &mut scene);
    assert_eq!(cache.resident_count(), 2);

    component.tick(0.15, &cache, &mut scene);
    assert_eq!(scene.local_pose("Hip").unwrap().0, Vec3::new(4.0, 0.0, 0.0));

    // the idle clip is released on the tick after the crossfade ends
    component.tick(0.0, &cache, &mut scene);
    assert_eq!(cache.refcount(clip_id(1)), 0);
    assert_eq!(cache.refcount(clip_id(2)), 1);

    component.stop();
    assert_eq!(cache.resident_count(), 0);
}

#[test]
fn test_directory_backed_playback() {
    let dir = tempfile::tempdir().unwrap();
    let clip = hip_clip(clip_id(3));
    let source = DirectorySource::new(dir.path());
    std::fs::write(source.path_for(clip.uid()), encode_clip_with_header(&clip).unwrap()).unwrap();
    let cache = ClipCache::new(source);

    let mut scene = scene();
    let mut component = AnimationComponent::new(vec!["Hip".into()]);
    component
        .add_skin(
            Skin::new(0, vec![0], vec![Mat4::IDENTITY])
                .unwrap()
                .with_bone_names(vec!["Hip".into()])
                .unwrap(),
        )
        .unwrap();
    component.play(&cache, clip.uid(), false).unwrap();
    component.tick(1.5, &cache, &mut scene);

    assert_eq!(scene.local_pose("Hip").unwrap().0, Vec3::new(1.5, 0.0, 0.0));
    assert!(
        component.palettes()[0].matrices()[0]
            .abs_diff_eq(Mat4::from_translation(Vec3::new(1.5, 0.0, 0.0)), 1e-6)
    );

    // run past the end: clamped, final pose kept
    component.tick(5.0, &cache, &mut scene);
    assert_eq!(scene.local_pose("Hip").unwrap().0, Vec3::new(2.0, 0.0, 0.0));
    assert!(!component.is_playing());
}

#[test]
fn test_unavailable_clip_leaves_pose() {
    let cache = ClipCache::new(MemorySource::new());
    let mut scene = scene();
    let mut component = AnimationComponent::new(vec!["Hip".into()]);
    assert!(component.play(&cache, clip_id(9), true).is_err());
    component.tick(1.0, &cache, &mut scene);
    assert_eq!(scene.local_pose("Hip").unwrap().0, Vec3::ZERO);
}
