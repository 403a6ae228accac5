use glam::{Quat, Vec3};
use rig_anim::{AnimationClip, Channel, ResourceCategory, ResourceId};

pub fn clip_id(local: u64) -> ResourceId {
    ResourceId::new(ResourceCategory::Animation, local).unwrap()
}

/// Hip translates along X by one unit per second over two seconds
pub fn hip_clip(uid: ResourceId) -> AnimationClip {
    let hip = Channel::new()
        .with_positions(vec![0.0, 1.0, 2.0], vec![
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(2.0, 0.0, 0.0),
        ])
        .unwrap();
    AnimationClip::from_channels(uid, "walk", [("Hip", hip)]).unwrap()
}

/// Clip mixing position-only, rotation-only and dual-track channels
pub fn mixed_clip(uid: ResourceId) -> AnimationClip {
    let hip = Channel::new()
        .with_positions(vec![0.0, 0.5, 1.25], vec![
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.25, 1.1, -0.5),
            Vec3::new(0.5, 1.0, 0.0),
        ])
        .unwrap()
        .with_rotations(vec![0.0, 1.25], vec![
            Quat::IDENTITY,
            Quat::from_rotation_y(0.75),
        ])
        .unwrap();
    let spine = Channel::new()
        .with_rotations(vec![0.0, 0.4, 0.8, 1.5], vec![
            Quat::IDENTITY,
            Quat::from_rotation_x(0.2),
            Quat::from_rotation_x(-0.1),
            Quat::from_xyzw(0.1, 0.2, 0.3, 0.9),
        ])
        .unwrap();
    let hand = Channel::new()
        .with_positions(vec![0.3], vec![Vec3::new(-1.0, 0.0, 2.0)])
        .unwrap();
    AnimationClip::from_channels(uid, "mixed", [("Hip", hip), ("Spine", spine), ("Hand.L", hand)])
        .unwrap()
}

/// Clip holding one constant position for "Hip"
pub fn constant_clip(uid: ResourceId, name: &str, x: f32) -> AnimationClip {
    let hip = Channel::new()
        .with_positions(vec![0.0, 1.0], vec![Vec3::new(x, 0.0, 0.0); 2])
        .unwrap();
    AnimationClip::from_channels(uid, name, [("Hip", hip)]).unwrap()
}
