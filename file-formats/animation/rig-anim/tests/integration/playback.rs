use glam::{Quat, Vec3};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rig_anim::animation::{lerp_position, sample_track, slerp_rotation};
use rig_anim::{Channel, PlaybackSampler, PlaybackState, Track};

use crate::common::{clip_id, hip_clip, mixed_clip};

#[test]
fn test_hip_scenarios() {
    let clip = hip_clip(clip_id(1));
    let mut sampler = PlaybackSampler::new();
    sampler.play(&clip, false);

    sampler.update(1.5);
    assert_eq!(
        sampler.sample_node(&clip, "Hip").unwrap().position,
        Some(Vec3::new(1.5, 0.0, 0.0))
    );

    sampler.update(1.5);
    assert_eq!(sampler.state(), PlaybackState::Stopped);
    assert_eq!(
        sampler.sample_node(&clip, "Hip").unwrap().position,
        Some(Vec3::new(2.0, 0.0, 0.0))
    );
}

#[test]
fn test_first_and_last_keyframes_exact() {
    let clip = mixed_clip(clip_id(2));
    for (_, channel) in clip.channels() {
        let pos = channel.position_track();
        if let (Some(first), Some(last)) = (pos.values.first(), pos.values.last()) {
            assert_eq!(sample_track(pos, pos.timestamps[0]), Some(*first));
            assert_eq!(sample_track(pos, pos.last_timestamp().unwrap()), Some(*last));
            assert_eq!(sample_track(pos, -10.0), Some(*first));
            assert_eq!(sample_track(pos, 100.0), Some(*last));
        }
        let rot = channel.rotation_track();
        if let (Some(first), Some(last)) = (rot.values.first(), rot.values.last()) {
            assert_eq!(sample_track(rot, -1.0), Some(*first));
            assert_eq!(sample_track(rot, 100.0), Some(*last));
        }
    }
}

#[test]
fn test_rotation_only_channel_leaves_position_alone() {
    let clip = mixed_clip(clip_id(3));
    let mut sampler = PlaybackSampler::new();
    sampler.play(&clip, true);
    sampler.update(0.6);
    let pose = sampler.sample_node(&clip, "Spine").unwrap();
    assert_eq!(pose.position, None);
    assert!(pose.rotation.unwrap().is_normalized());
}

#[test]
fn test_loop_phase_continuity() {
    let clip = hip_clip(clip_id(4));
    let mut looping = PlaybackSampler::new();
    looping.play(&clip, true);
    let mut reference = PlaybackSampler::new();
    reference.play(&clip, true);

    looping.update(2.0 + 0.75);
    reference.update(0.75);
    assert!((looping.current_time() - reference.current_time()).abs() < 1e-5);
    let a = looping.sample_node(&clip, "Hip").unwrap().position.unwrap();
    let b = reference.sample_node(&clip, "Hip").unwrap().position.unwrap();
    assert!(a.abs_diff_eq(b, 1e-5));
}

#[test]
fn test_single_key_track_is_constant() {
    let channel = Channel::new()
        .with_rotations(vec![0.5], vec![Quat::from_rotation_z(1.0)])
        .unwrap();
    for time in [-1.0, 0.0, 0.5, 7.0] {
        assert_eq!(
            sample_track(channel.rotation_track(), time),
            Some(Quat::from_rotation_z(1.0))
        );
    }
}

#[test]
fn test_empty_track_yields_nothing() {
    let track: Track<'_, Vec3> = Track {
        timestamps: &[],
        values: &[],
    };
    assert_eq!(sample_track(track, 0.0), None);
}

fn quat_strategy() -> impl Strategy<Value = Quat> {
    (-1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0)
        .prop_filter("non-degenerate", |(x, y, z, w)| x * x + y * y + z * z + w * w > 0.01)
        .prop_map(|(x, y, z, w)| Quat::from_xyzw(x, y, z, w))
}

proptest! {
    #[test]
    fn prop_slerp_is_unit_length(a in quat_strategy(), b in quat_strategy(), t in 0.0f32..=1.0) {
        let q = slerp_rotation(a, b, t);
        prop_assert!((q.length() - 1.0).abs() < 1e-4);
        prop_assert!(q.is_finite());
    }

    #[test]
    fn prop_slerp_short_path_sign_invariant(a in quat_strategy(), b in quat_strategy(), t in 0.0f32..=1.0) {
        let direct = slerp_rotation(a, b, t);
        let flipped = slerp_rotation(a, -b, t);
        // Same rotation, possibly opposite sign
        prop_assert!(direct.dot(flipped).abs() > 1.0 - 1e-4);
    }

    #[test]
    fn prop_lerp_hits_endpoints(x in -100.0f32..100.0, y in -100.0f32..100.0) {
        let a = Vec3::new(x, y, 0.0);
        let b = Vec3::new(y, x, 1.0);
        prop_assert_eq!(lerp_position(a, b, 0.0), a);
        prop_assert!(lerp_position(a, b, 1.0).abs_diff_eq(b, 1e-4));
    }

    #[test]
    fn prop_loop_time_stays_in_range(steps in prop::collection::vec(0.0f32..0.9, 1..40)) {
        let clip = hip_clip(clip_id(9));
        let mut sampler = PlaybackSampler::new();
        sampler.play(&clip, true);
        for dt in steps {
            sampler.update(dt);
            prop_assert!(sampler.current_time() >= 0.0);
            prop_assert!(sampler.current_time() <= clip.duration());
        }
    }
}
