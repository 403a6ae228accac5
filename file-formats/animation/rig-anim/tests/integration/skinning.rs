use glam::{Mat4, Quat, Vec3};
use rig_anim::skinning::{skin_vertices, MAX_INFLUENCES};
use rig_anim::{
    AnimError, BoneInfluence, FlatScene, MAX_BONES, Palette, SceneGraph, Skin, SkinnedVertex,
    SkinningOptions,
};
use rstest::rstest;

fn bind_scene() -> FlatScene {
    let mut scene = FlatScene::new();
    scene.add_node("Hip", Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY);
    scene.add_node("Knee", Vec3::new(0.0, 0.5, 0.1), Quat::from_rotation_x(0.3));
    scene
}

fn skin_for(scene: &FlatScene) -> Skin {
    let inverse: Vec<Mat4> = ["Hip", "Knee"]
        .iter()
        .map(|name| scene.world_transform(name).unwrap().inverse())
        .collect();
    Skin::new(0, vec![0, 1], inverse)
        .unwrap()
        .with_bone_names(vec!["Hip".into(), "Knee".into()])
        .unwrap()
}

#[test]
fn test_bind_pose_palette_is_identity() {
    let scene = bind_scene();
    let skin = skin_for(&scene);
    let mut palette = Palette::new();
    skin.update_palette(&scene, &mut palette);

    for matrix in palette.matrices() {
        assert!(matrix.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    let vertex = SkinnedVertex {
        position: Vec3::new(0.2, 0.8, 0.0),
        normal: Vec3::Y,
        influences: [
            BoneInfluence::new(0, 0.6),
            BoneInfluence::new(1, 0.4),
            BoneInfluence::default(),
            BoneInfluence::default(),
        ],
    };
    let skinned = skin_vertices(&palette, &[vertex], &SkinningOptions::default());
    assert!(skinned[0].position.abs_diff_eq(vertex.position, 1e-5));
    assert!(skinned[0].normal.abs_diff_eq(vertex.normal, 1e-5));
}

#[test]
fn test_moving_a_bone_moves_its_vertices() {
    let mut scene = bind_scene();
    let skin = skin_for(&scene);
    scene.set_local_pose("Hip", Some(Vec3::new(0.0, 2.0, 0.0)), None);

    let mut palette = Palette::new();
    skin.update_palette(&scene, &mut palette);
    let vertex = SkinnedVertex {
        position: Vec3::new(0.0, 1.0, 0.0),
        normal: Vec3::X,
        influences: [BoneInfluence::new(0, 1.0); MAX_INFLUENCES],
    };
    let out = skin_vertices(&palette, &[vertex], &SkinningOptions::default());
    assert!(out[0].position.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
}

#[test]
fn test_missing_bone_falls_back_to_identity() {
    let scene = FlatScene::new();
    let skin = Skin::new(0, vec![4], vec![Mat4::IDENTITY]).unwrap();
    assert_eq!(skin.gather_world_transforms(&scene), vec![Mat4::IDENTITY]);
}

#[rstest]
#[case(1)]
#[case(64)]
#[case(MAX_BONES)]
fn test_palette_bytes_are_contiguous(#[case] bones: usize) {
    let skin = Skin::new(0, (0..bones as u32).collect(), vec![Mat4::IDENTITY; bones]).unwrap();
    let mut palette = Palette::new();
    skin.compute_palette(&vec![Mat4::from_scale(Vec3::splat(2.0)); bones], &mut palette);
    let bytes = palette.as_bytes();
    assert_eq!(bytes.len(), bones * 16 * 4);
    assert_eq!(&bytes[..4], &2.0f32.to_le_bytes());
}

#[test]
fn test_oversized_skin_rejected_not_truncated() {
    let bones = MAX_BONES + 10;
    let result = Skin::new(0, (0..bones as u32).collect(), vec![Mat4::IDENTITY; bones]);
    assert!(matches!(
        result,
        Err(AnimError::BoneCountExceeded { count, max }) if count == bones && max == MAX_BONES
    ));
}
