use glam::{Quat, Vec3};
use pretty_assertions::assert_eq;
use rig_anim::ResourceId;
use rig_anim::import::import_slice;

const JSON: &str = r#"{
  "asset": { "version": "2.0" },
  "nodes": [ { "name": "Hip" }, {} ],
  "buffers": [ { "byteLength": 64 } ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 8 },
    { "buffer": 0, "byteOffset": 8, "byteLength": 24 },
    { "buffer": 0, "byteOffset": 32, "byteLength": 32 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
    { "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC3" },
    { "bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC4" }
  ],
  "animations": [
    {
      "name": "walk",
      "samplers": [ { "input": 0, "output": 1 }, { "input": 0, "output": 2 } ],
      "channels": [
        { "sampler": 0, "target": { "node": 0, "path": "translation" } },
        { "sampler": 1, "target": { "node": 1, "path": "rotation" } }
      ]
    }
  ]
}"#;

fn chunk(kind: &[u8; 4], mut data: Vec<u8>, pad: u8) -> Vec<u8> {
    while data.len() % 4 != 0 {
        data.push(pad);
    }
    let mut out = (data.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend(data);
    out
}

fn glb() -> Vec<u8> {
    let mut bin = Vec::new();
    let floats: [f32; 16] = [
        0.0, 1.0, // times
        0.0, 0.0, 0.0, 1.0, 2.0, 3.0, // translations
        0.0, 0.0, 0.0, 1.0, // identity
        0.0, 0.0, 0.707_106_8, 0.707_106_8, // 90 degrees about z
    ];
    for f in floats {
        bin.extend_from_slice(&f.to_le_bytes());
    }

    let json = chunk(b"JSON", JSON.as_bytes().to_vec(), b' ');
    let bin = chunk(b"BIN\0", bin, 0);
    let total = 12 + json.len() + bin.len();

    let mut out = b"glTF".to_vec();
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend(json);
    out.extend(bin);
    out
}

#[test]
fn test_import_animation() {
    let imported = import_slice(&glb(), ResourceId(4_000_000_000_000_000_100)).unwrap();
    assert_eq!(imported.clips.len(), 1);
    assert!(imported.skins.is_empty());

    let clip = &imported.clips[0];
    assert_eq!(clip.uid(), ResourceId(4_000_000_000_000_000_100));
    assert_eq!(clip.name(), "walk");
    assert_eq!(clip.duration(), 1.0);

    let hip = clip.channel("Hip").unwrap();
    assert_eq!(hip.position_track().values, &[Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0)]);
    assert!(hip.rotation_track().is_empty());

    let unnamed = clip.channel("node_1").unwrap();
    assert_eq!(unnamed.rotation_track().values[0], Quat::IDENTITY);
    assert!(unnamed.position_track().is_empty());
}
