use pretty_assertions::assert_eq;
use rig_anim::codec::encoded_len;
use rig_anim::{AnimError, AnimationClip, Resource, ResourceId, decode_clip, encode_clip, encode_clip_with_header};

use crate::common::{clip_id, mixed_clip};

fn bits(clip: &AnimationClip) -> Vec<(String, Vec<u32>, Vec<u32>)> {
    clip.channels()
        .map(|(name, channel)| {
            let pos = channel.position_track();
            let rot = channel.rotation_track();
            let mut p: Vec<u32> = pos.timestamps.iter().map(|t| t.to_bits()).collect();
            p.extend(pos.values.iter().flat_map(|v| v.to_array()).map(f32::to_bits));
            let mut r: Vec<u32> = rot.timestamps.iter().map(|t| t.to_bits()).collect();
            r.extend(rot.values.iter().flat_map(|q| q.to_array()).map(f32::to_bits));
            (name.to_string(), p, r)
        })
        .collect()
}

#[test]
fn test_mixed_tracks_round_trip_bit_exact() {
    let clip = mixed_clip(clip_id(1));
    let bytes = encode_clip(&clip).unwrap();
    assert_eq!(bytes.len(), encoded_len(&clip));

    let decoded = decode_clip(clip.uid(), clip.name(), &bytes).unwrap();
    assert_eq!(bits(&decoded), bits(&clip));
    assert_eq!(decoded.duration(), 1.5);
    assert_eq!(decoded.track_count(), 4);

    // and re-encoding gives the same bytes
    assert_eq!(encode_clip(&decoded).unwrap(), bytes);
}

#[test]
fn test_resource_trait_round_trip() {
    let clip = mixed_clip(clip_id(2));
    let bytes = Resource::encode(&clip).unwrap();
    let decoded = <AnimationClip as Resource>::decode(clip.uid(), "mixed", &bytes).unwrap();
    assert_eq!(decoded, clip);
}

#[test]
fn test_every_truncation_fails() {
    let bytes = encode_clip(&mixed_clip(clip_id(3))).unwrap();
    for len in 0..bytes.len() {
        let result = decode_clip(ResourceId(3), "cut", &bytes[..len]);
        assert!(result.is_err(), "prefix of {len} bytes decoded");
    }
}

#[test]
fn test_enveloped_truncation_fails() {
    let bytes = encode_clip_with_header(&mixed_clip(clip_id(3))).unwrap();
    for len in 0..bytes.len() {
        assert!(decode_clip(ResourceId(3), "cut", &bytes[..len]).is_err());
    }
}

#[test]
fn test_unsupported_envelope_version() {
    let mut bytes = encode_clip_with_header(&mixed_clip(clip_id(4))).unwrap().to_vec();
    bytes[4] = 2;
    assert!(matches!(
        decode_clip(ResourceId(4), "future", &bytes),
        Err(AnimError::UnsupportedVersion(2))
    ));
}

#[test]
fn test_unsorted_payload_rejected() {
    // One translation entry for "A" with timestamps 1.0, 0.0
    let mut data = Vec::new();
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&1u32.to_le_bytes());
    data.push(b'A');
    data.push(0);
    data.extend_from_slice(&2u32.to_le_bytes());
    for t in [1.0f32, 0.0] {
        data.extend_from_slice(&t.to_le_bytes());
    }
    for _ in 0..6 {
        data.extend_from_slice(&0f32.to_le_bytes());
    }
    assert!(matches!(
        decode_clip(ResourceId(5), "unsorted", &data),
        Err(AnimError::ValidationError(_))
    ));
}
