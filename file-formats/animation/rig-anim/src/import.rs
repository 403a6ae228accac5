//! glTF import of animation clips and skins.
//!
//! Every glTF animation becomes one [`AnimationClip`] whose identifier is
//! `base_uid + animation index`. Translation and rotation channels become
//! tracks of the target node; scale and morph-weight channels are skipped.
//! Nodes without a name are addressed as `node_<index>`.

use std::collections::BTreeMap;
use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use gltf::animation::Interpolation;
use gltf::animation::util::ReadOutputs;
use log::{debug, warn};

use crate::channel::Channel;
use crate::clip::AnimationClip;
use crate::error::{AnimError, Result};
use crate::resource::ResourceId;
use crate::skinning::Skin;

/// Clips and skins read from one glTF asset
#[derive(Debug, Clone, Default)]
pub struct GltfImport {
    pub clips: Vec<AnimationClip>,
    pub skins: Vec<Skin>,
}

/// Import a `.gltf` or `.glb` file
pub fn import_file(path: impl AsRef<Path>, base_uid: ResourceId) -> Result<GltfImport> {
    let path = path.as_ref();
    let (document, buffers, _) =
        gltf::import(path).map_err(|e| AnimError::ImportError(format!("{}: {e}", path.display())))?;
    import_document(&document, &buffers, base_uid)
}

/// Import from an in-memory `.glb` or self-contained `.gltf`
pub fn import_slice(data: &[u8], base_uid: ResourceId) -> Result<GltfImport> {
    let (document, buffers, _) =
        gltf::import_slice(data).map_err(|e| AnimError::ImportError(e.to_string()))?;
    import_document(&document, &buffers, base_uid)
}

pub fn import_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    base_uid: ResourceId,
) -> Result<GltfImport> {
    Ok(GltfImport {
        clips: clips_from_document(document, buffers, base_uid)?,
        skins: skins_from_document(document, buffers)?,
    })
}

/// Scene node name as the runtime sees it
pub fn node_name(node: &gltf::Node<'_>) -> String {
    node.name()
        .map_or_else(|| format!("node_{}", node.index()), str::to_string)
}

#[derive(Default)]
struct PendingChannel {
    positions: Option<(Vec<f32>, Vec<Vec3>)>,
    rotations: Option<(Vec<f32>, Vec<Quat>)>,
}

pub fn clips_from_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    base_uid: ResourceId,
) -> Result<Vec<AnimationClip>> {
    let mut clips = Vec::new();

    for animation in document.animations() {
        let index = animation.index();
        let uid = base_uid
            .0
            .checked_add(index as u64)
            .map(ResourceId)
            .ok_or_else(|| AnimError::ImportError(format!("clip id overflow at animation {index}")))?;
        let name = animation
            .name()
            .map_or_else(|| format!("animation_{index}"), str::to_string);

        let mut pending: BTreeMap<String, PendingChannel> = BTreeMap::new();
        for channel in animation.channels() {
            let node = node_name(&channel.target().node());
            let interpolation = channel.sampler().interpolation();
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));

            let Some(inputs) = reader.read_inputs() else {
                warn!("{name}: channel for '{node}' has no keyframe times, skipped");
                continue;
            };
            let times: Vec<f32> = inputs.collect();

            let slot = pending.entry(node.clone()).or_default();
            match reader.read_outputs() {
                Some(ReadOutputs::Translations(values)) => {
                    if slot.positions.is_some() {
                        warn!("{name}: second translation channel for '{node}' ignored");
                        continue;
                    }
                    let values: Vec<Vec3> = values.map(Vec3::from_array).collect();
                    slot.positions = Some(resample(&times, &values, interpolation));
                }
                Some(ReadOutputs::Rotations(values)) => {
                    if slot.rotations.is_some() {
                        warn!("{name}: second rotation channel for '{node}' ignored");
                        continue;
                    }
                    let values: Vec<Quat> = values.into_f32().map(Quat::from_array).collect();
                    slot.rotations = Some(resample(&times, &values, interpolation));
                }
                Some(ReadOutputs::Scales(_) | ReadOutputs::MorphTargetWeights(_)) => {
                    debug!("{name}: skipping unsupported channel on '{node}'");
                }
                None => warn!("{name}: channel for '{node}' has no output values, skipped"),
            }
        }

        let mut clip = AnimationClip::new(uid, name);
        for (node, tracks) in pending {
            let mut channel = Channel::new();
            if let Some((times, values)) = tracks.positions {
                channel = channel.with_positions(times, values)?;
            }
            if let Some((times, values)) = tracks.rotations {
                channel = channel.with_rotations(times, values)?;
            }
            if !channel.is_empty() {
                clip.insert_channel(node, channel)?;
            }
        }
        debug!(
            "Imported clip {uid} '{}' with {} channels",
            clip.name(),
            clip.channel_count()
        );
        clips.push(clip);
    }

    Ok(clips)
}

/// Convert glTF sampler output to linear keyframes.
///
/// Cubic-spline output stores in-tangent, value, out-tangent per key; only
/// the value is kept. Step keys are expanded into a pair of keys sharing a
/// timestamp so linear sampling holds each value until the next key.
fn resample<T: Copy>(times: &[f32], values: &[T], interpolation: Interpolation) -> (Vec<f32>, Vec<T>) {
    match interpolation {
        Interpolation::Linear => {
            let count = times.len().min(values.len());
            (times[..count].to_vec(), values[..count].to_vec())
        }
        Interpolation::CubicSpline => {
            let keys: Vec<T> = values.chunks_exact(3).map(|triple| triple[1]).collect();
            let count = times.len().min(keys.len());
            (times[..count].to_vec(), keys[..count].to_vec())
        }
        Interpolation::Step => {
            let count = times.len().min(values.len());
            let mut out_times = Vec::with_capacity(count * 2);
            let mut out_values = Vec::with_capacity(count * 2);
            for i in 0..count {
                if i > 0 {
                    out_times.push(times[i]);
                    out_values.push(values[i - 1]);
                }
                out_times.push(times[i]);
                out_values.push(values[i]);
            }
            (out_times, out_values)
        }
    }
}

pub fn skins_from_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<Vec<Skin>> {
    let mut skins = Vec::new();

    for skin in document.skins() {
        let joints: Vec<gltf::Node<'_>> = skin.joints().collect();
        let bone_indices: Vec<u32> = joints.iter().map(|j| j.index() as u32).collect();
        let names: Vec<String> = joints.iter().map(node_name).collect();

        let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));
        let inverse_bind_matrices: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
            Some(matrices) => matrices.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
            None => vec![Mat4::IDENTITY; joints.len()],
        };

        let root_index = skin
            .skeleton()
            .map(|node| node.index() as u32)
            .or_else(|| bone_indices.first().copied())
            .unwrap_or(0);

        skins.push(Skin::new(root_index, bone_indices, inverse_bind_matrices)?.with_bone_names(names)?);
    }

    Ok(skins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_keys_are_held() {
        let (times, values) = resample(&[0.0, 1.0, 2.0], &[1, 2, 3], Interpolation::Step);
        assert_eq!(times, vec![0.0, 1.0, 1.0, 2.0, 2.0]);
        assert_eq!(values, vec![1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_cubic_keeps_values() {
        let (times, values) = resample(&[0.0, 1.0], &[9, 1, 9, 9, 2, 9], Interpolation::CubicSpline);
        assert_eq!(times, vec![0.0, 1.0]);
        assert_eq!(values, vec![1, 2]);
    }
}
