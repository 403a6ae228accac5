//! Skeleton binding: bone palettes and linear blend skinning.
//!
//! Each frame the world transforms of the bound bone nodes are multiplied
//! with their inverse bind matrices to produce the palette. Vertices then
//! blend up to four palette entries by weight.

use glam::{Mat4, Vec3};
use log::warn;

use crate::error::{AnimError, Result};
use crate::scene::SceneGraph;

/// Palette capacity. Skins binding more bones are rejected.
pub const MAX_BONES: usize = 128;

/// Influences carried per vertex
pub const MAX_INFLUENCES: usize = 4;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct SkinningOptions {
    /// Rescale usable weights so they sum to exactly 1
    pub normalize_weights: bool,
    /// Weights below this are ignored
    pub weight_threshold: f32,
}

impl Default for SkinningOptions {
    fn default() -> Self {
        Self {
            normalize_weights: true,
            weight_threshold: 0.001,
        }
    }
}

/// Binding of a mesh to a set of skeleton nodes.
///
/// Palette slot `i` corresponds to `bone_indices[i]` and
/// `inverse_bind_matrices[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    root_index: u32,
    bone_indices: Vec<u32>,
    inverse_bind_matrices: Vec<Mat4>,
    bone_names: Vec<String>,
}

impl Skin {
    /// Build a skin from parallel bone index and inverse bind matrix lists
    pub fn new(root_index: u32, bone_indices: Vec<u32>, inverse_bind_matrices: Vec<Mat4>) -> Result<Self> {
        if bone_indices.len() != inverse_bind_matrices.len() {
            return Err(AnimError::ValidationError(format!(
                "skin has {} bones but {} inverse bind matrices",
                bone_indices.len(),
                inverse_bind_matrices.len()
            )));
        }
        if bone_indices.len() > MAX_BONES {
            return Err(AnimError::BoneCountExceeded {
                count: bone_indices.len(),
                max: MAX_BONES,
            });
        }

        Ok(Self {
            root_index,
            bone_indices,
            inverse_bind_matrices,
            bone_names: Vec::new(),
        })
    }

    /// Attach the scene node names of the bones, in palette order
    pub fn with_bone_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.bone_indices.len() {
            return Err(AnimError::ValidationError(format!(
                "skin has {} bones but {} bone names",
                self.bone_indices.len(),
                names.len()
            )));
        }
        self.bone_names = names;
        Ok(self)
    }

    /// Scene node index of the skeleton root
    pub fn root_index(&self) -> u32 {
        self.root_index
    }

    /// Scene node index of each palette slot
    pub fn bone_indices(&self) -> &[u32] {
        &self.bone_indices
    }

    /// Inverse bind matrix of each palette slot
    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind_matrices
    }

    /// Number of palette slots
    pub fn bone_count(&self) -> usize {
        self.bone_indices.len()
    }

    /// Scene node name of a palette slot. Unnamed bones are `node_<index>`.
    pub fn bone_name(&self, slot: usize) -> Option<String> {
        if let Some(name) = self.bone_names.get(slot) {
            return Some(name.clone());
        }
        self.bone_indices
            .get(slot)
            .map(|index| format!("node_{index}"))
    }

    /// World transforms of the bones in palette order. Bones the scene
    /// cannot resolve fall back to identity.
    pub fn gather_world_transforms<S: SceneGraph + ?Sized>(&self, scene: &S) -> Vec<Mat4> {
        (0..self.bone_count())
            .map(|slot| {
                let name = self.bone_name(slot).unwrap_or_default();
                scene.world_transform(&name).unwrap_or_else(|| {
                    warn!("Skin bone '{name}' (slot {slot}) not found in scene, using identity");
                    Mat4::IDENTITY
                })
            })
            .collect()
    }

    /// `palette[slot] = world[slot] * inverse_bind[slot]`
    pub fn compute_palette(&self, world: &[Mat4], palette: &mut Palette) {
        palette.matrices.clear();
        palette.matrices.extend(
            self.inverse_bind_matrices
                .iter()
                .enumerate()
                .map(|(slot, inverse_bind)| {
                    world.get(slot).copied().unwrap_or(Mat4::IDENTITY) * *inverse_bind
                }),
        );
    }

    /// Gather world transforms from `scene` and rebuild `palette`
    pub fn update_palette<S: SceneGraph + ?Sized>(&self, scene: &S, palette: &mut Palette) {
        let world = self.gather_world_transforms(scene);
        self.compute_palette(&world, palette);
    }
}

/// Per-frame skinning matrices, one per bone slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    matrices: Vec<Mat4>,
}

impl Palette {
    /// Empty palette with room for the maximum bone count
    pub fn new() -> Self {
        Self {
            matrices: Vec::with_capacity(MAX_BONES),
        }
    }

    /// Skinning matrices in slot order
    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    /// Matrix for `slot`, if the palette has one
    pub fn get(&self, slot: usize) -> Option<&Mat4> {
        self.matrices.get(slot)
    }

    /// Number of matrices
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    /// True until the first palette update
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Column-major `f32` matrices, contiguous, ready for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.matrices.as_slice())
    }
}

/// One bone weight of a skinned vertex
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoneInfluence {
    pub slot: u16,
    pub weight: f32,
}

impl BoneInfluence {
    /// Influence of palette `slot` with the given weight
    pub fn new(slot: u16, weight: f32) -> Self {
        Self { slot, weight }
    }
}

/// Bind-space vertex with its bone influences
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkinnedVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub influences: [BoneInfluence; MAX_INFLUENCES],
}

/// Transform one vertex by the palette. The returned vertex keeps the input
/// influences.
pub fn skin_vertex(palette: &Palette, vertex: &SkinnedVertex, options: &SkinningOptions) -> SkinnedVertex {
    let mut usable = [(Mat4::IDENTITY, 0.0f32); MAX_INFLUENCES];
    let mut used = 0;
    let mut total = 0.0;

    for influence in &vertex.influences {
        if !(influence.weight >= options.weight_threshold) || influence.weight <= 0.0 {
            continue;
        }
        let Some(matrix) = palette.get(usize::from(influence.slot)) else {
            warn!(
                "Influence slot {} outside palette of {} bones, skipped",
                influence.slot,
                palette.len()
            );
            continue;
        };
        usable[used] = (*matrix, influence.weight);
        used += 1;
        total += influence.weight;
    }

    if used == 0 || total <= 0.0 {
        return *vertex;
    }

    let scale = if total > 1.0 || (options.normalize_weights && total > options.weight_threshold) {
        1.0 / total
    } else {
        1.0
    };

    let mut position = Vec3::ZERO;
    let mut normal = Vec3::ZERO;
    for &(matrix, weight) in &usable[..used] {
        let weight = weight * scale;
        position += matrix.transform_point3(vertex.position) * weight;
        normal += matrix.transform_vector3(vertex.normal) * weight;
    }

    SkinnedVertex {
        position,
        normal: normal.try_normalize().unwrap_or(vertex.normal),
        influences: vertex.influences,
    }
}

/// Skin every vertex of `vertices` against `palette`
pub fn skin_vertices(
    palette: &Palette,
    vertices: &[SkinnedVertex],
    options: &SkinningOptions,
) -> Vec<SkinnedVertex> {
    vertices
        .iter()
        .map(|v| skin_vertex(palette, v, options))
        .collect()
}
