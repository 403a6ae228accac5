//! Contract with the host scene graph.
//!
//! The animation code never owns scene nodes. It looks them up by name,
//! which must match the channel and bone names exactly.

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};

pub trait SceneGraph {
    /// World transform of the named node after the host propagated the
    /// hierarchy, or `None` if no such node exists
    fn world_transform(&self, node: &str) -> Option<Mat4>;

    /// Overwrite the local translation and/or rotation of the named node.
    /// `None` leaves that property as it is. Unknown nodes are ignored.
    fn set_local_pose(&mut self, node: &str, position: Option<Vec3>, rotation: Option<Quat>);
}

/// Flat scene without hierarchy: a node's world transform is its local
/// transform. Used by tools and tests.
#[derive(Debug, Clone, Default)]
pub struct FlatScene {
    nodes: HashMap<String, (Vec3, Quat)>,
}

impl FlatScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>, position: Vec3, rotation: Quat) {
        self.nodes.insert(name.into(), (position, rotation));
    }

    pub fn local_pose(&self, node: &str) -> Option<(Vec3, Quat)> {
        self.nodes.get(node).copied()
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}

impl SceneGraph for FlatScene {
    fn world_transform(&self, node: &str) -> Option<Mat4> {
        self.nodes
            .get(node)
            .map(|&(position, rotation)| Mat4::from_rotation_translation(rotation, position))
    }

    fn set_local_pose(&mut self, node: &str, position: Option<Vec3>, rotation: Option<Quat>) {
        if let Some(entry) = self.nodes.get_mut(node) {
            if let Some(position) = position {
                entry.0 = position;
            }
            if let Some(rotation) = rotation {
                entry.1 = rotation;
            }
        }
    }
}
