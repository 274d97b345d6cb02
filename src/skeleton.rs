//! Skeletons that loaded clips are bound to
//!
//! The loader never owns a skeleton. It asks the caller's model for one and
//! hands back the same shared reference alongside the clip.

use crate::Result;
use gltf::Gltf;
use std::collections::HashMap;
use std::sync::Arc;

/// A joint in a skeleton
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone, `None` for roots
    pub parent: Option<usize>,
}

/// A joint hierarchy, bones stored in joint order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Create a skeleton from a list of bones
    pub fn new(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    /// Index of the bone with the given name
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Bone with the given name
    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Number of bones
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Build a skeleton from the first skin of a GLB (or VRM) model.
    ///
    /// Joints become bones in joint order; a bone's parent is the nearest
    /// ancestor node that is also a joint. Returns `Ok(None)` when the model
    /// has no skins.
    pub fn from_glb(data: &[u8]) -> Result<Option<Self>> {
        let gltf = Gltf::from_slice(data)?;

        let Some(skin) = gltf.skins().next() else {
            return Ok(None);
        };

        let mut node_parent: HashMap<usize, usize> = HashMap::new();
        for node in gltf.nodes() {
            for child in node.children() {
                node_parent.insert(child.index(), node.index());
            }
        }

        let joints: Vec<gltf::Node> = skin.joints().collect();
        let joint_slot: HashMap<usize, usize> = joints
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.index(), slot))
            .collect();

        let bones = joints
            .iter()
            .map(|node| {
                let mut parent = None;
                let mut cursor = node_parent.get(&node.index()).copied();
                // bounded walk, a malformed hierarchy may contain cycles
                let mut steps = node_parent.len();
                while let Some(ancestor) = cursor {
                    if steps == 0 {
                        break;
                    }
                    steps -= 1;
                    if let Some(&slot) = joint_slot.get(&ancestor) {
                        parent = Some(slot);
                        break;
                    }
                    cursor = node_parent.get(&ancestor).copied();
                }

                Bone {
                    name: node
                        .name()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("node_{}", node.index())),
                    parent,
                }
            })
            .collect();

        log::debug!("Built skeleton with {} bones", joints.len());
        Ok(Some(Self { bones }))
    }
}

/// A model that may provide a skeleton for clip binding
pub trait SkeletonSource: Send + Sync {
    /// Shared reference to the model's skeleton, if it has one
    fn skeleton(&self) -> Option<Arc<Skeleton>>;
}

impl SkeletonSource for Arc<Skeleton> {
    fn skeleton(&self) -> Option<Arc<Skeleton>> {
        Some(Arc::clone(self))
    }
}

impl SkeletonSource for Option<Arc<Skeleton>> {
    fn skeleton(&self) -> Option<Arc<Skeleton>> {
        self.clone()
    }
}
