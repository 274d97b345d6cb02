//! VRM animation (VRMA) content
//!
//! A VRMA file is a GLB whose root carries the `VRMC_vrm_animation`
//! extension. The extension maps humanoid bone names and expression names to
//! nodes; tracks are named after those roles instead of the node names so the
//! clip can drive any VRM model.

use super::gltf::{clip_name, first_animation_clip, read_channels, AnimationParser, ChannelOutputs};
use crate::clip::{AnimationClip, KeyframeTrack, TrackValues};
use crate::{LoaderError, Result};
use gltf::{Glb, Gltf};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Name of the root extension holding the humanoid and expression maps
pub const VRM_ANIMATION_EXTENSION: &str = "VRMC_vrm_animation";

/// The only humanoid bone whose translation is animated
const HIPS: &str = "hips";

/// Builds clips from VRMA files, naming tracks after humanoid bones and
/// expressions
#[derive(Debug, Clone, Copy, Default)]
pub struct VrmAnimationParser;

impl VrmAnimationParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse synchronously
    pub fn parse_vrm_animation(&self, data: &[u8]) -> Result<Option<AnimationClip>> {
        let glb = Glb::from_slice(data)?;
        let root: VrmaRoot = serde_json::from_slice(&glb.json)?;
        let gltf = Gltf::from_slice(data)?;

        let Some(extension) = root.extensions.and_then(|e| e.vrm_animation) else {
            log::warn!("No {VRM_ANIMATION_EXTENSION} extension, naming tracks after nodes");
            return Ok(first_animation_clip(&gltf));
        };
        if let Some(version) = &extension.spec_version {
            log::debug!("{VRM_ANIMATION_EXTENSION} specVersion {version}");
        }

        let Some(animation) = gltf.animations().next() else {
            log::debug!("VRMA document contains no animations");
            return Ok(None);
        };

        let roles = extension.node_roles();
        let node_count = gltf.nodes().count();
        if let Some((node, role)) = roles.iter().find(|(node, _)| **node >= node_count) {
            return Err(LoaderError::InvalidData(format!(
                "{role:?} references node {node}, document has {node_count} nodes"
            )));
        }
        let mut tracks = Vec::new();
        for channel in read_channels(&animation, gltf.blob.as_deref()) {
            match (roles.get(&channel.node), channel.outputs) {
                (Some(NodeRole::HumanBone(bone)), ChannelOutputs::Rotations(v)) => {
                    tracks.push(
                        KeyframeTrack::new(
                            format!("{bone}.quaternion"),
                            channel.times,
                            TrackValues::Quaternion(v),
                        )
                        .with_interpolation(channel.interpolation),
                    );
                }
                (Some(NodeRole::HumanBone(bone)), ChannelOutputs::Translations(v)) if bone == HIPS => {
                    tracks.push(
                        KeyframeTrack::new(
                            format!("{bone}.position"),
                            channel.times,
                            TrackValues::Vector(v),
                        )
                        .with_interpolation(channel.interpolation),
                    );
                }
                (Some(NodeRole::Expression(name)), ChannelOutputs::Translations(v)) => {
                    let weights = v.iter().map(|t| t.x).collect();
                    tracks.push(
                        KeyframeTrack::new(
                            format!("{name}.weight"),
                            channel.times,
                            TrackValues::Scalar(weights),
                        )
                        .with_interpolation(channel.interpolation),
                    );
                }
                (role, _) => {
                    log::debug!(
                        "Ignoring channel on {} ({role:?})",
                        channel.node_name
                    );
                }
            }
        }

        Ok(Some(AnimationClip::with_resolved_duration(
            clip_name(&animation),
            tracks,
        )))
    }
}

#[async_trait::async_trait]
impl AnimationParser for VrmAnimationParser {
    async fn parse_animation(&self, data: &[u8]) -> Result<Option<AnimationClip>> {
        self.parse_vrm_animation(data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeRole {
    HumanBone(String),
    Expression(String),
}

// ----- extension schema (serde) -----

#[derive(Debug, Default, Deserialize)]
struct VrmaRoot {
    #[serde(default)]
    extensions: Option<RootExtensions>,
}

#[derive(Debug, Default, Deserialize)]
struct RootExtensions {
    #[serde(rename = "VRMC_vrm_animation")]
    vrm_animation: Option<VrmAnimationExtension>,
}

#[derive(Debug, Default, Deserialize)]
struct VrmAnimationExtension {
    #[serde(rename = "specVersion")]
    spec_version: Option<String>,
    #[serde(default)]
    humanoid: Option<Humanoid>,
    #[serde(default)]
    expressions: Option<Expressions>,
}

#[derive(Debug, Default, Deserialize)]
struct Humanoid {
    #[serde(rename = "humanBones", default)]
    human_bones: BTreeMap<String, NodeRef>,
}

#[derive(Debug, Default, Deserialize)]
struct Expressions {
    #[serde(default)]
    preset: BTreeMap<String, NodeRef>,
    #[serde(default)]
    custom: BTreeMap<String, NodeRef>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct NodeRef {
    node: usize,
}

impl VrmAnimationExtension {
    fn node_roles(&self) -> HashMap<usize, NodeRole> {
        let mut roles = HashMap::new();
        if let Some(expressions) = &self.expressions {
            for (name, node_ref) in expressions.preset.iter().chain(&expressions.custom) {
                roles.insert(node_ref.node, NodeRole::Expression(name.clone()));
            }
        }
        // bones win when a node is listed twice
        if let Some(humanoid) = &self.humanoid {
            for (bone, node_ref) in &humanoid.human_bones {
                roles.insert(node_ref.node, NodeRole::HumanBone(bone.clone()));
            }
        }
        roles
    }
}
