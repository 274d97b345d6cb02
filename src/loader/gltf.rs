//! Binary glTF (GLB) content
//!
//! Binary content is recognised by its magic bytes only; parsing the
//! container is left to the `gltf` crate. The first animation in the
//! document becomes the clip.

use crate::clip::{AnimationClip, Interpolation, KeyframeTrack, TrackValues};
use crate::Result;
use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use gltf::animation::Property;
use gltf::Gltf;

/// First four bytes of every GLB file
pub const GLB_MAGIC: &[u8; 4] = b"glTF";

/// Whether the content starts with the GLB magic
pub fn is_binary_gltf(data: &[u8]) -> bool {
    data.starts_with(GLB_MAGIC)
}

/// Parser for content that is not in the JSON track format
///
/// Uses async-trait for dyn compatibility
#[async_trait::async_trait]
pub trait AnimationParser: Send + Sync + std::fmt::Debug {
    /// Parse the content into a clip; `Ok(None)` when it holds no animation
    async fn parse_animation(&self, data: &[u8]) -> Result<Option<AnimationClip>>;
}

/// Builds a clip from the first animation of a GLB document, naming tracks
/// after the animated nodes
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfAnimationParser;

impl GltfAnimationParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse synchronously
    pub fn parse_first_animation(&self, data: &[u8]) -> Result<Option<AnimationClip>> {
        let gltf = Gltf::from_slice(data)?;
        Ok(first_animation_clip(&gltf))
    }
}

#[async_trait::async_trait]
impl AnimationParser for GltfAnimationParser {
    async fn parse_animation(&self, data: &[u8]) -> Result<Option<AnimationClip>> {
        self.parse_first_animation(data)
    }
}

/// Clip for the first animation in the document, tracks named after nodes
pub(crate) fn first_animation_clip(gltf: &Gltf) -> Option<AnimationClip> {
    let Some(animation) = gltf.animations().next() else {
        log::debug!("GLB document contains no animations");
        return None;
    };

    let mut tracks = Vec::new();
    for channel in read_channels(&animation, gltf.blob.as_deref()) {
        let target = channel.node_name.clone();
        tracks.extend(channel.into_tracks(&target));
    }

    Some(AnimationClip::with_resolved_duration(
        clip_name(&animation),
        tracks,
    ))
}

/// Animation name, or `animation_<index>` for unnamed animations
pub(crate) fn clip_name(animation: &gltf::Animation) -> String {
    animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("animation_{}", animation.index()))
}

/// Decoded output samples of one channel
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ChannelOutputs {
    Translations(Vec<Vec3>),
    Rotations(Vec<Quat>),
    Scales(Vec<Vec3>),
    /// Flattened, `targets` weights per key
    Weights(Vec<f32>),
}

/// One animation channel with its samples read out of the binary chunk
#[derive(Debug, Clone)]
pub(crate) struct ChannelSamples {
    pub node: usize,
    pub node_name: String,
    pub times: Vec<f32>,
    pub outputs: ChannelOutputs,
    pub interpolation: Interpolation,
}

impl ChannelSamples {
    /// Tracks for this channel bound to `target`
    ///
    /// Morph target weights become one scalar track per target.
    pub fn into_tracks(self, target: &str) -> Vec<KeyframeTrack> {
        let interpolation = self.interpolation;
        let times = self.times;

        let tracks = match self.outputs {
            ChannelOutputs::Translations(v) => vec![KeyframeTrack::new(
                format!("{target}.position"),
                times,
                TrackValues::Vector(v),
            )],
            ChannelOutputs::Rotations(v) => vec![KeyframeTrack::new(
                format!("{target}.quaternion"),
                times,
                TrackValues::Quaternion(v),
            )],
            ChannelOutputs::Scales(v) => vec![KeyframeTrack::new(
                format!("{target}.scale"),
                times,
                TrackValues::Vector(v),
            )],
            ChannelOutputs::Weights(v) => {
                let targets = if times.is_empty() { 0 } else { v.len() / times.len() };
                (0..targets)
                    .map(|t| {
                        let weights = v.iter().skip(t).step_by(targets).copied().collect();
                        KeyframeTrack::new(
                            format!("{target}.morphTargetInfluences[{t}]"),
                            times.clone(),
                            TrackValues::Scalar(weights),
                        )
                    })
                    .collect()
            }
        };

        tracks
            .into_iter()
            .map(|t| t.with_interpolation(interpolation))
            .collect()
    }
}

/// Read every channel of an animation whose data lives in the GLB binary chunk
pub(crate) fn read_channels(animation: &gltf::Animation, blob: Option<&[u8]>) -> Vec<ChannelSamples> {
    let mut channels = Vec::new();

    for (index, channel) in animation.channels().enumerate() {
        let node = channel.target().node();
        let node_name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{}", node.index()));

        let reader = channel.reader(|buffer| match buffer.source() {
            gltf::buffer::Source::Bin => blob,
            gltf::buffer::Source::Uri(_) => None,
        });

        let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
            log::warn!(
                "Skipping channel {} on {node_name}: buffer data is not embedded",
                index
            );
            continue;
        };
        let times: Vec<f32> = inputs.collect();

        let (interpolation, spline) = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => (Interpolation::Linear, false),
            gltf::animation::Interpolation::Step => (Interpolation::Step, false),
            gltf::animation::Interpolation::CubicSpline => (Interpolation::Linear, true),
        };

        let outputs = match (channel.target().property(), outputs) {
            (Property::Translation, ReadOutputs::Translations(it)) => {
                ChannelOutputs::Translations(spline_values(it.map(Vec3::from).collect(), times.len(), spline))
            }
            (Property::Rotation, ReadOutputs::Rotations(it)) => ChannelOutputs::Rotations(spline_values(
                it.into_f32().map(|q| Quat::from_array(q).normalize()).collect(),
                times.len(),
                spline,
            )),
            (Property::Scale, ReadOutputs::Scales(it)) => {
                ChannelOutputs::Scales(spline_values(it.map(Vec3::from).collect(), times.len(), spline))
            }
            (Property::MorphTargetWeights, ReadOutputs::MorphTargetWeights(it)) => {
                ChannelOutputs::Weights(spline_values(it.into_f32().collect(), times.len(), spline))
            }
            (property, _) => {
                log::warn!("Skipping channel {}: output type does not match {property:?}", index);
                continue;
            }
        };

        log::debug!(
            "  - Channel {} on {node_name}: {} keys",
            index,
            times.len()
        );
        channels.push(ChannelSamples {
            node: node.index(),
            node_name,
            times,
            outputs,
            interpolation,
        });
    }

    channels
}

/// Cubic spline samples store in-tangent, value and out-tangent per key;
/// only the values are kept.
fn spline_values<T: Copy>(samples: Vec<T>, keys: usize, spline: bool) -> Vec<T> {
    if !spline || keys == 0 {
        return samples;
    }
    let per_key = samples.len() / keys;
    let width = per_key / 3;
    if width == 0 {
        return samples;
    }
    samples
        .chunks_exact(per_key)
        .flat_map(|key| key[width..2 * width].iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_magic_detection() {
        assert!(is_binary_gltf(b"glTF\x02\x00\x00\x00"));
        assert!(!is_binary_gltf(b"{\"tracks\": []}"));
        assert!(!is_binary_gltf(b"glT"));
        assert!(!is_binary_gltf(b""));
    }

    #[test]
    fn test_truncated_glb_is_gltf_error() {
        let result = block_on(GltfAnimationParser::new().parse_animation(b"glTF\x02\x00\x00\x00"));
        assert!(matches!(result, Err(crate::LoaderError::Gltf(_))));
    }

    #[test]
    fn test_spline_values_keep_middle() {
        // two keys, in/value/out each
        let samples = vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0];
        assert_eq!(spline_values(samples.clone(), 2, true), vec![1.0, 11.0]);
        assert_eq!(spline_values(samples.clone(), 2, false), samples);
    }

    #[test]
    fn test_weight_channel_splits_per_target() {
        let channel = ChannelSamples {
            node: 0,
            node_name: "face".to_string(),
            times: vec![0.0, 1.0],
            outputs: ChannelOutputs::Weights(vec![0.0, 0.5, 1.0, 0.25]),
            interpolation: Interpolation::Step,
        };

        let tracks = channel.into_tracks("face");
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].name, "face.morphTargetInfluences[0]");
        assert_eq!(tracks[0].values, TrackValues::Scalar(vec![0.0, 1.0]));
        assert_eq!(tracks[1].values, TrackValues::Scalar(vec![0.5, 0.25]));
        assert!(tracks.iter().all(|t| t.interpolation == Interpolation::Step));
    }
}
