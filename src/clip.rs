//! Keyframe tracks and animation clips
//!
//! A track is one animated property: an ordered list of key times plus one
//! sample per key. Samples are grouped from the flat value array by stride,
//! and the stride decides the kind of track.

use glam::{Quat, Vec3};
use uuid::Uuid;

/// Duration reported by a clip whose length could not be determined
pub const UNDETERMINED_DURATION: f32 = -1.0;

/// Kind of a keyframe track, selected by the number of components per key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// One component per key (weights, influences)
    Scalar,
    /// Three components per key (position, scale)
    Vector,
    /// Four components per key (rotation, x/y/z/w)
    Quaternion,
}

impl TrackKind {
    /// Map a stride to a track kind. Strides other than 1, 3 and 4 are not supported.
    pub fn from_stride(stride: usize) -> Option<Self> {
        match stride {
            1 => Some(Self::Scalar),
            3 => Some(Self::Vector),
            4 => Some(Self::Quaternion),
            _ => None,
        }
    }

    /// Number of components per key
    pub fn stride(&self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vector => 3,
            Self::Quaternion => 4,
        }
    }

    /// Short name used in log output
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Scalar => "number",
            Self::Vector => "vector",
            Self::Quaternion => "quaternion",
        }
    }
}

/// How values between two keys are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Linear for scalars and vectors, spherical for quaternions
    #[default]
    Linear,
    /// Hold the previous key until the next one
    Step,
}

/// Per-key samples of a track, already grouped by stride
#[derive(Debug, Clone, PartialEq)]
pub enum TrackValues {
    Scalar(Vec<f32>),
    Vector(Vec<Vec3>),
    Quaternion(Vec<Quat>),
}

impl TrackValues {
    /// Group a flat value array into samples of the given kind.
    ///
    /// Returns `None` when the array length is not a multiple of the stride.
    pub fn from_flat(kind: TrackKind, flat: &[f32]) -> Option<Self> {
        if flat.len() % kind.stride() != 0 {
            return None;
        }

        let values = match kind {
            TrackKind::Scalar => Self::Scalar(flat.to_vec()),
            TrackKind::Vector => Self::Vector(
                flat.chunks_exact(3)
                    .map(|c| Vec3::new(c[0], c[1], c[2]))
                    .collect(),
            ),
            TrackKind::Quaternion => Self::Quaternion(
                flat.chunks_exact(4)
                    .map(|c| Quat::from_xyzw(c[0], c[1], c[2], c[3]))
                    .collect(),
            ),
        };
        Some(values)
    }

    /// Kind of the samples
    pub fn kind(&self) -> TrackKind {
        match self {
            Self::Scalar(_) => TrackKind::Scalar,
            Self::Vector(_) => TrackKind::Vector,
            Self::Quaternion(_) => TrackKind::Quaternion,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(v) => v.len(),
            Self::Vector(v) => v.len(),
            Self::Quaternion(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten the samples back into one component array
    pub fn to_flat(&self) -> Vec<f32> {
        match self {
            Self::Scalar(v) => v.clone(),
            Self::Vector(v) => v.iter().flat_map(|s| s.to_array()).collect(),
            Self::Quaternion(v) => v.iter().flat_map(|s| s.to_array()).collect(),
        }
    }
}

/// One animated property: key times and one sample per key
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack {
    /// Binding name, `<target>.<property>`
    pub name: String,
    /// Key times in seconds
    pub times: Vec<f32>,
    /// Samples, one per key time
    pub values: TrackValues,
    /// Interpolation between keys
    pub interpolation: Interpolation,
}

impl KeyframeTrack {
    /// Create a track from already grouped samples
    pub fn new(name: impl Into<String>, times: Vec<f32>, values: TrackValues) -> Self {
        Self {
            name: name.into(),
            times,
            values,
            interpolation: Interpolation::Linear,
        }
    }

    /// Create a track from a flat value array.
    ///
    /// The stride is `round(values / times)`, or 0 when there are no key
    /// times. Returns `None` when the stride has no track kind or when the
    /// value count is not exactly `stride * times`.
    pub fn from_flat(name: impl Into<String>, times: Vec<f32>, flat_values: &[f32]) -> Option<Self> {
        let stride = stride_of(times.len(), flat_values.len());
        let kind = TrackKind::from_stride(stride)?;

        if flat_values.len() != stride * times.len() {
            return None;
        }

        let values = TrackValues::from_flat(kind, flat_values)?;
        Some(Self::new(name, times, values))
    }

    /// Set the interpolation mode
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Kind of the track
    pub fn kind(&self) -> TrackKind {
        self.values.kind()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the final key, 0 for a track without keys
    pub fn last_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Samples as one flat component array
    pub fn flat_values(&self) -> Vec<f32> {
        self.values.to_flat()
    }
}

/// Number of components per key, `round(values / times)`, or 0 without keys
pub fn stride_of(time_count: usize, value_count: usize) -> usize {
    if time_count == 0 {
        return 0;
    }
    (value_count as f64 / time_count as f64).round() as usize
}

/// A named collection of tracks with an overall duration
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Unique id assigned on construction
    pub id: Uuid,
    pub name: String,
    /// Length in seconds, or [`UNDETERMINED_DURATION`]
    pub duration: f32,
    pub tracks: Vec<KeyframeTrack>,
}

impl AnimationClip {
    /// Create a clip with an explicit duration
    pub fn new(name: impl Into<String>, duration: f32, tracks: Vec<KeyframeTrack>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Create a clip whose duration is the latest final key time over all
    /// tracks, or [`UNDETERMINED_DURATION`] when there are no tracks.
    pub fn with_resolved_duration(name: impl Into<String>, tracks: Vec<KeyframeTrack>) -> Self {
        let duration = resolve_duration(&tracks);
        Self::new(name, duration, tracks)
    }

    /// Whether the duration is known
    pub fn has_valid_duration(&self) -> bool {
        self.duration >= 0.0
    }

    /// Find a track by binding name
    pub fn track(&self, name: &str) -> Option<&KeyframeTrack> {
        self.tracks.iter().find(|t| t.name == name)
    }
}

/// Latest final key time over the tracks, or [`UNDETERMINED_DURATION`]
pub fn resolve_duration(tracks: &[KeyframeTrack]) -> f32 {
    tracks
        .iter()
        .map(KeyframeTrack::last_time)
        .reduce(f32::max)
        .unwrap_or(UNDETERMINED_DURATION)
}
