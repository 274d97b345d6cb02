//! JSON track format
//!
//! ```text
//! { "duration"?: number, "tracks": [ { "name": string, "times": [..], "values": [..] } ] }
//! ```
//!
//! Elements that do not have this shape are skipped, as are tracks whose
//! stride has no track kind. Neither is an error.

use crate::clip::{stride_of, AnimationClip, KeyframeTrack};
use crate::Result;
use serde_json::Value;

/// Name given to clips parsed from JSON
pub const JSON_CLIP_NAME: &str = "animation";

/// Decode fetched bytes as text, replacing invalid UTF-8 sequences
pub fn decode_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

/// Parse the JSON track format into a clip
pub fn parse_json_clip(text: &str) -> Result<AnimationClip> {
    let document: Value = serde_json::from_str(text)?;

    let tracks: Vec<KeyframeTrack> = match document.get("tracks").and_then(Value::as_array) {
        Some(elements) => elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| parse_track(index, element))
            .collect(),
        None => Vec::new(),
    };

    let clip = match document.get("duration").and_then(Value::as_f64) {
        Some(duration) => AnimationClip::new(JSON_CLIP_NAME, duration as f32, tracks),
        None => AnimationClip::with_resolved_duration(JSON_CLIP_NAME, tracks),
    };

    log::debug!(
        "Parsed JSON clip: {} tracks, duration {}",
        clip.tracks.len(),
        clip.duration
    );
    Ok(clip)
}

fn parse_track(index: usize, element: &Value) -> Option<KeyframeTrack> {
    let Some(name) = element.get("name").and_then(Value::as_str) else {
        log::debug!("Skipping track {index}: missing name");
        return None;
    };
    let (Some(times), Some(values)) = (
        element.get("times").and_then(number_array),
        element.get("values").and_then(number_array),
    ) else {
        log::debug!("Skipping track {index} ({name}): times/values are not number arrays");
        return None;
    };

    let stride = stride_of(times.len(), values.len());
    let track = KeyframeTrack::from_flat(name, times, &values);
    if track.is_none() {
        log::debug!(
            "Skipping track {index} ({name}): unsupported stride {stride} for {} values",
            values.len()
        );
    }
    track
}

fn number_array(value: &Value) -> Option<Vec<f32>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_f64().map(|n| n as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{TrackKind, UNDETERMINED_DURATION};
    use crate::LoaderError;

    #[test]
    fn test_explicit_duration_wins() {
        let clip = parse_json_clip(r#"{"duration": 2.5, "tracks": []}"#).unwrap();
        assert_eq!(clip.name, "animation");
        assert_eq!(clip.duration, 2.5);
        assert!(clip.tracks.is_empty());
    }

    #[test]
    fn test_duration_from_last_key() {
        let clip = parse_json_clip(
            r#"{"tracks": [{"name":"bone.quaternion","times":[0,1],"values":[0,0,0,1,0,0,0,1]}]}"#,
        )
        .unwrap();

        assert_eq!(clip.duration, 1.0);
        assert_eq!(clip.tracks.len(), 1);
        assert_eq!(clip.tracks[0].kind(), TrackKind::Quaternion);
    }

    #[test]
    fn test_no_tracks_no_duration() {
        let clip = parse_json_clip(r#"{"tracks": []}"#).unwrap();
        assert_eq!(clip.duration, UNDETERMINED_DURATION);

        let clip = parse_json_clip("{}").unwrap();
        assert_eq!(clip.duration, UNDETERMINED_DURATION);
    }

    #[test]
    fn test_non_object_document_is_empty_clip() {
        let clip = parse_json_clip("[1, 2, 3]").unwrap();
        assert!(clip.tracks.is_empty());
        assert_eq!(clip.duration, UNDETERMINED_DURATION);
    }

    #[test]
    fn test_non_numeric_duration_is_ignored() {
        let clip = parse_json_clip(
            r#"{"duration": "long", "tracks": [{"name":"w","times":[0,4],"values":[0,1]}]}"#,
        )
        .unwrap();
        assert_eq!(clip.duration, 4.0);
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_json_clip("{ \"tracks\": [").unwrap_err();
        assert!(matches!(err, LoaderError::Json(_)));

        let parser_message = serde_json::from_str::<Value>("{ \"tracks\": [")
            .unwrap_err()
            .to_string();
        let message = err.to_string();
        assert!(message.contains("Failed to parse JSON"));
        assert!(message.contains(&parser_message));
    }

    #[test]
    fn test_non_number_samples_skip_track() {
        let clip = parse_json_clip(
            r#"{"tracks": [
                {"name":"a.position","times":[0,"x"],"values":[0,0,0,1,1,1]},
                {"name":"b.position","times":[0,1],"values":[0,0,0,1,1,1]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(clip.tracks.len(), 1);
        assert_eq!(clip.tracks[0].name, "b.position");
    }

    #[test]
    fn test_decode_text_is_lossy() {
        assert_eq!(decode_text(b"{}"), "{}");
        assert_eq!(decode_text(&[b'{', 0xff, b'}']), "{\u{fffd}}");
    }
}
