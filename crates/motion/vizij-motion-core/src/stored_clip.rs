use serde::Deserialize;

use crate::data::{AnimationClip, Channel, ChannelKind};
use crate::error::TransformError;

/// Public API: parse clip JSON (`{ name, tracks: [{ name, type, times, values }] }`)
/// into the canonical [`AnimationClip`] (data.rs).
///
/// Notes:
/// - `type` accepts `vector`/`vector3`/`position` and `quaternion`/`rotation`.
/// - Times are seconds and must be finite and non-decreasing.
/// - Value buffers must hold exactly one stride per time (3 or 4); mismatches are
///   reported as `MalformedTrack` rather than repaired.
pub fn parse_clip_json(s: &str) -> Result<AnimationClip, TransformError> {
    let raw: RawClip = serde_json::from_str(s)?;

    let mut channels = Vec::with_capacity(raw.tracks.len());
    for track in raw.tracks {
        let kind = match track.kind.to_ascii_lowercase().as_str() {
            "vector" | "vector3" | "position" => ChannelKind::Vector,
            "quaternion" | "rotation" => ChannelKind::Quaternion,
            other => {
                return Err(TransformError::InvalidClip {
                    reason: format!("unsupported track type '{other}' for '{}'", track.name),
                })
            }
        };
        let times = track.times.iter().map(|t| *t as f32).collect();
        let values = track.values.iter().map(|v| *v as f32).collect();
        channels.push(Channel::new(track.name, kind, times, values)?);
    }

    let clip = AnimationClip::new(raw.name, channels);
    clip.validate_basic()?;
    Ok(clip)
}

/// Serialize a clip back into the same JSON layout.
pub fn clip_to_json(clip: &AnimationClip) -> serde_json::Value {
    let tracks: Vec<serde_json::Value> = clip
        .channels
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.name,
                "type": match c.kind {
                    ChannelKind::Vector => "vector",
                    ChannelKind::Quaternion => "quaternion",
                },
                "times": c.times,
                "values": c.values,
            })
        })
        .collect();
    serde_json::json!({ "name": clip.name, "tracks": tracks })
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct RawClip {
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}
