//! Immutable original snapshots of loaded clips.
//!
//! Every override starts from these copies, never from the live channel, which
//! is what makes each transform reversible.

use hashbrown::HashMap;

use crate::classify::ChannelProfile;
use crate::data::{AnimationClip, Channel, ChannelKind};
use crate::euler::{self, Euler};

/// Original samples of one channel plus cached derived data.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSnapshot {
    pub times: Vec<f32>,
    pub values: Vec<f32>,
    pub duration: f32,
    /// Per-sample Euler triples, quaternion channels only.
    pub eulers: Option<Vec<Euler>>,
    pub profile: ChannelProfile,
}

impl ChannelSnapshot {
    pub fn capture(channel: &Channel) -> Self {
        let eulers = match channel.kind {
            ChannelKind::Quaternion => Some(euler::eulers_from_values(&channel.values)),
            ChannelKind::Vector => None,
        };
        Self {
            times: channel.times.clone(),
            values: channel.values.clone(),
            duration: channel.duration(),
            eulers,
            profile: ChannelProfile::of(channel),
        }
    }
}

/// Snapshot of a whole clip, indexed like `AnimationClip::channels`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipSnapshot {
    pub channels: Vec<ChannelSnapshot>,
}

impl ClipSnapshot {
    pub fn capture(clip: &AnimationClip) -> Self {
        Self {
            channels: clip.channels.iter().map(ChannelSnapshot::capture).collect(),
        }
    }

    #[inline]
    pub fn channel(&self, index: usize) -> Option<&ChannelSnapshot> {
        self.channels.get(index)
    }
}

/// Originals keyed by clip name.
#[derive(Debug, Default)]
pub struct OriginalStore {
    clips: HashMap<String, ClipSnapshot>,
}

impl OriginalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture (or replace) the snapshot for `clip`.
    pub fn capture(&mut self, clip: &AnimationClip) -> &ClipSnapshot {
        log::debug!(
            "snapshot: capturing '{}' ({} channels)",
            clip.name,
            clip.channels.len()
        );
        self.clips
            .insert(clip.name.clone(), ClipSnapshot::capture(clip));
        &self.clips[clip.name.as_str()]
    }

    pub fn get(&self, clip_name: &str) -> Option<&ClipSnapshot> {
        self.clips.get(clip_name)
    }

    pub fn remove(&mut self, clip_name: &str) -> Option<ClipSnapshot> {
        self.clips.remove(clip_name)
    }

    pub fn contains(&self, clip_name: &str) -> bool {
        self.clips.contains_key(clip_name)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
