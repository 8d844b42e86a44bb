//! Keyframe analyzer: read-only time/channel indexes over a clip.
//!
//! `analyze` rebuilds both indexes from scratch; the source clip is never
//! touched. Times are grouped by exact `f32` equality.

use hashbrown::HashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::{ChannelProfile, LimbPart};
use crate::data::{AnimationClip, Channel, ChannelKind};
use crate::euler;

/// One sample value, tagged by layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum SampleValue {
    Vector([f32; 3]),
    Quaternion([f32; 4]),
}

impl SampleValue {
    fn read(channel: &Channel, index: usize) -> Option<Self> {
        let s = channel.sample(index)?;
        Some(match channel.kind {
            ChannelKind::Vector => SampleValue::Vector([s[0], s[1], s[2]]),
            ChannelKind::Quaternion => SampleValue::Quaternion([s[0], s[1], s[2], s[3]]),
        })
    }

    /// Distance to another sample of the same layout (radians for rotations).
    pub fn distance(&self, other: &SampleValue) -> Option<f64> {
        match (self, other) {
            (SampleValue::Vector(a), SampleValue::Vector(b)) => Some(
                a.iter()
                    .zip(b)
                    .map(|(x, y)| ((x - y) as f64).powi(2))
                    .sum::<f64>()
                    .sqrt(),
            ),
            (SampleValue::Quaternion(a), SampleValue::Quaternion(b)) => {
                Some(euler::angular_distance(*a, *b))
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelSample {
    pub channel: String,
    pub value: SampleValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedSample {
    pub time: f32,
    pub value: SampleValue,
}

/// All samples sharing one time stamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeGroup {
    pub time: f32,
    pub samples: Vec<ChannelSample>,
}

/// Channel selector for time lookups.
#[derive(Clone, Debug)]
pub enum ChannelFilter {
    Name(String),
    Pattern(Regex),
}

impl ChannelFilter {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            ChannelFilter::Name(n) => n == name,
            ChannelFilter::Pattern(re) => re.is_match(name),
        }
    }
}

/// Step statistics of one channel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementStats {
    pub channel: String,
    pub samples: usize,
    /// Sum of distances between consecutive samples.
    pub total: f64,
    pub mean_step: f64,
    pub max_step: f64,
}

#[derive(Debug, Default)]
pub struct KeyframeAnalyzer {
    // Sorted by time.
    by_time: Vec<TimeGroup>,
    by_channel: HashMap<String, Vec<TimedSample>>,
    profiles: HashMap<String, ChannelProfile>,
}

impl KeyframeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh analyzer for `clip`.
    pub fn from_clip(clip: &AnimationClip) -> Self {
        let mut analyzer = Self::new();
        analyzer.analyze(clip);
        analyzer
    }

    /// Rebuild both indexes.
    pub fn analyze(&mut self, clip: &AnimationClip) {
        self.by_channel.clear();
        self.profiles.clear();
        let mut groups: HashMap<u32, TimeGroup> = HashMap::new();

        for channel in &clip.channels {
            let mut series = Vec::with_capacity(channel.len());
            for (i, &time) in channel.times.iter().enumerate() {
                let Some(value) = SampleValue::read(channel, i) else {
                    continue;
                };
                series.push(TimedSample { time, value });
                groups
                    .entry(time_key(time))
                    .or_insert_with(|| TimeGroup {
                        time,
                        samples: Vec::new(),
                    })
                    .samples
                    .push(ChannelSample {
                        channel: channel.name.clone(),
                        value,
                    });
            }
            self.by_channel.insert(channel.name.clone(), series);
            self.profiles
                .insert(channel.name.clone(), ChannelProfile::of(channel));
        }

        self.by_time = groups.into_values().collect();
        self.by_time.sort_by(|a, b| a.time.total_cmp(&b.time));
        log::debug!(
            "analyzer: '{}' indexed {} times over {} channels",
            clip.name,
            self.by_time.len(),
            self.by_channel.len()
        );
    }

    /// Distinct times, ascending.
    pub fn times(&self) -> Vec<f32> {
        self.by_time.iter().map(|g| g.time).collect()
    }

    pub fn channel(&self, name: &str) -> Option<&[TimedSample]> {
        self.by_channel.get(name).map(Vec::as_slice)
    }

    /// Samples stamped exactly at `time`, optionally filtered by channel.
    pub fn at_time(&self, time: f32, filter: Option<&ChannelFilter>) -> Vec<ChannelSample> {
        let Ok(idx) = self
            .by_time
            .binary_search_by(|g| g.time.total_cmp(&time))
        else {
            return Vec::new();
        };
        self.by_time[idx]
            .samples
            .iter()
            .filter(|s| filter.map_or(true, |f| f.matches(&s.channel)))
            .cloned()
            .collect()
    }

    /// Up to `limit` groups stamped at or before `time + range`, nearest first.
    pub fn nearest(&self, time: f32, range: f32, limit: usize) -> Vec<&TimeGroup> {
        let bound = time + range;
        let end = self.by_time.partition_point(|g| g.time <= bound);
        self.by_time[..end].iter().rev().take(limit).collect()
    }

    /// Step statistics per channel, in name order.
    pub fn movement_stats(&self) -> Vec<MovementStats> {
        let mut stats: Vec<MovementStats> = self
            .by_channel
            .iter()
            .map(|(name, series)| {
                let steps: Vec<f64> = series
                    .windows(2)
                    .filter_map(|w| w[1].value.distance(&w[0].value))
                    .collect();
                let total: f64 = steps.iter().sum();
                MovementStats {
                    channel: name.clone(),
                    samples: series.len(),
                    total,
                    mean_step: if steps.is_empty() {
                        0.0
                    } else {
                        total / steps.len() as f64
                    },
                    max_step: steps.iter().copied().fold(0.0, f64::max),
                }
            })
            .collect();
        stats.sort_by(|a, b| a.channel.cmp(&b.channel));
        stats
    }

    /// Total movement summed per limb (axis-point partition).
    pub fn movement_by_part(&self) -> HashMap<LimbPart, f64> {
        let mut out = HashMap::new();
        for s in self.movement_stats() {
            if let Some(part) = self.profiles.get(&s.channel).and_then(|p| p.axis_point) {
                *out.entry(part).or_insert(0.0) += s.total;
            }
        }
        out
    }
}

#[inline]
fn time_key(t: f32) -> u32 {
    // -0.0 and 0.0 share a group.
    if t == 0.0 {
        0
    } else {
        t.to_bits()
    }
}
