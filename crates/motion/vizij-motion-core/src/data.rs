//! Canonical clip data model: channels of flat time/value sample buffers.

use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::samples;

/// Value layout of a channel.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ChannelKind {
    /// Three components per sample (positions, scales).
    Vector,
    /// Unit quaternion `(x, y, z, w)` per sample.
    Quaternion,
}

impl ChannelKind {
    #[inline]
    pub fn stride(self) -> usize {
        match self {
            ChannelKind::Vector => 3,
            ChannelKind::Quaternion => 4,
        }
    }
}

/// One animated property of one joint, e.g. `"Spine.quaternion"`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    pub name: String,
    pub kind: ChannelKind,
    /// Non-decreasing sample times in seconds.
    pub times: Vec<f32>,
    /// Sample-major values, `times.len() * kind.stride()` long.
    pub values: Vec<f32>,
}

impl Channel {
    /// Build a channel, rejecting buffers that break the stride invariant.
    pub fn new(
        name: impl Into<String>,
        kind: ChannelKind,
        times: Vec<f32>,
        values: Vec<f32>,
    ) -> Result<Self, TransformError> {
        let channel = Self {
            name: name.into(),
            kind,
            times,
            values,
        };
        channel.check_shape()?;
        Ok(channel)
    }

    pub fn check_shape(&self) -> Result<(), TransformError> {
        let stride = self.kind.stride();
        if self.values.len() != self.times.len() * stride {
            return Err(TransformError::MalformedTrack {
                channel: self.name.clone(),
                stride,
                times_len: self.times.len(),
                values_len: self.values.len(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[inline]
    pub fn is_rotation(&self) -> bool {
        matches!(self.kind, ChannelKind::Quaternion)
    }

    /// Joint part of the name (everything before the last `.`).
    pub fn joint(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => &self.name,
        }
    }

    /// Borrow sample `index`.
    #[inline]
    pub fn sample(&self, index: usize) -> Option<&[f32]> {
        samples::frame(&self.values, index, self.kind.stride())
    }

    /// Quaternion at `index` for rotation channels.
    pub fn quat(&self, index: usize) -> Option<[f32; 4]> {
        match self.kind {
            ChannelKind::Quaternion => self.sample(index).map(|s| [s[0], s[1], s[2], s[3]]),
            ChannelKind::Vector => None,
        }
    }

    /// Last time minus first time, `0` when empty.
    pub fn duration(&self) -> f32 {
        match (self.times.first(), self.times.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

/// Ordered channels sharing one timeline origin.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        Self {
            name: name.into(),
            channels,
        }
    }

    /// Max channel duration.
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .map(Channel::duration)
            .fold(0.0f32, f32::max)
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Validate basic invariants (stride, non-decreasing finite times).
    pub fn validate_basic(&self) -> Result<(), TransformError> {
        for channel in &self.channels {
            channel.check_shape()?;
            let mut last = -f32::INFINITY;
            for t in &channel.times {
                if !t.is_finite() {
                    return Err(TransformError::InvalidClip {
                        reason: format!("non-finite time in '{}'", channel.name),
                    });
                }
                if *t < last {
                    return Err(TransformError::InvalidClip {
                        reason: format!("times must be non-decreasing in '{}'", channel.name),
                    });
                }
                last = *t;
            }
        }
        Ok(())
    }
}
