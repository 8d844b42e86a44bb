//! Error types for the transform engine.
//!
//! Only shape/type contract violations surface as errors. Soft anomalies
//! (unclassified channels, missing snapshots, non-finite quotients) are
//! absorbed where they happen and never reach this enum.

use serde::{Deserialize, Serialize};

use crate::data::ChannelKind;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TransformError {
    /// Value buffer does not hold `stride` components per time sample.
    #[error("Malformed track '{channel}': {values_len} values for {times_len} times (stride {stride})")]
    MalformedTrack {
        channel: String,
        stride: usize,
        times_len: usize,
        values_len: usize,
    },

    /// Operation requires a different channel kind.
    #[error("Channel '{channel}' kind mismatch: expected {expected:?}, got {actual:?}")]
    KindMismatch {
        channel: String,
        expected: ChannelKind,
        actual: ChannelKind,
    },

    #[error("Frame {frame} out of range for channel '{channel}' ({len} frames)")]
    FrameOutOfRange {
        channel: String,
        frame: usize,
        len: usize,
    },

    #[error("Channel index {index} out of range ({len} channels)")]
    ChannelOutOfRange { index: usize, len: usize },

    #[error("Clip not found: {id}")]
    ClipNotFound { id: u32 },

    #[error("Unknown curve transform: {name}")]
    UnknownCurve { name: String },

    #[error("Invalid clip: {reason}")]
    InvalidClip { reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl TransformError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedTrack { .. } | Self::KindMismatch { .. } | Self::InvalidClip { .. } => {
                "shape"
            }
            Self::FrameOutOfRange { .. } | Self::ChannelOutOfRange { .. } => "range",
            Self::ClipNotFound { .. } => "data",
            Self::UnknownCurve { .. } => "curve",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
