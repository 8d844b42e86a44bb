//! External body space: valley detection and graduated delay injection.
//!
//! The aggregate rotational motion of a clip is reduced to one scalar per
//! frame, normalized, and scanned for runs of near-constant motion
//! ("valleys"). Gaps between valleys are padded with short filler intervals,
//! then every rotation channel is retimed so that each completed interval adds
//! exactly `delay` seconds, spread evenly across its frames.

use serde::{Deserialize, Serialize};

use crate::config::SpaceConfig;
use crate::curves;
use crate::data::Channel;

/// Values above this are capped before normalization.
pub const MOTION_CAP: f64 = 0.05;

/// Frames covered by one padding filler, minus one.
const FILLER_SPAN: usize = 3;

const STRIDE_EPS: f64 = 1e-9;

/// Inclusive frame range `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValleyInterval {
    pub start: usize,
    pub end: usize,
}

impl ValleyInterval {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Number of frames covered.
    #[inline]
    pub fn frames(&self) -> usize {
        self.end - self.start + 1
    }

    #[inline]
    pub fn contains(&self, frame: usize) -> bool {
        (self.start..=self.end).contains(&frame)
    }
}

/// Per-frame mean absolute component value, averaged over the channels that
/// have that frame.
pub fn aggregate_motion(channels: &[&Channel]) -> Vec<f64> {
    let frames = channels.iter().map(|c| c.len()).max().unwrap_or(0);
    (0..frames)
        .map(|f| {
            let (sum, count) = channels
                .iter()
                .filter_map(|c| c.sample(f))
                .map(|s| s.iter().map(|v| v.abs() as f64).sum::<f64>() / s.len() as f64)
                .fold((0.0, 0usize), |(sum, n), m| (sum + m, n + 1));
            if count == 0 {
                0.0
            } else {
                sum / count as f64
            }
        })
        .collect()
}

/// Clamp values above `cap` to the largest value not above it, then min-max
/// scale to `[0, 1]`. A constant series maps to zeros.
pub fn capped_normalize(arr: &[f64], cap: f64) -> Vec<f64> {
    let ceiling = arr
        .iter()
        .copied()
        .filter(|v| *v <= cap)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
        .unwrap_or(cap);
    let capped: Vec<f64> = arr
        .iter()
        .map(|v| if *v > cap { ceiling } else { *v })
        .collect();
    let min = capped.iter().copied().fold(f64::INFINITY, f64::min);
    let max = capped.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !(range > 0.0) {
        return vec![0.0; capped.len()];
    }
    capped.iter().map(|v| (v - min) / range).collect()
}

/// Split the series at every frame-to-frame jump larger than `threshold / 100`
/// and keep the pieces longer than `min_window` frames.
///
/// A series without any jump yields no valleys.
pub fn detect_valleys(series: &[f64], threshold: f64, min_window: usize) -> Vec<ValleyInterval> {
    let limit = threshold / 100.0;
    let mut valleys = Vec::new();
    let mut start = 0usize;
    let mut split = false;
    for i in 1..series.len() {
        if (series[i] - series[i - 1]).abs() > limit {
            if i - start > min_window {
                valleys.push(ValleyInterval::new(start, i - 1));
            }
            start = i;
            split = true;
        }
    }
    if split && series.len() - start > min_window {
        valleys.push(ValleyInterval::new(start, series.len() - 1));
    }
    valleys
}

/// Fill uncovered frames with `[x, x + 3]` intervals every
/// `floor(100 * (1 - threshold))` frames, then sort and merge overlaps.
pub fn pad_valleys(
    valleys: &[ValleyInterval],
    frame_count: usize,
    threshold: f64,
) -> Vec<ValleyInterval> {
    // Snap representation error (1 - 0.9 is just under 0.1) before flooring.
    let stride = (100.0 * (1.0 - threshold) + STRIDE_EPS).floor();
    let mut sorted = valleys.to_vec();
    sorted.sort_by_key(|v| (v.start, v.end));
    if !(stride >= 1.0) || frame_count == 0 {
        return merge_overlapping(sorted);
    }
    let stride = stride as usize;

    let mut out = Vec::with_capacity(sorted.len() * 2);
    let mut cursor = 0usize;
    // Sentinel past the last frame flushes the trailing gap.
    let sentinel = ValleyInterval::new(frame_count, frame_count);
    for v in sorted.iter().chain(std::iter::once(&sentinel)) {
        if v.start > cursor {
            fill_gap(&mut out, cursor, v.start - 1, stride);
        }
        if v.start < frame_count {
            out.push(*v);
        }
        cursor = cursor.max(v.end + 1);
    }
    out.sort_by_key(|v| (v.start, v.end));
    merge_overlapping(out)
}

fn fill_gap(out: &mut Vec<ValleyInterval>, from: usize, to: usize, stride: usize) {
    let mut x = from;
    while x + FILLER_SPAN <= to {
        out.push(ValleyInterval::new(x, x + FILLER_SPAN));
        x += stride;
    }
}

/// Merge intervals sharing at least one frame, keeping the earliest start.
pub fn merge_overlapping(sorted: Vec<ValleyInterval>) -> Vec<ValleyInterval> {
    let mut merged: Vec<ValleyInterval> = Vec::with_capacity(sorted.len());
    for v in sorted {
        match merged.last_mut() {
            Some(last) if v.start <= last.end => last.end = last.end.max(v.end),
            _ => merged.push(v),
        }
    }
    merged
}

/// Shift the channel's times: each interval adds `delay`, distributed
/// `delay / len` per frame while inside it, and carried forward afterwards.
pub fn apply_valley_delay(channel: &mut Channel, intervals: &[ValleyInterval], delay: f32) {
    let mut global_delay = 0.0f32;
    let mut per_frame = 0.0f32;
    let mut in_valley = 0.0f32;
    let mut next = 0usize;
    let mut active: Option<ValleyInterval> = None;

    for (frame, t) in channel.times.iter_mut().enumerate() {
        if active.is_none() {
            if let Some(v) = intervals.get(next).filter(|v| v.start == frame) {
                per_frame = delay / v.frames() as f32;
                in_valley = 0.0;
                active = Some(*v);
            }
        }
        let mut shift = global_delay;
        if let Some(v) = active {
            in_valley += per_frame;
            shift += in_valley;
            if frame == v.end {
                global_delay += delay;
                shift = global_delay;
                active = None;
                next += 1;
            }
        }
        *t += shift;
    }
}

/// Full pass over a clip's channels. Only rotation channels are retimed.
///
/// Returns the intervals used; empty when `delay == 0` or there is nothing to
/// analyse.
pub fn apply_space(channels: &mut [Channel], cfg: &SpaceConfig) -> Vec<ValleyInterval> {
    if cfg.delay == 0.0 {
        return Vec::new();
    }
    let rotations: Vec<&Channel> = channels.iter().filter(|c| c.is_rotation()).collect();
    if rotations.is_empty() {
        return Vec::new();
    }

    let mut averages = aggregate_motion(&rotations);
    if cfg.window_size > 1 {
        averages = curves::lowpass(&averages, cfg.window_size);
    }
    let normalized = capped_normalize(&averages, MOTION_CAP);
    let valleys = detect_valleys(&normalized, cfg.threshold, cfg.min_window);
    let intervals = pad_valleys(&valleys, normalized.len(), cfg.threshold);
    log::debug!(
        "space: {} valleys, {} intervals after padding over {} frames",
        valleys.len(),
        intervals.len(),
        normalized.len()
    );

    for channel in channels.iter_mut().filter(|c| c.is_rotation()) {
        apply_valley_delay(channel, &intervals, cfg.delay);
    }
    intervals
}
