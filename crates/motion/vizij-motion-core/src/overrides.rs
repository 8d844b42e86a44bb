//! Override engine: energy, delay, curve and rotation overrides per channel.
//!
//! Each invocation resets the touched buffers from the clip's
//! [`ClipSnapshot`](crate::snapshot::ClipSnapshot) before applying anything, so
//! repeated updates never compound. Steps, in order:
//!
//! 1. position lock (root position channel only, independent of other flags),
//! 2. timing: delay shift then energy and timescale division,
//! 3. curve transform in Euler space,
//! 4. per-axis rotation scaling from the cached snapshot Euler angles.
//!
//! A channel without a snapshot entry is skipped; the rest of the clip is
//! still updated.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::curves::CurveRegistry;
use crate::data::{AnimationClip, Channel, ChannelKind};
use crate::euler::{self, Euler};
use crate::snapshot::{ChannelSnapshot, ClipSnapshot};

/// Which parts of the pipeline a parameter change affects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateFlags {
    pub timing: bool,
    pub rotation: bool,
    pub curve: bool,
    pub lock_position: bool,
}

impl UpdateFlags {
    pub fn all() -> Self {
        Self {
            timing: true,
            rotation: true,
            curve: true,
            lock_position: true,
        }
    }

    pub fn timing() -> Self {
        Self {
            timing: true,
            ..Self::default()
        }
    }
}

/// Playback state sampled when the update is issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateContext {
    /// Current playback time in seconds.
    pub current_time: f32,
}

/// Per-update counters, mostly for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverrideReport {
    pub updated: usize,
    pub skipped_missing_snapshot: usize,
    pub unclassified: usize,
    pub locked: usize,
}

/// Shift applied to a channel's times for a delay parameter.
///
/// Only negative offsets are applied; a positive result (negative delay
/// parameter or negative playback time) leaves the times alone. Whether forward
/// shifts should ever be supported is left open, so the guard is kept as is.
#[inline]
pub fn delay_offset(current_time: f32, delay_param: f32) -> Option<f32> {
    let offset = -current_time / 100.0 * delay_param;
    (offset < 0.0).then_some(offset)
}

/// Divide every time by `factor`, keeping the original where the quotient is
/// not finite.
///
/// The timing step calls this twice: once with the part's energy factor and
/// once more with the global `timescale` playback rate (1.0 leaves times as is).
pub fn scale_times(times: &mut [f32], factor: f32) {
    if factor == 1.0 {
        return;
    }
    for t in times.iter_mut() {
        let scaled = *t / factor;
        if scaled.is_finite() {
            *t = scaled;
        }
    }
}

/// Run the override pipeline over every channel of `clip`.
pub fn apply_overrides(
    clip: &mut AnimationClip,
    snapshot: &ClipSnapshot,
    cfg: &EngineConfig,
    flags: UpdateFlags,
    ctx: UpdateContext,
    curves: &CurveRegistry,
) -> OverrideReport {
    let mut report = OverrideReport::default();
    for (index, channel) in clip.channels.iter_mut().enumerate() {
        let Some(snap) = snapshot.channel(index) else {
            log::warn!(
                "overrides: no snapshot for channel {} ('{}'); skipping",
                index,
                channel.name
            );
            report.skipped_missing_snapshot += 1;
            continue;
        };
        match apply_channel(channel, snap, cfg, flags, ctx, curves) {
            ChannelOutcome::Updated => report.updated += 1,
            ChannelOutcome::Locked => report.locked += 1,
            ChannelOutcome::Unclassified => report.unclassified += 1,
        }
    }
    log::debug!(
        "overrides: '{}' updated={} locked={} unclassified={} missing={}",
        clip.name,
        report.updated,
        report.locked,
        report.unclassified,
        report.skipped_missing_snapshot
    );
    report
}

#[derive(Debug, PartialEq, Eq)]
enum ChannelOutcome {
    Updated,
    Locked,
    Unclassified,
}

fn apply_channel(
    channel: &mut Channel,
    snap: &ChannelSnapshot,
    cfg: &EngineConfig,
    flags: UpdateFlags,
    ctx: UpdateContext,
    curves: &CurveRegistry,
) -> ChannelOutcome {
    let profile = &snap.profile;

    // 1) position lock
    if flags.lock_position && profile.root_position {
        if cfg.lock_position {
            channel.values.iter_mut().for_each(|v| *v = 0.0);
            return ChannelOutcome::Locked;
        }
        channel.values.clone_from(&snap.values);
    }

    // 2) timing
    if flags.timing {
        channel.times.clone_from(&snap.times);
        if let Some(part) = profile.delay {
            if let Some(offset) = delay_offset(ctx.current_time, cfg.delay_param(part)) {
                crate::samples::offset_times(&mut channel.times, offset);
            }
        }
        let Some(part) = profile.energy else {
            return ChannelOutcome::Unclassified;
        };
        scale_times(&mut channel.times, cfg.energy_factor(part));
        scale_times(&mut channel.times, cfg.timescale);
    }

    // 3) curve
    if flags.curve {
        channel.values.clone_from(&snap.values);
        if channel.is_rotation()
            && profile
                .curve
                .is_some_and(|part| cfg.curve.parts.enabled(part))
        {
            apply_curve(channel, snap, cfg, curves);
        }
    }

    // 4) rotation
    if flags.rotation {
        match channel.kind {
            ChannelKind::Quaternion => apply_rotation_scale(channel, snap, cfg),
            ChannelKind::Vector => {}
        }
    }

    ChannelOutcome::Updated
}

fn apply_curve(
    channel: &mut Channel,
    snap: &ChannelSnapshot,
    cfg: &EngineConfig,
    curves: &CurveRegistry,
) {
    let eulers: Vec<Euler> = match &snap.eulers {
        Some(cached) => cached.clone(),
        None => euler::eulers_from_values(&channel.values),
    };
    let options = cfg.curve.options();
    let enabled = cfg.curve.axes.as_array();
    let mut out = eulers.clone();

    for (axis, on) in enabled.iter().enumerate() {
        if !on {
            continue;
        }
        let series: Vec<f64> = eulers.iter().map(|e| e[axis]).collect();
        let filtered = match curves.apply(&cfg.curve.equation, &series, &options) {
            Ok(filtered) => filtered,
            Err(err) => {
                log::warn!("overrides: curve skipped for '{}': {}", channel.name, err);
                return;
            }
        };
        for (e, v) in out.iter_mut().zip(filtered) {
            e[axis] = v;
        }
    }

    write_eulers(&mut channel.values, &out);
}

fn apply_rotation_scale(channel: &mut Channel, snap: &ChannelSnapshot, cfg: &EngineConfig) {
    if cfg.rotations.is_identity() {
        channel.values.clone_from(&snap.values);
        return;
    }
    let Some(eulers) = &snap.eulers else {
        return;
    };
    let scale = cfg.rotations.as_array();
    let scaled: Vec<Euler> = eulers
        .iter()
        .map(|e| [e[0] * scale[0], e[1] * scale[1], e[2] * scale[2]])
        .collect();
    write_eulers(&mut channel.values, &scaled);
}

fn write_eulers(values: &mut [f32], eulers: &[Euler]) {
    for (chunk, e) in values.chunks_exact_mut(4).zip(eulers) {
        chunk.copy_from_slice(&euler::from_euler(*e));
    }
}
